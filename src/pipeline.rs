use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::ai::analysis::{ai_assisted_filter, analyze};
use crate::ai::TextModel;
use crate::data::filter::filter_rows;
use crate::data::loader::load_table;
use crate::data::model::Table;
use crate::document::read_pdf_text;
use crate::output::{save_excel, save_json, OutputMode, OutputNames, SaveDialogs, Saved};
use crate::status::StatusLog;

// ---------------------------------------------------------------------------
// One user-initiated run
// ---------------------------------------------------------------------------

/// Everything the form collected for a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRequest {
    pub table_path: PathBuf,
    pub document_path: PathBuf,
    pub sheet_name: String,
    pub filter_column: String,
    pub search_term: String,
    pub output_mode: OutputMode,
    pub ai_assisted: bool,
}

/// How a run ended when it did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// No rows matched; nothing was sent to the model.
    NoMatches,
    /// The model gave no records back.
    NoRecords,
    /// The user cancelled a save dialog.
    Cancelled,
    Completed {
        records: usize,
        json: Option<PathBuf>,
        excel: Option<PathBuf>,
    },
}

/// Run the whole flow, reporting every step and any error to `status`.
/// Errors never escape: they are logged and returned as `None`.
pub fn run(
    request: &RunRequest,
    model: &dyn TextModel,
    dialogs: &mut dyn SaveDialogs,
    status: &mut StatusLog,
) -> Option<RunOutcome> {
    match try_run(request, model, dialogs, status) {
        Ok(outcome) => Some(outcome),
        Err(e) => {
            status.error(format!("Error: {e:#}"));
            None
        }
    }
}

fn try_run(
    request: &RunRequest,
    model: &dyn TextModel,
    dialogs: &mut dyn SaveDialogs,
    status: &mut StatusLog,
) -> Result<RunOutcome> {
    let column = request.filter_column.as_str();
    let term = request.search_term.trim();

    status.info(format!(
        "Processing data where {column} contains '{term}' in sheet: {}",
        request.sheet_name
    ));

    status.info("Reading Excel file...");
    let table = load_table(&request.table_path, &request.sheet_name)?;

    let rows = if request.ai_assisted {
        ai_assisted_filter(model, &table, column, term, status)?
    } else {
        filter_rows(&table, column, term)?
    };

    if rows.is_empty() {
        status.info(format!("No data found where {column} contains '{term}'."));
        return Ok(RunOutcome::NoMatches);
    }
    status.info(format!("Found {} records where {column} contains '{term}'", rows.len()));

    status.info("Reading PDF file...");
    let pdf_text = read_pdf_text(&request.document_path).context("Error reading PDF")?;
    status.info("PDF data extracted successfully");

    analyze_and_save(request, &table, &rows, &pdf_text, model, dialogs, status)
}

/// Second half of a run: model call and output, once rows and guideline
/// text are in hand.
fn analyze_and_save(
    request: &RunRequest,
    table: &Table,
    rows: &[usize],
    pdf_text: &str,
    model: &dyn TextModel,
    dialogs: &mut dyn SaveDialogs,
    status: &mut StatusLog,
) -> Result<RunOutcome> {
    let column = request.filter_column.as_str();
    let term = request.search_term.trim();

    let data_text = table.render_rows(rows);
    let records = analyze(model, term, column, pdf_text, &data_text, status).context("AI API error")?;

    if records.is_empty() {
        status.warn("Failed to get analyzable response from AI.");
        return Ok(RunOutcome::NoRecords);
    }
    if records.len() != rows.len() {
        status.warn(format!(
            "AI returned {} records for {} filtered rows",
            records.len(),
            rows.len()
        ));
    }

    let names = OutputNames::new(&request.table_path, &request.sheet_name, column);
    let mut had_errors = false;

    let json = match save_json(&records, request.output_mode, &names, dialogs) {
        Ok(Saved::Written { path, .. }) => {
            status.info(format!("JSON data saved successfully to: {}", display_name(&path)));
            Some(path)
        }
        Ok(Saved::Cancelled) => {
            status.info("JSON save cancelled.");
            status.info("Operation cancelled.");
            return Ok(RunOutcome::Cancelled);
        }
        Err(e) => {
            status.error(format!("JSON save issue: {e}"));
            had_errors = true;
            None
        }
    };

    let excel = match save_excel(&records, request.output_mode, &names, dialogs) {
        Ok(Saved::Written { path, sheet }) => {
            status.info(format!(
                "Excel data saved successfully to: {} (sheet '{}')",
                display_name(&path),
                sheet.unwrap_or_default()
            ));
            Some(path)
        }
        Ok(Saved::Cancelled) => {
            status.info("Excel file save cancelled.");
            status.info("Operation cancelled.");
            return Ok(RunOutcome::Cancelled);
        }
        Err(e) => {
            status.error(format!("Excel save issue: {e}"));
            had_errors = true;
            None
        }
    };

    if had_errors {
        status.warn("Process finished with errors.");
    } else {
        status.info("Process completed successfully!");
    }

    Ok(RunOutcome::Completed {
        records: records.len(),
        json,
        excel,
    })
}

fn display_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
