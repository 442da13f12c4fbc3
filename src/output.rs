//! Result writers: JSON and Excel, new file or appended to an existing one.
//!
//! Target paths come from a [`SaveDialogs`] implementation so the flow can
//! be driven by native dialogs in the form and by scripts in tests.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::{Format, Formula, Workbook, Worksheet, XlsxError};
use serde::Serialize;
use serde_json::{ser::PrettyFormatter, Serializer, Value as JsonValue};

use crate::ai::analysis::AnalysisRecord;

/// Excel's hard limit on sheet-name length.
pub const MAX_SHEET_NAME_LEN: usize = 31;

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Selected file does not contain valid JSON data: {0}")]
    InvalidJson(serde_json::Error),

    #[error("Existing JSON file is not in the expected list format")]
    NotAnArray,

    #[error("Failed to serialize JSON: {0}")]
    Serialize(serde_json::Error),

    #[error("Failed to read existing workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Failed to write Excel file: {0}")]
    Xlsx(#[from] XlsxError),
}

// ---------------------------------------------------------------------------
// Output mode and naming
// ---------------------------------------------------------------------------

/// Whether results go to fresh files or are added to existing ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    NewFiles,
    AppendToExisting,
}

/// Default names derived from the source file, sheet, and filter column.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputNames {
    pub json_file: String,
    pub excel_file: String,
    pub sheet: String,
}

impl OutputNames {
    pub fn new(source: &Path, sheet: &str, filter_column: &str) -> Self {
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("results");
        Self {
            json_file: format!("{stem}_by_{filter_column}_Analyzed.json"),
            excel_file: format!("{stem}_by_{filter_column}_Analyzed.xlsx"),
            sheet: sanitize_sheet_name(&format!("{sheet}_by_{filter_column}_Analyzed")),
        }
    }
}

/// Replace characters Excel rejects in sheet names and cap the length.
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            other => other,
        })
        .collect();
    let cleaned = cleaned.trim_matches('\'');
    let cleaned = if cleaned.is_empty() { "Sheet" } else { cleaned };
    cleaned.chars().take(MAX_SHEET_NAME_LEN).collect()
}

/// First of `desired`, `desired_1`, `desired_2`, ... not already in
/// `existing`. Excel compares sheet names case-insensitively.
pub fn unique_sheet_name(desired: &str, existing: &[String]) -> String {
    let taken: HashSet<String> = existing.iter().map(|s| s.to_lowercase()).collect();
    if !taken.contains(&desired.to_lowercase()) {
        return desired.to_string();
    }

    let mut counter = 1usize;
    loop {
        let suffix = format!("_{counter}");
        let keep = MAX_SHEET_NAME_LEN.saturating_sub(suffix.len());
        let base: String = desired.chars().take(keep).collect();
        let candidate = format!("{base}{suffix}");
        if !taken.contains(&candidate.to_lowercase()) {
            return candidate;
        }
        counter += 1;
    }
}

// ---------------------------------------------------------------------------
// Dialog seam
// ---------------------------------------------------------------------------

/// A file type offered in pickers.
#[derive(Debug, Clone, Copy)]
pub struct FileKind {
    pub label: &'static str,
    pub extensions: &'static [&'static str],
}

pub const JSON_FILES: FileKind = FileKind {
    label: "JSON files",
    extensions: &["json"],
};

pub const EXCEL_FILES: FileKind = FileKind {
    label: "Excel files",
    extensions: &["xlsx"],
};

/// User interaction needed while saving.
pub trait SaveDialogs {
    /// Ask for a path to create. `None` means cancelled.
    fn pick_new_file(&mut self, title: &str, kind: FileKind, default_name: &str) -> Option<PathBuf>;

    /// Ask for an existing file to add to. `None` means cancelled.
    fn pick_existing_file(&mut self, title: &str, kind: FileKind) -> Option<PathBuf>;

    /// Yes/no question.
    fn confirm(&mut self, title: &str, message: &str) -> bool;
}

/// Where a save ended up.
#[derive(Debug, Clone, PartialEq)]
pub enum Saved {
    Written { path: PathBuf, sheet: Option<String> },
    Cancelled,
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

fn records_to_json(records: &[AnalysisRecord]) -> Vec<JsonValue> {
    records.iter().map(AnalysisRecord::to_json).collect()
}

fn write_pretty(path: &Path, value: &JsonValue) -> Result<(), OutputError> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut ser).map_err(OutputError::Serialize)?;
    std::fs::write(path, buf)?;
    Ok(())
}

/// Write `records` as a new pretty-printed JSON array.
pub fn write_json_new(path: &Path, records: &[AnalysisRecord]) -> Result<(), OutputError> {
    write_pretty(path, &JsonValue::Array(records_to_json(records)))
}

/// Append `records` to the JSON array stored at `path`.
pub fn append_json(path: &Path, records: &[AnalysisRecord]) -> Result<(), OutputError> {
    let text = std::fs::read_to_string(path)?;
    let existing: JsonValue = serde_json::from_str(&text).map_err(OutputError::InvalidJson)?;
    let JsonValue::Array(mut items) = existing else {
        return Err(OutputError::NotAnArray);
    };
    items.extend(records_to_json(records));
    write_pretty(path, &JsonValue::Array(items))
}

fn save_json_new(
    records: &[AnalysisRecord],
    names: &OutputNames,
    dialogs: &mut dyn SaveDialogs,
) -> Result<Saved, OutputError> {
    let Some(path) = dialogs.pick_new_file("Save JSON results", JSON_FILES, &names.json_file) else {
        return Ok(Saved::Cancelled);
    };
    write_json_new(&path, records)?;
    Ok(Saved::Written { path, sheet: None })
}

/// Save `records` as JSON according to `mode`.
pub fn save_json(
    records: &[AnalysisRecord],
    mode: OutputMode,
    names: &OutputNames,
    dialogs: &mut dyn SaveDialogs,
) -> Result<Saved, OutputError> {
    if mode == OutputMode::NewFiles {
        return save_json_new(records, names, dialogs);
    }

    let Some(target) = dialogs.pick_existing_file("Select JSON file to append data to", JSON_FILES) else {
        if dialogs.confirm(
            "JSON File Selection",
            "No existing JSON file selected. Would you like to save to a new JSON file?",
        ) {
            return save_json_new(records, names, dialogs);
        }
        return Ok(Saved::Cancelled);
    };

    match append_json(&target, records) {
        Ok(()) => Ok(Saved::Written {
            path: target,
            sheet: None,
        }),
        Err(e) => {
            log::warn!("Appending to {} failed: {e}", target.display());
            if dialogs.confirm(
                "JSON Error",
                &format!("Could not append to the selected JSON file ({e}). Would you like to save to a new file instead?"),
            ) {
                save_json_new(records, names, dialogs)
            } else {
                Err(e)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Excel
// ---------------------------------------------------------------------------

/// Column names across all records, in first-seen order.
fn record_columns(rows: &[JsonValue]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut columns = Vec::new();
    for row in rows {
        if let JsonValue::Object(obj) = row {
            for key in obj.keys() {
                if seen.insert(key.clone()) {
                    columns.push(key.clone());
                }
            }
        }
    }
    columns
}

fn write_json_cell(ws: &mut Worksheet, row: u32, col: u16, value: &JsonValue) -> Result<(), XlsxError> {
    match value {
        JsonValue::Null => {}
        JsonValue::Bool(b) => {
            ws.write_boolean(row, col, *b)?;
        }
        JsonValue::Number(n) => match n.as_f64() {
            Some(f) => {
                ws.write_number(row, col, f)?;
            }
            None => {
                ws.write_string(row, col, n.to_string())?;
            }
        },
        JsonValue::String(s) => {
            ws.write_string(row, col, s)?;
        }
        other => {
            ws.write_string(row, col, other.to_string())?;
        }
    }
    Ok(())
}

fn write_records_sheet(
    workbook: &mut Workbook,
    sheet: &str,
    records: &[AnalysisRecord],
) -> Result<(), XlsxError> {
    let rows = records_to_json(records);
    let columns = record_columns(&rows);
    let header = Format::new().set_bold();

    let ws = workbook.add_worksheet();
    ws.set_name(sheet)?;

    for (c, name) in columns.iter().enumerate() {
        ws.write_string_with_format(0, c as u16, name, &header)?;
    }
    for (r, row) in rows.iter().enumerate() {
        for (c, name) in columns.iter().enumerate() {
            if let Some(value) = row.get(name) {
                write_json_cell(ws, r as u32 + 1, c as u16, value)?;
            }
        }
    }
    Ok(())
}

/// Write `records` to a new workbook with a single sheet.
pub fn write_excel_new(path: &Path, sheet: &str, records: &[AnalysisRecord]) -> Result<(), OutputError> {
    let mut workbook = Workbook::new();
    write_records_sheet(&mut workbook, sheet, records)?;
    workbook.save(path)?;
    Ok(())
}

fn copy_cell(ws: &mut Worksheet, row: u32, col: u16, cell: &Data, date_format: &Format) -> Result<(), XlsxError> {
    match cell {
        Data::Empty => {}
        Data::String(s) => {
            ws.write_string(row, col, s)?;
        }
        Data::Float(f) => {
            ws.write_number(row, col, *f)?;
        }
        Data::Int(i) => {
            ws.write_number(row, col, *i as f64)?;
        }
        Data::Bool(b) => {
            ws.write_boolean(row, col, *b)?;
        }
        Data::DateTime(dt) => {
            ws.write_number_with_format(row, col, dt.as_f64(), date_format)?;
        }
        Data::DateTimeIso(s) | Data::DurationIso(s) => {
            ws.write_string(row, col, s)?;
        }
        Data::Error(e) => {
            ws.write_string(row, col, e.to_string())?;
        }
    }
    Ok(())
}

/// Add `records` as a new sheet at the end of the workbook at `path`.
///
/// The existing sheets are read back and rewritten: formulas are kept with
/// their cached results, other cells as values. Cell formatting, merged
/// ranges and column widths of those sheets are not carried over. Returns
/// the sheet name actually used after collision suffixing.
pub fn append_excel_sheet(path: &Path, sheet: &str, records: &[AnalysisRecord]) -> Result<String, OutputError> {
    let mut existing = open_workbook_auto(path)?;
    let names = existing.sheet_names().to_vec();
    let sheet = unique_sheet_name(sheet, &names);

    let date_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");
    let mut workbook = Workbook::new();

    for name in &names {
        let range = existing.worksheet_range(name)?;
        let formulas = existing.worksheet_formula(name)?;

        let ws = workbook.add_worksheet();
        ws.set_name(name)?;

        let (frow0, fcol0) = formulas.start().unwrap_or((0, 0));
        let mut formula_cells = HashSet::new();
        for (r, c, formula) in formulas.used_cells() {
            let row = frow0 + r as u32;
            let col = fcol0 + c as u32;
            let cached = range.get_value((row, col)).map(Data::to_string).unwrap_or_default();
            ws.write_formula(row, col as u16, Formula::new(formula).set_result(cached))?;
            formula_cells.insert((row, col));
        }

        let (row0, col0) = range.start().unwrap_or((0, 0));
        for (r, c, cell) in range.used_cells() {
            let row = row0 + r as u32;
            let col = col0 + c as u32;
            if !formula_cells.contains(&(row, col)) {
                copy_cell(ws, row, col as u16, cell, &date_format)?;
            }
        }
    }
    drop(existing);

    write_records_sheet(&mut workbook, &sheet, records)?;
    workbook.save(path)?;
    Ok(sheet)
}

fn save_excel_new(
    records: &[AnalysisRecord],
    names: &OutputNames,
    dialogs: &mut dyn SaveDialogs,
) -> Result<Saved, OutputError> {
    let Some(path) = dialogs.pick_new_file("Save as new Excel file", EXCEL_FILES, &names.excel_file) else {
        return Ok(Saved::Cancelled);
    };
    write_excel_new(&path, &names.sheet, records)?;
    Ok(Saved::Written {
        path,
        sheet: Some(names.sheet.clone()),
    })
}

/// Save `records` as an Excel sheet according to `mode`.
pub fn save_excel(
    records: &[AnalysisRecord],
    mode: OutputMode,
    names: &OutputNames,
    dialogs: &mut dyn SaveDialogs,
) -> Result<Saved, OutputError> {
    if mode == OutputMode::NewFiles {
        return save_excel_new(records, names, dialogs);
    }

    let Some(target) = dialogs.pick_existing_file("Select Excel file to add sheet to", EXCEL_FILES) else {
        if dialogs.confirm(
            "Excel File Selection",
            "No existing Excel file selected. Would you like to save to a new Excel file?",
        ) {
            return save_excel_new(records, names, dialogs);
        }
        return Ok(Saved::Cancelled);
    };

    match append_excel_sheet(&target, &names.sheet, records) {
        Ok(sheet) => Ok(Saved::Written {
            path: target,
            sheet: Some(sheet),
        }),
        Err(e) => {
            log::warn!("Adding a sheet to {} failed: {e}", target.display());
            if dialogs.confirm(
                "Excel Write Error",
                &format!(
                    "Could not write to the selected Excel file ({e}). It may be open in another program. \
                     Would you like to save to a new file instead?"
                ),
            ) {
                save_excel_new(records, names, dialogs)
            } else {
                Err(e)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::path::PathBuf;

    use super::{FileKind, SaveDialogs};

    /// Answers dialogs from queues; an empty queue means "cancel" / "no".
    #[derive(Default)]
    pub struct ScriptedDialogs {
        pub new_files: VecDeque<PathBuf>,
        pub existing_files: VecDeque<PathBuf>,
        pub confirmations: VecDeque<bool>,
        pub questions: Vec<String>,
    }

    impl SaveDialogs for ScriptedDialogs {
        fn pick_new_file(&mut self, _title: &str, _kind: FileKind, _default_name: &str) -> Option<PathBuf> {
            self.new_files.pop_front()
        }

        fn pick_existing_file(&mut self, _title: &str, _kind: FileKind) -> Option<PathBuf> {
            self.existing_files.pop_front()
        }

        fn confirm(&mut self, title: &str, _message: &str) -> bool {
            self.questions.push(title.to_string());
            self.confirmations.pop_front().unwrap_or(false)
        }
    }
}
