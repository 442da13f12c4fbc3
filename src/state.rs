use std::path::{Path, PathBuf};

use crate::ai::TextModel;
use crate::data::filter::{filter_rows, FilteredRows};
use crate::data::loader::{load_table, sheet_names};
use crate::data::model::Table;
use crate::output::{OutputMode, SaveDialogs};
use crate::pipeline::{self, RunOutcome, RunRequest};
use crate::status::StatusLog;

/// Column picked by default when the sheet has it.
pub const PREFERRED_COLUMN: &str = "DiseaseName";
pub const DEFAULT_SHEET: &str = "Sheet1";

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Where the form is in a run. A run is queued for one frame so the
/// spinner is on screen before the UI thread blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    #[default]
    Idle,
    Queued,
    Running,
}

/// Matching rows of the current sheet, shown in the preview table.
#[derive(Debug, Clone)]
pub struct Preview {
    pub table: Table,
    pub rows: FilteredRows,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Spreadsheet with the records to check.
    pub table_path: Option<PathBuf>,

    /// Guideline PDF.
    pub document_path: Option<PathBuf>,

    /// Sheet name as typed / picked by the user.
    pub sheet_name: String,

    /// Sheets of the selected workbook.
    pub available_sheets: Vec<String>,

    /// Columns of the loaded sheet.
    pub columns: Vec<String>,

    pub filter_column: Option<String>,
    pub search_term: String,
    pub output_mode: OutputMode,
    pub ai_assisted: bool,

    /// Last plain-filter preview.
    pub preview: Option<Preview>,

    pub status: StatusLog,
    pub phase: RunPhase,

    /// Set when the AI client could not be configured at startup.
    pub config_error: Option<String>,

    /// How the most recent run ended, if it did not fail.
    pub last_outcome: Option<RunOutcome>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            table_path: None,
            document_path: None,
            sheet_name: DEFAULT_SHEET.to_string(),
            available_sheets: Vec::new(),
            columns: Vec::new(),
            filter_column: None,
            search_term: String::new(),
            output_mode: OutputMode::default(),
            ai_assisted: false,
            preview: None,
            status: StatusLog::with_welcome(),
            phase: RunPhase::Idle,
            config_error: None,
            last_outcome: None,
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl AppState {
    /// Record a newly picked spreadsheet, list its sheets, load columns.
    pub fn set_table_path(&mut self, path: PathBuf) {
        self.status.info(format!("Excel file selected: {}", file_name(&path)));
        self.preview = None;

        match sheet_names(&path) {
            Ok(sheets) => {
                if !sheets.is_empty() && !sheets.contains(&self.sheet_name) {
                    self.sheet_name = sheets[0].clone();
                }
                self.available_sheets = sheets;
            }
            Err(e) => {
                self.status.error(format!("Error reading sheets: {e}"));
                self.available_sheets.clear();
            }
        }

        self.table_path = Some(path);
        self.load_columns();
    }

    pub fn set_document_path(&mut self, path: PathBuf) {
        self.status.info(format!("PDF file selected: {}", file_name(&path)));
        self.document_path = Some(path);
    }

    /// Load the column names of the current sheet.
    pub fn load_columns(&mut self) {
        let Some(path) = self.table_path.clone() else {
            self.status.warn("Please select an Excel file first.");
            return;
        };
        let sheet = self.sheet_name.trim().to_string();
        if sheet.is_empty() {
            self.status.warn("Please enter a sheet name.");
            return;
        }

        self.status.info(format!("Loading columns from sheet: {sheet}"));
        match load_table(&path, &sheet) {
            Ok(table) => {
                self.columns = table.columns;
                self.filter_column = if self.columns.iter().any(|c| c == PREFERRED_COLUMN) {
                    Some(PREFERRED_COLUMN.to_string())
                } else {
                    self.columns.first().cloned()
                };
                if self.columns.is_empty() {
                    self.status.warn("No columns found in the sheet.");
                } else {
                    self.status.info(format!(
                        "Loaded {} columns from sheet: {sheet}",
                        self.columns.len()
                    ));
                }
            }
            Err(e) => {
                self.columns.clear();
                self.filter_column = None;
                self.status.error(format!("Error loading columns: {e}"));
            }
        }
    }

    /// Check the form and build a run request, or report what is missing.
    pub fn build_request(&mut self) -> Option<RunRequest> {
        let (Some(table_path), Some(document_path)) = (self.table_path.clone(), self.document_path.clone())
        else {
            self.status.warn("Please select both Excel and PDF files.");
            return None;
        };
        let Some(filter_column) = self.filter_column.clone() else {
            self.status.warn("Please select a column to filter by.");
            return None;
        };
        let search_term = self.search_term.trim().to_lowercase();
        if search_term.is_empty() {
            self.status.warn("Please enter a search term.");
            return None;
        }
        let sheet_name = match self.sheet_name.trim() {
            "" => DEFAULT_SHEET.to_string(),
            s => s.to_string(),
        };

        Some(RunRequest {
            table_path,
            document_path,
            sheet_name,
            filter_column,
            search_term,
            output_mode: self.output_mode,
            ai_assisted: self.ai_assisted,
        })
    }

    /// Plain substring filter of the current sheet for the preview table.
    pub fn refresh_preview(&mut self) {
        let (Some(path), Some(column)) = (self.table_path.clone(), self.filter_column.clone()) else {
            self.status.warn("Please select an Excel file and a filter column first.");
            return;
        };

        let result = load_table(&path, self.sheet_name.trim())
            .map_err(|e| e.to_string())
            .and_then(|table| {
                filter_rows(&table, &column, &self.search_term)
                    .map(|rows| Preview { table, rows })
                    .map_err(|e| e.to_string())
            });

        match result {
            Ok(preview) => {
                self.status.info(format!(
                    "Preview: {} of {} rows match",
                    preview.rows.len(),
                    preview.table.len()
                ));
                self.preview = Some(preview);
            }
            Err(e) => {
                self.status.error(format!("Error: {e}"));
                self.preview = None;
            }
        }
    }

    /// Ask for a run on the next frames.
    pub fn queue_run(&mut self) {
        if self.phase == RunPhase::Idle {
            self.phase = RunPhase::Queued;
        }
    }

    pub fn is_busy(&self) -> bool {
        self.phase != RunPhase::Idle
    }

    /// Step the run phase once per frame. Returns `true` when the run should
    /// execute now.
    pub fn advance_phase(&mut self) -> bool {
        match self.phase {
            RunPhase::Idle => false,
            RunPhase::Queued => {
                self.phase = RunPhase::Running;
                false
            }
            RunPhase::Running => true,
        }
    }

    /// Validate and run the whole flow on the calling thread.
    pub fn execute_run(&mut self, model: Option<&dyn TextModel>, dialogs: &mut dyn SaveDialogs) {
        self.phase = RunPhase::Idle;

        let Some(model) = model else {
            let msg = self
                .config_error
                .clone()
                .unwrap_or_else(|| "AI model is not configured.".to_string());
            self.status.error(msg);
            return;
        };
        let Some(request) = self.build_request() else {
            return;
        };

        self.last_outcome = pipeline::run(&request, model, dialogs, &mut self.status);
    }
}

#[cfg(test)]
mod tests {
    use rust_xlsxwriter::Workbook;

    use super::*;
    use crate::ai::testing::ScriptedModel;
    use crate::output::testing::ScriptedDialogs;

    fn workbook(path: &Path, sheet: &str, header: &[&str]) {
        let mut wb = Workbook::new();
        let ws = wb.add_worksheet().set_name(sheet).unwrap();
        for (c, h) in header.iter().enumerate() {
            ws.write_string(0, c as u16, *h).unwrap();
        }
        ws.write_string(1, 0, "x").unwrap();
        wb.save(path).unwrap();
    }

    #[test]
    fn test_selecting_table_prefers_disease_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ward.xlsx");
        workbook(&path, "IPD DEC-2024", &["PatientID", "DiseaseName", "Treatment"]);

        let mut state = AppState::default();
        state.set_table_path(path);

        assert_eq!(state.available_sheets, vec!["IPD DEC-2024"]);
        assert_eq!(state.sheet_name, "IPD DEC-2024");
        assert_eq!(state.columns.len(), 3);
        assert_eq!(state.filter_column.as_deref(), Some("DiseaseName"));
        assert!(state.status.contains("Loaded 3 columns from sheet: IPD DEC-2024"));
    }

    #[test]
    fn test_first_column_when_no_disease_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ward.xlsx");
        workbook(&path, "Sheet1", &["Code", "Ward"]);

        let mut state = AppState::default();
        state.set_table_path(path);
        assert_eq!(state.filter_column.as_deref(), Some("Code"));
    }

    #[test]
    fn test_load_columns_reports_missing_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ward.xlsx");
        workbook(&path, "Sheet1", &["Code"]);

        let mut state = AppState::default();
        state.set_table_path(path);
        state.sheet_name = "Other".into();
        state.load_columns();

        assert!(state.columns.is_empty());
        assert_eq!(
            state.status.last(),
            Some("Error loading columns: Sheet 'Other' not found. Available sheets: Sheet1")
        );
    }

    #[test]
    fn test_build_request_validation() {
        let mut state = AppState::default();
        assert!(state.build_request().is_none());
        assert_eq!(state.status.last(), Some("Please select both Excel and PDF files."));

        state.table_path = Some("a.xlsx".into());
        state.document_path = Some("g.pdf".into());
        assert!(state.build_request().is_none());
        assert_eq!(state.status.last(), Some("Please select a column to filter by."));

        state.filter_column = Some("DiseaseName".into());
        state.search_term = "   ".into();
        assert!(state.build_request().is_none());
        assert_eq!(state.status.last(), Some("Please enter a search term."));

        state.search_term = "  Asthma ".into();
        state.sheet_name = " ".into();
        let request = state.build_request().unwrap();
        assert_eq!(request.search_term, "asthma");
        assert_eq!(request.sheet_name, DEFAULT_SHEET);
    }

    #[test]
    fn test_run_phase_waits_one_frame() {
        let mut state = AppState::default();
        assert!(!state.advance_phase());
        state.queue_run();
        assert!(state.is_busy());
        assert!(!state.advance_phase());
        assert!(state.advance_phase());
    }

    #[test]
    fn test_run_without_model_reports_config_error() {
        let mut state = AppState {
            config_error: Some("Gemini API key not found".into()),
            phase: RunPhase::Running,
            ..AppState::default()
        };
        state.execute_run(None, &mut ScriptedDialogs::default());
        assert_eq!(state.phase, RunPhase::Idle);
        assert_eq!(state.status.last(), Some("Gemini API key not found"));
    }

    #[test]
    fn test_preview_filters_current_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ward.xlsx");
        workbook(&path, "Sheet1", &["Code"]);

        let mut state = AppState::default();
        state.set_table_path(path);
        state.search_term = "X".into();
        state.refresh_preview();

        let preview = state.preview.as_ref().unwrap();
        assert_eq!(preview.rows, vec![0]);
        assert!(state.status.contains("Preview: 1 of 1 rows match"));

        let model = ScriptedModel::new(vec![]);
        state.execute_run(Some(&model), &mut ScriptedDialogs::default());
        assert_eq!(state.status.last(), Some("Please select both Excel and PDF files."));
    }
}
