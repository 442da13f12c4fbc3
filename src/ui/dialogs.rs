use std::path::PathBuf;

use rfd::{FileDialog, MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};

use crate::output::{FileKind, SaveDialogs};

// ---------------------------------------------------------------------------
// Native dialogs
// ---------------------------------------------------------------------------

/// [`SaveDialogs`] backed by the platform's file pickers and message boxes.
pub struct NativeDialogs;

impl SaveDialogs for NativeDialogs {
    fn pick_new_file(&mut self, title: &str, kind: FileKind, default_name: &str) -> Option<PathBuf> {
        FileDialog::new()
            .set_title(title)
            .add_filter(kind.label, kind.extensions)
            .set_file_name(default_name)
            .save_file()
    }

    fn pick_existing_file(&mut self, title: &str, kind: FileKind) -> Option<PathBuf> {
        FileDialog::new()
            .set_title(title)
            .add_filter(kind.label, kind.extensions)
            .pick_file()
    }

    fn confirm(&mut self, title: &str, message: &str) -> bool {
        MessageDialog::new()
            .set_level(MessageLevel::Warning)
            .set_title(title)
            .set_description(message)
            .set_buttons(MessageButtons::YesNo)
            .show()
            == MessageDialogResult::Yes
    }
}

/// Pick the spreadsheet with the records to check.
pub fn pick_table_file() -> Option<PathBuf> {
    FileDialog::new()
        .set_title("Open spreadsheet")
        .add_filter("Spreadsheets", &["xlsx", "xlsm", "xls", "xlsb", "ods", "csv"])
        .add_filter("Excel files", &["xlsx", "xlsm", "xls", "xlsb"])
        .add_filter("CSV", &["csv"])
        .pick_file()
}

/// Pick the guideline PDF.
pub fn pick_document_file() -> Option<PathBuf> {
    FileDialog::new()
        .set_title("Open guideline PDF")
        .add_filter("PDF files", &["pdf"])
        .pick_file()
}
