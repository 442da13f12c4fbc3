use eframe::egui::{ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Preview table (central panel)
// ---------------------------------------------------------------------------

/// Render the rows matched by the last preview.
pub fn preview_table(ui: &mut Ui, state: &AppState) {
    let preview = match &state.preview {
        Some(p) => p,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Choose a spreadsheet, a column and a search term, then press Preview");
            });
            return;
        }
    };

    let table = &preview.table;
    ui.label(format!(
        "{} of {} rows match",
        preview.rows.len(),
        table.len()
    ));
    ui.separator();

    if table.columns.is_empty() {
        ui.label("The sheet has no columns.");
        return;
    }
    if table.is_empty() {
        ui.label("The sheet has no data rows.");
        return;
    }

    ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .columns(Column::auto().at_least(60.0), table.columns.len())
            .header(20.0, |mut header| {
                for name in &table.columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, preview.rows.len(), |mut row| {
                    let source = &table.rows[preview.rows[row.index()]];
                    for cell in source {
                        row.col(|ui: &mut Ui| {
                            ui.label(cell.to_string());
                        });
                    }
                });
            });
    });
}
