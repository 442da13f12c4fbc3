use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::output::OutputMode;
use crate::pipeline::RunOutcome;
use crate::state::AppState;
use crate::ui::dialogs::{pick_document_file, pick_table_file};

fn file_label(path: Option<&std::path::Path>) -> RichText {
    match path.and_then(|p| p.file_name()) {
        Some(name) => RichText::new(name.to_string_lossy()),
        None => RichText::new("No file selected").color(Color32::GRAY),
    }
}

// ---------------------------------------------------------------------------
// Left side panel – the form
// ---------------------------------------------------------------------------

/// Render the input form.
pub fn form_panel(ui: &mut Ui, state: &mut AppState) {
    let busy = state.is_busy();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.add_enabled_ui(!busy, |ui: &mut Ui| {
                input_files(ui, state);
                ui.add_space(8.0);
                filter_parameters(ui, state);
                ui.add_space(8.0);
                output_options(ui, state);
            });
            ui.add_space(8.0);
            actions(ui, state, busy);
        });
}

fn input_files(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Input Files");
    ui.separator();

    egui::Grid::new("input_files")
        .num_columns(3)
        .spacing([8.0, 6.0])
        .show(ui, |ui: &mut Ui| {
            ui.label("Excel File:");
            ui.label(file_label(state.table_path.as_deref()));
            if ui.button("Browse…").clicked() {
                match pick_table_file() {
                    Some(path) => state.set_table_path(path),
                    None => state.status.warn("No Excel file selected."),
                }
            }
            ui.end_row();

            ui.label("PDF File:");
            ui.label(file_label(state.document_path.as_deref()));
            if ui.button("Browse…").clicked() {
                match pick_document_file() {
                    Some(path) => state.set_document_path(path),
                    None => state.status.warn("No PDF file selected."),
                }
            }
            ui.end_row();
        });
}

fn filter_parameters(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter Parameters");
    ui.separator();

    // Clone what we need so we can mutate state inside the widgets.
    let sheets = state.available_sheets.clone();
    let columns = state.columns.clone();
    let mut reload_columns = false;

    egui::Grid::new("filter_parameters")
        .num_columns(2)
        .spacing([8.0, 6.0])
        .show(ui, |ui: &mut Ui| {
            ui.label("Sheet Name:");
            ui.horizontal(|ui: &mut Ui| {
                ui.add(egui::TextEdit::singleline(&mut state.sheet_name).desired_width(140.0));
                if !sheets.is_empty() {
                    egui::ComboBox::from_id_salt("sheet_picker")
                        .selected_text("▾")
                        .width(24.0)
                        .show_ui(ui, |ui: &mut Ui| {
                            for sheet in &sheets {
                                if ui
                                    .selectable_value(&mut state.sheet_name, sheet.clone(), sheet)
                                    .clicked()
                                {
                                    reload_columns = true;
                                }
                            }
                        });
                }
                if ui.button("Load Columns").clicked() {
                    reload_columns = true;
                }
            });
            ui.end_row();

            ui.label("Filter Column:");
            let selected = state
                .filter_column
                .clone()
                .unwrap_or_else(|| "<Load Excel file first>".to_string());
            egui::ComboBox::from_id_salt("filter_column")
                .selected_text(selected)
                .width(200.0)
                .show_ui(ui, |ui: &mut Ui| {
                    for col in &columns {
                        ui.selectable_value(&mut state.filter_column, Some(col.clone()), col);
                    }
                });
            ui.end_row();

            ui.label("Search Term:");
            ui.add(egui::TextEdit::singleline(&mut state.search_term).desired_width(200.0));
            ui.end_row();

            ui.label("");
            ui.checkbox(&mut state.ai_assisted, "AI-assisted filter")
                .on_hover_text("Also ask the model for values that mean the same thing as the search term");
            ui.end_row();
        });

    if reload_columns {
        state.load_columns();
    }
}

fn output_options(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Output Options");
    ui.separator();
    ui.radio_value(&mut state.output_mode, OutputMode::NewFiles, "Create new files");
    ui.radio_value(&mut state.output_mode, OutputMode::AppendToExisting, "Add to existing files");
}

fn actions(ui: &mut Ui, state: &mut AppState, busy: bool) {
    ui.separator();
    ui.horizontal(|ui: &mut Ui| {
        if ui.add_enabled(!busy, egui::Button::new("Preview")).clicked() {
            state.refresh_preview();
        }
        if ui.add_enabled(!busy, egui::Button::new("Process Data")).clicked() {
            state.queue_run();
            ui.ctx().request_repaint();
        }
        if busy {
            ui.add(egui::Spinner::new());
        }
        if ui.button("Quit").clicked() {
            ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
        }
    });
}

// ---------------------------------------------------------------------------
// Bottom panel – status log
// ---------------------------------------------------------------------------

/// Render the scrolling status log.
pub fn status_panel(ui: &mut Ui, state: &AppState) {
    ui.strong("Status");
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .stick_to_bottom(true)
        .show(ui, |ui: &mut Ui| {
            for line in state.status.lines() {
                let text = RichText::new(line).monospace();
                if line.starts_with("Error") {
                    ui.label(text.color(Color32::RED));
                } else {
                    ui.label(text);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open spreadsheet…").clicked() {
                if let Some(path) = pick_table_file() {
                    state.set_table_path(path);
                }
                ui.close_menu();
            }
            if ui.button("Open guideline PDF…").clicked() {
                if let Some(path) = pick_document_file() {
                    state.set_document_path(path);
                }
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Quit").clicked() {
                ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
            }
        });

        ui.separator();

        if !state.columns.is_empty() {
            ui.label(format!(
                "Sheet '{}': {} columns",
                state.sheet_name,
                state.columns.len()
            ));
        }

        if let Some(summary) = state.last_outcome.as_ref().map(outcome_summary) {
            ui.separator();
            ui.label(summary);
        }

        if let Some(msg) = &state.config_error {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

fn outcome_summary(outcome: &RunOutcome) -> String {
    match outcome {
        RunOutcome::NoMatches => "Last run: no matching rows".to_string(),
        RunOutcome::NoRecords => "Last run: no records from AI".to_string(),
        RunOutcome::Cancelled => "Last run: cancelled".to_string(),
        RunOutcome::Completed {
            records,
            json,
            excel,
        } => {
            let saved = [json, excel]
                .into_iter()
                .flatten()
                .filter_map(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .collect::<Vec<_>>();
            if saved.is_empty() {
                format!("Last run: {records} records, nothing saved")
            } else {
                format!("Last run: {records} records → {}", saved.join(", "))
            }
        }
    }
}
