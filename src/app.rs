use eframe::egui;

use crate::ai::gemini::GeminiClient;
use crate::ai::TextModel;
use crate::config::Config;
use crate::state::AppState;
use crate::ui::dialogs::NativeDialogs;
use crate::ui::{panels, preview};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct GuidelineCheckerApp {
    pub state: AppState,
    model: Option<GeminiClient>,
}

impl GuidelineCheckerApp {
    /// Build the app from the environment. A missing or bad configuration is
    /// shown in the form instead of stopping the program.
    pub fn from_env() -> Self {
        let mut state = AppState::default();

        let model = Config::from_env()
            .map_err(|e| e.to_string())
            .and_then(|config| GeminiClient::new(&config).map_err(|e| e.to_string()));

        let model = match model {
            Ok(client) => {
                log::info!("Using Gemini model {}", client.model());
                Some(client)
            }
            Err(msg) => {
                state.status.error(msg.clone());
                state.config_error = Some(msg);
                None
            }
        };

        Self { state, model }
    }
}

impl eframe::App for GuidelineCheckerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Bottom panel: status log ----
        egui::TopBottomPanel::bottom("status_panel")
            .resizable(true)
            .default_height(180.0)
            .show(ctx, |ui| {
                panels::status_panel(ui, &self.state);
            });

        // ---- Left side panel: form ----
        egui::SidePanel::left("form_panel")
            .default_width(380.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::form_panel(ui, &mut self.state);
            });

        // ---- Central panel: preview ----
        egui::CentralPanel::default().show(ctx, |ui| {
            preview::preview_table(ui, &self.state);
        });

        // The run blocks this thread; it starts one frame after being queued
        // so the spinner and disabled buttons are drawn first.
        if self.state.advance_phase() {
            let model = self.model.as_ref().map(|m| m as &dyn TextModel);
            self.state.execute_run(model, &mut NativeDialogs);
        }
        if self.state.is_busy() {
            ctx.request_repaint();
        }
    }
}
