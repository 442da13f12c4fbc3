mod ai;
mod app;
mod config;
mod data;
mod document;
mod output;
mod pipeline;
mod state;
mod status;
mod ui;

use app::GuidelineCheckerApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    // A missing .env file is fine; the variables may come from the shell.
    if let Err(e) = dotenvy::dotenv() {
        log::debug!("No .env loaded: {e}");
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 800.0])
            .with_min_inner_size([700.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Guideline Checker",
        options,
        Box::new(|_cc| Ok(Box::new(GuidelineCheckerApp::from_env()))),
    )
}
