#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod run_worker;
mod state;
mod views;

use std::path::PathBuf;
use std::sync::Arc;

use app::FeedbackApp;
use fb_app::DashboardConfig;
use fb_controls::FeedbackEvaluator;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt::init();

    // Optional dashboard config as the only argument.
    let config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => fb_app::load_config(&path).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "using default config");
            DashboardConfig::default()
        }),
        None => DashboardConfig::default(),
    };
    let evaluator = Arc::new(FeedbackEvaluator::new(config.evaluator_options()));
    let title = config.title.clone();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 760.0])
            .with_title(&title),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| Ok(Box::new(FeedbackApp::new(cc, config, evaluator)))),
    )
}
