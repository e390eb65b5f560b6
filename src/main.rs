mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use std::path::Path;
use std::sync::Arc;

use app::VariancePnlApp;
use eframe::egui;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // Load before any window exists: a bad data file means no dashboard.
    let path = Path::new(config::DATA_FILE);
    let dataset = match data::loader::load_file(path) {
        Ok(dataset) => {
            if dataset.is_empty() {
                log::warn!("{} has a header but no rows", path.display());
            }
            Arc::new(dataset)
        }
        Err(e) => {
            log::error!("Failed to load {}: {e:#}", path.display());
            return Err(e);
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(config::WINDOW_TITLE)
            .with_inner_size(config::WINDOW_SIZE)
            .with_min_inner_size(config::MIN_WINDOW_SIZE),
        ..Default::default()
    };

    eframe::run_native(
        config::WINDOW_TITLE,
        options,
        Box::new(move |_cc| Ok(Box::new(VariancePnlApp::new(dataset)))),
    )
    .map_err(|e| anyhow::anyhow!("running the dashboard window: {e}"))
}
