use anyhow::anyhow;
use clap::Parser;
use eframe::egui;

use smartfin_lab::app::SmartFinApp;
use smartfin_lab::config::Config;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let config = Config::parse();
    log::info!("Starting with dataset source {}", config.source_spec());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "SmartFin Lab – Stock Screener",
        options,
        Box::new(|_cc| Ok(Box::new(SmartFinApp::new(config)))),
    )
    .map_err(|e| anyhow!("running the UI: {e}"))
}
