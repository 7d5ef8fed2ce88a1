#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;

use gbe_core::config::ConfigManager;
use gbe_core::logging::init_tracing;

use app::EasyApp;

fn main() -> Result<(), eframe::Error> {
    init_tracing("info");

    let mut config = ConfigManager::new(ConfigManager::default_path());
    if let Err(e) = config.load_or_create() {
        // Start with defaults rather than refusing to launch.
        tracing::warn!("Could not load settings from {}: {}", config.path().display(), e);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([560.0, 480.0])
            .with_min_inner_size([440.0, 360.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "GPSBabel Easy",
        options,
        Box::new(|_cc| Ok(Box::new(EasyApp::new(config)))),
    )
}
