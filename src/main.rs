#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use tee_designer::{DesignRecord, DesignerApp, DesignerConfig};

/// Config file location override
const CONFIG_ENV: &str = "TEE_DESIGNER_CONFIG";

#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    let config = match std::env::var_os(CONFIG_ENV) {
        Some(path) => DesignerConfig::load_or_default(path),
        None => DesignerConfig::default(),
    };

    // Optional saved design to open, as the JSON wire record.
    let design = std::env::args_os().nth(1).and_then(|path| match DesignRecord::load_from(&path) {
        Ok(record) => Some(record),
        Err(err) => {
            log::error!("Could not open design {}: {err}", path.to_string_lossy());
            None
        }
    });

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([720.0, 600.0])
            .with_min_inner_size([480.0, 420.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };
    eframe::run_native(
        "T-Shirt Designer",
        native_options,
        Box::new(|cc| Ok(Box::new(DesignerApp::new(cc, config, design)))),
    )
}

// The web build embeds the library in a host page; there is no standalone binary.
#[cfg(target_arch = "wasm32")]
fn main() {}
