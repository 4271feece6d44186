#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use clap::Parser;
use eframe::egui;
use std::path::PathBuf;

mod app;
mod components;
mod settings;
mod theme;

use app::CallscopeApp;
use settings::AppSettings;

/// Browse a call graph and lay out the neighborhood of one function
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Call-graph JSON to open on start
    file: Option<PathBuf>,
}

fn main() -> eframe::Result<()> {
    // Log to stdout (if you run with `RUST_LOG=debug`).
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let settings = AppSettings::load();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([settings.window_width, settings.window_height]),
        ..Default::default()
    };

    eframe::run_native(
        "Callscope",
        options,
        Box::new(move |cc| Ok(Box::new(CallscopeApp::new(cc, settings, args.file)))),
    )
}
