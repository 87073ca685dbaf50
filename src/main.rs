//! Entry point for the scope-ui front-end.
//!
//! Loads settings from `config/`, wires stderr and in-GUI logging, preloads
//! any parameter files named on the command line, and hands control to the
//! eframe event loop.

use anyhow::{anyhow, Result};
use clap::Parser;
use eframe::egui;
use log::{info, warn, Level};
use scope_ui::config::Settings;
use scope_ui::gui::Gui;
use scope_ui::log_capture::{LogBuffer, LogCollector};
use scope_ui::selector::ConfigurationList;
use scope_ui::storage;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scope-ui")]
#[command(about = "Parameter editing and mosaic navigation front-end", long_about = None)]
struct Cli {
    /// Alternate settings file under config/ (without extension)
    #[arg(long)]
    config: Option<String>,

    /// Parameter files to load at startup
    parameters: Vec<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = match Settings::new(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("settings unavailable ({}), using built-in defaults", e);
            Settings::default()
        }
    };

    let log_buffer = LogBuffer::new();
    init_logging(&settings.log_level, log_buffer.clone())?;

    let mut list = ConfigurationList::new();
    for path in &cli.parameters {
        match storage::load_tree(path) {
            Ok(tree) => {
                info!("loaded parameters '{}'", tree.display_name());
                list.add(tree);
            }
            Err(e) => warn!("skipping '{}': {}", path.display(), e),
        }
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Scope Control"),
        ..Default::default()
    };

    eframe::run_native(
        "Scope Control",
        options,
        Box::new(move |cc| Ok(Box::new(Gui::new(cc, &settings, list, log_buffer)))),
    )
    .map_err(|e| anyhow!("event loop error: {}", e))
}

/// Log to stderr (env_logger) and to the GUI buffer (LogCollector) at once.
fn init_logging(level: &str, buffer: LogBuffer) -> Result<()> {
    let stderr_logger = env_logger::Builder::new()
        .parse_filters(level)
        .build();
    let collector = LogCollector::new(buffer);
    multi_log::MultiLogger::init(
        vec![Box::new(stderr_logger), Box::new(collector)],
        Level::Trace,
    )
    .map_err(|e| anyhow!("logger init failed: {}", e))
}
