use std::path::PathBuf;

mod backend_bridge;
mod controller;
mod ui;

use anyhow::Context;
use clap::Parser;
use client_core::load_settings;
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::ui::{AdminPanelApp, StartupConfig};

#[derive(Parser, Debug)]
#[command(name = "shortener-admin-gui", about = "Desktop admin panel for a URL shortener")]
struct Args {
    /// Backend endpoint, e.g. http://localhost:8080/api/shorten
    #[arg(long)]
    base_url: Option<String>,
    /// TOML settings file (defaults to ./shortener-admin.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings =
        load_settings(args.config.as_deref(), args.base_url).context("failed to load settings")?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_filter.as_str()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let base_url = settings.base_url()?;
    let startup = StartupConfig {
        server_url: base_url.to_string(),
    };

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    backend_bridge::runtime::launch(base_url, cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Short URL Admin")
            .with_inner_size([1080.0, 680.0])
            .with_min_inner_size([720.0, 420.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Short URL Admin",
        options,
        Box::new(move |_cc| Ok(Box::new(AdminPanelApp::bootstrap(cmd_tx, ui_rx, startup)))),
    )
    .map_err(|err| anyhow::anyhow!("failed to start admin panel: {err}"))
}
