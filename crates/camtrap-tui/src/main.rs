//! `camtrap`: terminal dashboard for the Assirik and Fongoli camera traps.
//!
//! Built on [ratatui](https://ratatui.rs). The Map screen draws the study
//! area with site markers and baboon-count bubbles; the Detail screen shows
//! the selected site's trigger-hour histogram and an hourly weather
//! forecast fetched in the background.
//!
//! Logs are written to a file (default `/tmp/camtrap.log`) to avoid
//! corrupting the terminal UI.
//!
//! Entry point: CLI argument parsing, tracing setup, panic hooks, data
//! loading, and app launch.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screen;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use camtrap_config::Config;
use camtrap_core::{DashboardController, EnrichmentFetcher, load_boundary_or_unbounded, load_catalog};

use crate::app::App;

/// Terminal dashboard for camera-trap field sites.
#[derive(Parser, Debug)]
#[command(name = "camtrap", version, about)]
struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(short = 'c', long, env = "CAMTRAP_CONFIG")]
    config: Option<PathBuf>,

    /// Directory containing the Assirik/ and Fongoli/ site documents
    #[arg(short = 's', long, env = "CAMTRAP_SITES_DIR")]
    sites_dir: Option<PathBuf>,

    /// GeoJSON boundary of the study area
    #[arg(short = 'b', long, env = "CAMTRAP_BOUNDARY")]
    boundary: Option<PathBuf>,

    /// Forecast endpoint URL
    #[arg(short = 'w', long, env = "CAMTRAP_WEATHER_URL")]
    weather_url: Option<String>,

    /// Log file path (defaults to /tmp/camtrap.log)
    #[arg(long, default_value = "/tmp/camtrap.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. Nothing may go to stdout/stderr while the
/// terminal is in raw mode. Hold the returned guard until exit so logs flush.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "camtrap={log_level},camtrap_core={log_level},camtrap_api={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("camtrap.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

/// Config file + env, then CLI flag overrides.
fn resolve_config(cli: &Cli) -> Result<Config> {
    let path = cli.config.clone().unwrap_or_else(camtrap_config::config_path);
    let mut cfg = camtrap_config::load_config_from(&path)
        .wrap_err_with(|| format!("loading config from {}", path.display()))?;

    if let Some(dir) = &cli.sites_dir {
        cfg.data.sites_dir.clone_from(dir);
    }
    if let Some(file) = &cli.boundary {
        cfg.data.boundary_file.clone_from(file);
    }
    if let Some(url) = &cli.weather_url {
        cfg.weather.base_url.clone_from(url);
    }
    cfg.validate()?;
    Ok(cfg)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Install panic/error hooks BEFORE entering the terminal
    tui::install_hooks()?;

    let _log_guard = setup_tracing(&cli);

    let cfg = resolve_config(&cli)?;
    info!(
        sites_dir = %cfg.data.sites_dir.display(),
        weather = %cfg.weather.base_url,
        "starting camtrap"
    );

    // A broken catalog ends the session; a broken boundary does not.
    let catalog = load_catalog(&cfg.data.sites_dir)
        .wrap_err_with(|| format!("loading sites from {}", cfg.data.sites_dir.display()))?;
    let region = load_boundary_or_unbounded(&cfg.data.boundary_file);

    let client = cfg.weather.forecast_client()?;
    let (controller, outcome_rx) = DashboardController::new(
        Arc::new(catalog),
        Arc::new(region),
        EnrichmentFetcher::new(client),
    );

    let mut app = App::new(controller, outcome_rx, &cfg);
    app.run().await?;

    Ok(())
}
