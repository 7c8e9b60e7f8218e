use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use eframe::egui;

use rusty_cord::app::RustyCordApp;
use rusty_cord::config::DashboardConfig;
use rusty_cord::data::cache::shared_cache;
use rusty_cord::state::AppState;

/// CORD-19 metadata explorer.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Metadata file to open (.csv, .json or .parquet)
    #[arg(long, short)]
    data: Option<PathBuf>,

    /// TOML settings file
    #[arg(long, short, default_value = "rusty-cord.toml")]
    config: PathBuf,

    /// Seed for the random paper sample
    #[arg(long)]
    seed: Option<u64>,
}

fn load_config(cli: &Cli) -> Result<DashboardConfig> {
    let mut config = if cli.config.exists() {
        DashboardConfig::from_path(&cli.config)
            .with_context(|| format!("loading {}", cli.config.display()))?
    } else {
        log::debug!("{} not found, using defaults", cli.config.display());
        DashboardConfig::default()
    };
    if let Some(data) = &cli.data {
        config.dataset = data.clone();
    }
    if cli.seed.is_some() {
        config.sample_seed = cli.seed;
    }
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let mut state = AppState::new(config);
    let dataset = state.config.dataset.clone();
    state.load(&dataset, shared_cache());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Cord – CORD-19 Explorer",
        options,
        Box::new(move |_cc| Ok(Box::new(RustyCordApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running the dashboard: {e}"))
}
