//! Market Export CLI: scheduled export runs and the query API.
//!
//! Commands:
//! - `export`: full export of every configured exchange and stock
//! - `update`: incremental update of latest prices and fresh snapshots
//! - `serve`: read-only HTTP API over the exported tree
//!
//! `export` and `update` exit 0 once the run completes, whatever happened to
//! individual entities. Only configuration and startup errors fail.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use marketexport_api::{serve, ApiState};
use marketexport_core::store::JsonFileStore;
use marketexport_runner::{run_configured, ExportConfig, RunMode, StdoutProgress};

#[derive(Parser)]
#[command(
    name = "marketexport",
    version,
    about = "Market data exporter: full and incremental JSON exports"
)]
struct Cli {
    /// Path to a TOML config file. Defaults to ./marketexport.toml if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory. Overrides `data_dir` from the config.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full export: complete price histories and all snapshots.
    Export,
    /// Incremental update: append the latest prices, replace snapshots.
    Update,
    /// Serve the exported tree over HTTP.
    Serve {
        /// Address to bind. Overrides `api.bind` from the config.
        #[arg(long)]
        bind: Option<String>,
    },
}

fn init_tracing() {
    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("marketexport=info"));

    if json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = ExportConfig::load(cli.config.as_deref())?.with_data_dir(cli.data_dir);

    match cli.command {
        Commands::Export => run_export(&config, RunMode::Full),
        Commands::Update => run_export(&config, RunMode::Incremental),
        Commands::Serve { bind } => run_serve(&config, bind),
    }
}

fn run_export(config: &ExportConfig, mode: RunMode) -> Result<()> {
    let report = run_configured(config, mode, &StdoutProgress)?;

    for failure in &report.failures {
        eprintln!("  skipped {} ({}): {}", failure.entity, failure.stage, failure.message);
    }
    if let Some(err) = &report.summary_error {
        tracing::error!(error = %err, "run finished without a summary entry");
    }
    Ok(())
}

fn run_serve(config: &ExportConfig, bind: Option<String>) -> Result<()> {
    let bind = bind.unwrap_or_else(|| config.api.bind.clone());
    let markets = config.registry()?.codes();
    let state = ApiState::new(Arc::new(JsonFileStore::new(config.data_dir.clone())), markets);

    tracing::info!(data_dir = %config.data_dir.display(), "serving exported tree");

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime
        .block_on(serve(&bind, state))
        .with_context(|| format!("query API on {bind} failed"))
}
