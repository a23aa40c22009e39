//! ahp-engine - Recompute AHP weights from a JSON snapshot
//!
//! Loads indicators and submissions into the in-memory stores, runs the
//! aggregation and prints the computed payload as JSON on stdout. Logs go to
//! stderr or to the configured log file.

use ahp_common::config::{resolve_config_path, EngineConfig};
use ahp_engine::snapshot::Snapshot;
use ahp_engine::EngineState;
use anyhow::{Context, Result};
use clap::Parser;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Command-line arguments for ahp-engine
#[derive(Parser, Debug)]
#[command(name = "ahp-engine")]
#[command(about = "Aggregate pairwise-comparison surveys into AHP priority weights")]
#[command(version)]
struct Args {
    /// Path to config file (overrides AHP_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Snapshot JSON with indicators and submissions
    #[arg(short, long)]
    data: PathBuf,

    /// Recompute only this iteration
    #[arg(short, long, conflicts_with = "all")]
    iteration: Option<u64>,

    /// Print every recomputed iteration instead of only the last one
    #[arg(long)]
    all: bool,
}

fn init_tracing(config: &EngineConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match &config.logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = EngineConfig::load(args.config.as_deref()).context("Invalid configuration")?;
    init_tracing(&config)?;

    // Build identification first, before any work
    info!(
        "Starting ahp-engine v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match resolve_config_path(args.config.as_deref()) {
        Some(path) => info!("Config file: {}", path.display()),
        None => info!("No config file; using defaults"),
    }
    info!(
        "Consistency threshold: {}, log level: {}",
        config.consistency_threshold, config.logging.level
    );

    let snapshot = Snapshot::from_file(&args.data)
        .with_context(|| format!("Failed to load snapshot {}", args.data.display()))?;
    let engine = EngineState::from_snapshot(snapshot, &config).context("Invalid snapshot")?;

    let output = if let Some(iteration) = args.iteration {
        let computed = engine.orchestrator.compute_iteration(iteration).await?;
        if computed.is_none() {
            warn!("No submissions for iteration {}", iteration);
        }
        serde_json::to_string_pretty(&computed)?
    } else if args.all {
        let computed = engine.orchestrator.compute_all_detailed().await?;
        info!("Recomputed {} iteration(s)", computed.len());
        serde_json::to_string_pretty(&computed)?
    } else {
        let computed = engine.orchestrator.compute_all().await?;
        if computed.is_none() {
            warn!("Snapshot holds no submissions");
        }
        serde_json::to_string_pretty(&computed)?
    };

    println!("{}", output);
    Ok(())
}
