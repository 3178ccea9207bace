//! Power Position Service
//!
//! Writes an hourly net power position CSV every `interval_mins` until
//! interrupted with Ctrl+C.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use power_position::{
    Config, CsvSnapshotWriter, ExtractionJob, ResilientFetcher, Scheduler, SystemClock,
};

/// CLI arguments
#[derive(Parser, Debug)]
#[command(name = "power-position")]
#[command(about = "Generate scheduled power position CSV reports", long_about = None)]
struct Args {
    /// Path to the configuration YAML file
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    /// Override the configured output directory
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Run a single extraction and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let args = Args::parse();

    info!("Loading configuration from {:?}", args.config);
    let mut config = Config::from_file(&args.config).context("Failed to load configuration")?;
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }

    info!("Output directory: {:?}", config.output_dir);
    info!("Interval: {} minute(s)", config.interval_mins);
    info!(
        "Retry policy: {} attempt(s), {}ms backoff",
        config.retry.max_attempts, config.retry.backoff_ms
    );
    info!("Provider: {:?}", config.provider);

    let job = ExtractionJob::new(
        ResilientFetcher::new(config.provider.build(), config.retry.clone()),
        CsvSnapshotWriter::new(config.output_dir.clone()),
        Arc::new(SystemClock),
    );
    let scheduler = Scheduler::new(job, config.interval())?;

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received, stopping scheduler");
                shutdown.cancel();
            }
            Err(e) => warn!("Failed to listen for Ctrl+C: {}", e),
        }
    });

    let summary = if args.once {
        scheduler.run_once(cancel).await
    } else {
        scheduler.run(cancel).await
    };

    info!(
        "Exiting: {} cycle(s), {} completed, {} failed",
        summary.cycles, summary.completed, summary.failed
    );
    Ok(())
}
