//! prismtracker daemon
//!
//! Reads the configuration file, applies command-line overrides and runs the
//! tracker until the location source ends or Ctrl-C is pressed.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use prismtracker::{Tracker, TrackerConfig, logging};

const DEFAULT_CONFIG: &str = "/etc/prismtracker.yaml";

#[derive(Parser)]
#[command(name = "prismtracker")]
#[command(version, about = "APRS position tracker", long_about = None)]
struct Args {
    /// Configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    /// Callsign with SSID, overrides station.callsign
    #[arg(long)]
    call: Option<String>,

    /// Log level or filter directive, overrides log_level
    #[arg(long)]
    log_level: Option<String>,

    /// Send a single report and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = TrackerConfig::read(&args.config)
        .with_context(|| format!("reading configuration {}", args.config.display()))?;
    if let Some(call) = args.call {
        config.station.callsign = call;
    }
    if let Some(level) = args.log_level {
        config.log_level = level;
    }
    if args.once {
        config.daemon.one_shot = true;
    }
    config.validate().context("invalid configuration")?;

    logging::init(&config.log_level)?;
    info!(
        callsign = %config.station.callsign,
        transports = config.transports.len(),
        "prismtracker {} starting",
        env!("CARGO_PKG_VERSION")
    );

    let handle = Tracker::start(&config).await.context("starting tracker")?;
    let cancel = handle.cancel_token();

    let wait = handle.wait();
    tokio::pin!(wait);

    let stats = tokio::select! {
        stats = &mut wait => stats?,
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => {
                    info!("Interrupted, shutting down");
                    cancel.cancel();
                }
                Err(e) => warn!("Failed to listen for Ctrl-C: {}", e),
            }
            wait.await?
        }
    };

    info!(
        samples = stats.samples,
        reports = stats.reports,
        delivery_failures = stats.delivery_failures,
        "prismtracker stopped"
    );
    Ok(())
}
