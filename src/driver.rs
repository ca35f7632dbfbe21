//! Driver spawns and runs the tracking loop

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::aprs::PositionReport;
use crate::beacon::BeaconAlgorithm;
use crate::config::{DaemonConfig, StationConfig};
use crate::provider::LocationProvider;
use crate::transport::Transport;
use crate::types::LocationSample;

/// Consecutive provider failures (other than "no fix") before giving up.
const MAX_ERRORS: u32 = 10;

/// A report that went through the transports
#[derive(Debug, Clone)]
pub struct SentReport {
    pub report: PositionReport,
    pub sample: LocationSample,
    /// Transports that accepted the report
    pub delivered: usize,
    /// Transports that reported a delivery failure
    pub failed: usize,
}

/// Counters for one driver run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverStats {
    pub samples: u64,
    pub not_ready: u64,
    pub reports: u64,
    pub delivery_failures: u64,
    pub skipped: u64,
}

/// Result of spawning the driver task
pub struct DriverChannels {
    /// Receiver for sent reports
    pub reports: watch::Receiver<Option<Arc<SentReport>>>,
    /// Cancellation token for graceful shutdown
    pub cancel: CancellationToken,
    /// Completes with the run's counters when the loop exits
    pub task: JoinHandle<DriverStats>,
}

/// Everything the tracking loop owns
pub struct DriverParts {
    pub provider: Box<dyn LocationProvider>,
    pub beacon: Box<dyn BeaconAlgorithm>,
    pub transports: Vec<Box<dyn Transport>>,
    pub station: StationConfig,
    pub daemon: DaemonConfig,
}

/// Driver spawns and manages the tracking task
///
/// The task exclusively owns the provider, beacon algorithm and transports.
/// Every wait inside it is raced against the cancellation token.
pub struct Driver;

impl Driver {
    /// Spawn the tracking task
    pub fn spawn(parts: DriverParts) -> DriverChannels {
        let (report_tx, report_rx) = watch::channel(None);
        let cancel = CancellationToken::new();

        let cancel_task = cancel.clone();
        let task = tokio::spawn(async move { Self::tracking_task(parts, report_tx, cancel_task).await });

        DriverChannels { reports: report_rx, cancel, task }
    }

    async fn tracking_task(
        mut parts: DriverParts,
        report_tx: watch::Sender<Option<Arc<SentReport>>>,
        cancel: CancellationToken,
    ) -> DriverStats {
        info!(
            provider = parts.provider.name(),
            beacon = parts.beacon.name(),
            transports = parts.transports.len(),
            "Tracking task started"
        );
        let mut stats = DriverStats::default();
        let mut error_count = 0u32;

        loop {
            if cancel.is_cancelled() {
                info!("Tracking task cancelled");
                break;
            }

            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Tracking task cancelled during read");
                    break;
                }
                result = parts.provider.next_sample() => result,
            };

            let delay = match result {
                Ok(Some(sample)) => {
                    stats.samples += 1;
                    error_count = 0;
                    trace!(
                        "Sample {}: lat={:.6} lon={:.6} course={:.1} speed={:.1} t={}",
                        stats.samples,
                        sample.latitude,
                        sample.longitude,
                        sample.course,
                        sample.speed,
                        sample.timestamp()
                    );

                    if parts.beacon.check(&sample) {
                        match Self::broadcast(&mut parts, sample, &mut stats).await {
                            Some(sent) => {
                                let _ = report_tx.send(Some(Arc::new(sent)));
                                if parts.daemon.one_shot {
                                    info!("One-shot report sent, stopping");
                                    break;
                                }
                            }
                            None => stats.skipped += 1,
                        }
                    }
                    parts.daemon.poll_interval()
                }
                Ok(None) => {
                    info!("Location source ended after {} samples", stats.samples);
                    break;
                }
                Err(e) if e.is_not_ready() => {
                    stats.not_ready += 1;
                    warn!("GPS Not Ready: {}", e);
                    parts.daemon.not_ready_delay()
                }
                Err(e) => {
                    // Provider error - don't crash on transient failures
                    error_count += 1;
                    error!("Provider error ({}/{}): {}", error_count, MAX_ERRORS, e);

                    if error_count >= MAX_ERRORS {
                        error!("Too many provider errors, shutting down");
                        break;
                    }

                    // Exponential backoff: 100ms, 200ms, 400ms, ...
                    Duration::from_millis(50 * (1 << error_count.min(6)))
                }
            };

            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Tracking task cancelled while waiting");
                    break;
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }

        info!(
            samples = stats.samples,
            reports = stats.reports,
            delivery_failures = stats.delivery_failures,
            "Tracking task ended"
        );
        stats
    }

    /// Build the report for a due sample and hand it to every transport.
    ///
    /// Returns `None` when the sample cannot be encoded.
    async fn broadcast(
        parts: &mut DriverParts,
        sample: LocationSample,
        stats: &mut DriverStats,
    ) -> Option<SentReport> {
        let report = match parts.station.build_report(&sample) {
            Ok(report) => report,
            Err(e) => {
                warn!("Skipping sample that cannot be encoded: {}", e);
                return None;
            }
        };
        info!("APRS Frame: {}", report);

        let mut delivered = 0;
        let mut failed = 0;
        for transport in parts.transports.iter_mut() {
            match transport.send(&report).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    failed += 1;
                    warn!("Delivery via {} failed: {}", transport.name(), e);
                }
            }
        }

        stats.reports += 1;
        stats.delivery_failures += failed as u64;
        debug!(delivered, failed, "Report broadcast");

        Some(SentReport { report, sample, delivered, failed })
    }
}
