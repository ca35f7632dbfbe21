//! APRS position tracker.
//!
//! Prismtracker reads fixes from a location source, decides when a report is
//! worth sending, encodes it as an APRS compressed position report and hands it
//! to one or more transports.
//!
//! # Features
//!
//! - **Compressed reports**: bit-exact base91 position, course and speed fields
//! - **Smart beaconing**: report more often when moving fast or turning, with
//!   hard minimum and maximum intervals
//! - **Sources**: gpsd, or a recorded track for replay
//! - **Transports**: AX.25 via the ax25-tools `beacon` program, and APRS-IS
//!
//! ## Example (recorded track)
//!
//! ```rust,no_run
//! use prismtracker::{Tracker, TrackerConfig};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> prismtracker::Result<()> {
//!     let config = TrackerConfig::load("/etc/prismtracker.yaml")?;
//!     let tracker = Tracker::start(&config).await?;
//!
//!     let mut reports = Box::pin(tracker.reports());
//!     while let Some(sent) = reports.next().await {
//!         println!("{}", sent.report);
//!     }
//!     Ok(())
//! }
//! ```

// Core types and error handling
mod error;
pub mod types;

// Report encoding and beacon decisions
pub mod aprs;
pub mod beacon;

// Collaborators and the tracking loop
pub mod config;
pub mod driver;
mod handle;
pub mod logging;
pub mod provider;
pub mod providers;
pub mod transport;
pub mod transports;

#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;

// Core exports
pub use error::*;
pub use types::*;

pub use aprs::{APP_DESTINATION, PositionReport};
pub use beacon::{BeaconAlgorithm, BeaconConfig, IntervalBeacon, SmartBeacon};
pub use config::{DaemonConfig, GpsConfig, StationConfig, TrackerConfig, TransportConfig};
pub use driver::{DriverStats, SentReport};
pub use handle::TrackerHandle;
pub use provider::LocationProvider;
pub use transport::Transport;

use driver::{Driver, DriverParts};

/// Unified entry point for starting a tracker.
pub struct Tracker;

impl Tracker {
    /// Start tracking with the source and transports named in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration does not validate
    /// - The location source cannot be opened (gpsd unreachable, track file missing)
    pub async fn start(config: &TrackerConfig) -> Result<TrackerHandle> {
        config.validate()?;
        let provider = config.gps.open().await?;
        Self::start_with(config, provider, config.build_transports())
    }

    /// Start tracking with an explicit source and transports.
    ///
    /// The station, beacon and daemon sections of `config` still apply; its
    /// `gps` and `transports` sections are ignored.
    pub fn start_with(
        config: &TrackerConfig,
        provider: Box<dyn LocationProvider>,
        transports: Vec<Box<dyn Transport>>,
    ) -> Result<TrackerHandle> {
        config.station.validate()?;
        config.daemon.validate()?;
        let beacon = config.beacon.build()?;

        let channels = Driver::spawn(DriverParts {
            provider,
            beacon,
            transports,
            station: config.station.clone(),
            daemon: config.daemon.clone(),
        });
        Ok(TrackerHandle::new(channels))
    }
}
