//! Beacon algorithms decide when a fix is worth reporting.
//!
//! Both algorithms implement [`BeaconAlgorithm`] and own their state outright;
//! state only moves forward when [`check`](BeaconAlgorithm::check) returns true.
//!
//! - [`IntervalBeacon`]: report every `interval` seconds
//! - [`SmartBeacon`]: interpolate between `max_interval` (idle) and
//!   `min_interval` (fast or turning hard)
//!
//! Timestamps are expected to be non-decreasing. A sample older than the last
//! report is treated as a clock reset: it is reported immediately and re-seeds
//! the algorithm's state.

use serde::{Deserialize, Serialize};

use crate::types::LocationSample;
use crate::{Result, TrackerError};

mod interval;
mod smart;

pub use interval::IntervalBeacon;
pub use smart::{BeaconState, COURSE_REFERENCE, REFERENCE_SPEED, SmartBeacon, TURN_SPEED_THRESHOLD};

/// Default fixed beacon interval in seconds.
pub const DEFAULT_INTERVAL: u64 = 600;

/// Decides whether a sample should be reported now.
pub trait BeaconAlgorithm: Send {
    /// Returns true when a report is due; state is updated only in that case.
    fn check(&mut self, sample: &LocationSample) -> bool;

    /// Short algorithm name for logs
    fn name(&self) -> &'static str;
}

/// Beacon algorithm selection, as written in the configuration file.
///
/// ```yaml
/// beacon:
///   mode: smart
///   min_interval: 30
///   max_interval: 600
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BeaconConfig {
    Interval {
        #[serde(default = "default_interval")]
        interval: u64,
    },
    Smart {
        min_interval: u64,
        max_interval: u64,
    },
}

fn default_interval() -> u64 {
    DEFAULT_INTERVAL
}

impl Default for BeaconConfig {
    fn default() -> Self {
        BeaconConfig::Interval { interval: DEFAULT_INTERVAL }
    }
}

impl BeaconConfig {
    /// Check the numeric parameters
    pub fn validate(&self) -> Result<()> {
        match *self {
            BeaconConfig::Interval { interval } if interval == 0 => {
                Err(TrackerError::config("beacon interval must be greater than zero"))
            }
            BeaconConfig::Smart { min_interval, max_interval }
                if min_interval == 0 || min_interval >= max_interval =>
            {
                Err(TrackerError::config(format!(
                    "smart beacon needs 0 < min_interval < max_interval (got {min_interval} and {max_interval})"
                )))
            }
            _ => Ok(()),
        }
    }

    /// Instantiate the configured algorithm
    pub fn build(&self) -> Result<Box<dyn BeaconAlgorithm>> {
        self.validate()?;
        Ok(match *self {
            BeaconConfig::Interval { interval } => Box::new(IntervalBeacon::new(interval)),
            BeaconConfig::Smart { min_interval, max_interval } => {
                Box::new(SmartBeacon::new(min_interval, max_interval))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_ten_minute_interval() {
        assert_eq!(BeaconConfig::default(), BeaconConfig::Interval { interval: 600 });
        assert_eq!(BeaconConfig::default().build().unwrap().name(), "interval");
    }

    #[test]
    fn parses_tagged_yaml() {
        let smart: BeaconConfig =
            serde_yaml_ng::from_str("mode: smart\nmin_interval: 30\nmax_interval: 600\n").unwrap();
        assert_eq!(smart, BeaconConfig::Smart { min_interval: 30, max_interval: 600 });
        assert_eq!(smart.build().unwrap().name(), "smart");

        let interval: BeaconConfig = serde_yaml_ng::from_str("mode: interval\n").unwrap();
        assert_eq!(interval, BeaconConfig::Interval { interval: DEFAULT_INTERVAL });
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(BeaconConfig::Interval { interval: 0 }.build().is_err());
        assert!(BeaconConfig::Smart { min_interval: 0, max_interval: 10 }.build().is_err());
        assert!(BeaconConfig::Smart { min_interval: 600, max_interval: 600 }.build().is_err());
        assert!(BeaconConfig::Smart { min_interval: 700, max_interval: 600 }.build().is_err());
    }
}
