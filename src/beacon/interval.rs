//! Fixed-interval beacon

use tracing::{debug, warn};

use super::BeaconAlgorithm;
use crate::types::LocationSample;

/// Reports once every `interval` seconds regardless of motion.
#[derive(Debug, Clone)]
pub struct IntervalBeacon {
    interval: i64,
    last_report_time: i64,
}

impl IntervalBeacon {
    pub fn new(interval: u64) -> Self {
        Self { interval: i64::try_from(interval).unwrap_or(i64::MAX), last_report_time: 0 }
    }

    /// Timestamp of the last positive decision (0 before the first one)
    pub fn last_report_time(&self) -> i64 {
        self.last_report_time
    }
}

impl BeaconAlgorithm for IntervalBeacon {
    fn check(&mut self, sample: &LocationSample) -> bool {
        let now = sample.timestamp();

        if now < self.last_report_time {
            warn!(
                now,
                last_report_time = self.last_report_time,
                "Sample time went backwards, reporting and restarting interval"
            );
        } else if now < self.last_report_time.saturating_add(self.interval) {
            debug!("Not sending a report, interval has not expired");
            return false;
        }

        self.last_report_time = now;
        true
    }

    fn name(&self) -> &'static str {
        "interval"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_at;

    const T0: i64 = 1_614_600_000;

    #[test]
    fn first_sample_reports() {
        let mut beacon = IntervalBeacon::new(600);
        assert!(beacon.check(&sample_at(T0)));
        assert_eq!(beacon.last_report_time(), T0);
    }

    #[test]
    fn waits_full_interval() {
        let mut beacon = IntervalBeacon::new(600);
        assert!(beacon.check(&sample_at(T0)));
        assert!(!beacon.check(&sample_at(T0 + 599)));
        assert!(beacon.check(&sample_at(T0 + 600)));
        assert!(!beacon.check(&sample_at(T0 + 1199)));
        assert!(beacon.check(&sample_at(T0 + 1200)));
    }

    #[test]
    fn negative_decision_leaves_state() {
        let mut beacon = IntervalBeacon::new(600);
        beacon.check(&sample_at(T0));
        beacon.check(&sample_at(T0 + 10));
        assert_eq!(beacon.last_report_time(), T0);
    }

    #[test]
    fn clock_reset_reports_immediately() {
        let mut beacon = IntervalBeacon::new(600);
        assert!(beacon.check(&sample_at(T0)));
        assert!(beacon.check(&sample_at(T0 - 3600)));
        assert_eq!(beacon.last_report_time(), T0 - 3600);
        assert!(!beacon.check(&sample_at(T0 - 3500)));
    }
}
