//! Adaptive ("SmartBeaconing") beacon
//!
//! The effective interval slides linearly from `max_interval` when idle down to
//! `min_interval` as speed and course change grow. `min_interval` is a hard floor
//! and `max_interval` a hard ceiling whatever the motion.

use tracing::{debug, trace, warn};

use super::BeaconAlgorithm;
use crate::types::LocationSample;

/// Speed (knots, about 55 mph) at which speed alone saturates the urgency.
pub const REFERENCE_SPEED: f64 = 47.79;

/// Below this speed (knots, about 5 mph) course changes are ignored.
pub const TURN_SPEED_THRESHOLD: f64 = 4.34;

/// Course change (degrees) at which turning alone saturates the urgency.
pub const COURSE_REFERENCE: f64 = 45.0;

/// What the smart beacon remembers about its last report.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BeaconState {
    pub last_report_time: i64,
    pub last_latitude: f64,
    pub last_longitude: f64,
    pub last_course: f64,
}

/// Speed- and turn-sensitive beacon.
#[derive(Debug, Clone)]
pub struct SmartBeacon {
    min_interval: i64,
    max_interval: i64,
    state: BeaconState,
}

impl SmartBeacon {
    /// Callers guarantee `0 < min_interval < max_interval`
    /// (see [`BeaconConfig::validate`](super::BeaconConfig::validate)).
    pub fn new(min_interval: u64, max_interval: u64) -> Self {
        Self {
            min_interval: i64::try_from(min_interval).unwrap_or(i64::MAX),
            max_interval: i64::try_from(max_interval).unwrap_or(i64::MAX),
            state: BeaconState::default(),
        }
    }

    pub fn state(&self) -> &BeaconState {
        &self.state
    }

    /// Combined speed/turn urgency in `[0, 1]` for a sample against the current state.
    pub fn urgency(&self, sample: &LocationSample) -> f64 {
        let speed_ratio = sample.speed / REFERENCE_SPEED;

        let course_ratio = if sample.speed > TURN_SPEED_THRESHOLD {
            let mut course_diff = (sample.course - self.state.last_course).abs();
            if course_diff > 180.0 {
                course_diff = 360.0 - course_diff;
            }
            course_diff / COURSE_REFERENCE
        } else {
            0.0
        };

        let urgency = (speed_ratio + course_ratio) / 2.0;
        // A corrupt fix (NaN or infinite speed/course) never shortens the wait
        if urgency.is_finite() { urgency.min(1.0) } else { 0.0 }
    }

    /// Seconds to wait after the last report for a given urgency
    pub fn effective_interval(&self, urgency: f64) -> f64 {
        let span = (self.max_interval - self.min_interval) as f64;
        self.max_interval as f64 - urgency * span
    }

    fn record(&mut self, sample: &LocationSample) {
        self.state = BeaconState {
            last_report_time: sample.timestamp(),
            last_latitude: sample.latitude,
            last_longitude: sample.longitude,
            last_course: sample.course,
        };
    }
}

impl BeaconAlgorithm for SmartBeacon {
    fn check(&mut self, sample: &LocationSample) -> bool {
        let now = sample.timestamp();
        let last = self.state.last_report_time;

        if now < last {
            warn!(now, last_report_time = last, "Sample time went backwards, reporting and re-seeding");
            self.record(sample);
            return true;
        }

        let elapsed = now - last;
        if elapsed < self.min_interval {
            trace!(elapsed, "Inside minimum interval");
            return false;
        }

        if elapsed >= self.max_interval {
            debug!(elapsed, "Maximum interval reached");
            self.record(sample);
            return true;
        }

        let urgency = self.urgency(sample);
        let wait = self.effective_interval(urgency);
        if (elapsed as f64) < wait {
            trace!(elapsed, urgency, wait, "Not due yet");
            return false;
        }

        debug!(elapsed, urgency, wait, speed = sample.speed, course = sample.course, "Smart beacon due");
        self.record(sample);
        true
    }

    fn name(&self) -> &'static str {
        "smart"
    }
}
