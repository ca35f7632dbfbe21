//! Location samples produced by providers

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::{Result, TrackerError};

/// Knots per metre-per-second.
pub const KNOTS_PER_MPS: f64 = 1.943844;

/// Feet per metre.
pub const FEET_PER_METER: f64 = 3.28084;

/// One position fix from a location source.
///
/// Latitude and longitude are signed decimal degrees (south and west negative),
/// course is degrees true, speed is knots, altitude is feet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub course: f64,
    #[serde(default)]
    pub speed: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    pub time: DateTime<Utc>,
}

impl LocationSample {
    /// Create a stationary sample with no altitude
    pub fn new(latitude: f64, longitude: f64, time: DateTime<Utc>) -> Self {
        Self { latitude, longitude, course: 0.0, speed: 0.0, altitude: None, time }
    }

    /// Set course (degrees) and speed (knots)
    pub fn with_motion(mut self, course: f64, speed: f64) -> Self {
        self.course = course;
        self.speed = speed;
        self
    }

    /// Set altitude in feet
    pub fn with_altitude(mut self, feet: f64) -> Self {
        self.altitude = Some(feet);
        self
    }

    /// Seconds since the Unix epoch, UTC
    pub fn timestamp(&self) -> i64 {
        self.time.timestamp()
    }

    /// UTC hour, minute and second of the fix
    pub fn utc_hms(&self) -> (u32, u32, u32) {
        (self.time.hour(), self.time.minute(), self.time.second())
    }

    /// Parse a GPS zulu time string such as `2021-03-01T12:34:56.000Z`.
    pub fn parse_time(time: &str) -> Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(time)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| TrackerError::parse("GPS time", format!("{time:?}: {e}")))
    }
}
