//! Compressed position report frames

use std::fmt;

use super::position::{compress_course_and_speed, compress_latitude, compress_longitude};
use crate::{Result, TrackerError};

/// Report-type marker for a report without timestamp.
pub const MARKER_PLAIN: char = '!';

/// Report-type marker for a report carrying a timestamp.
pub const MARKER_TIMESTAMPED: char = '/';

const ALTITUDE_MIN: f64 = -99_999.0;
const ALTITUDE_MAX: f64 = 999_999.0;

/// APRS compressed position report with optional timestamp and altitude.
///
/// The compressed position and course/speed fields are computed once at
/// construction. Timestamp and altitude may be added afterwards; a repeated call
/// replaces the earlier value. [`render`](Self::render) always reflects the
/// current fields.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionReport {
    source: String,
    destination: String,
    path: Vec<String>,
    table: char,
    symbol: char,
    latitude: f64,
    longitude: f64,
    compressed_latitude: String,
    compressed_longitude: String,
    course_and_speed: String,
    timestamp: Option<String>,
    altitude: Option<String>,
}

impl PositionReport {
    /// Build a plain (`!`) report from a position fix.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source: impl Into<String>,
        destination: impl Into<String>,
        path: Vec<String>,
        table: char,
        symbol: char,
        latitude: f64,
        longitude: f64,
        course: f64,
        speed: f64,
    ) -> Result<Self> {
        Ok(Self {
            source: source.into(),
            destination: destination.into(),
            path,
            table,
            symbol,
            latitude,
            longitude,
            compressed_latitude: compress_latitude(latitude)?,
            compressed_longitude: compress_longitude(longitude)?,
            course_and_speed: compress_course_and_speed(course, speed)?,
            timestamp: None,
            altitude: None,
        })
    }

    /// Add an `HHMMSSh` (UTC) timestamp, switching the marker to `/`.
    pub fn add_timestamp(&mut self, hour: u32, minute: u32, second: u32) -> Result<()> {
        for (quantity, value, limit) in [("hour", hour, 23), ("minute", minute, 59), ("second", second, 59)] {
            if value > limit {
                return Err(TrackerError::encoding_range(quantity, f64::from(value), f64::from(limit)));
            }
        }
        self.timestamp = Some(format!("{hour:02}{minute:02}{second:02}h"));
        Ok(())
    }

    /// Add a `/A=NNNNNN` altitude comment, in feet.
    pub fn add_altitude(&mut self, feet: f64) -> Result<()> {
        if !feet.is_finite() || !(ALTITUDE_MIN..=ALTITUDE_MAX).contains(&feet) {
            return Err(TrackerError::encoding_range("altitude", feet, ALTITUDE_MAX));
        }
        let feet = feet.round_ties_even() as i64;
        self.altitude = Some(format!("/A={feet:06}"));
        Ok(())
    }

    /// Report-type marker for the current state
    pub fn marker(&self) -> char {
        if self.timestamp.is_some() { MARKER_TIMESTAMPED } else { MARKER_PLAIN }
    }

    /// Information field (everything after the `:`)
    pub fn info(&self) -> String {
        let mut info = String::with_capacity(32);
        info.push(self.marker());
        if let Some(timestamp) = &self.timestamp {
            info.push_str(timestamp);
        }
        info.push(self.table);
        info.push_str(&self.compressed_latitude);
        info.push_str(&self.compressed_longitude);
        info.push(self.symbol);
        info.push_str(&self.course_and_speed);
        if let Some(altitude) = &self.altitude {
            info.push_str(altitude);
        }
        info
    }

    /// Full addressed frame: `source>destination[,hop...]:info`
    pub fn render(&self) -> String {
        let mut frame = format!("{}>{}", self.source, self.destination);
        for hop in &self.path {
            frame.push(',');
            frame.push_str(hop);
        }
        frame.push(':');
        frame.push_str(&self.info());
        frame
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Latitude and longitude the report was built from
    pub fn position(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

impl fmt::Display for PositionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
