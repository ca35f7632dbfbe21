//! Scaling of position, course and speed into compressed report fields
//!
//! These constants come from the published APRS compressed position format and
//! must stay bit-exact for existing decoders to read our reports.

use super::base91;
use crate::{Result, TrackerError};

/// Base91 units per degree of latitude.
pub const LATITUDE_SCALE: f64 = 380_926.0;

/// Base91 units per degree of longitude.
pub const LONGITUDE_SCALE: f64 = 190_463.0;

/// Logarithm base of the compressed speed digit.
pub const SPEED_LOG_BASE: f64 = 1.08;

/// Compression type byte appended to the course/speed field.
pub const COMPRESSION_TYPE: char = 'Y';

/// Largest single-character digit.
const MAX_DIGIT: f64 = (base91::BASE - 1) as f64;

/// Compressed four-character latitude field.
pub fn compress_latitude(degrees: f64) -> Result<String> {
    if !degrees.is_finite() || !(-90.0..=90.0).contains(&degrees) {
        return Err(TrackerError::encoding_range("latitude", degrees, 90.0));
    }
    base91::encode4(scaled(LATITUDE_SCALE * (90.0 - degrees)))
}

/// Compressed four-character longitude field.
pub fn compress_longitude(degrees: f64) -> Result<String> {
    if !degrees.is_finite() || !(-180.0..=180.0).contains(&degrees) {
        return Err(TrackerError::encoding_range("longitude", degrees, 180.0));
    }
    base91::encode4(scaled(LONGITUDE_SCALE * (180.0 + degrees)))
}

/// Three-character course/speed field: course digit, speed digit, `Y`.
pub fn compress_course_and_speed(course: f64, speed: f64) -> Result<String> {
    let course_digit = single_digit("course", course, (course / 4.0).round_ties_even())?;
    let speed_digit = single_digit("speed", speed, (speed + 1.0).log(SPEED_LOG_BASE).round_ties_even())?;

    Ok([course_digit, speed_digit, COMPRESSION_TYPE].into_iter().collect())
}

// Callers have already bounded the product to [0, 91^4), so the cast cannot truncate.
fn scaled(value: f64) -> u64 {
    value.round_ties_even() as u64
}

fn single_digit(quantity: &'static str, input: f64, digit: f64) -> Result<char> {
    if !input.is_finite() || input < 0.0 || !(0.0..=MAX_DIGIT).contains(&digit) {
        return Err(TrackerError::encoding_range(quantity, input, MAX_DIGIT));
    }
    Ok(char::from(base91::OFFSET + digit as u8))
}
