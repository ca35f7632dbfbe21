//! APRS compressed position reports.
//!
//! ## Wire format
//!
//! ```text
//! SOURCE>DEST[,HOP...]:<marker><HHMMSSh?><table><lat4><lon4><symbol><c><s>Y</A=NNNNNN?>
//! ```
//!
//! - [`base91`] is the fixed-width radix-91 codec underneath every numeric field
//! - [`position`] scales latitude, longitude, course and speed into those fields
//! - [`PositionReport`] assembles and renders the addressed frame
//!
//! ## Example
//!
//! ```rust
//! use prismtracker::aprs::{APP_DESTINATION, PositionReport};
//!
//! let mut report = PositionReport::new(
//!     "N0CALL-9", APP_DESTINATION, vec!["WIDE1-1".into()], '/', '>', 49.5, -72.75, 88.0, 36.2,
//! )?;
//! report.add_altitude(1200.0)?;
//! assert!(report.render().starts_with("N0CALL-9>APZFSM,WIDE1-1:!/5L!!"));
//! assert!(report.render().ends_with(">7PY/A=001200"));
//! # Ok::<(), prismtracker::TrackerError>(())
//! ```

pub mod base91;
mod frame;
pub mod position;

pub use frame::{MARKER_PLAIN, MARKER_TIMESTAMPED, PositionReport};
pub use position::{compress_course_and_speed, compress_latitude, compress_longitude};

/// Destination (software identifier) stamped on every report we originate.
pub const APP_DESTINATION: &str = "APZFSM";
