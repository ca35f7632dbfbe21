//! Core data types shared between providers, the beacon algorithms and the
//! frame builder.
//!
//! [`LocationSample`] is the unit of data that flows through the tracker: a
//! provider produces one per poll, the beacon algorithm inspects it, and the
//! station configuration turns it into a position report.

mod sample;

pub use sample::{FEET_PER_METER, KNOTS_PER_MPS, LocationSample};
