//! Location provider implementations

pub mod gpsd;
pub mod replay;

pub use gpsd::GpsdProvider;
pub use replay::{RecordedTrack, ReplayProvider};
