//! Transport implementations

pub mod aprs_is;
pub mod ax25_beacon;

pub use aprs_is::AprsIsTransport;
pub use ax25_beacon::Ax25BeaconTransport;
