//! Provider trait for location sources

use crate::Result;
use crate::types::LocationSample;

/// Trait for location sources
///
/// Providers abstract over where fixes come from (a gpsd daemon, a recorded
/// track) and handle their own I/O internally.
#[async_trait::async_trait]
pub trait LocationProvider: Send + 'static {
    /// Get the current location fix
    ///
    /// Returns:
    /// - `Ok(Some(sample))` - Fix available
    /// - `Ok(None)` - Source ended (normal termination)
    /// - `Err(TrackerError::NotReady { .. })` - No fix yet, try again later
    /// - `Err(e)` - Any other error
    async fn next_sample(&mut self) -> Result<Option<LocationSample>>;

    /// Short provider name for logs
    fn name(&self) -> &'static str;
}
