//! Transport trait for broadcasting reports

use crate::Result;
use crate::aprs::PositionReport;

/// Something that can put a rendered report on the air or on the network.
///
/// A failed send returns [`TrackerError::DeliveryFailed`](crate::TrackerError::DeliveryFailed);
/// the caller decides whether that matters.
#[async_trait::async_trait]
pub trait Transport: Send + 'static {
    /// Deliver one report
    async fn send(&mut self, report: &PositionReport) -> Result<()>;

    /// Short transport name for logs and errors
    fn name(&self) -> &str;
}
