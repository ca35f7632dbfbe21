//! Handle to a running tracker

use futures::{Stream, StreamExt};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::Result;
use crate::driver::{DriverChannels, DriverStats, SentReport};

/// Running tracker
///
/// Dropping the handle stops the tracking task.
pub struct TrackerHandle {
    reports: watch::Receiver<Option<Arc<SentReport>>>,
    cancel: CancellationToken,
    task: Option<JoinHandle<DriverStats>>,
}

impl TrackerHandle {
    pub(crate) fn new(channels: DriverChannels) -> Self {
        Self { reports: channels.reports, cancel: channels.cancel, task: Some(channels.task) }
    }

    /// Stream of reports as they are sent
    ///
    /// A subscriber sees the most recent report first (if any), then each new one.
    pub fn reports(&self) -> impl Stream<Item = Arc<SentReport>> + 'static {
        WatchStream::new(self.reports.clone()).filter_map(|opt| async move { opt })
    }

    /// Most recently sent report
    pub fn last_report(&self) -> Option<Arc<SentReport>> {
        self.reports.borrow().clone()
    }

    /// Token that stops the tracker when cancelled
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Ask the tracking task to stop
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Wait for the tracking task to finish and return its counters
    pub async fn wait(mut self) -> Result<DriverStats> {
        match self.task.take() {
            Some(task) => Ok(task.await?),
            None => Ok(DriverStats::default()),
        }
    }
}

impl Drop for TrackerHandle {
    fn drop(&mut self) {
        debug!("Dropping tracker handle");
        self.cancel.cancel();
    }
}
