//! Test utilities shared by unit tests and benchmarks
//!
//! Sample builders with fixed, realistic timestamps, a scripted location
//! provider and a transport that records what it was asked to send.

#![cfg(any(test, feature = "benchmark"))]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::aprs::{APP_DESTINATION, PositionReport};
use crate::provider::LocationProvider;
use crate::transport::Transport;
use crate::types::LocationSample;
use crate::{Result, TrackerError};

/// Stationary sample at Portland, OR at `timestamp` seconds since the epoch.
pub fn sample_at(timestamp: i64) -> LocationSample {
    let time = DateTime::<Utc>::from_timestamp(timestamp, 0).unwrap_or_default();
    LocationSample::new(45.5152, -122.6784, time)
}

/// Moving sample at `timestamp` with the given course (degrees) and speed (knots).
pub fn moving_sample_at(timestamp: i64, course: f64, speed: f64) -> LocationSample {
    sample_at(timestamp).with_motion(course, speed)
}

/// `N0CALL-9>APZFSM` report at 0°N 0°E, stationary.
pub fn origin_report(path: Vec<String>) -> PositionReport {
    PositionReport::new("N0CALL-9", APP_DESTINATION, path, '/', '>', 0.0, 0.0, 0.0, 0.0)
        .unwrap_or_else(|e| panic!("origin report must encode: {e}"))
}

/// Provider that plays back a scripted list of results, then ends.
#[derive(Default)]
pub struct MockProvider {
    script: VecDeque<Result<Option<LocationSample>>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn samples(samples: impl IntoIterator<Item = LocationSample>) -> Self {
        let mut provider = Self::new();
        for sample in samples {
            provider = provider.then_sample(sample);
        }
        provider
    }

    pub fn then_sample(mut self, sample: LocationSample) -> Self {
        self.script.push_back(Ok(Some(sample)));
        self
    }

    pub fn then_not_ready(mut self) -> Self {
        self.script.push_back(Err(TrackerError::not_ready("No fix")));
        self
    }

    pub fn then_error(mut self, error: TrackerError) -> Self {
        self.script.push_back(Err(error));
        self
    }
}

#[async_trait::async_trait]
impl LocationProvider for MockProvider {
    async fn next_sample(&mut self) -> Result<Option<LocationSample>> {
        self.script.pop_front().unwrap_or(Ok(None))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Transport that records rendered frames; can be told to fail.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    sent: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport whose every send fails
    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    /// Rendered frames sent so far
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl Transport for RecordingTransport {
    async fn send(&mut self, report: &PositionReport) -> Result<()> {
        if self.fail {
            return Err(TrackerError::delivery_failed(self.name(), "configured to fail"));
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(report.render());
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}
