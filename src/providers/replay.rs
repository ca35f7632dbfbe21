//! Replay provider for recorded tracks

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::provider::LocationProvider;
use crate::types::LocationSample;
use crate::{Result, TrackerError};

/// A recorded sequence of fixes, as stored on disk.
///
/// ```yaml
/// samples:
///   - latitude: 45.5
///     longitude: -122.6
///     course: 90.0
///     speed: 12.5
///     altitude: 150.0
///     time: 2021-03-01T12:00:00Z
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordedTrack {
    #[serde(default)]
    pub samples: Vec<LocationSample>,
}

impl RecordedTrack {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| TrackerError::parse("recorded track", e.to_string()))
    }
}

/// Replays a recorded track one sample per call, then ends.
pub struct ReplayProvider {
    samples: std::vec::IntoIter<LocationSample>,
    total: usize,
}

impl ReplayProvider {
    /// Load a recorded track from a YAML file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| TrackerError::file_error(path.to_path_buf(), e))?;
        let track = RecordedTrack::from_yaml_str(&yaml)?;

        info!("Opened recorded track {}: {} samples", path.display(), track.samples.len());
        Ok(Self::new(track))
    }

    pub fn new(track: RecordedTrack) -> Self {
        let total = track.samples.len();
        Self { samples: track.samples.into_iter(), total }
    }

    /// Samples not yet replayed
    pub fn remaining(&self) -> usize {
        self.samples.len()
    }

    pub fn total(&self) -> usize {
        self.total
    }
}

#[async_trait::async_trait]
impl LocationProvider for ReplayProvider {
    async fn next_sample(&mut self) -> Result<Option<LocationSample>> {
        let sample = self.samples.next();
        if sample.is_none() {
            debug!("Reached end of recorded track");
        }
        Ok(sample)
    }

    fn name(&self) -> &'static str {
        "replay"
    }
}
