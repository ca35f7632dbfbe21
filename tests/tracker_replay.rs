//! End-to-end runs of the tracker over recorded tracks.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::StreamExt;
use prismtracker::providers::{RecordedTrack, ReplayProvider};
use prismtracker::{
    BeaconConfig, GpsConfig, PositionReport, StationConfig, Tracker, TrackerConfig, TrackerError, Transport,
};

const TRACK: &str = r#"
samples:
  - latitude: 49.5
    longitude: -72.75
    course: 88.0
    speed: 36.2
    altitude: 1200.0
    time: "2021-03-01T12:00:00Z"
  - latitude: 49.501
    longitude: -72.74
    course: 88.0
    speed: 36.2
    time: "2021-03-01T12:05:00Z"
  - latitude: 49.502
    longitude: -72.73
    course: 88.0
    speed: 36.2
    time: "2021-03-01T12:10:00Z"
  - latitude: 49.503
    longitude: -72.72
    course: 88.0
    speed: 36.2
    time: "2021-03-01T12:15:00Z"
  - latitude: 49.504
    longitude: -72.71
    course: 88.0
    speed: 36.2
    time: "2021-03-01T12:20:00Z"
"#;

#[derive(Clone, Default)]
struct Collector {
    frames: Arc<Mutex<Vec<String>>>,
}

impl Collector {
    fn frames(&self) -> Vec<String> {
        self.frames.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for Collector {
    async fn send(&mut self, report: &PositionReport) -> Result<(), TrackerError> {
        self.frames.lock().unwrap().push(report.to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        "collector"
    }
}

fn config() -> TrackerConfig {
    TrackerConfig {
        station: StationConfig {
            callsign: "N0CALL-9".to_string(),
            path: vec!["WIDE1-1".to_string()],
            ..StationConfig::default()
        },
        ..TrackerConfig::default()
    }
}

#[tokio::test(start_paused = true)]
async fn interval_beacon_over_recorded_track() {
    let collector = Collector::default();
    let provider = ReplayProvider::new(RecordedTrack::from_yaml_str(TRACK).unwrap());

    let handle = Tracker::start_with(&config(), Box::new(provider), vec![Box::new(collector.clone())]).unwrap();
    let stats = handle.wait().await.unwrap();

    // 12:00, 12:10 and 12:20 are 600 s apart
    assert_eq!(stats.samples, 5);
    assert_eq!(stats.reports, 3);

    let frames = collector.frames();
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[0], "N0CALL-9>APZFSM,WIDE1-1:!/5L!!<*e8>7PY");
    assert!(frames.iter().all(|f| f.starts_with("N0CALL-9>APZFSM,WIDE1-1:!/")));
}

#[tokio::test(start_paused = true)]
async fn optional_fields_reach_the_transport() {
    let mut config = config();
    config.station.timestamp = true;
    config.station.altitude = true;
    config.daemon.one_shot = true;

    let collector = Collector::default();
    let provider = ReplayProvider::new(RecordedTrack::from_yaml_str(TRACK).unwrap());

    let handle = Tracker::start_with(&config, Box::new(provider), vec![Box::new(collector.clone())]).unwrap();
    let stats = handle.wait().await.unwrap();
    assert_eq!(stats.reports, 1);

    let frames = collector.frames();
    assert_eq!(frames, ["N0CALL-9>APZFSM,WIDE1-1:/120000h/5L!!<*e8>7PY/A=001200"]);
}

#[tokio::test(start_paused = true)]
async fn report_stream_sees_sent_reports() {
    let mut config = config();
    config.beacon = BeaconConfig::Smart { min_interval: 30, max_interval: 600 };

    let provider = ReplayProvider::new(RecordedTrack::from_yaml_str(TRACK).unwrap());
    let handle = Tracker::start_with(&config, Box::new(provider), vec![]).unwrap();

    let first = Box::pin(handle.reports()).next().await.unwrap();
    assert_eq!(first.sample.latitude, 49.5);
    assert_eq!((first.delivered, first.failed), (0, 0));

    let stats = handle.wait().await.unwrap();
    assert!(stats.reports >= 1);
}

#[tokio::test(start_paused = true)]
async fn starts_from_configured_track_file() {
    let path = std::env::temp_dir().join(format!("prismtracker-track-{}.yaml", std::process::id()));
    std::fs::write(&path, TRACK).unwrap();

    let mut config = config();
    config.gps = GpsConfig::Replay { path: path.clone() };
    config.daemon.one_shot = true;

    let handle = Tracker::start(&config).await;
    std::fs::remove_file(&path).ok();

    let stats = handle.unwrap().wait().await.unwrap();
    assert_eq!((stats.samples, stats.reports), (1, 1));
}

#[tokio::test]
async fn start_rejects_missing_track_and_bad_station() {
    let mut config = config();
    config.gps = GpsConfig::Replay { path: "/nonexistent/track.yaml".into() };
    assert!(matches!(Tracker::start(&config).await, Err(TrackerError::File { .. })));

    let provider = ReplayProvider::new(RecordedTrack::default());
    let result = Tracker::start_with(&TrackerConfig::default(), Box::new(provider), vec![]);
    assert!(matches!(result, Err(TrackerError::Config { .. })));
}
