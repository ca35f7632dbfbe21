//! Tracker configuration
//!
//! Configuration is a single YAML file. Every section is optional except the
//! station callsign; omitted keys fall back to the defaults below.
//!
//! ```yaml
//! station:
//!   callsign: N0CALL-9
//!   path: [WIDE1-1, WIDE2-1]
//!   symbol_table: "/"
//!   symbol: ">"
//!   timestamp: true
//!   altitude: true
//! beacon:
//!   mode: smart
//!   min_interval: 30
//!   max_interval: 600
//! gps:
//!   kind: gpsd
//!   host: localhost
//!   port: 2947
//! transports:
//!   - kind: ax25_beacon
//!     port: ax0
//!   - kind: aprs_is
//!     passcode: "12345"
//! daemon:
//!   poll_interval_secs: 1
//! log_level: info
//! ```
//!
//! Note that `>` must be quoted in YAML.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aprs::{APP_DESTINATION, PositionReport};
use crate::beacon::BeaconConfig;
use crate::provider::LocationProvider;
use crate::providers::{GpsdProvider, ReplayProvider, gpsd};
use crate::transport::Transport;
use crate::transports::{AprsIsTransport, Ax25BeaconTransport, aprs_is, ax25_beacon};
use crate::types::LocationSample;
use crate::{Result, TrackerError};

/// Longest callsign-SSID accepted by AX.25 (6 characters, dash, 2 digits).
const MAX_CALLSIGN_LEN: usize = 9;

/// Complete daemon configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub station: StationConfig,
    pub beacon: BeaconConfig,
    pub gps: GpsConfig,
    pub transports: Vec<TransportConfig>,
    pub daemon: DaemonConfig,
    pub log_level: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            station: StationConfig::default(),
            beacon: BeaconConfig::default(),
            gps: GpsConfig::default(),
            transports: Vec::new(),
            daemon: DaemonConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl TrackerConfig {
    /// Read, parse and validate a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a configuration file without validating it.
    ///
    /// Lets callers apply overrides (e.g. a callsign from the command line)
    /// before [`validate`](Self::validate).
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| TrackerError::file_error(path.to_path_buf(), e))?;

        let config = Self::parse_yaml(&yaml)?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse and validate configuration YAML
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config = Self::parse_yaml(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn parse_yaml(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| TrackerError::parse("configuration", e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        self.station.validate()?;
        self.beacon.validate()?;
        self.daemon.validate()?;
        if let GpsConfig::Replay { path } = &self.gps {
            if path.as_os_str().is_empty() {
                return Err(TrackerError::config("replay gps source needs a path"));
            }
        }
        Ok(())
    }

    /// Instantiate every configured transport
    pub fn build_transports(&self) -> Vec<Box<dyn Transport>> {
        self.transports.iter().map(|t| t.build(&self.station)).collect()
    }
}

/// Station identity and report contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    /// Callsign with SSID suffix
    pub callsign: String,
    pub destination: String,
    /// Digipeater path, in order
    pub path: Vec<String>,
    pub symbol_table: char,
    pub symbol: char,
    /// Include an `HHMMSSh` timestamp
    pub timestamp: bool,
    /// Include a `/A=` altitude comment
    pub altitude: bool,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            callsign: String::new(),
            destination: APP_DESTINATION.to_string(),
            path: vec!["WIDE1-1".to_string(), "WIDE2-1".to_string()],
            symbol_table: '/',
            symbol: '>',
            timestamp: false,
            altitude: false,
        }
    }
}

impl StationConfig {
    pub fn validate(&self) -> Result<()> {
        let callsign = &self.callsign;
        if callsign.is_empty() {
            return Err(TrackerError::config("station callsign is required"));
        }
        if callsign.len() > MAX_CALLSIGN_LEN
            || !callsign.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(TrackerError::config(format!("invalid callsign {callsign:?}")));
        }
        if self.path.iter().any(|hop| hop.is_empty() || hop.contains(',')) {
            return Err(TrackerError::config(format!("invalid digipeater path {:?}", self.path)));
        }
        if !(self.symbol_table == '/' || self.symbol_table == '\\' || self.symbol_table.is_ascii_alphanumeric())
        {
            return Err(TrackerError::config(format!("invalid symbol table {:?}", self.symbol_table)));
        }
        if !self.symbol.is_ascii_graphic() {
            return Err(TrackerError::config(format!("invalid symbol {:?}", self.symbol)));
        }
        Ok(())
    }

    /// Build the report for a sample, including the optional fields enabled here
    pub fn build_report(&self, sample: &LocationSample) -> Result<PositionReport> {
        let mut report = PositionReport::new(
            self.callsign.as_str(),
            self.destination.as_str(),
            self.path.clone(),
            self.symbol_table,
            self.symbol,
            sample.latitude,
            sample.longitude,
            sample.course,
            sample.speed,
        )?;

        if self.timestamp {
            let (hour, minute, second) = sample.utc_hms();
            report.add_timestamp(hour, minute, second)?;
        }
        if self.altitude {
            match sample.altitude {
                Some(feet) => report.add_altitude(feet)?,
                None => debug!("Altitude enabled but the fix has none"),
            }
        }
        Ok(report)
    }
}

/// Location source selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GpsConfig {
    Gpsd {
        #[serde(default = "default_gpsd_host")]
        host: String,
        #[serde(default = "default_gpsd_port")]
        port: u16,
    },
    Replay {
        path: PathBuf,
    },
}

fn default_gpsd_host() -> String {
    "localhost".to_string()
}

fn default_gpsd_port() -> u16 {
    gpsd::DEFAULT_PORT
}

impl Default for GpsConfig {
    fn default() -> Self {
        GpsConfig::Gpsd { host: default_gpsd_host(), port: default_gpsd_port() }
    }
}

impl GpsConfig {
    /// Open the configured location source
    pub async fn open(&self) -> Result<Box<dyn LocationProvider>> {
        Ok(match self {
            GpsConfig::Gpsd { host, port } => Box::new(GpsdProvider::connect(host, *port).await?),
            GpsConfig::Replay { path } => Box::new(ReplayProvider::open(path)?),
        })
    }
}

/// One broadcast transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransportConfig {
    Ax25Beacon {
        #[serde(default = "default_ax25_port")]
        port: String,
        #[serde(default = "default_beacon_program")]
        program: PathBuf,
    },
    AprsIs {
        #[serde(default = "default_aprs_is_host")]
        host: String,
        #[serde(default = "default_aprs_is_port")]
        port: u16,
        /// Login; defaults to the station callsign
        #[serde(default)]
        login: Option<String>,
        #[serde(default = "default_passcode")]
        passcode: String,
    },
}

fn default_ax25_port() -> String {
    ax25_beacon::DEFAULT_AX25_PORT.to_string()
}

fn default_beacon_program() -> PathBuf {
    PathBuf::from(ax25_beacon::DEFAULT_BEACON_PROGRAM)
}

fn default_aprs_is_host() -> String {
    aprs_is::DEFAULT_SERVER.to_string()
}

fn default_aprs_is_port() -> u16 {
    aprs_is::DEFAULT_PORT
}

fn default_passcode() -> String {
    aprs_is::UNVERIFIED_PASSCODE.to_string()
}

impl TransportConfig {
    pub fn build(&self, station: &StationConfig) -> Box<dyn Transport> {
        match self {
            TransportConfig::Ax25Beacon { port, program } => {
                Box::new(Ax25BeaconTransport::new(port.as_str()).with_program(program))
            }
            TransportConfig::AprsIs { host, port, login, passcode } => {
                let login = login.clone().unwrap_or_else(|| station.callsign.clone());
                Box::new(AprsIsTransport::new(host, *port, login, passcode.as_str()))
            }
        }
    }
}

/// Driving loop timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Seconds between location polls
    pub poll_interval_secs: u64,
    /// Seconds to wait after the source reports no fix
    pub not_ready_delay_secs: u64,
    /// Exit after the first report is sent
    pub one_shot: bool,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self { poll_interval_secs: 1, not_ready_delay_secs: 5, one_shot: false }
    }
}

impl DaemonConfig {
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_secs == 0 {
            return Err(TrackerError::config("poll_interval_secs must be greater than zero"));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn not_ready_delay(&self) -> Duration {
        Duration::from_secs(self.not_ready_delay_secs)
    }
}
