//! gpsd provider
//!
//! Talks the gpsd JSON protocol over TCP. After connecting we enable watching
//! and then ask for the latest fix with `?POLL;` on every call, so a slow
//! consumer always sees the current position rather than a backlog of reports.

use std::time::Duration;

use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, info, trace, warn};

use crate::provider::LocationProvider;
use crate::types::{FEET_PER_METER, KNOTS_PER_MPS, LocationSample};
use crate::{Result, TrackerError};

/// Default gpsd TCP port.
pub const DEFAULT_PORT: u16 = 2947;

const WATCH_COMMAND: &[u8] = b"?WATCH={\"enable\":true};\n";
const POLL_COMMAND: &[u8] = b"?POLL;\n";

/// gpsd fix modes, indexed by the TPV `mode` field.
const MODE_NAMES: [&str; 4] = ["No value", "No fix", "2D fix", "3D fix"];

#[derive(Debug, Deserialize)]
#[serde(tag = "class", rename_all = "UPPERCASE")]
enum Message {
    Watch,
    Poll {
        #[serde(default)]
        tpv: Vec<Tpv>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Default, Deserialize)]
struct Tpv {
    #[serde(default)]
    mode: u8,
    time: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    alt: Option<f64>,
    #[serde(rename = "altMSL")]
    alt_msl: Option<f64>,
    track: Option<f64>,
    speed: Option<f64>,
}

impl Tpv {
    fn into_sample(self) -> Result<LocationSample> {
        if self.mode < 3 {
            let name = MODE_NAMES.get(usize::from(self.mode)).copied().unwrap_or("Unknown");
            return Err(TrackerError::not_ready(format!("waiting for fix (current mode: {name})")));
        }

        let (Some(lat), Some(lon), Some(time)) = (self.lat, self.lon, self.time.as_deref()) else {
            return Err(TrackerError::not_ready("3D fix reported without position or time"));
        };

        let mut sample = LocationSample::new(lat, lon, LocationSample::parse_time(time)?).with_motion(
            self.track.unwrap_or(0.0),
            self.speed.unwrap_or(0.0) * KNOTS_PER_MPS,
        );
        if let Some(alt) = self.alt_msl.or(self.alt) {
            sample = sample.with_altitude(alt * FEET_PER_METER);
        }
        Ok(sample)
    }
}

fn io_error(e: std::io::Error) -> TrackerError {
    TrackerError::connection_failed_with_source("gpsd I/O error", Box::new(e))
}

/// Location provider backed by a gpsd daemon
pub struct GpsdProvider {
    address: String,
    stream: Option<BufReader<TcpStream>>,
    read_timeout: Duration,
}

impl GpsdProvider {
    /// Connect to gpsd and enable watching
    pub async fn connect(host: &str, port: u16) -> Result<Self> {
        let mut provider = Self {
            address: format!("{host}:{port}"),
            stream: None,
            read_timeout: Duration::from_secs(5),
        };
        provider.ensure_connected().await?;
        info!(address = %provider.address, "Connected to gpsd");
        Ok(provider)
    }

    /// Override how long to wait for each gpsd response
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    async fn ensure_connected(&mut self) -> Result<&mut BufReader<TcpStream>> {
        if self.stream.is_none() {
            debug!(address = %self.address, "Opening gpsd connection");
            let socket = tokio::time::timeout(self.read_timeout, TcpStream::connect(&self.address))
                .await
                .map_err(|_| TrackerError::Timeout { duration: self.read_timeout })?
                .map_err(|e| {
                    TrackerError::connection_failed_with_source(
                        format!("cannot reach gpsd at {}", self.address),
                        Box::new(e),
                    )
                })?;

            let mut stream = BufReader::new(socket);
            stream.get_mut().write_all(WATCH_COMMAND).await.map_err(io_error)?;
            Self::read_until(&mut stream, self.read_timeout, |m| matches!(m, Message::Watch)).await?;
            self.stream = Some(stream);
        }

        self.stream
            .as_mut()
            .ok_or_else(|| TrackerError::connection_failed("gpsd connection unavailable"))
    }

    async fn read_until(
        stream: &mut BufReader<TcpStream>,
        read_timeout: Duration,
        wanted: impl Fn(&Message) -> bool,
    ) -> Result<Message> {
        let mut line = String::new();
        loop {
            line.clear();
            let read = tokio::time::timeout(read_timeout, stream.read_line(&mut line))
                .await
                .map_err(|_| TrackerError::Timeout { duration: read_timeout })?
                .map_err(io_error)?;
            if read == 0 {
                return Err(TrackerError::connection_failed("gpsd closed the connection"));
            }

            let message: Message = serde_json::from_str(line.trim())
                .map_err(|e| TrackerError::parse("gpsd response", e.to_string()))?;
            trace!(?message, "gpsd message");
            if wanted(&message) {
                return Ok(message);
            }
        }
    }

    async fn poll(&mut self) -> Result<Message> {
        let read_timeout = self.read_timeout;
        let stream = self.ensure_connected().await?;
        stream.get_mut().write_all(POLL_COMMAND).await.map_err(io_error)?;
        Self::read_until(stream, read_timeout, |m| matches!(m, Message::Poll { .. })).await
    }
}

#[async_trait::async_trait]
impl LocationProvider for GpsdProvider {
    async fn next_sample(&mut self) -> Result<Option<LocationSample>> {
        let message = match self.poll().await {
            Ok(message) => message,
            Err(e) => {
                // Reconnect from scratch on the next poll
                warn!("gpsd poll failed, dropping connection: {}", e);
                self.stream = None;
                return Err(e);
            }
        };

        let Message::Poll { tpv } = message else {
            return Err(TrackerError::parse("gpsd response", "expected POLL"));
        };
        let tpv = tpv.into_iter().next().unwrap_or_default();
        tpv.into_sample().map(Some)
    }

    fn name(&self) -> &'static str {
        "gpsd"
    }
}
