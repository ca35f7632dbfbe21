//! AX.25 transport using the ax25-tools `beacon` program

use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::{debug, error, info};

use crate::aprs::PositionReport;
use crate::transport::Transport;
use crate::{Result, TrackerError};

/// Where ax25-tools installs `beacon`.
pub const DEFAULT_BEACON_PROGRAM: &str = "/usr/sbin/beacon";

/// Default AX.25 port name from `/etc/ax25/axports`.
pub const DEFAULT_AX25_PORT: &str = "ax0";

/// Sends each report as a single `beacon` invocation on an AX.25 port.
#[derive(Debug, Clone)]
pub struct Ax25BeaconTransport {
    program: PathBuf,
    port: String,
    name: String,
}

impl Ax25BeaconTransport {
    pub fn new(port: impl Into<String>) -> Self {
        let port = port.into();
        Self { program: PathBuf::from(DEFAULT_BEACON_PROGRAM), name: format!("ax25:{port}"), port }
    }

    /// Use a different `beacon` binary
    pub fn with_program(mut self, program: impl AsRef<Path>) -> Self {
        self.program = program.as_ref().to_path_buf();
        self
    }

    /// Arguments passed to `beacon` for a report.
    ///
    /// The digipeater path rides in the destination argument as `DEST via HOP HOP`.
    pub fn command_args(&self, report: &PositionReport) -> Vec<String> {
        let destination = if report.path().is_empty() {
            report.destination().to_string()
        } else {
            format!("{} via {}", report.destination(), report.path().join(" "))
        };

        vec![
            "-c".to_string(),
            report.source().to_string(),
            "-d".to_string(),
            destination,
            "-s".to_string(),
            self.port.clone(),
            report.info(),
        ]
    }
}

#[async_trait::async_trait]
impl Transport for Ax25BeaconTransport {
    async fn send(&mut self, report: &PositionReport) -> Result<()> {
        let args = self.command_args(report);
        debug!("EXEC: {} {:?}", self.program.display(), args);

        let output = Command::new(&self.program).args(&args).output().await.map_err(|e| {
            TrackerError::delivery_failed_with_source(
                &self.name,
                format!("cannot run {}", self.program.display()),
                Box::new(e),
            )
        })?;

        if !output.status.success() {
            error!(
                "{} returned {}; stdout={}, stderr={}",
                self.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stdout).trim(),
                String::from_utf8_lossy(&output.stderr).trim(),
            );
            return Err(TrackerError::delivery_failed(
                &self.name,
                format!("{} returned {}", self.program.display(), output.status),
            ));
        }

        info!("frame sent via {}: {}", self.name, report);
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
