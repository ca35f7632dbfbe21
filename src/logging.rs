//! Logging setup for the daemon binary

use tracing_subscriber::EnvFilter;

use crate::{Result, TrackerError};

/// Install a `tracing` fmt subscriber at `level` (`RUST_LOG` wins when set).
pub fn init(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| TrackerError::config(format!("invalid log level {level:?}: {e}")))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| TrackerError::config(format!("logging already initialised: {e}")))
}
