//! Error types for the tracker.
//!
//! Every fallible operation in the crate returns [`TrackerError`]. The variants map
//! onto the places a tracker can go wrong: encoding a fix that lies outside the
//! representable range, a location source that has no fix yet, a transport that
//! could not deliver a frame, and the usual configuration and I/O failures.
//!
//! ## Recovery and Retry
//!
//! ```rust
//! use prismtracker::TrackerError;
//!
//! let error = TrackerError::not_ready("waiting for fix (current mode: No fix)");
//! assert!(error.is_not_ready());
//! assert!(error.is_retryable());
//! for suggestion in error.recovery_suggestions() {
//!     println!("  - {}", suggestion);
//! }
//! ```

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for tracker operations.
pub type Result<T, E = TrackerError> = std::result::Result<T, E>;

/// Main error type for tracker operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TrackerError {
    #[error("{quantity} value {value} is outside the encodable range (limit {limit})")]
    EncodingRange { quantity: &'static str, value: f64, limit: f64 },

    #[error("Location source not ready: {reason}")]
    NotReady { reason: String },

    #[error("Delivery via {transport} failed: {reason}")]
    DeliveryFailed {
        transport: String,
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Connection failed: {reason}")]
    Connection {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    #[error("Parse error in {context}: {details}")]
    Parse { context: String, details: String },

    #[error("File error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Operation timed out after {duration:?}")]
    Timeout { duration: Duration },

    #[error("Tracking task failed")]
    TaskFailed {
        #[source]
        source: tokio::task::JoinError,
    },
}

impl TrackerError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            TrackerError::NotReady { .. } => true,
            TrackerError::DeliveryFailed { .. } => true,
            TrackerError::Connection { .. } => true,
            TrackerError::Timeout { .. } => true,
            TrackerError::EncodingRange { .. } => false,
            TrackerError::Config { .. } => false,
            TrackerError::Parse { .. } => false,
            TrackerError::File { .. } => false,
            TrackerError::TaskFailed { .. } => false,
        }
    }

    /// True for the "no fix yet" condition raised by location providers.
    pub fn is_not_ready(&self) -> bool {
        matches!(self, TrackerError::NotReady { .. })
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            TrackerError::EncodingRange { .. } => vec![
                "Check the GPS fix for corrupt coordinates",
                "Verify altitude is reported in feet",
            ],
            TrackerError::NotReady { .. } => vec![
                "Wait for the receiver to acquire a 3D fix",
                "Check the antenna has a clear view of the sky",
            ],
            TrackerError::DeliveryFailed { .. } => vec![
                "Check the AX.25 port is configured and up",
                "Verify the APRS-IS server is reachable",
                "Check the passcode matches the callsign",
            ],
            TrackerError::Connection { .. } => vec![
                "Ensure gpsd is running and listening",
                "Check host and port in the configuration",
                "Verify network connectivity",
            ],
            TrackerError::Config { .. } => vec![
                "Check the configuration file against the documented keys",
                "Ensure beacon intervals are positive and min < max",
            ],
            TrackerError::Parse { .. } => vec![
                "Check data format compatibility",
                "Verify source data integrity",
            ],
            TrackerError::File { .. } => vec![
                "Check file exists and is readable",
                "Check file permissions",
            ],
            TrackerError::Timeout { .. } => vec![
                "Increase timeout duration",
                "Verify the remote end is responding",
            ],
            TrackerError::TaskFailed { .. } => vec![
                "Check the logs for a panic in a provider or transport",
                "Restart the daemon",
            ],
        }
    }

    /// Helper constructor for out-of-range encoder input.
    pub fn encoding_range(quantity: &'static str, value: f64, limit: f64) -> Self {
        TrackerError::EncodingRange { quantity, value, limit }
    }

    /// Helper constructor for the "no fix yet" condition.
    pub fn not_ready(reason: impl Into<String>) -> Self {
        TrackerError::NotReady { reason: reason.into() }
    }

    /// Helper constructor for transport delivery failures.
    pub fn delivery_failed(transport: impl Into<String>, reason: impl Into<String>) -> Self {
        TrackerError::DeliveryFailed { transport: transport.into(), reason: reason.into(), source: None }
    }

    /// Helper constructor for transport delivery failures with source.
    pub fn delivery_failed_with_source(
        transport: impl Into<String>,
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        TrackerError::DeliveryFailed {
            transport: transport.into(),
            reason: reason.into(),
            source: Some(source),
        }
    }

    /// Helper constructor for connection errors.
    pub fn connection_failed(reason: impl Into<String>) -> Self {
        TrackerError::Connection { reason: reason.into(), source: None }
    }

    /// Helper constructor for connection errors with source.
    pub fn connection_failed_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        TrackerError::Connection { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for configuration errors.
    pub fn config(reason: impl Into<String>) -> Self {
        TrackerError::Config { reason: reason.into() }
    }

    /// Helper constructor for parse errors.
    pub fn parse(context: impl Into<String>, details: impl Into<String>) -> Self {
        TrackerError::Parse { context: context.into(), details: details.into() }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        TrackerError::File { path, source }
    }
}

impl From<tokio::task::JoinError> for TrackerError {
    fn from(source: tokio::task::JoinError) -> Self {
        TrackerError::TaskFailed { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn error_messages_carry_their_context(
                reason in ".*",
                transport in "\\w+",
                value in -1.0e9f64..1.0e9f64,
            ) {
                let not_ready = TrackerError::not_ready(reason.clone());
                prop_assert!(not_ready.to_string().contains(&reason));

                let delivery = TrackerError::delivery_failed(transport.clone(), reason.clone());
                let msg = delivery.to_string();
                prop_assert!(msg.contains(&transport));
                prop_assert!(msg.contains(&reason));

                let range = TrackerError::encoding_range("latitude", value, 90.0);
                prop_assert!(range.to_string().contains("latitude"));
            }

            #[test]
            fn source_chain_is_preserved(base_message in ".*") {
                let io = std::io::Error::other(base_message.clone());
                let err = TrackerError::delivery_failed_with_source("aprs-is", "write failed", Box::new(io));

                let source = std::error::Error::source(&err);
                prop_assert!(source.is_some());
                prop_assert_eq!(source.map(|s| s.to_string()), Some(base_message));
            }
        }
    }

    #[test]
    fn retry_classification() {
        assert!(TrackerError::not_ready("no fix").is_retryable());
        assert!(TrackerError::delivery_failed("ax25", "exit 1").is_retryable());
        assert!(TrackerError::connection_failed("refused").is_retryable());
        assert!(!TrackerError::config("bad").is_retryable());
        assert!(!TrackerError::encoding_range("altitude", 1.0e7, 999_999.0).is_retryable());

        assert!(TrackerError::not_ready("no fix").is_not_ready());
        assert!(!TrackerError::connection_failed("refused").is_not_ready());
    }

    #[test]
    fn every_variant_has_suggestions() {
        let errors = [
            TrackerError::encoding_range("latitude", 91.0, 90.0),
            TrackerError::not_ready("no fix"),
            TrackerError::delivery_failed("ax25", "exit 1"),
            TrackerError::connection_failed("refused"),
            TrackerError::config("bad"),
            TrackerError::parse("gpsd", "bad json"),
            TrackerError::Timeout { duration: Duration::from_secs(1) },
        ];

        for error in &errors {
            let suggestions = error.recovery_suggestions();
            assert!(!suggestions.is_empty(), "{error} has no suggestions");
            assert!(suggestions.iter().all(|s| s.len() > 5));
        }
    }

    #[test]
    fn error_traits_validation() {
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<TrackerError>();
    }

    #[test]
    fn file_error_keeps_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = TrackerError::file_error(PathBuf::from("/var/lib/prismtracker/track.yaml"), io_err);

        assert_eq!(err.to_string(), "File error: /var/lib/prismtracker/track.yaml");
        match err {
            TrackerError::File { source, .. } => assert_eq!(source.kind(), std::io::ErrorKind::NotFound),
            _ => panic!("Expected File error variant"),
        }
    }
}
