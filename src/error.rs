//! Error types for pose ingestion and republishing.
//!
//! Only collaborator-facing operations return errors: connecting to the capture
//! server, querying descriptions, loading configuration, setting up a transport
//! and decoding wire data. The frame hand-off, identity resolution and snapshot
//! construction never fail; contention and unknown ids degrade to stale or empty
//! data for that cycle instead.
//!
//! ## Error Categories
//!
//! - **Connection Errors**: capture server unreachable or host not present
//! - **Transport Errors**: socket setup or send/receive failures
//! - **Config Errors**: invalid or unreadable configuration
//! - **Parse/Encoding Errors**: recordings or wire records that do not decode
//!
//! ## Recovery and Retry
//!
//! ```rust
//! use posecast::PosecastError;
//!
//! let error = PosecastError::connection_failed("Motive not running");
//! if error.is_retryable() {
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! ```

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for posecast operations.
pub type Result<T, E = PosecastError> = std::result::Result<T, E>;

/// Main error type for posecast operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PosecastError {
    #[error("Failed to connect to capture server: {reason}")]
    Connection {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Transport error on {endpoint}")]
    Transport {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {details}")]
    Config { details: String },

    #[error("File error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {context}: {details}")]
    Parse { context: String, details: String },

    #[error("Encoding error: {details}")]
    Encoding { details: String },

    #[error("Operation timed out after {duration:?}")]
    Timeout { duration: Duration },

    #[error("{operation} requires an active connection")]
    NotConnected { operation: String },
}

impl PosecastError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            PosecastError::Connection { .. } => true,
            PosecastError::Transport { .. } => true,
            PosecastError::Timeout { .. } => true,
            PosecastError::NotConnected { .. } => true,
            PosecastError::Config { .. } => false,
            PosecastError::File { .. } => false,
            PosecastError::Parse { .. } => false,
            PosecastError::Encoding { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            PosecastError::Connection { .. } => vec![
                "Ensure the capture server application is running",
                "Check that streaming is enabled on the server",
                "Verify server and local addresses are on the same network",
            ],
            PosecastError::Transport { .. } => vec![
                "Check the endpoint is written as host:port",
                "Verify the port is not already bound by another process",
                "Check firewall rules for UDP traffic",
            ],
            PosecastError::Config { .. } => vec![
                "Check configuration values against the documented defaults",
                "Validate the YAML syntax of the configuration file",
            ],
            PosecastError::File { .. } => vec![
                "Check file exists and is readable",
                "Check file permissions",
            ],
            PosecastError::Parse { .. } => vec![
                "Verify the recording was produced by a compatible version",
                "Check the YAML structure of the recording",
            ],
            PosecastError::Encoding { .. } => vec![
                "Check both ends agree on the record layout",
                "Verify the requested vector length",
            ],
            PosecastError::Timeout { .. } => vec![
                "Increase timeout duration",
                "Verify the remote end is responding",
            ],
            PosecastError::NotConnected { .. } => vec![
                "Call connect() before querying the capture server",
                "Check the earlier connection attempt for errors",
            ],
        }
    }

    /// Helper constructor for connection errors.
    pub fn connection_failed(reason: impl Into<String>) -> Self {
        PosecastError::Connection { reason: reason.into(), source: None }
    }

    /// Helper constructor for connection errors with source.
    pub fn connection_failed_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        PosecastError::Connection { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for transport errors with endpoint context.
    pub fn transport(endpoint: impl Into<String>, source: std::io::Error) -> Self {
        PosecastError::Transport { endpoint: endpoint.into(), source }
    }

    /// Helper constructor for configuration errors.
    pub fn config(details: impl Into<String>) -> Self {
        PosecastError::Config { details: details.into() }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        PosecastError::File { path, source }
    }

    /// Helper constructor for encoding errors.
    pub fn encoding(details: impl Into<String>) -> Self {
        PosecastError::Encoding { details: details.into() }
    }

    /// Helper constructor for operations attempted before connecting.
    pub fn not_connected(operation: impl Into<String>) -> Self {
        PosecastError::NotConnected { operation: operation.into() }
    }
}

impl From<std::io::Error> for PosecastError {
    fn from(err: std::io::Error) -> Self {
        PosecastError::File { path: PathBuf::from("<unknown>"), source: err }
    }
}

impl From<serde_yaml_ng::Error> for PosecastError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        PosecastError::Parse { context: "YAML".to_string(), details: err.to_string() }
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
            endpoint in "[a-z]{1,12}:[0-9]{1,5}",
            details in ".*",
            duration_ms in 1u64..60000u64
          ) {
            let connection = PosecastError::connection_failed(reason.clone());
            prop_assert!(connection.to_string().contains(&reason));

            let transport = PosecastError::transport(
                endpoint.clone(),
                std::io::Error::other("refused"),
            );
            prop_assert!(transport.to_string().contains(&endpoint));

            let config = PosecastError::config(details.clone());
            prop_assert!(config.to_string().contains(&details));

            let timeout = PosecastError::Timeout { duration: Duration::from_millis(duration_ms) };
            prop_assert!(!timeout.to_string().is_empty());
          }

          #[test]
          fn source_chain_preserves_base_message(
            base_message in ".*",
            layers in prop::collection::vec(".*", 1..5)
          ) {
            let mut current: Box<dyn std::error::Error + Send + Sync> =
              Box::new(std::io::Error::other(base_message.clone()));

            for (i, reason) in layers.iter().enumerate() {
              current = Box::new(PosecastError::connection_failed_with_source(
                format!("Level {}: {}", i, reason),
                current,
              ));
            }

            let mut depth = 0;
            let mut found_base = false;
            let mut next = std::error::Error::source(current.as_ref());
            while let Some(source) = next {
              depth += 1;
              if source.to_string().contains(&base_message) {
                found_base = true;
              }
              next = std::error::Error::source(source);
              if depth > 10 {
                break;
              }
            }

            prop_assert_eq!(depth, layers.len());
            prop_assert!(found_base, "Base message '{}' not found in chain", base_message);
          }
        }
    }

    #[test]
    fn error_traits_validation() {
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<PosecastError>();

        let error = PosecastError::connection_failed("test");
        let _: &dyn std::error::Error = &error;
    }

    #[test]
    fn retry_classification() {
        assert!(PosecastError::connection_failed("down").is_retryable());
        assert!(PosecastError::not_connected("data_descriptions").is_retryable());
        assert!(!PosecastError::config("capacity must be at least 1").is_retryable());
        assert!(!PosecastError::encoding("short record").is_retryable());

        for suggestion in PosecastError::connection_failed("down").recovery_suggestions() {
            assert!(suggestion.len() > 5);
        }
    }

    #[test]
    fn from_conversions_work() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "recording.yaml");
        match PosecastError::from(io_err) {
            PosecastError::File { source, .. } => assert_eq!(source.to_string(), "recording.yaml"),
            other => panic!("Expected File error variant, got {other:?}"),
        }

        let yaml_err = serde_yaml_ng::from_str::<u32>("not: [a number").unwrap_err();
        assert!(matches!(PosecastError::from(yaml_err), PosecastError::Parse { .. }));
    }
}
