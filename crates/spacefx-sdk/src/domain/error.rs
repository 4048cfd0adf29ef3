//! SDK error types.
//!
//! A non-successful status in a response header is not an error; callers get
//! the response and inspect `response_header.status`.

use crate::domain::config::ConfigError;
use spacefx_bus::TransportError;
use spacefx_types::CodecError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced to SDK callers.
#[derive(Debug, Error)]
pub enum SdkError {
    /// The sidecar could not be reached while building the client.
    #[error("sidecar unreachable at {endpoint}: {reason}")]
    Connection { endpoint: String, reason: String },

    /// Nothing usable arrived within the caller's window.
    #[error("timed out after {waited:?} waiting for {operation}")]
    Timeout { operation: String, waited: Duration },

    /// A payload did not match the expected schema.
    #[error("failed to deserialize {message_type}: {reason}")]
    Deserialization {
        message_type: String,
        reason: String,
    },

    /// A tracking ID was registered twice.
    #[error("tracking id '{0}' is already in flight")]
    DuplicateTrackingId(String),

    /// Rejected before any network interaction.
    #[error("invalid argument: {0}")]
    Argument(String),

    /// No heartbeat from the target service within the window.
    #[error("service '{app_id}' is not online: no heartbeat within {waited:?}")]
    ServiceUnavailable { app_id: String, waited: Duration },

    /// The session's channel is gone.
    #[error("sidecar session closed")]
    SessionClosed,

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("io error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SdkError {
    pub fn timeout(operation: impl Into<String>, waited: Duration) -> Self {
        SdkError::Timeout {
            operation: operation.into(),
            waited,
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SdkError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the same call might succeed if repeated.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SdkError::Timeout { .. } | SdkError::ServiceUnavailable { .. }
        )
    }
}

impl From<CodecError> for SdkError {
    fn from(e: CodecError) -> Self {
        SdkError::Deserialization {
            message_type: e.kind().to_string(),
            reason: e.to_string(),
        }
    }
}

/// Result type for SDK operations
pub type SdkResult<T> = Result<T, SdkError>;
