//! # Error Types
//!
//! Failures raised while turning message schemas into payload bytes and back.

use thiserror::Error;

/// Payload (de)serialization errors.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A message could not be serialized.
    #[error("failed to encode {kind}: {source}")]
    Encode {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Payload bytes do not match the expected schema.
    #[error("failed to decode {kind}: {source}")]
    Decode {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl CodecError {
    /// Name of the schema involved.
    pub fn kind(&self) -> &'static str {
        match self {
            CodecError::Encode { kind, .. } | CodecError::Decode { kind, .. } => kind,
        }
    }
}
