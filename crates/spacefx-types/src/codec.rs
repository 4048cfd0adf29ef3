//! # Payload Codec
//!
//! Message payloads are JSON documents with camelCase field names. The bus
//! treats them as opaque bytes; only the SDK decodes them.

use crate::envelope::{ResponseHeader, SidecarMessage};
use crate::errors::CodecError;
use serde::Deserialize;

/// Serialize a message into payload bytes.
pub fn encode<M: SidecarMessage>(message: &M) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(message).map_err(|source| CodecError::Encode {
        kind: M::KIND.name(),
        source,
    })
}

/// Deserialize payload bytes into `M`.
pub fn decode<M: SidecarMessage>(payload: &[u8]) -> Result<M, CodecError> {
    serde_json::from_slice(payload).map_err(|source| CodecError::Decode {
        kind: M::KIND.name(),
        source,
    })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HeaderOnly {
    response_header: ResponseHeader,
}

/// Read only the response header of a payload, ignoring the body.
///
/// The receive loop uses this to route a response without knowing its schema.
pub fn peek_response_header(payload: &[u8]) -> Result<ResponseHeader, CodecError> {
    serde_json::from_slice::<HeaderOnly>(payload)
        .map(|peek| peek.response_header)
        .map_err(|source| CodecError::Decode {
            kind: "ResponseHeader",
            source,
        })
}
