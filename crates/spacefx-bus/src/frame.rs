//! # Wire Frame
//!
//! The unit carried by every sidecar channel. A frame names the message kind,
//! the sending and receiving app, and holds the encoded payload untouched.
//!
//! On stream carriers a frame is written as a big-endian `u32` length
//! followed by the `bincode` encoding of [`WireFrame`].

use crate::transport::TransportError;
use serde::{Deserialize, Serialize};
use spacefx_types::codec;
use spacefx_types::{CodecError, MessageKind, SidecarMessage};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest frame accepted by default (16 MiB).
pub const DEFAULT_MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Target app ID used for frames addressed to every listener.
pub const BROADCAST: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireFrame {
    pub kind: MessageKind,
    pub source_app_id: String,
    pub target_app_id: String,
    pub payload: Vec<u8>,
}

impl WireFrame {
    /// Encode `message` into a frame.
    pub fn encode<M: SidecarMessage>(
        source_app_id: impl Into<String>,
        target_app_id: impl Into<String>,
        message: &M,
    ) -> Result<Self, CodecError> {
        Ok(Self {
            kind: M::KIND,
            source_app_id: source_app_id.into(),
            target_app_id: target_app_id.into(),
            payload: codec::encode(message)?,
        })
    }

    /// Decode the payload as `M`.
    pub fn decode<M: SidecarMessage>(&self) -> Result<M, CodecError> {
        codec::decode(&self.payload)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, TransportError> {
        bincode::serialize(self).map_err(|e| TransportError::Malformed(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransportError> {
        bincode::deserialize(bytes).map_err(|e| TransportError::Malformed(e.to_string()))
    }
}

/// Write one length-prefixed frame and flush.
pub async fn write_frame<W>(
    writer: &mut W,
    frame: &WireFrame,
    max_frame_size: usize,
) -> Result<(), TransportError>
where
    W: AsyncWrite + Unpin,
{
    let bytes = frame.to_bytes()?;
    if bytes.len() > max_frame_size {
        return Err(TransportError::FrameTooLarge {
            size: bytes.len(),
            limit: max_frame_size,
        });
    }
    let len = u32::try_from(bytes.len()).map_err(|_| TransportError::FrameTooLarge {
        size: bytes.len(),
        limit: u32::MAX as usize,
    })?;

    writer.write_u32(len).await?;
    writer.write_all(&bytes).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one length-prefixed frame.
///
/// Oversized or undecodable frames are consumed in full so the stream stays
/// aligned, then reported as non-fatal errors.
pub async fn read_frame<R>(reader: &mut R, max_frame_size: usize) -> Result<WireFrame, TransportError>
where
    R: AsyncRead + Unpin,
{
    let len = match reader.read_u32().await {
        Ok(len) => len as usize,
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(TransportError::ChannelClosed)
        }
        Err(e) => return Err(e.into()),
    };

    if len > max_frame_size {
        let mut skipped = (&mut *reader).take(len as u64);
        tokio::io::copy(&mut skipped, &mut tokio::io::sink()).await?;
        return Err(TransportError::FrameTooLarge {
            size: len,
            limit: max_frame_size,
        });
    }

    let mut buf = vec![0u8; len];
    match reader.read_exact(&mut buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(TransportError::ChannelClosed)
        }
        Err(e) => return Err(e.into()),
    }

    WireFrame::from_bytes(&buf)
}
