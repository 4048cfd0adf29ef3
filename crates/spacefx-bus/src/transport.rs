//! # Sidecar Transport
//!
//! The SDK sees the sidecar as two halves: a [`FrameSender`] shared by every
//! caller and a [`FrameReceiver`] drained by a single receive loop.
//!
//! Stream carriers run over a Unix domain socket or TCP; see
//! [`SidecarEndpoint`].

use crate::frame::{read_frame, write_frame, WireFrame};
use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::debug;

/// Outbound half of a sidecar channel.
#[async_trait]
pub trait FrameSender: Send + Sync {
    async fn send(&self, frame: WireFrame) -> Result<(), TransportError>;
}

/// Inbound half of a sidecar channel.
#[async_trait]
pub trait FrameReceiver: Send + Sync {
    /// Receive the next frame (suspends until one is available).
    async fn receive(&self) -> Result<WireFrame, TransportError>;
}

/// Transport errors
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("channel closed")]
    ChannelClosed,
    #[error("send failed: {0}")]
    SendFailed(String),
    #[error("malformed frame: {0}")]
    Malformed(String),
    #[error("frame of {size} bytes exceeds limit of {limit}")]
    FrameTooLarge { size: usize, limit: usize },
    #[error("invalid sidecar endpoint '{0}'")]
    InvalidEndpoint(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// Fatal errors end the receive loop; the rest only lose one frame.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TransportError::ChannelClosed | TransportError::Io(_))
    }
}

/// Where the sidecar listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidecarEndpoint {
    /// `unix:///run/spacefx/sidecar.sock` or a bare absolute path.
    Unix(PathBuf),
    /// `tcp://127.0.0.1:50051`
    Tcp(String),
}

impl FromStr for SidecarEndpoint {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(path) = s.strip_prefix("unix://") {
            if path.is_empty() {
                return Err(TransportError::InvalidEndpoint(s.to_string()));
            }
            Ok(SidecarEndpoint::Unix(PathBuf::from(path)))
        } else if let Some(addr) = s.strip_prefix("tcp://") {
            if addr.is_empty() {
                return Err(TransportError::InvalidEndpoint(s.to_string()));
            }
            Ok(SidecarEndpoint::Tcp(addr.to_string()))
        } else if s.starts_with('/') {
            Ok(SidecarEndpoint::Unix(PathBuf::from(s)))
        } else {
            Err(TransportError::InvalidEndpoint(s.to_string()))
        }
    }
}

impl fmt::Display for SidecarEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SidecarEndpoint::Unix(path) => write!(f, "unix://{}", path.display()),
            SidecarEndpoint::Tcp(addr) => write!(f, "tcp://{addr}"),
        }
    }
}

/// A connected channel, split into its two halves.
pub struct Connection {
    pub sender: Arc<dyn FrameSender>,
    pub receiver: Box<dyn FrameReceiver>,
}

impl SidecarEndpoint {
    /// Connect to the sidecar.
    pub async fn connect(&self, max_frame_size: usize) -> Result<Connection, TransportError> {
        debug!(endpoint = %self, "Connecting to sidecar");
        match self {
            #[cfg(unix)]
            SidecarEndpoint::Unix(path) => {
                let stream = tokio::net::UnixStream::connect(path).await?;
                let (read, write) = stream.into_split();
                Ok(split_connection(read, write, max_frame_size))
            }
            #[cfg(not(unix))]
            SidecarEndpoint::Unix(_) => Err(TransportError::InvalidEndpoint(self.to_string())),
            SidecarEndpoint::Tcp(addr) => {
                let stream = tokio::net::TcpStream::connect(addr.as_str()).await?;
                stream.set_nodelay(true)?;
                let (read, write) = stream.into_split();
                Ok(split_connection(read, write, max_frame_size))
            }
        }
    }
}

fn split_connection<R, W>(read: R, write: W, max_frame_size: usize) -> Connection
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    Connection {
        sender: Arc::new(StreamFrameSender::new(write, max_frame_size)),
        receiver: Box::new(StreamFrameReceiver::new(read, max_frame_size)),
    }
}

/// Frames queued for the writer task before `send` applies backpressure.
const OUTBOUND_QUEUE_DEPTH: usize = 256;

struct Outbound {
    frame: WireFrame,
    done: oneshot::Sender<Result<(), TransportError>>,
}

/// Writes length-prefixed frames to any async byte sink.
///
/// A single writer task owns the sink, so a frame is written whole even when
/// the caller's `send` future is dropped mid-write. Must be created inside a
/// tokio runtime.
pub struct StreamFrameSender {
    queue: mpsc::Sender<Outbound>,
}

impl StreamFrameSender {
    pub fn new<W>(writer: W, max_frame_size: usize) -> Self
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (queue, rx) = mpsc::channel(OUTBOUND_QUEUE_DEPTH);
        tokio::spawn(drain_outbound(writer, rx, max_frame_size));
        Self { queue }
    }
}

async fn drain_outbound<W>(mut writer: W, mut rx: mpsc::Receiver<Outbound>, max_frame_size: usize)
where
    W: AsyncWrite + Unpin,
{
    while let Some(Outbound { frame, done }) = rx.recv().await {
        let result = write_frame(&mut writer, &frame, max_frame_size).await;
        let fatal = result.as_ref().is_err_and(TransportError::is_fatal);
        if let Err(e) = &result {
            debug!(kind = %frame.kind.name(), error = %e, "Frame write failed");
        }
        // The caller may have stopped waiting.
        let _ = done.send(result);
        if fatal {
            break;
        }
    }
}

#[async_trait]
impl FrameSender for StreamFrameSender {
    async fn send(&self, frame: WireFrame) -> Result<(), TransportError> {
        let (done, written) = oneshot::channel();
        self.queue
            .send(Outbound { frame, done })
            .await
            .map_err(|_| TransportError::ChannelClosed)?;
        written.await.map_err(|_| TransportError::ChannelClosed)?
    }
}

/// Reads length-prefixed frames from any async byte source.
pub struct StreamFrameReceiver<R> {
    reader: Mutex<R>,
    max_frame_size: usize,
}

impl<R> StreamFrameReceiver<R> {
    pub fn new(reader: R, max_frame_size: usize) -> Self {
        Self {
            reader: Mutex::new(reader),
            max_frame_size,
        }
    }
}

#[async_trait]
impl<R> FrameReceiver for StreamFrameReceiver<R>
where
    R: AsyncRead + Unpin + Send,
{
    async fn receive(&self) -> Result<WireFrame, TransportError> {
        let mut reader = self.reader.lock().await;
        read_frame(&mut *reader, self.max_frame_size).await
    }
}
