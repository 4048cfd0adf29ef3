//! In-memory sidecar link over `mpsc`, for embedded sidecars and tests.

use crate::frame::WireFrame;
use crate::transport::{FrameReceiver, FrameSender, TransportError};
use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};

pub struct ChannelSender(pub mpsc::Sender<WireFrame>);
pub struct ChannelReceiver(pub Mutex<mpsc::Receiver<WireFrame>>);

#[async_trait]
impl FrameSender for ChannelSender {
    async fn send(&self, frame: WireFrame) -> Result<(), TransportError> {
        self.0
            .send(frame)
            .await
            .map_err(|_| TransportError::ChannelClosed)
    }
}

#[async_trait]
impl FrameReceiver for ChannelReceiver {
    async fn receive(&self) -> Result<WireFrame, TransportError> {
        let mut guard = self.0.lock().await;
        guard.recv().await.ok_or(TransportError::ChannelClosed)
    }
}

/// The sidecar's view of an in-memory link.
pub struct SidecarEnd {
    /// Frames sent by the app.
    pub inbound: mpsc::Receiver<WireFrame>,
    /// Frames delivered to the app.
    pub outbound: mpsc::Sender<WireFrame>,
}

/// Create a connected app/sidecar pair.
pub fn in_memory_link(buffer: usize) -> (ChannelSender, ChannelReceiver, SidecarEnd) {
    let (app_tx, sidecar_rx) = mpsc::channel(buffer);
    let (sidecar_tx, app_rx) = mpsc::channel(buffer);
    (
        ChannelSender(app_tx),
        ChannelReceiver(Mutex::new(app_rx)),
        SidecarEnd {
            inbound: sidecar_rx,
            outbound: sidecar_tx,
        },
    )
}
