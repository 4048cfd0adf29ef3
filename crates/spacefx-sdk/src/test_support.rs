//! Scripted sidecar for unit tests.

use crate::domain::pending::CorrelationRegistry;
use crate::ipc::{Gateway, ResponseRouter};
use crate::session::SidecarSession;
use parking_lot::{Mutex, RwLock};
use spacefx_bus::{in_memory_link, WireFrame};
use spacefx_types::{ResponseHeader, SidecarRequest, SidecarResponse, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

pub(crate) type SeenFrames = Arc<Mutex<Vec<WireFrame>>>;

/// A gateway wired to a sidecar task that answers with `respond`.
pub(crate) fn scripted_gateway<F>(respond: F) -> (Gateway, SeenFrames)
where
    F: Fn(&WireFrame) -> Option<WireFrame> + Send + 'static,
{
    let (sender, receiver, mut sidecar) = in_memory_link(64);
    let sender = Arc::new(sender);
    let session = Arc::new(SidecarSession::new());
    let registry = CorrelationRegistry::new();

    let gateway = Gateway::new(
        "payload-app",
        sender.clone(),
        registry.clone(),
        Arc::clone(&session),
        Duration::from_secs(2),
        false,
    );
    let router = ResponseRouter::new(
        "payload-app",
        Box::new(receiver),
        sender,
        registry,
        session,
        Arc::new(RwLock::new(None)),
    );
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        router.run(shutdown_rx).await;
        drop(shutdown_tx);
    });

    let seen: SeenFrames = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    tokio::spawn(async move {
        while let Some(frame) = sidecar.inbound.recv().await {
            let reply = respond(&frame);
            log.lock().push(frame);
            if let Some(reply) = reply {
                if sidecar.outbound.send(reply).await.is_err() {
                    break;
                }
            }
        }
    });

    (gateway, seen)
}

/// Default response to the request in `frame`, with `status`.
pub(crate) fn reply<R: SidecarRequest>(frame: &WireFrame, status: StatusCode) -> WireFrame {
    reply_with::<R>(frame, status, |_| {})
}

pub(crate) fn reply_with<R: SidecarRequest>(
    frame: &WireFrame,
    status: StatusCode,
    fill: impl FnOnce(&mut R::Response),
) -> WireFrame {
    let request: R = frame.decode().unwrap();
    let mut response = R::Response::default();
    *response.response_header_mut() = ResponseHeader::with_status(request.request_header(), status);
    fill(&mut response);
    WireFrame::encode(&frame.target_app_id, &frame.source_app_id, &response).unwrap()
}
