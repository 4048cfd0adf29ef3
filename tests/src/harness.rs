//! # Mock Sidecar
//!
//! Plays the sidecar on the far end of an in-memory link: records every frame
//! the app sends, answers requests according to a per-kind [`Script`] and can
//! push heartbeats or events at the app.

use parking_lot::{Mutex, RwLock};
use spacefx_bus::{SidecarEnd, WireFrame, BROADCAST};
use spacefx_sdk::{ClientConfig, SpacefxClient};
use spacefx_types::{
    host_services, HeartBeatPulse, LinkRequest, LogMessage, MessageKind, PositionRequest,
    ResponseHeader, SensorsAvailableRequest, SidecarMessage, SidecarRequest, SidecarResponse,
    StatusCode, TaskingPreCheckRequest, TaskingRequest, TelemetryMetric, TelemetryMultiMetric,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// How the mock answers one request kind.
#[derive(Debug, Clone)]
pub enum Script {
    /// One response with this status.
    Reply(StatusCode),
    /// One response per status, in order.
    Sequence(Vec<StatusCode>),
    /// `SUCCESSFUL` after a delay derived from the response payload, so that
    /// concurrent requests are answered out of order.
    Jittered { max_delay: Duration },
    /// Never answer.
    Silent,
}

impl Default for Script {
    fn default() -> Self {
        Script::Reply(StatusCode::Successful)
    }
}

pub struct MockSidecar {
    outbound: mpsc::Sender<WireFrame>,
    seen: Arc<Mutex<Vec<WireFrame>>>,
    scripts: Arc<RwLock<HashMap<MessageKind, Script>>>,
    task: JoinHandle<()>,
}

impl MockSidecar {
    /// Start answering frames arriving on `end`.
    pub fn attach(end: SidecarEnd) -> Self {
        let SidecarEnd {
            mut inbound,
            outbound,
        } = end;
        let seen = Arc::new(Mutex::new(Vec::new()));
        let scripts: Arc<RwLock<HashMap<MessageKind, Script>>> =
            Arc::new(RwLock::new(HashMap::new()));

        let task = {
            let seen = Arc::clone(&seen);
            let scripts = Arc::clone(&scripts);
            let outbound = outbound.clone();
            tokio::spawn(async move {
                while let Some(frame) = inbound.recv().await {
                    let script = scripts.read().get(&frame.kind).cloned().unwrap_or_default();
                    seen.lock().push(frame.clone());
                    answer(frame, script, outbound.clone());
                }
            })
        };

        Self {
            outbound,
            seen,
            scripts,
            task,
        }
    }

    pub fn script(&self, kind: MessageKind, script: Script) {
        self.scripts.write().insert(kind, script);
    }

    /// Send a heartbeat as `app_id`.
    pub async fn heartbeat(&self, app_id: &str) {
        let pulse = HeartBeatPulse::new(app_id, 1000);
        self.push(app_id, &pulse).await;
    }

    /// Heartbeat for every host service.
    pub async fn announce_host_services(&self) {
        for app_id in [
            host_services::LOGGING,
            host_services::POSITION,
            host_services::SENSOR,
            host_services::LINK,
        ] {
            self.heartbeat(app_id).await;
        }
    }

    /// Deliver any message to the app.
    pub async fn push<M: SidecarMessage>(&self, source_app_id: &str, message: &M) {
        let frame = WireFrame::encode(source_app_id, BROADCAST, message)
            .expect("mock messages always encode");
        self.outbound
            .send(frame)
            .await
            .expect("app side of the link is gone");
    }

    /// Every frame received so far.
    pub fn requests(&self) -> Vec<WireFrame> {
        self.seen.lock().clone()
    }

    pub fn requests_of(&self, kind: MessageKind) -> Vec<WireFrame> {
        self.seen
            .lock()
            .iter()
            .filter(|f| f.kind == kind)
            .cloned()
            .collect()
    }

    /// Wait until `count` frames of `kind` have arrived.
    pub async fn wait_for_requests(&self, kind: MessageKind, count: usize) -> Vec<WireFrame> {
        loop {
            let frames = self.requests_of(kind);
            if frames.len() >= count {
                return frames;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

impl Drop for MockSidecar {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Config for tests: no own heartbeat, short default timeout.
pub fn test_config(app_id: &str) -> ClientConfig {
    ClientConfig {
        app_id: app_id.to_string(),
        response_timeout: Duration::from_secs(5),
        heartbeat_pulse_interval: None,
        ..ClientConfig::default()
    }
}

/// A client wired to a fresh mock sidecar.
pub fn connected_client(config: ClientConfig) -> (SpacefxClient, MockSidecar) {
    let (client, end) = SpacefxClient::in_memory(config).expect("test config is valid");
    (client, MockSidecar::attach(end))
}

fn answer(frame: WireFrame, script: Script, outbound: mpsc::Sender<WireFrame>) {
    let (statuses, delay) = match script {
        Script::Reply(status) => (vec![status], Duration::ZERO),
        Script::Sequence(statuses) => (statuses, Duration::ZERO),
        Script::Jittered { max_delay } => (vec![StatusCode::Successful], max_delay),
        Script::Silent => return,
    };
    let jitter = !delay.is_zero();

    tokio::spawn(async move {
        for status in statuses {
            let Some(reply) = response_frame(&frame, status) else {
                return;
            };
            if jitter {
                tokio::time::sleep(jitter_for(&reply, delay)).await;
            }
            if outbound.send(reply).await.is_err() {
                return;
            }
        }
    });
}

fn response_frame(frame: &WireFrame, status: StatusCode) -> Option<WireFrame> {
    match frame.kind {
        MessageKind::LogMessage => Some(reply::<LogMessage>(frame, status)),
        MessageKind::TelemetryMetric => Some(reply::<TelemetryMetric>(frame, status)),
        MessageKind::TelemetryMultiMetric => Some(reply::<TelemetryMultiMetric>(frame, status)),
        MessageKind::PositionRequest => Some(reply::<PositionRequest>(frame, status)),
        MessageKind::SensorsAvailableRequest => Some(reply::<SensorsAvailableRequest>(frame, status)),
        MessageKind::TaskingPreCheckRequest => Some(reply::<TaskingPreCheckRequest>(frame, status)),
        MessageKind::TaskingRequest => Some(reply::<TaskingRequest>(frame, status)),
        MessageKind::LinkRequest => Some(reply::<LinkRequest>(frame, status)),
        _ => None,
    }
}

fn reply<R: SidecarRequest>(frame: &WireFrame, status: StatusCode) -> WireFrame {
    let request: R = frame.decode().expect("app sent a well-formed request");
    let mut response = R::Response::default();
    let mut header = ResponseHeader::with_status(request.request_header(), status);
    header.app_id = frame.target_app_id.clone();
    *response.response_header_mut() = header;
    WireFrame::encode(&frame.target_app_id, &frame.source_app_id, &response)
        .expect("mock responses always encode")
}

/// Deterministic delay in `[0, max)` keyed on the response payload.
fn jitter_for(frame: &WireFrame, max: Duration) -> Duration {
    let hash = frame
        .payload
        .iter()
        .fold(0xcbf2_9ce4_8422_2325_u64, |h, b| (h ^ u64::from(*b)).wrapping_mul(0x100_0000_01b3));
    let max_ms = max.as_millis().max(1) as u64;
    Duration::from_millis(hash % max_ms)
}
