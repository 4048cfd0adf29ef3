//! Inbound half of the sidecar channel.
//!
//! One task reads frames and routes them by kind:
//!
//! | Kind | Destination |
//! |------|-------------|
//! | `HeartBeatPulse` | session (service table, ONLINE) |
//! | `SensorData` | sensor data subscribers |
//! | `HealthCheck` | health check reply |
//! | any response | correlation registry |

use crate::domain::pending::{CorrelationRegistry, RawResponse, ResolveOutcome};
use crate::session::SidecarSession;
use parking_lot::RwLock;
use spacefx_bus::{FrameReceiver, FrameSender, WireFrame};
use spacefx_types::{
    codec, HealthCheck, HealthCheckResponse, HeartBeatPulse, MessageKind, ResponseHeader,
    StatusCode,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// App-supplied health probe. Returning `false` reports `FAILED`.
pub type HealthCheckFn = Arc<dyn Fn() -> bool + Send + Sync>;

/// Shared slot for the current health probe; `None` means always healthy.
pub type HealthCheckSlot = Arc<RwLock<Option<HealthCheckFn>>>;

/// Where [`ResponseRouter::route`] sent a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routed {
    Heartbeat,
    SensorData,
    HealthCheck,
    Response(ResolveOutcome),
    Dropped,
}

pub struct ResponseRouter {
    app_id: String,
    receiver: Box<dyn FrameReceiver>,
    sender: Arc<dyn FrameSender>,
    registry: CorrelationRegistry,
    session: Arc<SidecarSession>,
    health_check: HealthCheckSlot,
}

impl ResponseRouter {
    pub fn new(
        app_id: impl Into<String>,
        receiver: Box<dyn FrameReceiver>,
        sender: Arc<dyn FrameSender>,
        registry: CorrelationRegistry,
        session: Arc<SidecarSession>,
        health_check: HealthCheckSlot,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            receiver,
            sender,
            registry,
            session,
            health_check,
        }
    }

    /// Run until the channel closes or `shutdown` flips.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!("Receive loop started");
        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    debug!("Receive loop stopping on shutdown");
                    break;
                }
                received = self.receiver.receive() => match received {
                    Ok(frame) => {
                        self.route(frame);
                    }
                    Err(e) if e.is_fatal() => {
                        warn!(error = %e, "Sidecar channel lost, stopping receive loop");
                        self.session.mark_offline("channel closed");
                        // Waiters get their last interim response or SessionClosed.
                        self.registry.clear();
                        break;
                    }
                    Err(e) => {
                        warn!(error = %e, "Dropping unreadable frame");
                    }
                }
            }
        }
        info!("Receive loop stopped");
    }

    pub fn route(&self, frame: WireFrame) -> Routed {
        match frame.kind {
            MessageKind::HeartBeatPulse => match frame.decode::<HeartBeatPulse>() {
                Ok(pulse) => {
                    self.session.observe_heartbeat(&pulse);
                    Routed::Heartbeat
                }
                Err(e) => self.drop_frame(&frame, &e),
            },
            MessageKind::SensorData => {
                self.session.sensor_data().dispatch(&frame.payload);
                Routed::SensorData
            }
            MessageKind::HealthCheck => match frame.decode::<HealthCheck>() {
                Ok(check) => {
                    self.reply_health(check, frame.source_app_id);
                    Routed::HealthCheck
                }
                Err(e) => self.drop_frame(&frame, &e),
            },
            kind if kind.is_response() => match codec::peek_response_header(&frame.payload) {
                Ok(header) => Routed::Response(self.registry.resolve(RawResponse {
                    kind,
                    header,
                    payload: frame.payload,
                })),
                Err(e) => self.drop_frame(&frame, &e),
            },
            kind => {
                debug!(kind = %kind, source = %frame.source_app_id, "Ignoring unexpected frame");
                Routed::Dropped
            }
        }
    }

    fn drop_frame(&self, frame: &WireFrame, error: &dyn std::fmt::Display) -> Routed {
        warn!(kind = %frame.kind, source = %frame.source_app_id, error = %error, "Dropping undecodable frame");
        Routed::Dropped
    }

    fn reply_health(&self, check: HealthCheck, reply_to: String) {
        let probe = self.health_check.read().clone();
        let sender = Arc::clone(&self.sender);
        let app_id = self.app_id.clone();

        tokio::spawn(async move {
            let healthy = match probe {
                Some(probe) => tokio::task::spawn_blocking(move || probe())
                    .await
                    .unwrap_or_else(|_| {
                        warn!("Health check panicked, reporting unhealthy");
                        false
                    }),
                None => true,
            };
            let status = if healthy {
                StatusCode::Successful
            } else {
                StatusCode::Failed
            };

            let mut header = ResponseHeader::with_status(&check.request_header, status);
            header.app_id = app_id.clone();
            let response = HealthCheckResponse {
                response_header: header,
            };

            let sent = match WireFrame::encode(app_id, reply_to, &response) {
                Ok(frame) => sender.send(frame).await.map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            };
            match sent {
                Ok(()) => debug!(status = %status, "Answered health check"),
                Err(e) => warn!(error = %e, "Failed to answer health check"),
            }
        });
    }
}
