//! Outbound half of the sidecar channel.
//!
//! [`Gateway::send`] runs one correlated exchange:
//! stamp → wait for target heartbeat → register → transmit → await → decode.
//! The target wait and the response wait share one deadline.

use crate::domain::error::{SdkError, SdkResult};
use crate::domain::pending::{CorrelationRegistry, RawResponse};
use crate::session::SidecarSession;
use spacefx_bus::{FrameSender, TransportError, WireFrame};
use spacefx_types::{codec, SidecarMessage, SidecarRequest, SidecarResponse};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Sends requests to host services and waits for their responses.
#[derive(Clone)]
pub struct Gateway {
    inner: Arc<GatewayInner>,
}

struct GatewayInner {
    app_id: String,
    sender: Arc<dyn FrameSender>,
    registry: CorrelationRegistry,
    session: Arc<SidecarSession>,
    default_timeout: Duration,
    wait_for_target_service: bool,
}

impl Gateway {
    pub fn new(
        app_id: impl Into<String>,
        sender: Arc<dyn FrameSender>,
        registry: CorrelationRegistry,
        session: Arc<SidecarSession>,
        default_timeout: Duration,
        wait_for_target_service: bool,
    ) -> Self {
        Self {
            inner: Arc::new(GatewayInner {
                app_id: app_id.into(),
                sender,
                registry,
                session,
                default_timeout,
                wait_for_target_service,
            }),
        }
    }

    pub fn app_id(&self) -> &str {
        &self.inner.app_id
    }

    pub fn session(&self) -> &Arc<SidecarSession> {
        &self.inner.session
    }

    pub fn registry(&self) -> &CorrelationRegistry {
        &self.inner.registry
    }

    pub fn default_timeout(&self) -> Duration {
        self.inner.default_timeout
    }

    /// Send `request` to `target` and wait for the correlated response.
    ///
    /// A response with a non-successful status is returned as `Ok`; only
    /// transport, timeout and decoding problems are errors.
    pub async fn send<R: SidecarRequest>(
        &self,
        target: &str,
        mut request: R,
        timeout: Option<Duration>,
    ) -> SdkResult<R::Response> {
        let timeout = timeout.unwrap_or(self.inner.default_timeout);
        let deadline = Instant::now() + timeout;

        self.stamp(&mut request);
        let tracking_id = request.request_header().tracking_id.clone();

        self.ensure_target(target, timeout).await?;

        let pending = self.inner.registry.register(&tracking_id, timeout)?;
        let frame = WireFrame::encode(&self.inner.app_id, target, &request)?;
        self.transmit(frame).await?;

        debug!(
            tracking_id = %tracking_id,
            target = target,
            kind = %R::KIND,
            "Sent request"
        );

        let remaining = deadline.saturating_duration_since(Instant::now());
        let raw = pending.await_result(remaining).await.map_err(|e| match e {
            SdkError::Timeout { .. } => {
                warn!(tracking_id = %tracking_id, target = target, "No response before deadline");
                SdkError::timeout(format!("{} from '{}'", R::Response::KIND, target), timeout)
            }
            other => other,
        })?;

        decode_response::<R::Response>(raw)
    }

    /// Send `request` without registering a waiter.
    ///
    /// Returns a response addressed to the request with status `UNKNOWN`.
    pub async fn post<R: SidecarRequest>(
        &self,
        target: &str,
        mut request: R,
        timeout: Option<Duration>,
    ) -> SdkResult<R::Response> {
        let timeout = timeout.unwrap_or(self.inner.default_timeout);

        self.stamp(&mut request);
        self.ensure_target(target, timeout).await?;

        let frame = WireFrame::encode(&self.inner.app_id, target, &request)?;
        self.transmit(frame).await?;

        debug!(
            tracking_id = %request.request_header().tracking_id,
            target = target,
            kind = %R::KIND,
            "Posted request"
        );
        Ok(R::Response::from_request(request.request_header()))
    }

    /// Send any message without correlation.
    pub async fn emit<M: SidecarMessage>(&self, target: &str, message: &M) -> SdkResult<()> {
        let frame = WireFrame::encode(&self.inner.app_id, target, message)?;
        self.transmit(frame).await
    }

    fn stamp<R: SidecarRequest>(&self, request: &mut R) {
        let header = request.request_header_mut();
        header.stamp();
        if header.app_id.trim().is_empty() {
            header.app_id = self.inner.app_id.clone();
        }
    }

    async fn ensure_target(&self, target: &str, timeout: Duration) -> SdkResult<()> {
        if !self.inner.wait_for_target_service {
            return Ok(());
        }
        self.inner.session.wait_for_service(target, timeout).await
    }

    async fn transmit(&self, frame: WireFrame) -> SdkResult<()> {
        let target = frame.target_app_id.clone();
        self.inner.sender.send(frame).await.map_err(|e| {
            warn!(target = %target, error = %e, "Failed to send frame");
            match e {
                TransportError::ChannelClosed => SdkError::SessionClosed,
                other => SdkError::Transport(other),
            }
        })
    }
}

fn decode_response<T: SidecarResponse>(raw: RawResponse) -> SdkResult<T> {
    if raw.kind != T::KIND {
        return Err(SdkError::Deserialization {
            message_type: T::KIND.to_string(),
            reason: format!("received {} for the same tracking id", raw.kind),
        });
    }
    Ok(codec::decode::<T>(&raw.payload)?)
}
