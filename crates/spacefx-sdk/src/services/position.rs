//! Position facade for `hostsvc-position`.

use crate::domain::error::SdkResult;
use crate::ipc::Gateway;
use spacefx_types::{host_services, PositionRequest, PositionResponse};
use std::time::Duration;
use tracing::instrument;

#[derive(Clone)]
pub struct PositionService {
    gateway: Gateway,
}

impl PositionService {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Ask for the spacecraft's latest position and attitude.
    #[instrument(skip(self))]
    pub async fn request_position(&self, timeout: Option<Duration>) -> SdkResult<PositionResponse> {
        self.gateway
            .send(host_services::POSITION, PositionRequest::default(), timeout)
            .await
    }
}
