//! Sensor facade for `hostsvc-sensor`.
//!
//! Tasking requests carry an opaque JSON `request_data` body; extra metadata
//! is merged into the request header. Unsolicited `SensorData` arrives through
//! the session's dispatcher.

use crate::domain::error::{SdkError, SdkResult};
use crate::ipc::Gateway;
use serde_json::Value;
use spacefx_bus::SubscriptionHandle;
use spacefx_types::{
    host_services, SensorData, SensorsAvailableRequest, SensorsAvailableResponse,
    TaskingPreCheckRequest, TaskingPreCheckResponse, TaskingRequest, TaskingResponse,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

#[derive(Clone)]
pub struct SensorService {
    gateway: Gateway,
}

impl SensorService {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    #[instrument(skip(self))]
    pub async fn get_available_sensors(
        &self,
        timeout: Option<Duration>,
    ) -> SdkResult<SensorsAvailableResponse> {
        self.gateway
            .send(host_services::SENSOR, SensorsAvailableRequest::default(), timeout)
            .await
    }

    /// Ask whether `sensor_id` would accept a tasking.
    #[instrument(skip(self, request_data, metadata))]
    pub async fn sensor_tasking_pre_check(
        &self,
        sensor_id: &str,
        request_data: Option<Value>,
        metadata: Option<HashMap<String, String>>,
        timeout: Option<Duration>,
    ) -> SdkResult<TaskingPreCheckResponse> {
        require_sensor_id(sensor_id)?;
        let mut request = TaskingPreCheckRequest {
            sensor_id: sensor_id.to_string(),
            request_data,
            ..TaskingPreCheckRequest::default()
        };
        request.request_header.metadata.extend(metadata.unwrap_or_default());
        self.gateway.send(host_services::SENSOR, request, timeout).await
    }

    /// Task `sensor_id`. Resulting data arrives as `SensorData` events.
    #[instrument(skip(self, request_data, metadata))]
    pub async fn sensor_tasking(
        &self,
        sensor_id: &str,
        request_data: Option<Value>,
        metadata: Option<HashMap<String, String>>,
        timeout: Option<Duration>,
    ) -> SdkResult<TaskingResponse> {
        require_sensor_id(sensor_id)?;
        let mut request = TaskingRequest {
            sensor_id: sensor_id.to_string(),
            request_data,
            ..TaskingRequest::default()
        };
        request.request_header.metadata.extend(metadata.unwrap_or_default());
        self.gateway.send(host_services::SENSOR, request, timeout).await
    }

    /// Register a callback for every `SensorData` event.
    pub fn subscribe_to_sensor_data<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: Fn(Arc<SensorData>) + Send + Sync + 'static,
    {
        self.gateway.session().sensor_data().subscribe(callback)
    }

    pub fn unsubscribe_from_sensor_data(&self, handle: SubscriptionHandle) -> bool {
        self.gateway.session().sensor_data().unsubscribe(handle)
    }
}

fn require_sensor_id(sensor_id: &str) -> SdkResult<()> {
    if sensor_id.trim().is_empty() {
        return Err(SdkError::Argument("sensor id cannot be empty".into()));
    }
    Ok(())
}
