//! Sensor host service schemas (`hostsvc-sensor`).
//!
//! `request_data` and `data` are opaque to the SDK and passed through as JSON.

use crate::envelope::{MessageKind, RequestHeader, ResponseHeader};
use crate::{sidecar_request, sidecar_response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SensorsAvailableRequest {
    pub request_header: RequestHeader,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SensorInfo {
    #[serde(rename = "sensorID")]
    pub sensor_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SensorsAvailableResponse {
    pub response_header: ResponseHeader,
    pub sensors: Vec<SensorInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskingPreCheckRequest {
    pub request_header: RequestHeader,
    #[serde(rename = "sensorID")]
    pub sensor_id: String,
    pub request_data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskingPreCheckResponse {
    pub response_header: ResponseHeader,
    #[serde(rename = "sensorID")]
    pub sensor_id: String,
    pub response_data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskingRequest {
    pub request_header: RequestHeader,
    #[serde(rename = "sensorID")]
    pub sensor_id: String,
    pub request_data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskingResponse {
    pub response_header: ResponseHeader,
    #[serde(rename = "sensorID")]
    pub sensor_id: String,
    pub response_data: Option<serde_json::Value>,
}

/// Unsolicited sensor telemetry pushed to subscribers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SensorData {
    pub response_header: ResponseHeader,
    #[serde(rename = "sensorID")]
    pub sensor_id: String,
    pub data: Option<serde_json::Value>,
    pub generated_time: Option<DateTime<Utc>>,
    pub expiration_time: Option<DateTime<Utc>>,
}

impl crate::envelope::SidecarMessage for SensorData {
    const KIND: MessageKind = MessageKind::SensorData;
}

sidecar_request!(SensorsAvailableRequest => SensorsAvailableResponse, MessageKind::SensorsAvailableRequest);
sidecar_response!(SensorsAvailableResponse, MessageKind::SensorsAvailableResponse);
sidecar_request!(TaskingPreCheckRequest => TaskingPreCheckResponse, MessageKind::TaskingPreCheckRequest);
sidecar_response!(TaskingPreCheckResponse, MessageKind::TaskingPreCheckResponse);
sidecar_request!(TaskingRequest => TaskingResponse, MessageKind::TaskingRequest);
sidecar_response!(TaskingResponse, MessageKind::TaskingResponse);
