//! Liveness messages: heartbeat pulses and sidecar health checks.

use crate::envelope::{MessageKind, RequestHeader, ResponseHeader, SidecarMessage};
use crate::{sidecar_request, sidecar_response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Periodic pulse announcing that an app or host service is alive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeartBeatPulse {
    pub response_header: ResponseHeader,
    pub app_id: String,
    pub current_system_time: Option<DateTime<Utc>>,
    pub app_start_time: Option<DateTime<Utc>>,
    pub pulse_frequency_ms: u64,
    pub app_version: String,
}

impl HeartBeatPulse {
    pub fn new(app_id: impl Into<String>, pulse_frequency_ms: u64) -> Self {
        let app_id = app_id.into();
        Self {
            response_header: ResponseHeader {
                app_id: app_id.clone(),
                ..ResponseHeader::default()
            },
            app_id,
            current_system_time: Some(Utc::now()),
            app_start_time: None,
            pulse_frequency_ms,
            app_version: String::new(),
        }
    }
}

impl SidecarMessage for HeartBeatPulse {
    const KIND: MessageKind = MessageKind::HeartBeatPulse;
}

/// Sidecar probe asking whether the app is healthy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HealthCheck {
    pub request_header: RequestHeader,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HealthCheckResponse {
    pub response_header: ResponseHeader,
}

sidecar_request!(HealthCheck => HealthCheckResponse, MessageKind::HealthCheck);
sidecar_response!(HealthCheckResponse, MessageKind::HealthCheckResponse);
