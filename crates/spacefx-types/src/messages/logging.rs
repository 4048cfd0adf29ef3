//! Logging host service schemas (`hostsvc-logging`).

use crate::envelope::{MessageKind, RequestHeader, ResponseHeader};
use crate::{sidecar_request, sidecar_response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity attached to a [`LogMessage`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Critical,
    None,
}

/// Priority hint for the logging service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogMessage {
    pub request_header: RequestHeader,
    pub log_level: LogLevel,
    pub message: String,
    pub priority: Priority,
    pub category: String,
    pub sub_category: String,
    pub log_time: Option<DateTime<Utc>>,
}

impl LogMessage {
    pub fn new(message: impl Into<String>, log_level: LogLevel) -> Self {
        Self {
            request_header: RequestHeader::new(),
            log_level,
            message: message.into(),
            log_time: Some(Utc::now()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogMessageResponse {
    pub response_header: ResponseHeader,
}

/// A single named integer metric.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TelemetryMetric {
    pub request_header: RequestHeader,
    pub metric_name: String,
    /// Required by the logging service; `None` is rejected client side.
    pub metric_value: Option<i64>,
    pub metric_time: Option<DateTime<Utc>>,
}

impl TelemetryMetric {
    pub fn new(metric_name: impl Into<String>, metric_value: i64) -> Self {
        Self {
            request_header: RequestHeader::new(),
            metric_name: metric_name.into(),
            metric_value: Some(metric_value),
            metric_time: Some(Utc::now()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TelemetryMetricResponse {
    pub response_header: ResponseHeader,
}

/// Several metrics delivered in one request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TelemetryMultiMetric {
    pub request_header: RequestHeader,
    pub telemetry_metrics: Vec<TelemetryMetric>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TelemetryMultiMetricResponse {
    pub response_header: ResponseHeader,
}

sidecar_request!(LogMessage => LogMessageResponse, MessageKind::LogMessage);
sidecar_response!(LogMessageResponse, MessageKind::LogMessageResponse);
sidecar_request!(TelemetryMetric => TelemetryMetricResponse, MessageKind::TelemetryMetric);
sidecar_response!(TelemetryMetricResponse, MessageKind::TelemetryMetricResponse);
sidecar_request!(TelemetryMultiMetric => TelemetryMultiMetricResponse, MessageKind::TelemetryMultiMetric);
sidecar_response!(TelemetryMultiMetricResponse, MessageKind::TelemetryMultiMetricResponse);
