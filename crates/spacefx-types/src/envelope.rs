//! # Message Envelope
//!
//! Every request carries a [`RequestHeader`] and every response a
//! [`ResponseHeader`]. The headers hold the routing and correlation metadata;
//! the rest of each message is service specific.
//!
//! ## Identity Rules
//!
//! - `tracking_id` is assigned once, when the request is stamped, if empty.
//! - `correlation_id` defaults to `tracking_id` and is never overwritten.
//! - Responders copy both IDs from the request into the response header.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Header attached to every outgoing request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestHeader {
    /// Unique per request. Empty until stamped.
    pub tracking_id: String,
    /// Links this request to an originating exchange. Empty until stamped.
    pub correlation_id: String,
    /// App ID of the sender.
    pub app_id: String,
    /// Free-form key/value pairs forwarded to the host service.
    pub metadata: HashMap<String, String>,
}

impl RequestHeader {
    /// Create a header with a fresh tracking ID.
    pub fn new() -> Self {
        let mut header = Self::default();
        header.stamp();
        header
    }

    /// Create a header that chains onto an existing correlation ID.
    pub fn chained(correlation_id: impl Into<String>) -> Self {
        let mut header = Self {
            correlation_id: correlation_id.into(),
            ..Self::default()
        };
        header.stamp();
        header
    }

    /// Assign `tracking_id` if absent, then default `correlation_id` to it.
    ///
    /// Idempotent: IDs that are already set are left untouched.
    pub fn stamp(&mut self) {
        if self.tracking_id.trim().is_empty() {
            self.tracking_id = Uuid::new_v4().to_string();
        }
        if self.correlation_id.trim().is_empty() {
            self.correlation_id = self.tracking_id.clone();
        }
    }

    /// Whether both IDs are present.
    pub fn is_stamped(&self) -> bool {
        !self.tracking_id.trim().is_empty() && !self.correlation_id.trim().is_empty()
    }
}

/// Header carried by every response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResponseHeader {
    /// App ID of the responder.
    pub app_id: String,
    /// Tracking ID copied from the request.
    pub tracking_id: String,
    /// Correlation ID copied from the request.
    pub correlation_id: String,
    /// Outcome of the request.
    pub status: StatusCode,
    /// Human readable detail, usually empty on success.
    pub message: String,
}

impl ResponseHeader {
    /// Build a response header that answers `request`.
    ///
    /// Status starts as [`StatusCode::Unknown`].
    pub fn from_request(request: &RequestHeader) -> Self {
        Self {
            app_id: String::new(),
            tracking_id: request.tracking_id.clone(),
            correlation_id: request.correlation_id.clone(),
            status: StatusCode::Unknown,
            message: String::new(),
        }
    }

    /// Same as [`ResponseHeader::from_request`] with an explicit status.
    pub fn with_status(request: &RequestHeader, status: StatusCode) -> Self {
        Self {
            status,
            ..Self::from_request(request)
        }
    }
}

/// Host service status codes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusCode {
    #[default]
    Unknown,
    Successful,
    Pending,
    Transmitting,
    NotFound,
    Rejected,
    Failed,
    InvalidArgument,
    Timeout,
    Unauthorized,
    Ready,
    NotApplicable,
}

impl StatusCode {
    /// Interim statuses are recorded but never settle a request.
    pub fn is_interim(self) -> bool {
        matches!(self, StatusCode::Unknown | StatusCode::Pending)
    }

    pub fn is_successful(self) -> bool {
        self == StatusCode::Successful
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StatusCode::Unknown => "UNKNOWN",
            StatusCode::Successful => "SUCCESSFUL",
            StatusCode::Pending => "PENDING",
            StatusCode::Transmitting => "TRANSMITTING",
            StatusCode::NotFound => "NOT_FOUND",
            StatusCode::Rejected => "REJECTED",
            StatusCode::Failed => "FAILED",
            StatusCode::InvalidArgument => "INVALID_ARGUMENT",
            StatusCode::Timeout => "TIMEOUT",
            StatusCode::Unauthorized => "UNAUTHORIZED",
            StatusCode::Ready => "READY",
            StatusCode::NotApplicable => "NOT_APPLICABLE",
        };
        f.write_str(s)
    }
}

/// Discriminator carried on the wire next to every payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    HeartBeatPulse,
    HealthCheck,
    HealthCheckResponse,
    LogMessage,
    LogMessageResponse,
    TelemetryMetric,
    TelemetryMetricResponse,
    TelemetryMultiMetric,
    TelemetryMultiMetricResponse,
    PositionRequest,
    PositionResponse,
    SensorsAvailableRequest,
    SensorsAvailableResponse,
    TaskingPreCheckRequest,
    TaskingPreCheckResponse,
    TaskingRequest,
    TaskingResponse,
    SensorData,
    LinkRequest,
    LinkResponse,
}

impl MessageKind {
    /// Responses are routed to the correlation registry.
    pub fn is_response(self) -> bool {
        matches!(
            self,
            MessageKind::HealthCheckResponse
                | MessageKind::LogMessageResponse
                | MessageKind::TelemetryMetricResponse
                | MessageKind::TelemetryMultiMetricResponse
                | MessageKind::PositionResponse
                | MessageKind::SensorsAvailableResponse
                | MessageKind::TaskingPreCheckResponse
                | MessageKind::TaskingResponse
                | MessageKind::LinkResponse
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            MessageKind::HeartBeatPulse => "HeartBeatPulse",
            MessageKind::HealthCheck => "HealthCheck",
            MessageKind::HealthCheckResponse => "HealthCheckResponse",
            MessageKind::LogMessage => "LogMessage",
            MessageKind::LogMessageResponse => "LogMessageResponse",
            MessageKind::TelemetryMetric => "TelemetryMetric",
            MessageKind::TelemetryMetricResponse => "TelemetryMetricResponse",
            MessageKind::TelemetryMultiMetric => "TelemetryMultiMetric",
            MessageKind::TelemetryMultiMetricResponse => "TelemetryMultiMetricResponse",
            MessageKind::PositionRequest => "PositionRequest",
            MessageKind::PositionResponse => "PositionResponse",
            MessageKind::SensorsAvailableRequest => "SensorsAvailableRequest",
            MessageKind::SensorsAvailableResponse => "SensorsAvailableResponse",
            MessageKind::TaskingPreCheckRequest => "TaskingPreCheckRequest",
            MessageKind::TaskingPreCheckResponse => "TaskingPreCheckResponse",
            MessageKind::TaskingRequest => "TaskingRequest",
            MessageKind::TaskingResponse => "TaskingResponse",
            MessageKind::SensorData => "SensorData",
            MessageKind::LinkRequest => "LinkRequest",
            MessageKind::LinkResponse => "LinkResponse",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A schema that can travel through the sidecar.
pub trait SidecarMessage: Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: MessageKind;
}

/// A message that expects a correlated response.
pub trait SidecarRequest: SidecarMessage {
    type Response: SidecarResponse;

    fn request_header(&self) -> &RequestHeader;
    fn request_header_mut(&mut self) -> &mut RequestHeader;
}

/// A message that answers a [`SidecarRequest`].
pub trait SidecarResponse: SidecarMessage + Default {
    fn response_header(&self) -> &ResponseHeader;
    fn response_header_mut(&mut self) -> &mut ResponseHeader;

    /// An empty response addressed to `request`.
    fn from_request(request: &RequestHeader) -> Self {
        let mut response = Self::default();
        *response.response_header_mut() = ResponseHeader::from_request(request);
        response
    }
}

/// Implements [`SidecarRequest`] for a struct with a `request_header` field.
#[macro_export]
macro_rules! sidecar_request {
    ($request:ty => $response:ty, $kind:expr) => {
        impl $crate::envelope::SidecarMessage for $request {
            const KIND: $crate::envelope::MessageKind = $kind;
        }

        impl $crate::envelope::SidecarRequest for $request {
            type Response = $response;

            fn request_header(&self) -> &$crate::envelope::RequestHeader {
                &self.request_header
            }

            fn request_header_mut(&mut self) -> &mut $crate::envelope::RequestHeader {
                &mut self.request_header
            }
        }
    };
}

/// Implements [`SidecarResponse`] for a struct with a `response_header` field.
#[macro_export]
macro_rules! sidecar_response {
    ($response:ty, $kind:expr) => {
        impl $crate::envelope::SidecarMessage for $response {
            const KIND: $crate::envelope::MessageKind = $kind;
        }

        impl $crate::envelope::SidecarResponse for $response {
            fn response_header(&self) -> &$crate::envelope::ResponseHeader {
                &self.response_header
            }

            fn response_header_mut(&mut self) -> &mut $crate::envelope::ResponseHeader {
                &mut self.response_header
            }
        }
    };
}
