//! Host service message schemas.

pub mod heartbeat;
pub mod link;
pub mod logging;
pub mod position;
pub mod sensor;

pub use heartbeat::{HealthCheck, HealthCheckResponse, HeartBeatPulse};
pub use link::{LinkRequest, LinkResponse, LinkType};
pub use logging::{
    LogLevel, LogMessage, LogMessageResponse, Priority, TelemetryMetric, TelemetryMetricResponse,
    TelemetryMultiMetric, TelemetryMultiMetricResponse,
};
pub use position::{Attitude, Point, Position, PositionRequest, PositionResponse};
pub use sensor::{
    SensorData, SensorInfo, SensorsAvailableRequest, SensorsAvailableResponse,
    TaskingPreCheckRequest, TaskingPreCheckResponse, TaskingRequest, TaskingResponse,
};
