//! Position host service schemas (`hostsvc-position`).

use crate::envelope::{MessageKind, RequestHeader, ResponseHeader};
use crate::{sidecar_request, sidecar_response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PositionRequest {
    pub request_header: RequestHeader,
}

/// Cartesian position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Attitude quaternion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Attitude {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub k: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Position {
    pub position_time: Option<DateTime<Utc>>,
    pub point: Point,
    pub attitude: Attitude,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PositionResponse {
    pub response_header: ResponseHeader,
    pub position: Option<Position>,
}

sidecar_request!(PositionRequest => PositionResponse, MessageKind::PositionRequest);
sidecar_response!(PositionResponse, MessageKind::PositionResponse);
