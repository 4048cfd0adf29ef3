//! Link host service schemas (`hostsvc-link`).

use crate::envelope::{MessageKind, RequestHeader, ResponseHeader};
use crate::{sidecar_request, sidecar_response};
use serde::{Deserialize, Serialize};

/// Where the link service should deliver a file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkType {
    #[default]
    Unknown,
    App2App,
    Downlink,
    Crosslink,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LinkRequest {
    pub request_header: RequestHeader,
    pub link_type: LinkType,
    pub destination_app_id: String,
    pub file_name: String,
    /// Path relative to the outbox, empty for files at its root.
    pub subdirectory: String,
    pub overwrite: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LinkResponse {
    pub response_header: ResponseHeader,
    pub link_request: Option<LinkRequest>,
    pub file_list: Vec<String>,
}

sidecar_request!(LinkRequest => LinkResponse, MessageKind::LinkRequest);
sidecar_response!(LinkResponse, MessageKind::LinkResponse);
