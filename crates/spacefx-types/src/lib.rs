//! # SpaceFx Types
//!
//! Message envelope, status codes and the host-service schemas exchanged with
//! the sidecar.
//!
//! ## Layout
//!
//! - [`envelope`]: request/response headers, [`StatusCode`], [`MessageKind`]
//!   and the [`SidecarRequest`]/[`SidecarResponse`] traits.
//! - [`messages`]: logging, position, sensor, link and liveness schemas.
//! - [`codec`]: JSON payload encoding plus header-only peeking for routing.

pub mod codec;
pub mod envelope;
pub mod errors;
pub mod messages;

pub use envelope::{
    MessageKind, RequestHeader, ResponseHeader, SidecarMessage, SidecarRequest, SidecarResponse,
    StatusCode,
};
pub use errors::CodecError;
pub use messages::*;

/// App IDs of the host services the SDK talks to.
pub mod host_services {
    pub const LOGGING: &str = "hostsvc-logging";
    pub const POSITION: &str = "hostsvc-position";
    pub const SENSOR: &str = "hostsvc-sensor";
    pub const LINK: &str = "hostsvc-link";
}
