//! # SpaceFx SDK
//!
//! Client for apps running next to a SpaceFx sidecar. Requests to host
//! services are correlated by tracking ID and awaited with a timeout; pushed
//! events (heartbeats, sensor data) are routed by a background receive loop.
//!
//! ## Architecture
//!
//! ```text
//! app ──▶ facade (logging/position/sensor/link)
//!            │
//!            ▼
//!         Gateway ── register ──▶ CorrelationRegistry ◀── resolve ──┐
//!            │                                                     │
//!            └── FrameSender ──▶ [sidecar] ──▶ FrameReceiver ──▶ ResponseRouter
//!                                                                  │
//!                           SidecarSession (heartbeats, state) ◀───┤
//!                           EventDispatcher<SensorData>        ◀───┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use spacefx_sdk::{ClientConfig, SpacefxClient};
//! use spacefx_types::LogLevel;
//!
//! let client = SpacefxClient::build(ClientConfig::from_env()?).await?;
//! client.wait_for_online(None).await?;
//! client.logging().send_log_message("hello", LogLevel::Info, None, false).await?;
//! let position = client.position().request_position(None).await?;
//! ```
//!
//! A response whose header status is not `SUCCESSFUL` is returned as `Ok`;
//! errors are reserved for timeouts, transport, bad arguments and decoding.

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod client;
pub mod domain;
pub mod forwarder;
pub mod ipc;
pub mod services;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::SpacefxClient;
pub use domain::{
    ClientConfig, ConfigError, CorrelationRegistry, PendingRequest, RawResponse,
    RegistrySnapshot, ResolveOutcome, SdkError, SdkResult, XferDirectories,
    DEFAULT_RESPONSE_TIMEOUT,
};
pub use forwarder::spawn_log_forwarder;
pub use ipc::{Gateway, ResponseRouter, Routed};
pub use services::{LinkService, LoggingService, PositionService, SensorService};
pub use session::{KnownService, SessionState, SidecarSession};

pub use spacefx_bus::SubscriptionHandle;
pub use spacefx_types as types;
