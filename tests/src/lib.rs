//! # SpaceFx SDK Test Suite
//!
//! Cross-crate integration tests. The app side is a real
//! [`SpacefxClient`](spacefx_sdk::SpacefxClient); the sidecar is a
//! [`harness::MockSidecar`] on the other end of an in-memory link, or a
//! socket listener for the stream carrier tests.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── harness.rs              # MockSidecar, scripted responses
//! └── integration/
//!     ├── correlation.rs      # stamping, concurrency isolation, registry draining
//!     ├── session_flows.rs    # heartbeats, online/offline, health checks, shutdown
//!     ├── dispatch.rs         # sensor data fan-out
//!     ├── facades.rs          # logging, sensor, link, log forwarding
//!     └── stream_carrier.rs   # Unix socket and TCP round trips
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p spacefx-tests
//! cargo test -p spacefx-tests integration::correlation::
//! ```

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

pub mod harness;
pub mod integration;
