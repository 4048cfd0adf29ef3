//! # SpaceFx Telemetry
//!
//! Logging for apps built on the SpaceFx SDK. Two independent sinks sit
//! behind the usual `tracing` macros:
//!
//! - **Local**: a `fmt` layer writing pretty or JSON lines to stdout.
//! - **Remote**: [`RemoteLogLayer`] queues records for the logging host
//!   service. The SDK drains the queue with its log forwarder.
//!
//! A failure on the remote side never suppresses local output.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use spacefx_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let mut telemetry = init_telemetry(&TelemetryConfig::from_env())?;
//! let client = SpacefxClient::build(ClientConfig::from_env()?).await?;
//! if let Some(rx) = telemetry.take_log_forwarder() {
//!     spacefx_sdk::spawn_log_forwarder(&client, rx);
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SPACEFX_LOG_LEVEL` | `info` | Log level filter (`RUST_LOG` also honoured) |
//! | `SPACEFX_JSON_LOGS` | `false` (`true` in containers) | JSON local output |
//! | `SPACEFX_FORWARD_LOGS` | `true` | Forward to `hostsvc-logging` |
//! | `SPACEFX_FORWARD_LEVEL` | `info` | Minimum forwarded level |

mod config;
pub mod forward;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use forward::{ForwardedLog, LogForwardReceiver, RemoteLogLayer, SDK_TARGETS};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging.
///
/// Call once per process. A second call fails with
/// [`TelemetryError::SubscriberInit`].
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let forward_rx = tracing_setup::init_subscriber(config)?;
    Ok(TelemetryGuard { forward_rx })
}

/// Holds the forwarding receiver until the SDK claims it.
pub struct TelemetryGuard {
    forward_rx: Option<LogForwardReceiver>,
}

impl TelemetryGuard {
    /// Take the receiver fed by [`RemoteLogLayer`]. `None` if forwarding is
    /// disabled or the receiver was already taken.
    pub fn take_log_forwarder(&mut self) -> Option<LogForwardReceiver> {
        self.forward_rx.take()
    }
}
