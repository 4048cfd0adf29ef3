//! Telemetry configuration from environment variables.

use std::env;
use tracing::Level;

/// Configuration for local log output and remote forwarding.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// App ID shown in startup logs
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error) or a full directive
    pub log_level: String,

    /// Whether to write logs to stdout
    pub console_output: bool,

    /// Whether local output is JSON formatted
    pub json_logs: bool,

    /// Whether to forward logs to the logging host service
    pub forward_logs: bool,

    /// Minimum level that gets forwarded
    pub forward_level: Level,

    /// Records buffered for the forwarder before new ones are dropped
    pub forward_buffer: usize,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "spacefx-app".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
            forward_logs: true,
            forward_level: Level::INFO,
            forward_buffer: 1024,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SPACEFX_APP_ID`: Service name (default: spacefx-app)
    /// - `SPACEFX_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `SPACEFX_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `SPACEFX_JSON_LOGS`: Enable JSON logs (default: true in containers)
    /// - `SPACEFX_FORWARD_LOGS`: Forward to `hostsvc-logging` (default: true)
    /// - `SPACEFX_FORWARD_LEVEL`: Minimum forwarded level (default: info)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();
        let defaults = Self::default();

        Self {
            service_name: env::var("SPACEFX_APP_ID").unwrap_or(defaults.service_name),

            log_level: env::var("SPACEFX_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or(defaults.log_level),

            console_output: env::var("SPACEFX_CONSOLE_OUTPUT")
                .map(|v| parse_flag(&v, true))
                .unwrap_or(true),

            json_logs: env::var("SPACEFX_JSON_LOGS")
                .map(|v| parse_flag(&v, false))
                .unwrap_or(is_container),

            forward_logs: env::var("SPACEFX_FORWARD_LOGS")
                .map(|v| parse_flag(&v, true))
                .unwrap_or(true),

            forward_level: env::var("SPACEFX_FORWARD_LEVEL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.forward_level),

            forward_buffer: env::var("SPACEFX_FORWARD_BUFFER")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.forward_buffer),
        }
    }

    /// Configuration with forwarding turned off.
    pub fn local_only() -> Self {
        Self {
            forward_logs: false,
            ..Self::from_env()
        }
    }
}

fn parse_flag(value: &str, default: bool) -> bool {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}
