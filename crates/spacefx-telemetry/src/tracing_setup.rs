//! Subscriber setup: env filter, local fmt output and the optional forward layer.

use crate::forward::{LogForwardReceiver, RemoteLogLayer};
use crate::{TelemetryConfig, TelemetryError};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Install the global subscriber.
///
/// Returns the forwarding receiver when `forward_logs` is enabled.
pub(crate) fn init_subscriber(
    config: &TelemetryConfig,
) -> Result<Option<LogForwardReceiver>, TelemetryError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| TelemetryError::Config(e.to_string()))?;

    // JSON output for containers
    let json_layer = (config.console_output && config.json_logs).then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
    });

    // Pretty output for development
    let pretty_layer = (config.console_output && !config.json_logs).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_ansi(true)
    });

    let (forward_layer, forward_rx) = if config.forward_logs {
        let (layer, rx) = RemoteLogLayer::new(config.forward_buffer);
        let layer = layer.with_filter(LevelFilter::from_level(config.forward_level));
        (Some(layer), Some(rx))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(pretty_layer)
        .with(forward_layer)
        .try_init()
        .map_err(|e| TelemetryError::SubscriberInit(e.to_string()))?;

    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        forward_logs = config.forward_logs,
        forward_level = %config.forward_level,
        "Logging initialized"
    );

    Ok(forward_rx)
}
