//! Logging and telemetry facade for `hostsvc-logging`.

use crate::domain::error::{SdkError, SdkResult};
use crate::ipc::Gateway;
use spacefx_types::{
    host_services, LogLevel, LogMessage, LogMessageResponse, SidecarRequest, TelemetryMetric,
    TelemetryMetricResponse, TelemetryMultiMetric, TelemetryMultiMetricResponse,
};
use std::time::Duration;
use tracing::instrument;

/// Sends log messages and telemetry metrics to the logging host service.
///
/// With `wait_for_response == false` the message is posted and the returned
/// response carries status `UNKNOWN`.
#[derive(Clone)]
pub struct LoggingService {
    gateway: Gateway,
}

impl LoggingService {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Send a plain log line at `level`.
    #[instrument(skip(self, message))]
    pub async fn send_log_message(
        &self,
        message: impl Into<String>,
        level: LogLevel,
        timeout: Option<Duration>,
        wait_for_response: bool,
    ) -> SdkResult<LogMessageResponse> {
        self.send_complex_log_message(LogMessage::new(message, level), timeout, wait_for_response)
            .await
    }

    /// Send a fully populated [`LogMessage`].
    #[instrument(skip(self, message))]
    pub async fn send_complex_log_message(
        &self,
        message: LogMessage,
        timeout: Option<Duration>,
        wait_for_response: bool,
    ) -> SdkResult<LogMessageResponse> {
        self.dispatch(message, timeout, wait_for_response).await
    }

    /// Send one metric. `value` is required.
    #[instrument(skip(self, name, value))]
    pub async fn send_telemetry(
        &self,
        name: impl Into<String>,
        value: Option<i64>,
        timeout: Option<Duration>,
        wait_for_response: bool,
    ) -> SdkResult<TelemetryMetricResponse> {
        let name = name.into();
        let value = value.ok_or_else(|| {
            SdkError::Argument(format!("metric '{name}' needs a value"))
        })?;
        self.send_telemetry_metric(TelemetryMetric::new(name, value), timeout, wait_for_response)
            .await
    }

    /// Send a prepared [`TelemetryMetric`].
    pub async fn send_telemetry_metric(
        &self,
        metric: TelemetryMetric,
        timeout: Option<Duration>,
        wait_for_response: bool,
    ) -> SdkResult<TelemetryMetricResponse> {
        validate_metric(&metric)?;
        self.dispatch(metric, timeout, wait_for_response).await
    }

    /// Send several metrics in one message.
    #[instrument(skip(self, metrics), fields(count = metrics.len()))]
    pub async fn send_telemetry_multi(
        &self,
        metrics: Vec<TelemetryMetric>,
        timeout: Option<Duration>,
        wait_for_response: bool,
    ) -> SdkResult<TelemetryMultiMetricResponse> {
        if metrics.is_empty() {
            return Err(SdkError::Argument("no metrics to send".into()));
        }
        for metric in &metrics {
            validate_metric(metric)?;
        }
        let multi = TelemetryMultiMetric {
            telemetry_metrics: metrics,
            ..TelemetryMultiMetric::default()
        };
        self.dispatch(multi, timeout, wait_for_response).await
    }

    async fn dispatch<R: SidecarRequest>(
        &self,
        request: R,
        timeout: Option<Duration>,
        wait_for_response: bool,
    ) -> SdkResult<R::Response> {
        if wait_for_response {
            self.gateway.send(host_services::LOGGING, request, timeout).await
        } else {
            self.gateway.post(host_services::LOGGING, request, timeout).await
        }
    }
}

fn validate_metric(metric: &TelemetryMetric) -> SdkResult<()> {
    if metric.metric_name.trim().is_empty() {
        return Err(SdkError::Argument("metric name cannot be empty".into()));
    }
    if metric.metric_value.is_none() {
        return Err(SdkError::Argument(format!(
            "metric '{}' needs a value",
            metric.metric_name
        )));
    }
    Ok(())
}
