//! Ships app logs captured by `RemoteLogLayer` to `hostsvc-logging`.

use crate::client::SpacefxClient;
use spacefx_telemetry::{ForwardedLog, LogForwardReceiver};
use spacefx_types::{LogLevel, LogMessage};
use tokio::task::JoinHandle;
use tracing::{debug, Level};

/// Drain `receiver` into the logging host service until the client shuts
/// down or the layer goes away. Records are posted without waiting for a
/// response.
pub fn spawn_log_forwarder(client: &SpacefxClient, mut receiver: LogForwardReceiver) -> JoinHandle<()> {
    let logging = client.logging();
    let mut shutdown = client.shutdown_signal();

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                record = receiver.recv() => match record {
                    Some(record) => {
                        if let Err(e) = logging
                            .send_complex_log_message(to_log_message(record), None, false)
                            .await
                        {
                            debug!(error = %e, "Dropped forwarded log");
                        }
                    }
                    None => break,
                },
            }
        }
        debug!("Log forwarder stopped");
    })
}

fn to_log_message(record: ForwardedLog) -> LogMessage {
    let mut message = LogMessage::new(record.message, log_level(record.level));
    message.category = record.target;
    message.log_time = Some(record.timestamp);
    message
}

fn log_level(level: Level) -> LogLevel {
    match level {
        Level::TRACE => LogLevel::Trace,
        Level::DEBUG => LogLevel::Debug,
        Level::INFO => LogLevel::Info,
        Level::WARN => LogLevel::Warning,
        Level::ERROR => LogLevel::Error,
    }
}
