//! # Remote Log Forwarding
//!
//! [`RemoteLogLayer`] is a `tracing` layer that copies events into a bounded
//! channel. Something else (the SDK's log forwarder) drains the channel and
//! ships each [`ForwardedLog`] to the logging host service.
//!
//! The layer never blocks and never emits logs of its own: a full or closed
//! channel only bumps the dropped counter. Local output is a separate layer
//! and is unaffected either way.

use chrono::{DateTime, Utc};
use std::fmt::{self, Write as _};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// Targets that are never forwarded. Forwarding SDK logs would feed the
/// forwarder its own output.
pub const SDK_TARGETS: &[&str] = &[
    "spacefx_sdk",
    "spacefx_bus",
    "spacefx_telemetry",
    "spacefx_types",
];

/// One captured log event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardedLog {
    pub level: Level,
    pub target: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Receiving end handed to the forwarder task.
pub type LogForwardReceiver = mpsc::Receiver<ForwardedLog>;

pub struct RemoteLogLayer {
    tx: mpsc::Sender<ForwardedLog>,
    excluded_targets: Vec<String>,
    dropped: Arc<AtomicU64>,
}

impl RemoteLogLayer {
    /// Create a layer and the receiver it feeds.
    pub fn new(buffer: usize) -> (Self, LogForwardReceiver) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let layer = Self {
            tx,
            excluded_targets: SDK_TARGETS.iter().map(|t| t.to_string()).collect(),
            dropped: Arc::new(AtomicU64::new(0)),
        };
        (layer, rx)
    }

    /// Skip another target prefix.
    pub fn exclude_target(mut self, prefix: impl Into<String>) -> Self {
        self.excluded_targets.push(prefix.into());
        self
    }

    /// Count of records dropped because the channel was full or closed.
    pub fn dropped_counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.dropped)
    }

    fn is_excluded(&self, target: &str) -> bool {
        self.excluded_targets.iter().any(|prefix| {
            target == prefix
                || target
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|rest| rest.starts_with("::"))
        })
    }
}

impl<S: Subscriber> Layer<S> for RemoteLogLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if self.is_excluded(metadata.target()) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let record = ForwardedLog {
            level: *metadata.level(),
            target: metadata.target().to_string(),
            message: visitor.finish(),
            timestamp: Utc::now(),
        };

        if self.tx.try_send(record).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Collects the `message` field and appends the rest as `key=value`.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        match (self.message.is_empty(), self.fields.is_empty()) {
            (_, true) => self.message,
            (true, false) => self.fields,
            (false, false) => format!("{} {}", self.message, self.fields),
        }
    }

    fn push_field(&mut self, name: &str, value: fmt::Arguments<'_>) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{name}={value}");
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.push_field(field.name(), format_args!("{value}"));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.push_field(field.name(), format_args!("{value:?}"));
        }
    }
}
