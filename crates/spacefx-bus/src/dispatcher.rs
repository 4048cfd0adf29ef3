//! # Event Dispatcher
//!
//! Fans unsolicited events out to subscriber callbacks.
//!
//! ## Guarantees
//!
//! - Undecodable payloads are logged and dropped.
//! - Every callback runs on its own blocking-pool task and receives the same
//!   `Arc` of the decoded event.
//! - Dispatch never waits for callbacks. A panicking callback is caught,
//!   counted and logged; the others still run.

use parking_lot::RwLock;
use spacefx_types::{codec, SidecarMessage};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, warn};

/// Returned by [`EventDispatcher::subscribe`]; pass it back to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

impl SubscriptionHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

type Callback<E> = Arc<dyn Fn(Arc<E>) + Send + Sync>;

/// Dispatch counters
#[derive(Debug, Default)]
pub struct DispatchStats {
    pub events_dispatched: AtomicU64,
    pub events_dropped: AtomicU64,
    pub callback_panics: AtomicU64,
}

/// Typed fan-out for one event kind.
pub struct EventDispatcher<E> {
    subscribers: RwLock<Vec<(SubscriptionHandle, Callback<E>)>>,
    next_id: AtomicU64,
    stats: Arc<DispatchStats>,
}

impl<E: SidecarMessage> Default for EventDispatcher<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: SidecarMessage> EventDispatcher<E> {
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            stats: Arc::new(DispatchStats::default()),
        }
    }

    /// Append a callback; it sees every event dispatched from now on.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: Fn(Arc<E>) + Send + Sync + 'static,
    {
        let handle = SubscriptionHandle(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers.write().push((handle, Arc::new(callback)));
        debug!(kind = %E::KIND, subscription = handle.0, "Subscribed");
        handle
    }

    /// Remove a callback. Returns false if the handle was unknown.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|(h, _)| *h != handle);
        let removed = subscribers.len() != before;
        if removed {
            debug!(kind = %E::KIND, subscription = handle.0, "Unsubscribed");
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    pub fn stats(&self) -> &DispatchStats {
        &self.stats
    }

    /// Decode `payload` and fan it out. Returns how many callbacks were scheduled.
    pub fn dispatch(&self, payload: &[u8]) -> usize {
        match codec::decode::<E>(payload) {
            Ok(event) => self.dispatch_event(event),
            Err(e) => {
                self.stats.events_dropped.fetch_add(1, Ordering::Relaxed);
                warn!(kind = %E::KIND, error = %e, "Dropping undecodable event");
                0
            }
        }
    }

    /// Fan out an already decoded event.
    pub fn dispatch_event(&self, event: E) -> usize {
        let runtime = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                self.stats.events_dropped.fetch_add(1, Ordering::Relaxed);
                warn!(kind = %E::KIND, "No async runtime available, dropping event");
                return 0;
            }
        };

        // Copy the list so subscribers can change while callbacks run.
        let subscribers: Vec<_> = self.subscribers.read().clone();
        let event = Arc::new(event);

        for (handle, callback) in &subscribers {
            let callback = Arc::clone(callback);
            let event = Arc::clone(&event);
            let stats = Arc::clone(&self.stats);
            let id = handle.0;

            runtime.spawn_blocking(move || {
                if let Err(panic) = panic::catch_unwind(AssertUnwindSafe(|| callback(event))) {
                    stats.callback_panics.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        kind = %E::KIND,
                        subscription = id,
                        panic = %panic_message(panic.as_ref()),
                        "Event callback panicked"
                    );
                }
            });
        }

        self.stats.events_dispatched.fetch_add(1, Ordering::Relaxed);
        subscribers.len()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
