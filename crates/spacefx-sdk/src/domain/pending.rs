//! Correlation Registry - maps in-flight tracking IDs to waiting callers.
//!
//! Flow:
//! 1. The gateway stamps a request and calls [`CorrelationRegistry::register`]
//! 2. The request goes out through the sidecar
//! 3. The receive loop calls [`CorrelationRegistry::resolve`] for every response
//! 4. The caller awaits [`PendingRequest::await_result`] with its timeout
//!
//! Interim responses (`UNKNOWN`, `PENDING`) are remembered as last-heard and
//! returned on timeout. The first terminal response settles the request and
//! removes it; anything arriving later is dropped.

use crate::domain::error::{SdkError, SdkResult};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use spacefx_types::{MessageKind, ResponseHeader};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::debug;

/// A response as seen by the receive loop: routing header plus raw payload.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub kind: MessageKind,
    pub header: ResponseHeader,
    pub payload: Vec<u8>,
}

/// What [`CorrelationRegistry::resolve`] did with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// Settled a waiting request.
    Fulfilled,
    /// Stored as last-heard; the request keeps waiting.
    Interim,
    /// No request is waiting under that tracking ID.
    Unmatched,
}

struct Slot {
    sender: oneshot::Sender<RawResponse>,
    last_heard: Arc<Mutex<Option<RawResponse>>>,
    created_at: Instant,
}

type SlotMap = DashMap<String, Slot>;

/// Statistics for the registry
#[derive(Debug, Default)]
pub struct RegistryStats {
    pub total_registered: AtomicU64,
    pub total_fulfilled: AtomicU64,
    pub total_timeouts: AtomicU64,
    pub total_unmatched: AtomicU64,
}

/// Point-in-time copy of [`RegistryStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistrySnapshot {
    pub pending: usize,
    pub registered: u64,
    pub fulfilled: u64,
    pub timeouts: u64,
    pub unmatched: u64,
}

/// Concurrent map of tracking ID → waiter.
#[derive(Clone, Default)]
pub struct CorrelationRegistry {
    slots: Arc<SlotMap>,
    stats: Arc<RegistryStats>,
}

impl CorrelationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a waiter for `tracking_id`.
    pub fn register(&self, tracking_id: &str, timeout: Duration) -> SdkResult<PendingRequest> {
        let (tx, rx) = oneshot::channel();
        let last_heard = Arc::new(Mutex::new(None));
        let created_at = Instant::now();

        match self.slots.entry(tracking_id.to_string()) {
            Entry::Occupied(_) => {
                return Err(SdkError::DuplicateTrackingId(tracking_id.to_string()));
            }
            Entry::Vacant(vacant) => {
                vacant.insert(Slot {
                    sender: tx,
                    last_heard: Arc::clone(&last_heard),
                    created_at,
                });
            }
        }
        self.stats.total_registered.fetch_add(1, Ordering::Relaxed);

        debug!(tracking_id = %tracking_id, timeout_ms = timeout.as_millis() as u64, "Registered pending request");

        Ok(PendingRequest {
            tracking_id: tracking_id.to_string(),
            created_at,
            timeout,
            receiver: rx,
            last_heard,
            slots: Arc::clone(&self.slots),
            stats: Arc::clone(&self.stats),
        })
    }

    /// Route a response to its waiter, if any.
    pub fn resolve(&self, response: RawResponse) -> ResolveOutcome {
        let tracking_id = response.header.tracking_id.clone();

        if response.header.status.is_interim() {
            return match self.slots.get(&tracking_id) {
                Some(slot) => {
                    debug!(tracking_id = %tracking_id, status = %response.header.status, "Interim response recorded");
                    *slot.last_heard.lock() = Some(response);
                    ResolveOutcome::Interim
                }
                None => self.unmatched(&tracking_id),
            };
        }

        match self.slots.remove(&tracking_id) {
            Some((_, slot)) => {
                let elapsed = slot.created_at.elapsed();
                let status = response.header.status;
                if slot.sender.send(response).is_ok() {
                    self.stats.total_fulfilled.fetch_add(1, Ordering::Relaxed);
                    debug!(
                        tracking_id = %tracking_id,
                        status = %status,
                        response_time_ms = elapsed.as_millis() as u64,
                        "Completed pending request"
                    );
                    ResolveOutcome::Fulfilled
                } else {
                    // Waiter went away between lookup and send.
                    self.unmatched(&tracking_id)
                }
            }
            None => self.unmatched(&tracking_id),
        }
    }

    fn unmatched(&self, tracking_id: &str) -> ResolveOutcome {
        self.stats.total_unmatched.fetch_add(1, Ordering::Relaxed);
        debug!(tracking_id = %tracking_id, "Dropping response with no waiter");
        ResolveOutcome::Unmatched
    }

    pub fn pending_count(&self) -> usize {
        self.slots.len()
    }

    pub fn is_pending(&self, tracking_id: &str) -> bool {
        self.slots.contains_key(tracking_id)
    }

    /// Drop every waiter; their callers see last-heard or `SessionClosed`.
    pub fn clear(&self) {
        self.slots.clear();
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            pending: self.slots.len(),
            registered: self.stats.total_registered.load(Ordering::Relaxed),
            fulfilled: self.stats.total_fulfilled.load(Ordering::Relaxed),
            timeouts: self.stats.total_timeouts.load(Ordering::Relaxed),
            unmatched: self.stats.total_unmatched.load(Ordering::Relaxed),
        }
    }
}

/// Caller side of a registered request.
///
/// Dropping it (awaited or not) removes the registry entry.
pub struct PendingRequest {
    tracking_id: String,
    created_at: Instant,
    timeout: Duration,
    receiver: oneshot::Receiver<RawResponse>,
    last_heard: Arc<Mutex<Option<RawResponse>>>,
    slots: Arc<SlotMap>,
    stats: Arc<RegistryStats>,
}

impl PendingRequest {
    pub fn tracking_id(&self) -> &str {
        &self.tracking_id
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Wait for the settling response.
    ///
    /// On timeout returns the last interim response heard, otherwise
    /// [`SdkError::Timeout`].
    pub async fn await_result(mut self, timeout: Duration) -> SdkResult<RawResponse> {
        match tokio::time::timeout(timeout, &mut self.receiver).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(_)) => self.take_last_heard().ok_or(SdkError::SessionClosed),
            Err(_) => {
                self.stats.total_timeouts.fetch_add(1, Ordering::Relaxed);
                match self.take_last_heard() {
                    Some(response) => {
                        debug!(
                            tracking_id = %self.tracking_id,
                            status = %response.header.status,
                            "Timed out, returning last heard response"
                        );
                        Ok(response)
                    }
                    None => Err(SdkError::timeout(
                        format!("response to {}", self.tracking_id),
                        timeout,
                    )),
                }
            }
        }
    }

    fn take_last_heard(&self) -> Option<RawResponse> {
        self.last_heard.lock().take()
    }
}

impl Drop for PendingRequest {
    fn drop(&mut self) {
        self.slots.remove(&self.tracking_id);
    }
}
