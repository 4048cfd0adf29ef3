//! # Sidecar Session
//!
//! Owns the session state machine and the set of services heard on the bus.
//!
//! ```text
//! UNINITIALIZED ──build──▶ CONNECTING ──first heartbeat──▶ ONLINE
//!                               │                          ▲   │
//!                               │              heartbeat   │   │ silence past the
//!                               │                          │   ▼ liveness window
//!                               │                         OFFLINE
//!                               └─ wait_for_online gives up: TIMED_OUT (caller only)
//! ```
//!
//! Heartbeats are fed in by the receive loop. Known services are kept for
//! the life of the session; staleness only affects the session state.

use crate::domain::error::{SdkError, SdkResult};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use spacefx_bus::EventDispatcher;
use spacefx_types::{HeartBeatPulse, SensorData};
use std::fmt;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Session lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Uninitialized,
    Connecting,
    Online,
    Offline,
    /// Reported to a `wait_for_online` caller that gave up; never stored.
    TimedOut,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionState::Uninitialized => "UNINITIALIZED",
            SessionState::Connecting => "CONNECTING",
            SessionState::Online => "ONLINE",
            SessionState::Offline => "OFFLINE",
            SessionState::TimedOut => "TIMED_OUT",
        })
    }
}

/// A peer service that has sent at least one heartbeat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownService {
    pub app_id: String,
    pub last_heartbeat_at: DateTime<Utc>,
    pub pulse_frequency_ms: u64,
    pub app_version: String,
}

pub struct SidecarSession {
    state: watch::Sender<SessionState>,
    /// Keyed by lowercase app ID.
    services: DashMap<String, KnownService>,
    /// Bumped on every heartbeat so service waiters can wake.
    heartbeats: watch::Sender<u64>,
    last_heartbeat: Mutex<Option<Instant>>,
    sensor_data: EventDispatcher<SensorData>,
}

impl Default for SidecarSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SidecarSession {
    pub fn new() -> Self {
        let (state, _) = watch::channel(SessionState::Uninitialized);
        let (heartbeats, _) = watch::channel(0);
        Self {
            state,
            services: DashMap::new(),
            heartbeats,
            last_heartbeat: Mutex::new(None),
            sensor_data: EventDispatcher::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Watch state changes.
    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Sensor data fan-out owned by this session.
    pub fn sensor_data(&self) -> &EventDispatcher<SensorData> {
        &self.sensor_data
    }

    pub(crate) fn mark_connecting(&self) {
        self.transition(|s| s == SessionState::Uninitialized, SessionState::Connecting);
    }

    pub(crate) fn mark_offline(&self, reason: &str) {
        if self.transition(|s| s != SessionState::Offline, SessionState::Offline) {
            warn!(reason = reason, "Sidecar session offline");
        }
    }

    /// Record a heartbeat and bring the session online.
    pub fn observe_heartbeat(&self, pulse: &HeartBeatPulse) {
        let app_id = if pulse.app_id.is_empty() {
            pulse.response_header.app_id.as_str()
        } else {
            pulse.app_id.as_str()
        };
        if app_id.is_empty() {
            debug!("Ignoring heartbeat without an app id");
            return;
        }

        let service = KnownService {
            app_id: app_id.to_string(),
            last_heartbeat_at: pulse.current_system_time.unwrap_or_else(Utc::now),
            pulse_frequency_ms: pulse.pulse_frequency_ms,
            app_version: pulse.app_version.clone(),
        };
        if self
            .services
            .insert(app_id.to_lowercase(), service)
            .is_none()
        {
            info!(app_id = %app_id, "Heard new service");
        }

        *self.last_heartbeat.lock() = Some(Instant::now());
        self.heartbeats.send_modify(|count| *count = count.wrapping_add(1));

        if self.transition(
            |s| {
                matches!(
                    s,
                    SessionState::Uninitialized | SessionState::Connecting | SessionState::Offline
                )
            },
            SessionState::Online,
        ) {
            info!(app_id = %app_id, "Sidecar session online");
        }
    }

    /// Go offline if no heartbeat arrived within `window`.
    pub fn check_liveness(&self, window: Duration) -> SessionState {
        let silent = match *self.last_heartbeat.lock() {
            Some(at) => at.elapsed() > window,
            None => false,
        };
        if silent && self.state() == SessionState::Online {
            self.mark_offline("heartbeat silence");
        }
        self.state()
    }

    /// Snapshot of every service heard so far.
    pub fn services_online(&self) -> Vec<KnownService> {
        let mut services: Vec<_> = self.services.iter().map(|e| e.value().clone()).collect();
        services.sort_by(|a, b| a.app_id.cmp(&b.app_id));
        services
    }

    /// Case-insensitive lookup.
    pub fn is_service_online(&self, app_id: &str) -> bool {
        self.services.contains_key(&app_id.to_lowercase())
    }

    /// Suspend until the session is online.
    pub async fn wait_for_online(&self, timeout: Duration) -> SdkResult<SessionState> {
        let mut rx = self.state.subscribe();
        let outcome = tokio::time::timeout(timeout, rx.wait_for(|s| *s == SessionState::Online))
            .await
            .map(|seen| seen.map(|_| ()));
        match outcome {
            Ok(Ok(())) => Ok(SessionState::Online),
            Ok(Err(_)) => Err(SdkError::SessionClosed),
            Err(_) => {
                warn!(
                    state = %SessionState::TimedOut,
                    last_state = %self.state(),
                    waited_ms = timeout.as_millis() as u64,
                    "Sidecar did not come online"
                );
                Err(SdkError::timeout("sidecar to come online", timeout))
            }
        }
    }

    /// Suspend until a heartbeat from `app_id` has been heard.
    pub async fn wait_for_service(&self, app_id: &str, timeout: Duration) -> SdkResult<()> {
        let deadline = Instant::now() + timeout;
        let mut heard = self.heartbeats.subscribe();

        loop {
            if self.is_service_online(app_id) {
                return Ok(());
            }
            match tokio::time::timeout_at(deadline, heard.changed()).await {
                Ok(Ok(())) => continue,
                Ok(Err(_)) => return Err(SdkError::SessionClosed),
                Err(_) => {
                    return Err(SdkError::ServiceUnavailable {
                        app_id: app_id.to_string(),
                        waited: timeout,
                    })
                }
            }
        }
    }

    /// Apply `to` if `when` holds for the current state. Returns whether it changed.
    fn transition(&self, when: impl Fn(SessionState) -> bool, to: SessionState) -> bool {
        self.state.send_if_modified(|state| {
            if when(*state) && *state != to {
                debug!(from = %state, to = %to, "Session state change");
                *state = to;
                true
            } else {
                false
            }
        })
    }
}
