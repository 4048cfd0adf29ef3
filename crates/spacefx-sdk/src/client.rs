//! # SpaceFx Client
//!
//! The handle an app holds for its whole life. Building it connects to the
//! sidecar and starts the background tasks:
//!
//! - receive loop ([`ResponseRouter`])
//! - heartbeat pulse, if `heartbeat_pulse_interval` is set
//! - liveness monitor, if `heartbeat_liveness` is set
//!
//! Cloning is cheap; every clone shares one session.

use crate::domain::config::{ClientConfig, XferDirectories};
use crate::domain::error::{SdkError, SdkResult};
use crate::domain::pending::{CorrelationRegistry, RegistrySnapshot};
use crate::ipc::{Gateway, HealthCheckFn, HealthCheckSlot, ResponseRouter};
use crate::services::{LinkService, LoggingService, PositionService, SensorService};
use crate::session::{KnownService, SessionState, SidecarSession};
use parking_lot::{Mutex, RwLock};
use spacefx_bus::{
    in_memory_link, Connection, FrameReceiver, FrameSender, SidecarEnd, SubscriptionHandle,
    BROADCAST,
};
use spacefx_types::{HeartBeatPulse, SensorData};
use std::path::{Component, Path};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Shortest interval the liveness monitor polls at.
const MIN_LIVENESS_TICK: Duration = Duration::from_millis(100);

#[derive(Clone)]
pub struct SpacefxClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    gateway: Gateway,
    health_check: HealthCheckSlot,
    shutdown: watch::Sender<bool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl SpacefxClient {
    /// Connect to the sidecar named by `config.sidecar_endpoint`.
    pub async fn build(config: ClientConfig) -> SdkResult<Self> {
        config.validate()?;
        let endpoint = config.endpoint()?;

        info!(app_id = %config.app_id, endpoint = %endpoint, "Connecting to sidecar");
        let Connection { sender, receiver } = endpoint
            .connect(config.max_frame_size)
            .await
            .map_err(|e| SdkError::Connection {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;

        Self::with_transport(config, sender, receiver)
    }

    /// Build over an in-memory link. The returned [`SidecarEnd`] plays the sidecar.
    pub fn in_memory(config: ClientConfig) -> SdkResult<(Self, SidecarEnd)> {
        let (sender, receiver, sidecar) = in_memory_link(config.frame_buffer);
        let client = Self::with_transport(config, Arc::new(sender), Box::new(receiver))?;
        Ok((client, sidecar))
    }

    /// Build over an already established channel. Must run inside a Tokio runtime.
    pub fn with_transport(
        config: ClientConfig,
        sender: Arc<dyn FrameSender>,
        receiver: Box<dyn FrameReceiver>,
    ) -> SdkResult<Self> {
        config.validate()?;

        let session = Arc::new(SidecarSession::new());
        let registry = CorrelationRegistry::new();
        let health_check: HealthCheckSlot = Arc::new(RwLock::new(None));
        let (shutdown, shutdown_rx) = watch::channel(false);

        let gateway = Gateway::new(
            config.app_id.clone(),
            Arc::clone(&sender),
            registry.clone(),
            Arc::clone(&session),
            config.response_timeout,
            config.wait_for_target_service,
        );
        let router = ResponseRouter::new(
            config.app_id.clone(),
            receiver,
            sender,
            registry,
            Arc::clone(&session),
            Arc::clone(&health_check),
        );

        session.mark_connecting();
        let mut tasks = vec![tokio::spawn(router.run(shutdown_rx))];

        if let Some(interval) = config.heartbeat_pulse_interval {
            tasks.push(spawn_pulse(gateway.clone(), interval, shutdown.subscribe()));
        }
        if let Some(window) = config.heartbeat_liveness {
            tasks.push(spawn_liveness(Arc::clone(&session), window, shutdown.subscribe()));
        }

        info!(app_id = %config.app_id, "Client started");
        Ok(Self {
            inner: Arc::new(ClientInner {
                config,
                gateway,
                health_check,
                shutdown,
                tasks: Mutex::new(tasks),
            }),
        })
    }

    pub fn app_id(&self) -> &str {
        &self.inner.config.app_id
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn config_directory(&self) -> &Path {
        &self.inner.config.config_dir
    }

    /// Read the settings file `name` from the config directory.
    pub async fn config_setting(&self, name: &str) -> SdkResult<String> {
        let mut components = Path::new(name).components();
        let plain = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !plain {
            return Err(SdkError::Argument(format!(
                "config setting '{name}' must be a plain file name"
            )));
        }

        let path = self.inner.config.config_dir.join(name);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| SdkError::io(path, e))
    }

    pub fn xfer_directories(&self) -> XferDirectories {
        self.inner.config.xfer_directories()
    }

    pub fn state(&self) -> SessionState {
        self.session().state()
    }

    pub fn session(&self) -> &SidecarSession {
        self.inner.gateway.session()
    }

    pub fn gateway(&self) -> &Gateway {
        &self.inner.gateway
    }

    /// Wait for the first heartbeat. `None` uses the configured response timeout.
    pub async fn wait_for_online(&self, timeout: Option<Duration>) -> SdkResult<SessionState> {
        self.session()
            .wait_for_online(timeout.unwrap_or(self.inner.config.response_timeout))
            .await
    }

    pub fn services_online(&self) -> Vec<KnownService> {
        self.session().services_online()
    }

    pub async fn wait_for_service(&self, app_id: &str, timeout: Option<Duration>) -> SdkResult<()> {
        self.session()
            .wait_for_service(app_id, timeout.unwrap_or(self.inner.config.response_timeout))
            .await
    }

    /// Install the probe answered to sidecar health checks.
    pub fn set_health_check<F>(&self, check: F)
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        let check: HealthCheckFn = Arc::new(check);
        *self.inner.health_check.write() = Some(check);
    }

    pub fn logging(&self) -> LoggingService {
        LoggingService::new(self.inner.gateway.clone())
    }

    pub fn position(&self) -> PositionService {
        PositionService::new(self.inner.gateway.clone())
    }

    pub fn sensor(&self) -> SensorService {
        SensorService::new(self.inner.gateway.clone())
    }

    pub fn link(&self) -> LinkService {
        LinkService::new(self.inner.gateway.clone(), self.xfer_directories())
    }

    pub fn subscribe_to_sensor_data<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: Fn(Arc<SensorData>) + Send + Sync + 'static,
    {
        self.session().sensor_data().subscribe(callback)
    }

    pub fn unsubscribe_from_sensor_data(&self, handle: SubscriptionHandle) -> bool {
        self.session().sensor_data().unsubscribe(handle)
    }

    pub fn registry_snapshot(&self) -> RegistrySnapshot {
        self.inner.gateway.registry().snapshot()
    }

    /// Flips to `true` once [`shutdown`](Self::shutdown) is called.
    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.inner.shutdown.subscribe()
    }

    pub fn is_shut_down(&self) -> bool {
        *self.inner.shutdown.borrow()
    }

    /// Park until Ctrl-C or [`shutdown`](Self::shutdown).
    pub async fn keep_app_open(&self) {
        let mut stop = self.shutdown_signal();
        if *stop.borrow() {
            return;
        }
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    warn!(error = %e, "Could not listen for Ctrl-C");
                }
                self.shutdown();
            }
            _ = stop.changed() => {}
        }
    }

    /// Stop the background tasks and go offline. Idempotent.
    pub fn shutdown(&self) {
        if self.inner.shutdown.send_replace(true) {
            return;
        }
        info!(app_id = %self.app_id(), "Shutting down client");
        self.session().mark_offline("shutdown");
        self.inner.gateway.registry().clear();
        for task in self.inner.tasks.lock().drain(..) {
            task.abort();
        }
    }
}

fn spawn_pulse(
    gateway: Gateway,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let frequency_ms = interval.as_millis() as u64;
        let started = chrono::Utc::now();
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                _ = ticker.tick() => {
                    let mut pulse = HeartBeatPulse::new(gateway.app_id(), frequency_ms);
                    pulse.app_start_time = Some(started);
                    pulse.app_version = env!("CARGO_PKG_VERSION").to_string();
                    match gateway.emit(BROADCAST, &pulse).await {
                        Ok(()) => {}
                        Err(SdkError::SessionClosed) => break,
                        Err(e) => debug!(error = %e, "Heartbeat pulse not sent"),
                    }
                }
            }
        }
    })
}

fn spawn_liveness(
    session: Arc<SidecarSession>,
    window: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval((window / 2).max(MIN_LIVENESS_TICK));
        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                _ = ticker.tick() => {
                    session.check_liveness(window);
                }
            }
        }
    })
}
