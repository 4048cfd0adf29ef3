//! Client configuration with validation.
//!
//! Loaded from environment variables ([`ClientConfig::from_env`]) or a JSON
//! file ([`ClientConfig::from_file`]); durations are written in milliseconds.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};
use spacefx_bus::{SidecarEndpoint, DEFAULT_CHANNEL_CAPACITY, DEFAULT_MAX_FRAME_SIZE};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default wait for a response or a service heartbeat.
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(30);

/// Name of the optional settings file inside the config directory.
pub const SETTINGS_FILE_NAME: &str = "appsettings.json";

/// Main client configuration
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConfig {
    /// This app's ID on the bus
    pub app_id: String,
    /// `unix:///path` or `tcp://host:port`
    pub sidecar_endpoint: String,
    /// Default response timeout
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub response_timeout: Duration,
    /// Wait for the target service's heartbeat before sending
    pub wait_for_target_service: bool,
    /// Go offline after this long without any heartbeat
    #[serde_as(as = "Option<DurationMilliSeconds<u64>>")]
    pub heartbeat_liveness: Option<Duration>,
    /// How often this app announces itself; `None` disables
    #[serde_as(as = "Option<DurationMilliSeconds<u64>>")]
    pub heartbeat_pulse_interval: Option<Duration>,
    /// Directory holding config settings files
    pub config_dir: PathBuf,
    /// Root of the file transfer volume
    pub xfer_dir: PathBuf,
    /// Largest frame accepted from or sent to the sidecar
    pub max_frame_size: usize,
    /// Frame buffer for in-memory links
    pub frame_buffer: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            app_id: "spacefx-app".to_string(),
            sidecar_endpoint: "unix:///var/run/spacefx/sidecar.sock".to_string(),
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
            wait_for_target_service: true,
            heartbeat_liveness: None,
            heartbeat_pulse_interval: Some(Duration::from_secs(2)),
            config_dir: PathBuf::from("/spacefx-config"),
            xfer_dir: PathBuf::from("/spacefx-xfer"),
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            frame_buffer: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl ClientConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SPACEFX_APP_ID`: App ID (default: spacefx-app)
    /// - `SPACEFX_SIDECAR_ENDPOINT`: Sidecar endpoint
    /// - `SPACEFX_RESPONSE_TIMEOUT_MS`: Default response timeout (default: 30000)
    /// - `SPACEFX_WAIT_FOR_SERVICE`: Wait for target heartbeats (default: true)
    /// - `SPACEFX_HEARTBEAT_LIVENESS_MS`: Offline after silence (default: unset)
    /// - `SPACEFX_HEARTBEAT_PULSE_MS`: Own heartbeat period, 0 disables (default: 2000)
    /// - `SPACEFX_CONFIG_DIR`: Config directory (default: /spacefx-config)
    /// - `SPACEFX_XFER_DIR`: Transfer volume root (default: /spacefx-xfer)
    ///
    /// If `SPACEFX_CONFIG_DIR` contains `appsettings.json` it is loaded first
    /// and the variables above override it.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config_dir = env::var("SPACEFX_CONFIG_DIR").ok().map(PathBuf::from);

        let mut config = match &config_dir {
            Some(dir) if dir.join(SETTINGS_FILE_NAME).is_file() => {
                Self::from_file(dir.join(SETTINGS_FILE_NAME))?
            }
            _ => Self::default(),
        };

        if let Some(dir) = config_dir {
            config.config_dir = dir;
        }
        if let Ok(v) = env::var("SPACEFX_APP_ID") {
            config.app_id = v;
        }
        if let Ok(v) = env::var("SPACEFX_SIDECAR_ENDPOINT") {
            config.sidecar_endpoint = v;
        }
        if let Some(ms) = env_millis("SPACEFX_RESPONSE_TIMEOUT_MS")? {
            config.response_timeout = ms;
        }
        if let Ok(v) = env::var("SPACEFX_WAIT_FOR_SERVICE") {
            config.wait_for_target_service = !matches!(v.to_lowercase().as_str(), "false" | "0");
        }
        if let Some(ms) = env_millis("SPACEFX_HEARTBEAT_LIVENESS_MS")? {
            config.heartbeat_liveness = (!ms.is_zero()).then_some(ms);
        }
        if let Some(ms) = env_millis("SPACEFX_HEARTBEAT_PULSE_MS")? {
            config.heartbeat_pulse_interval = (!ms.is_zero()).then_some(ms);
        }
        if let Ok(v) = env::var("SPACEFX_XFER_DIR") {
            config.xfer_dir = PathBuf::from(v);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file. Missing fields take defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app_id.trim().is_empty() {
            return Err(ConfigError::InvalidAppId);
        }

        self.endpoint()?;

        if self.response_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "response timeout cannot be 0".into(),
            ));
        }

        if self.heartbeat_liveness.is_some_and(|d| d.is_zero()) {
            return Err(ConfigError::InvalidTimeout(
                "heartbeat liveness cannot be 0".into(),
            ));
        }

        if self.heartbeat_pulse_interval.is_some_and(|d| d.is_zero()) {
            return Err(ConfigError::InvalidTimeout(
                "heartbeat pulse interval cannot be 0, leave it unset to disable".into(),
            ));
        }

        if self.max_frame_size == 0 {
            return Err(ConfigError::InvalidLimit("max_frame_size cannot be 0".into()));
        }

        if self.frame_buffer == 0 {
            return Err(ConfigError::InvalidLimit("frame_buffer cannot be 0".into()));
        }

        Ok(())
    }

    /// Parsed sidecar endpoint
    pub fn endpoint(&self) -> Result<SidecarEndpoint, ConfigError> {
        self.sidecar_endpoint
            .parse()
            .map_err(|_| ConfigError::InvalidEndpoint(self.sidecar_endpoint.clone()))
    }

    /// Inbox, outbox and root of the transfer volume.
    pub fn xfer_directories(&self) -> XferDirectories {
        XferDirectories {
            inbox: self.xfer_dir.join("inbox"),
            outbox: self.xfer_dir.join("outbox"),
            root: self.xfer_dir.clone(),
        }
    }
}

/// Transfer volume layout used by the link service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XferDirectories {
    pub inbox: PathBuf,
    pub outbox: PathBuf,
    pub root: PathBuf,
}

fn env_millis(name: &'static str) -> Result<Option<Duration>, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map(|ms| Some(Duration::from_millis(ms)))
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        Err(_) => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("app id cannot be empty")]
    InvalidAppId,
    #[error("invalid sidecar endpoint '{0}'")]
    InvalidEndpoint(String),
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    #[error("invalid value '{value}' for {name}")]
    InvalidValue { name: &'static str, value: String },
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
