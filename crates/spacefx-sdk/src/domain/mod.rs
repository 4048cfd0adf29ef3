//! Domain layer: configuration, errors and the correlation registry.

pub mod config;
pub mod error;
pub mod pending;

pub use config::{ClientConfig, ConfigError, XferDirectories, DEFAULT_RESPONSE_TIMEOUT};
pub use error::{SdkError, SdkResult};
pub use pending::{
    CorrelationRegistry, PendingRequest, RawResponse, RegistrySnapshot, ResolveOutcome,
};
