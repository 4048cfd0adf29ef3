//! Typed facades over the gateway, one per host service.

pub mod link;
pub mod logging;
pub mod position;
pub mod sensor;

pub use link::LinkService;
pub use logging::LoggingService;
pub use position::PositionService;
pub use sensor::SensorService;
