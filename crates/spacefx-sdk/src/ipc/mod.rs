//! Sidecar IPC: the outbound gateway and the inbound router.

pub mod gateway;
pub mod router;

pub use gateway::Gateway;
pub use router::{HealthCheckFn, HealthCheckSlot, ResponseRouter, Routed};
