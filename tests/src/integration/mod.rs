//! Cross-crate flows against a mock sidecar.

pub mod correlation;
pub mod dispatch;
pub mod session_flows;
pub mod stream_carrier;
