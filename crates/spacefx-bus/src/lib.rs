//! # SpaceFx Bus - Sidecar Message Channel
//!
//! Moves [`WireFrame`]s between an app and its sidecar and fans unsolicited
//! events out to subscribers.
//!
//! ```text
//! ┌──────────────┐   FrameSender    ┌──────────────┐
//! │     App      │ ───────────────▶ │   Sidecar    │
//! │              │ ◀─────────────── │              │
//! └──────────────┘   FrameReceiver  └──────────────┘
//!        │
//!        ▼ EventDispatcher<E>
//!   subscriber callbacks
//! ```
//!
//! ## Carriers
//!
//! - [`SidecarEndpoint`]: length-prefixed frames over Unix sockets or TCP.
//! - [`channel::in_memory_link`]: `mpsc` pair for embedded sidecars and tests.

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod channel;
pub mod dispatcher;
pub mod frame;
pub mod transport;

pub use channel::{in_memory_link, ChannelReceiver, ChannelSender, SidecarEnd};
pub use dispatcher::{DispatchStats, EventDispatcher, SubscriptionHandle};
pub use frame::{read_frame, write_frame, WireFrame, BROADCAST, DEFAULT_MAX_FRAME_SIZE};
pub use transport::{
    Connection, FrameReceiver, FrameSender, SidecarEndpoint, StreamFrameReceiver,
    StreamFrameSender, TransportError,
};

/// Default buffer for in-memory links.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;
