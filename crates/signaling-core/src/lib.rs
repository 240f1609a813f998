//! # Signaling-Core
//!
//! Real-time signaling for Ringline: room bookkeeping and the event relay.
//!
//! This crate provides:
//! - `ConnectionRegistry`: rooms (`user:*`, `session:*`) mapped to live
//!   endpoint handles, decoupled from any transport library
//! - The wire messages exchanged with clients
//! - `SignalingRelay`: routes inbound events, consulting the registry for
//!   fan-out targets and the call state machine for lifecycle transitions
//!
//! Negotiation payloads (offers, answers, ICE candidates) are opaque: the
//! relay reads the `session_id` for routing and forwards everything else
//! untouched.

pub mod endpoint;
pub mod errors;
pub mod events;
pub mod registry;
pub mod relay;

pub use endpoint::{EndpointHandle, EndpointId};
pub use errors::{Result, SignalingError};
pub use events::{ClientEvent, ServerEvent, SignalPayload};
pub use registry::{ConnectionRegistry, RoomId};
pub use relay::SignalingRelay;
