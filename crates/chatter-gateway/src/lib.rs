//! # chatter-gateway
//!
//! The inbound half of the client: consumes decoded `(shard, title,
//! payload)` dispatches from the transport, keeps the object cache in
//! sync, tracks per-shard and aggregate readiness, and fans typed events
//! out to user-registered listeners.
//!
//! The transport itself (socket framing, heartbeating, resume) lives
//! elsewhere; its whole boundary here is [`DispatchHandler::handle`] plus
//! the [`ConnectSignal`] it sets once every shard finished its handshake.

pub mod bus;
pub mod dispatch;
pub mod events;
pub mod shard;

pub use bus::EventBus;
pub use dispatch::{DispatchError, DispatchHandler, ReadinessCoordinator};
pub use events::{names, Event, EventType};
pub use shard::{ConnectSignal, Shard};
