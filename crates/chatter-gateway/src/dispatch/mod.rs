//! Dispatch core
//!
//! [`DispatchHandler`] routes decoded gateway events to named handlers
//! that mutate the cache and emit typed events; [`ReadinessCoordinator`]
//! watches guild backfill and decides when a shard, and the client as a
//! whole, is ready.

mod error;
mod handler;
mod readiness;

pub use error::DispatchError;
pub use handler::DispatchHandler;
pub use readiness::ReadinessCoordinator;
