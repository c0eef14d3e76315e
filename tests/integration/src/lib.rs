//! Integration test utilities for the chatter client
//!
//! Provides a wired-together client harness (cache + bus + dispatch), an
//! event recorder, and payload fixtures. The transport is simulated by
//! feeding decoded dispatches straight into the handler, which is exactly
//! the boundary a real transport uses.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
