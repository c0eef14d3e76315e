//! # chatter-common
//!
//! Shared utilities for the chatter client: configuration loading and
//! telemetry setup.

pub mod config;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use config::{ClientConfig, ConfigError, GatewayConfig, RestConfig, DEFAULT_REST_BASE_URL};
pub use telemetry::{init_tracing, try_init_tracing, TracingConfig, TracingError};
