//! Tracing and logging setup
//!
//! Configures the `tracing` subscriber with environment-based filtering.
//! Embedding applications usually install their own subscriber; these
//! helpers cover bots that want a working default.

use tracing::Level;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Tracing configuration options
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Log level filter used when `RUST_LOG` is not set
    pub level: Level,
    /// Enable JSON output format
    pub json: bool,
    /// Include file and line numbers
    pub file_line: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json: false,
            file_line: false,
        }
    }
}

impl TracingConfig {
    /// Development configuration with debug logging and source locations
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: Level::DEBUG,
            json: false,
            file_line: true,
        }
    }

    /// Production configuration with JSON logging
    #[must_use]
    pub fn production() -> Self {
        Self {
            level: Level::INFO,
            json: true,
            file_line: false,
        }
    }
}

/// Error during subscriber initialization
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("failed to initialize tracing subscriber: {0}")]
    Init(String),
}

/// Initialize the tracing subscriber with the given configuration
///
/// # Panics
/// Panics if a subscriber is already installed; use [`try_init_tracing`]
/// when that is a recoverable condition.
pub fn init_tracing(config: TracingConfig) {
    if let Err(error) = try_init_tracing(config) {
        panic!("{error}");
    }
}

/// Initialize the tracing subscriber, returning an error if one is
/// already installed
pub fn try_init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_string()));

    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.json {
        registry
            .with(fmt::layer().json().with_file(config.file_line).with_line_number(config.file_line))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_file(config.file_line).with_line_number(config.file_line))
            .try_init()
    };

    result.map_err(|error| TracingError::Init(error.to_string()))
}
