//! Client configuration

mod client_config;

pub use client_config::{
    ClientConfig, ConfigError, GatewayConfig, RestConfig, DEFAULT_REST_BASE_URL,
};
