//! Client configuration structs
//!
//! Loads configuration from environment variables, with a `.env` file
//! picked up when present.

use std::env;
use std::time::Duration;

/// Base URL of the remote service's REST API
pub const DEFAULT_REST_BASE_URL: &str = "https://discord.com/api/v10";

/// Main client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Bot token used for authenticated requests; optional so that
    /// token-less endpoints stay reachable
    pub token: Option<String>,
    pub rest: RestConfig,
    pub gateway: GatewayConfig,
}

/// Outbound REST configuration
#[derive(Debug, Clone)]
pub struct RestConfig {
    pub base_url: String,
    /// Attempts per request, 1 to 5
    pub max_retries: u8,
}

/// Gateway dispatch configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Debounce window for guild backfill before readiness fires
    pub ready_timeout: Duration,
    /// Re-emit every raw dispatch as an observable event
    pub debug_events: bool,
}

// Default value functions
fn default_max_retries() -> u8 {
    5
}

fn default_ready_timeout() -> Duration {
    Duration::from_secs_f64(2.0)
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_REST_BASE_URL.to_string(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            ready_timeout: default_ready_timeout(),
            debug_events: false,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            token: None,
            rest: RestConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error when a variable is present but unparseable or out
    /// of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let max_retries = match env::var("CHATTER_MAX_RETRIES") {
            Ok(raw) => {
                let parsed: u8 = raw
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("CHATTER_MAX_RETRIES", raw.clone()))?;
                if !(1..=5).contains(&parsed) {
                    return Err(ConfigError::InvalidValue("CHATTER_MAX_RETRIES", raw));
                }
                parsed
            }
            Err(_) => default_max_retries(),
        };

        let ready_timeout = match env::var("CHATTER_READY_TIMEOUT") {
            Ok(raw) => {
                let secs: f64 = raw
                    .parse::<f64>()
                    .ok()
                    .filter(|secs| secs.is_finite() && *secs > 0.0)
                    .ok_or_else(|| ConfigError::InvalidValue("CHATTER_READY_TIMEOUT", raw))?;
                Duration::from_secs_f64(secs)
            }
            Err(_) => default_ready_timeout(),
        };

        let debug_events = env::var("CHATTER_DEBUG_EVENTS")
            .map(|raw| matches!(raw.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            token: env::var("CHATTER_TOKEN").ok(),
            rest: RestConfig {
                base_url: env::var("CHATTER_API_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_REST_BASE_URL.to_string()),
                max_retries,
            },
            gateway: GatewayConfig {
                ready_timeout,
                debug_events,
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
