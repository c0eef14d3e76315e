//! REST error types

use crate::routes::RouteError;

/// Errors produced by the outbound REST layer
#[derive(Debug, thiserror::Error)]
pub enum RestError {
    /// An authenticated route was requested before a token was configured
    #[error("No token is configured; the client is not set up for authenticated requests")]
    SetupRequired,

    /// Route construction failed
    #[error(transparent)]
    Route(#[from] RouteError),

    /// The underlying HTTP transport failed
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// 400 Bad Request
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// 403 Forbidden
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// 404 Not Found
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// 5xx from the remote service
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// A status the client has no specific handling for, including 429
    /// responses that did not come from the API itself
    #[error("Unexpected response ({status}): {message}")]
    Unexpected { status: u16, message: String },

    /// Every attempt ended in a retryable ratelimit response
    #[error("Request abandoned after {attempts} ratelimited attempts")]
    RetriesExhausted { attempts: u8 },

    /// A 2xx body did not decode into the expected shape
    #[error("Malformed response payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// A 2xx response carried no body where one was expected
    #[error("Response carried no body")]
    EmptyResponse,
}

impl RestError {
    /// Whether the error is a client-side (4xx) API error
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::BadRequest { .. } | Self::Forbidden { .. } | Self::NotFound { .. }
        )
    }

    /// Whether the error is a remote (5xx) API error
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ServerError { .. })
    }
}
