//! Dispatch error types

use crate::events::EventType;

/// Errors surfaced to the caller of [`DispatchHandler::handle`]
///
/// [`DispatchHandler::handle`]: crate::dispatch::DispatchHandler::handle
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// A recognized event carried a payload that does not match its
    /// documented shape
    #[error("malformed {event} payload: {source}")]
    Payload {
        event: EventType,
        #[source]
        source: serde_json::Error,
    },
}
