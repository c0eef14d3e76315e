//! Listener registration and event fan-out
//!
//! Every callback runs in its own spawned task, so one failing or
//! panicking callback cannot block or fail delivery to the rest.

use crate::events::Event;
use futures::future::BoxFuture;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

type Callback = Arc<dyn Fn(Event) -> BoxFuture<'static, ()> + Send + Sync>;

/// Registry of user event listeners
///
/// Listeners are expected to be registered before dispatch starts; the
/// map is read-mostly afterwards.
pub struct EventBus {
    listeners: RwLock<HashMap<&'static str, Vec<Callback>>>,
}

impl EventBus {
    /// Create an empty bus
    #[must_use]
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
        }
    }

    /// Register an async listener for the given event name
    ///
    /// See [`crate::events::names`] for the available names. Multiple
    /// listeners may share one name; all of them receive the event.
    pub fn on<F, Fut>(&self, event: &'static str, callback: F)
    where
        F: Fn(Event) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let callback: Callback = Arc::new(move |event| Box::pin(callback(event)));
        self.listeners.write().entry(event).or_default().push(callback);
    }

    /// Number of listeners registered under a name
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.read().get(event).map_or(0, Vec::len)
    }

    /// Fan an event out to every listener registered under its name
    ///
    /// Each callback is spawned independently; a panic inside one task
    /// does not reach the others or the dispatcher.
    pub fn invoke(&self, event: Event) {
        let callbacks = self.listeners.read().get(event.name()).cloned();

        let Some(callbacks) = callbacks else {
            tracing::trace!(event = event.name(), "No listeners registered for event");
            return;
        };

        tracing::trace!(
            event = event.name(),
            listeners = callbacks.len(),
            "Invoking event listeners"
        );

        for callback in callbacks {
            let event = event.clone();
            tokio::spawn(async move {
                callback(event).await;
            });
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let listeners = self.listeners.read();
        let total: usize = listeners.values().map(Vec::len).sum();
        f.debug_struct("EventBus")
            .field("events", &listeners.len())
            .field("listeners", &total)
            .finish()
    }
}
