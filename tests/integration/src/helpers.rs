//! Test helpers for integration tests

use chatter_cache::ClientCache;
use chatter_common::GatewayConfig;
use chatter_gateway::{
    ConnectSignal, DispatchError, DispatchHandler, Event, EventBus, Shard,
};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// A fully wired client core with a simulated transport boundary
pub struct TestClient {
    pub cache: Arc<ClientCache>,
    pub bus: Arc<EventBus>,
    pub signal: Arc<ConnectSignal>,
    pub dispatch: DispatchHandler,
}

impl TestClient {
    /// Wire up a client with the given gateway configuration
    #[must_use]
    pub fn new(config: GatewayConfig) -> Self {
        let cache = Arc::new(ClientCache::new());
        let bus = Arc::new(EventBus::new());
        let signal = Arc::new(ConnectSignal::new());
        let dispatch = DispatchHandler::new(
            &config,
            Arc::clone(&cache),
            Arc::clone(&bus),
            Arc::clone(&signal),
        );

        Self {
            cache,
            bus,
            signal,
            dispatch,
        }
    }

    /// Wire up a client with default configuration (2s window, no debug)
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(GatewayConfig::default())
    }

    /// Deliver one decoded gateway event, as the transport would
    pub async fn deliver(
        &self,
        shard: Shard,
        title: &str,
        data: Value,
    ) -> Result<(), DispatchError> {
        self.dispatch.handle(shard, title, data).await
    }
}

/// Records events arriving on one bus name, with virtual-clock timestamps
pub struct EventRecorder {
    hits: Arc<Mutex<Vec<(String, Duration)>>>,
}

impl EventRecorder {
    /// Attach a recording listener to the bus
    #[must_use]
    pub fn attach(bus: &EventBus, name: &'static str) -> Self {
        let hits = Arc::new(Mutex::new(Vec::new()));
        let start = Instant::now();
        {
            let hits = Arc::clone(&hits);
            bus.on(name, move |event: Event| {
                let hits = Arc::clone(&hits);
                async move {
                    hits.lock().push((event.name().to_string(), start.elapsed()));
                }
            });
        }
        Self { hits }
    }

    /// Number of recorded events
    pub fn count(&self) -> usize {
        self.hits.lock().len()
    }

    /// Elapsed times at which the events fired
    pub fn times(&self) -> Vec<Duration> {
        self.hits.lock().iter().map(|(_, at)| *at).collect()
    }
}

/// Yield enough times for spawned listener and readiness tasks to run
pub async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

/// Advance the paused test clock and let woken tasks run
pub async fn advance(duration: Duration) {
    tokio::time::advance(duration).await;
    settle().await;
}
