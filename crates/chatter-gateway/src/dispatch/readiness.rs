//! Readiness coordination
//!
//! A shard is ready once guild-availability traffic on it has been quiet
//! for one full debounce window; the client as a whole is ready once
//! arrivals across every shard have been quiet for one window, counted
//! only after all shards finished connecting. Backfill bursts keep
//! resetting the clock, so neither signal fires mid-burst.
//!
//! Aggregate readiness is a function of combined arrival quiescence, not
//! a conjunction of the per-shard signals; the two scopes run
//! independently and may complete in either order.

use crate::bus::EventBus;
use crate::events::Event;
use crate::shard::{ConnectSignal, Shard};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::timeout;

#[derive(Default)]
struct ReadyState {
    /// Shards whose per-shard wait has been started this lifetime
    shards_started: HashSet<u32>,
    /// Whether the aggregate wait has been started this lifetime
    aggregate_started: bool,
    /// Whether the aggregate ready event has fired this lifetime
    aggregate_emitted: bool,
}

/// Tracks per-shard and aggregate readiness for one connection lifetime
///
/// Emits `shard_ready` exactly once per shard and `ready` exactly once,
/// until [`reset`](Self::reset) begins a new lifetime.
pub struct ReadinessCoordinator {
    ready_timeout: Duration,
    connect_signal: Arc<ConnectSignal>,
    bus: Arc<EventBus>,
    state: Mutex<ReadyState>,
    /// Notify slots of every currently armed quiescence wait
    waiters: Mutex<Vec<Arc<Notify>>>,
    /// In-flight background waits, for shutdown
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl ReadinessCoordinator {
    /// Create a coordinator with the given debounce window
    #[must_use]
    pub fn new(
        ready_timeout: Duration,
        connect_signal: Arc<ConnectSignal>,
        bus: Arc<EventBus>,
    ) -> Self {
        Self {
            ready_timeout,
            connect_signal,
            bus,
            state: Mutex::new(ReadyState::default()),
            waiters: Mutex::new(Vec::new()),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Begin readiness collection for a shard that just established its
    /// session
    ///
    /// Spawns the shard's own quiescence wait, and the aggregate wait if
    /// no shard has started it yet this lifetime. A repeated session
    /// payload for the same shard is ignored so both signals stay
    /// exactly-once.
    pub fn begin_shard(self: &Arc<Self>, shard: Shard, guild_count: usize) {
        {
            let mut state = self.state.lock();
            if !state.shards_started.insert(shard.id) {
                tracing::warn!(%shard, "Duplicate session payload, readiness already tracked");
                return;
            }
        }

        tracing::info!(%shard, guilds = guild_count, "Collecting guild backfill before readiness");

        let this = Arc::clone(self);
        let handle = tokio::spawn(async move {
            this.quiesce().await;
            tracing::debug!(%shard, "Shard guild backfill quiesced");
            this.bus.invoke(Event::ShardReady { shard });
        });
        self.tasks.lock().push(handle);

        // Only the first shard of a lifetime launches the aggregate wait
        let start_aggregate = {
            let mut state = self.state.lock();
            !std::mem::replace(&mut state.aggregate_started, true)
        };

        if start_aggregate {
            let this = Arc::clone(self);
            let handle = tokio::spawn(async move {
                // All shards must have opened their streams before the
                // aggregate window starts counting
                this.connect_signal.wait().await;
                this.quiesce().await;
                this.state.lock().aggregate_emitted = true;
                tracing::info!("Guild backfill quiesced across all shards");
                this.bus.invoke(Event::Ready);
            });
            self.tasks.lock().push(handle);
        }
    }

    /// Resolve every currently armed quiescence wait
    ///
    /// Called for each guild-availability arrival, cached or not.
    pub fn notify_guild_arrival(&self) {
        for waiter in self.waiters.lock().iter() {
            waiter.notify_one();
        }
    }

    /// Whether any quiescence wait is currently armed
    pub fn collecting(&self) -> bool {
        !self.waiters.lock().is_empty()
    }

    /// Whether the aggregate ready event has fired this lifetime
    pub fn is_ready(&self) -> bool {
        self.state.lock().aggregate_emitted
    }

    /// Debounce loop: exit only after a full window without an arrival
    async fn quiesce(&self) {
        let slot = Arc::new(Notify::new());
        self.waiters.lock().push(Arc::clone(&slot));

        loop {
            match timeout(self.ready_timeout, slot.notified()).await {
                // An arrival landed inside the window; restart the clock
                Ok(()) => {}
                // A full window passed quietly
                Err(_) => break,
            }
        }

        // Disarm so a later idle period cannot re-resolve this slot
        self.waiters
            .lock()
            .retain(|waiter| !Arc::ptr_eq(waiter, &slot));
    }

    /// Abort every in-flight wait
    ///
    /// Called on client shutdown so suspended waits do not leak across
    /// restarts.
    pub fn shutdown(&self) {
        for task in self.tasks.lock().drain(..) {
            task.abort();
        }
        self.waiters.lock().clear();
        tracing::debug!("Readiness coordinator shut down");
    }

    /// Begin a new connection lifetime
    ///
    /// Aborts in-flight waits and re-arms both exactly-once signals; used
    /// after the session is invalidated and re-identified.
    pub fn reset(&self) {
        self.shutdown();
        *self.state.lock() = ReadyState::default();
        tracing::debug!("Readiness coordinator reset for a new session");
    }
}

impl std::fmt::Debug for ReadinessCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ReadinessCoordinator")
            .field("ready_timeout", &self.ready_timeout)
            .field("shards_started", &state.shards_started.len())
            .field("aggregate_started", &state.aggregate_started)
            .field("aggregate_emitted", &state.aggregate_emitted)
            .field("armed_waits", &self.waiters.lock().len())
            .finish()
    }
}
