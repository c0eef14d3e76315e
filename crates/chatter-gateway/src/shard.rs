//! Shard handle and the all-shards-connected signal

use std::fmt;
use tokio::sync::watch;

/// Handle identifying one gateway connection
///
/// Carried on every dispatch so handlers know which connection an event
/// arrived on. The transport owns the connection itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shard {
    /// Zero-based shard index
    pub id: u32,
    /// Total number of shards in this session
    pub total: u32,
}

impl Shard {
    /// Create a shard handle
    #[must_use]
    pub fn new(id: u32, total: u32) -> Self {
        Self { id, total }
    }
}

impl fmt::Display for Shard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shard {}/{}", self.id, self.total)
    }
}

/// One-shot gate set once every shard has completed its connect handshake
///
/// Set by the external shard manager; awaited by the aggregate readiness
/// wait before it starts timing guild backfill.
pub struct ConnectSignal {
    connected: watch::Sender<bool>,
}

impl ConnectSignal {
    /// Create an unset signal
    #[must_use]
    pub fn new() -> Self {
        let (connected, _) = watch::channel(false);
        Self { connected }
    }

    /// Mark all shards as connected, waking every waiter
    pub fn set(&self) {
        self.connected.send_replace(true);
    }

    /// Re-arm for a new connection epoch
    pub fn reset(&self) {
        self.connected.send_replace(false);
    }

    /// Whether the signal is currently set
    pub fn is_set(&self) -> bool {
        *self.connected.borrow()
    }

    /// Suspend until the signal is set
    pub async fn wait(&self) {
        let mut rx = self.connected.subscribe();
        // Only fails when the sender is gone, which cannot outlive `self`.
        let _ = rx.wait_for(|connected| *connected).await;
    }
}

impl Default for ConnectSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConnectSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectSignal")
            .field("set", &self.is_set())
            .finish()
    }
}
