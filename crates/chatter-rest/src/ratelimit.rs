//! Rate-limit registry
//!
//! Serializes outbound requests per remote-assigned bucket while honoring
//! a global throttle shared by every request. Bucket ids are only revealed
//! by response headers, so gates are first keyed by a route's provisional
//! grouping key and migrated to the bucket id once it is learned.
//!
//! The maps are guarded by a synchronous lock that is never held across an
//! await point; gate acquisition happens strictly after resolution, on the
//! `Arc` pulled out of the map. Migration therefore moves the very same
//! gate object, preserving any in-flight hold.

use crate::routes::Route;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{watch, Mutex as AsyncMutex, OwnedMutexGuard};

/// Exclusive hold on one rate-limit bucket
///
/// The bucket is released when the guard drops, on every exit path.
#[derive(Debug)]
pub struct BucketGuard {
    _permit: OwnedMutexGuard<()>,
}

#[derive(Default)]
struct RegistryInner {
    /// Gates keyed by bucket id once learned, provisional grouping key
    /// before that
    gates: HashMap<String, Arc<AsyncMutex<()>>>,
    /// Learned grouping key -> bucket id mappings
    buckets: HashMap<String, String>,
}

/// Tracks per-bucket exclusive gates and the global throttle gate
///
/// Process-wide; reset wholesale with [`clear`](Self::clear) when the
/// session is re-identified, since bucket ids are connection-epoch-scoped.
pub struct RatelimitRegistry {
    /// Global throttle; `true` means requests may proceed
    global_open: watch::Sender<bool>,
    inner: Mutex<RegistryInner>,
}

impl RatelimitRegistry {
    /// Create a registry with the global gate open
    #[must_use]
    pub fn new() -> Self {
        let (global_open, _) = watch::channel(true);
        Self {
            global_open,
            inner: Mutex::new(RegistryInner::default()),
        }
    }

    /// Suspend until the global throttle gate is open
    ///
    /// Awaited before every request attempt, including retries.
    pub async fn acquire_global(&self) {
        let mut rx = self.global_open.subscribe();
        // Only fails when the sender is gone, which cannot outlive `self`.
        let _ = rx.wait_for(|open| *open).await;
    }

    /// Close the global gate, suspending all new request attempts
    pub fn set_global(&self) {
        self.global_open.send_replace(false);
        tracing::warn!("Global ratelimit engaged, blocking outbound requests");
    }

    /// Reopen the global gate, waking every suspended request
    pub fn reset_global(&self) {
        self.global_open.send_replace(true);
        tracing::info!("Global ratelimit cleared, outbound requests resumed");
    }

    /// Whether the global gate is currently open
    pub fn global_open(&self) -> bool {
        *self.global_open.borrow()
    }

    /// Acquire exclusive hold of the route's bucket
    ///
    /// Suspends while another request holds the same gate.
    pub async fn acquire(&self, route: &Route) -> BucketGuard {
        self.acquire_path(route.ratelimit_path()).await
    }

    /// Acquire by raw grouping key or bucket id
    pub async fn acquire_path(&self, path: &str) -> BucketGuard {
        let gate = self.resolve_gate(path);
        BucketGuard {
            _permit: gate.lock_owned().await,
        }
    }

    /// Resolve a grouping key to its current gate, creating one on first use
    fn resolve_gate(&self, path: &str) -> Arc<AsyncMutex<()>> {
        let mut inner = self.inner.lock();
        let key = inner
            .buckets
            .get(path)
            .cloned()
            .unwrap_or_else(|| path.to_string());

        inner
            .gates
            .entry(key)
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Record the bucket id the server assigned to a grouping key
    ///
    /// Any gate stored under the grouping key migrates to the bucket id in
    /// the same critical section, keeping its held state. When the bucket
    /// id already owns a gate (another grouping key learned it first) the
    /// existing gate wins and the provisional one is dropped, so mutual
    /// exclusion per bucket is never widened. Idempotent.
    pub fn record_bucket(&self, path: &str, bucket: &str) {
        let mut inner = self.inner.lock();

        if let Some(gate) = inner.gates.remove(path) {
            inner.gates.entry(bucket.to_string()).or_insert(gate);
        }
        inner.buckets.insert(path.to_string(), bucket.to_string());

        tracing::trace!(path, bucket, "Ratelimit bucket recorded");
    }

    /// Whether the gate behind a grouping key or bucket id is held
    pub fn is_locked(&self, key: &str) -> bool {
        let inner = self.inner.lock();
        let resolved = inner.buckets.get(key).map_or(key, String::as_str);
        inner
            .gates
            .get(resolved)
            .is_some_and(|gate| gate.try_lock().is_err())
    }

    /// Number of live gates
    pub fn gate_count(&self) -> usize {
        self.inner.lock().gates.len()
    }

    /// Number of learned grouping-key -> bucket mappings
    pub fn bucket_count(&self) -> usize {
        self.inner.lock().buckets.len()
    }

    /// Drop all gates and mappings
    ///
    /// Called on full session re-identification; bucket assignments do not
    /// survive a reconnect epoch. The global gate is left as-is: a global
    /// throttle is a service-wide condition, not a connection artifact.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.gates.clear();
        inner.buckets.clear();
        tracing::debug!("Ratelimit registry cleared");
    }
}

impl Default for RatelimitRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RatelimitRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("RatelimitRegistry")
            .field("gates", &inner.gates.len())
            .field("buckets", &inner.buckets.len())
            .field("global_open", &*self.global_open.borrow())
            .finish()
    }
}
