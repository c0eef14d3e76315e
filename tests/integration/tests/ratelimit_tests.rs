//! Rate-limit registry scenarios: mutual exclusion, bucket migration,
//! and the global throttle under concurrent request tasks

use chatter_core::Snowflake;
use chatter_rest::{Method, RatelimitRegistry, Route};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

fn roles_route(guild_id: u64) -> Route {
    Route::new(
        Method::GET,
        "/guilds/{guild_id}/roles",
        &[("guild_id", Snowflake::new(guild_id))],
    )
    .unwrap()
}

fn messages_route(channel_id: u64, message_id: u64) -> Route {
    Route::new(
        Method::DELETE,
        "/channels/{channel_id}/messages/{message_id}",
        &[
            ("channel_id", Snowflake::new(channel_id)),
            ("message_id", Snowflake::new(message_id)),
        ],
    )
    .unwrap()
}

#[tokio::test(start_paused = true)]
async fn requests_sharing_a_grouping_key_are_serialized() {
    let registry = Arc::new(RatelimitRegistry::new());
    let log = Arc::new(Mutex::new(Vec::new()));

    // Two simulated requests to equivalent descriptors; each holds the
    // gate across a simulated round trip
    let mut workers = Vec::new();
    for tag in ["first", "second"] {
        let registry = Arc::clone(&registry);
        let log = Arc::clone(&log);
        workers.push(tokio::spawn(async move {
            let route = messages_route(7, 1);
            registry.acquire_global().await;
            let guard = registry.acquire(&route).await;
            log.lock().push(format!("{tag}:acquired"));
            tokio::time::sleep(Duration::from_millis(50)).await;
            log.lock().push(format!("{tag}:released"));
            drop(guard);
        }));
    }

    for worker in workers {
        worker.await.unwrap();
    }

    // Whatever the order, an acquire never lands between the other
    // request's acquire and release
    let log = log.lock().clone();
    assert_eq!(log.len(), 4);
    assert_eq!(log[0].split(':').nth(1), Some("acquired"));
    assert_eq!(log[1].split(':').next(), log[0].split(':').next());
    assert_eq!(log[1].split(':').nth(1), Some("released"));
}

#[tokio::test(start_paused = true)]
async fn unrelated_grouping_keys_proceed_concurrently() {
    let registry = Arc::new(RatelimitRegistry::new());
    let in_flight = Arc::new(Mutex::new(0_u32));
    let peak = Arc::new(Mutex::new(0_u32));

    let mut workers = Vec::new();
    for guild_id in [1_u64, 2, 3] {
        let registry = Arc::clone(&registry);
        let in_flight = Arc::clone(&in_flight);
        let peak = Arc::clone(&peak);
        workers.push(tokio::spawn(async move {
            let route = roles_route(guild_id);
            let _guard = registry.acquire(&route).await;
            {
                let mut current = in_flight.lock();
                *current += 1;
                let mut peak = peak.lock();
                *peak = (*peak).max(*current);
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
            *in_flight.lock() -= 1;
        }));
    }

    for worker in workers {
        worker.await.unwrap();
    }

    // All three distinct buckets were held at once
    assert_eq!(*peak.lock(), 3);
}

#[tokio::test]
async fn bucket_learned_mid_hold_migrates_the_held_gate() {
    let registry = RatelimitRegistry::new();
    let route = roles_route(42);

    let guard = registry.acquire(&route).await;
    // First response for this grouping key reveals the server bucket
    registry.record_bucket(route.ratelimit_path(), "d1e8a2b4");

    assert!(registry.is_locked("d1e8a2b4"));
    assert!(registry.is_locked(route.ratelimit_path()));

    drop(guard);
    assert!(!registry.is_locked("d1e8a2b4"));

    // Later acquires resolve through the learned mapping to the same gate
    let _guard = registry.acquire(&route).await;
    assert!(registry.is_locked("d1e8a2b4"));
    assert_eq!(registry.gate_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn queued_requests_suspend_while_global_throttle_is_closed() {
    let registry = Arc::new(RatelimitRegistry::new());
    let completed = Arc::new(Mutex::new(0_u32));

    registry.set_global();

    let mut workers = Vec::new();
    for guild_id in [1_u64, 2] {
        let registry = Arc::clone(&registry);
        let completed = Arc::clone(&completed);
        workers.push(tokio::spawn(async move {
            registry.acquire_global().await;
            let _guard = registry.acquire(&roles_route(guild_id)).await;
            *completed.lock() += 1;
        }));
    }

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(*completed.lock(), 0);

    registry.reset_global();
    for worker in workers {
        worker.await.unwrap();
    }
    assert_eq!(*completed.lock(), 2);
}

#[tokio::test]
async fn clear_discards_bucket_mappings_for_a_new_epoch() {
    let registry = RatelimitRegistry::new();
    let route = roles_route(42);

    {
        let _guard = registry.acquire(&route).await;
    }
    registry.record_bucket(route.ratelimit_path(), "old-epoch-bucket");
    assert_eq!(registry.bucket_count(), 1);

    registry.clear();
    assert_eq!(registry.gate_count(), 0);
    assert_eq!(registry.bucket_count(), 0);

    // A fresh epoch starts from the provisional grouping key again
    let _guard = registry.acquire(&route).await;
    assert!(registry.is_locked(route.ratelimit_path()));
    assert!(!registry.is_locked("old-epoch-bucket"));
}

#[tokio::test]
async fn two_grouping_keys_converging_on_one_bucket_stay_exclusive() {
    let registry = Arc::new(RatelimitRegistry::new());
    let get_route = messages_route(7, 1);
    let delete_route = roles_route(7);

    // Both provisional keys learn the same server bucket
    registry.record_bucket(get_route.ratelimit_path(), "shared-bucket");
    registry.record_bucket(delete_route.ratelimit_path(), "shared-bucket");

    let guard = registry.acquire(&get_route).await;
    assert!(registry.is_locked(delete_route.ratelimit_path()));

    // The other route's acquire must block until release
    {
        let registry = Arc::clone(&registry);
        tokio::select! {
            _ = registry.acquire(&delete_route) => panic!("shared bucket acquired twice"),
            () = tokio::time::sleep(Duration::from_millis(20)) => {}
        }
    }

    drop(guard);
    let _guard = registry.acquire(&delete_route).await;
}
