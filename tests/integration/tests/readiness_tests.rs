//! End-to-end readiness scenarios across the dispatch boundary

use chatter_common::GatewayConfig;
use chatter_core::Snowflake;
use chatter_gateway::{names, Shard};
use integration_tests::{
    advance, guild_payload, ready_payload, settle, unavailable_guild_payload, EventRecorder,
    TestClient,
};
use std::time::Duration;

fn two_second_window() -> GatewayConfig {
    GatewayConfig {
        ready_timeout: Duration::from_secs(2),
        debug_events: false,
    }
}

#[tokio::test(start_paused = true)]
async fn ready_fires_after_one_quiet_window_with_no_guilds() {
    let client = TestClient::new(two_second_window());
    client.signal.set();
    let ready = EventRecorder::attach(&client.bus, names::READY);
    let shard_ready = EventRecorder::attach(&client.bus, names::SHARD_READY);

    client
        .deliver(Shard::new(0, 1), "READY", ready_payload(1, &[]))
        .await
        .unwrap();
    settle().await;

    advance(Duration::from_secs(2)).await;

    assert_eq!(ready.times(), vec![Duration::from_secs(2)]);
    assert_eq!(shard_ready.times(), vec![Duration::from_secs(2)]);
}

#[tokio::test(start_paused = true)]
async fn backfill_bursts_keep_resetting_the_ready_clock() {
    let client = TestClient::new(two_second_window());
    client.signal.set();
    let ready = EventRecorder::attach(&client.bus, names::READY);

    let shard = Shard::new(0, 1);
    client
        .deliver(shard, "READY", ready_payload(1, &[100, 200, 300]))
        .await
        .unwrap();
    settle().await;

    // Guilds arrive at t = 0.5s, 1.0s, 1.5s
    for guild_id in [100, 200, 300] {
        advance(Duration::from_millis(500)).await;
        client
            .deliver(shard, "GUILD_CREATE", guild_payload(guild_id))
            .await
            .unwrap();
        settle().await;
    }

    // Quiet but not yet a full window after the last arrival
    advance(Duration::from_millis(1999)).await;
    assert_eq!(ready.count(), 0);

    // Two full seconds after the last arrival: t = 3.5s
    advance(Duration::from_millis(1)).await;
    assert_eq!(ready.times(), vec![Duration::from_millis(3500)]);
}

#[tokio::test(start_paused = true)]
async fn three_shards_emit_exactly_one_ready_each_and_one_aggregate() {
    let client = TestClient::new(two_second_window());
    let ready = EventRecorder::attach(&client.bus, names::READY);
    let shard_ready = EventRecorder::attach(&client.bus, names::SHARD_READY);

    // Shards identify at slightly different times, before the connect
    // signal is set
    for shard_id in 0..3 {
        client
            .deliver(
                Shard::new(shard_id, 3),
                "READY",
                ready_payload(1, &[u64::from(shard_id) * 100 + 100]),
            )
            .await
            .unwrap();
        settle().await;
        advance(Duration::from_millis(100)).await;
    }

    client.signal.set();
    settle().await;

    // Overlapping backfill from all three shards
    for (shard_id, guild_id) in [(0_u32, 100_u64), (1, 200), (2, 300)] {
        client
            .deliver(Shard::new(shard_id, 3), "GUILD_CREATE", guild_payload(guild_id))
            .await
            .unwrap();
        settle().await;
        advance(Duration::from_millis(300)).await;
    }

    advance(Duration::from_secs(3)).await;

    assert_eq!(shard_ready.count(), 3);
    assert_eq!(ready.count(), 1);
    assert!(client.dispatch.readiness().is_ready());

    // Long-idle periods afterwards must not re-trigger either signal
    advance(Duration::from_secs(30)).await;
    assert_eq!(shard_ready.count(), 3);
    assert_eq!(ready.count(), 1);
}

#[tokio::test(start_paused = true)]
async fn aggregate_ready_counts_only_after_all_shards_connected() {
    let client = TestClient::new(two_second_window());
    let ready = EventRecorder::attach(&client.bus, names::READY);

    client
        .deliver(Shard::new(0, 2), "READY", ready_payload(1, &[100]))
        .await
        .unwrap();
    settle().await;

    // Plenty of quiet time, but the second shard has not connected
    advance(Duration::from_secs(10)).await;
    assert_eq!(ready.count(), 0);

    client.signal.set();
    settle().await;
    advance(Duration::from_secs(2)).await;

    assert_eq!(ready.count(), 1);
}

#[tokio::test(start_paused = true)]
async fn unavailable_guild_feeds_the_debounce_without_entering_cache() {
    let client = TestClient::new(two_second_window());
    client.signal.set();
    let ready = EventRecorder::attach(&client.bus, names::READY);

    let shard = Shard::new(0, 1);
    client
        .deliver(shard, "READY", ready_payload(1, &[100]))
        .await
        .unwrap();
    settle().await;

    advance(Duration::from_secs(1)).await;
    client
        .deliver(shard, "GUILD_CREATE", unavailable_guild_payload(100))
        .await
        .unwrap();
    settle().await;

    assert!(client.cache.guild(Snowflake::new(100)).is_none());

    // The arrival at t = 1s pushed the deadline to t = 3s
    advance(Duration::from_millis(1999)).await;
    assert_eq!(ready.count(), 0);
    advance(Duration::from_millis(1)).await;
    assert_eq!(ready.times(), vec![Duration::from_secs(3)]);
}

#[tokio::test(start_paused = true)]
async fn guilds_are_available_during_backfill_and_joins_after_ready() {
    let client = TestClient::new(two_second_window());
    client.signal.set();
    let available = EventRecorder::attach(&client.bus, names::GUILD_AVAILABLE);
    let joins = EventRecorder::attach(&client.bus, names::GUILD_JOIN);

    let shard = Shard::new(0, 1);
    client
        .deliver(shard, "READY", ready_payload(1, &[100]))
        .await
        .unwrap();
    settle().await;

    client
        .deliver(shard, "GUILD_CREATE", guild_payload(100))
        .await
        .unwrap();
    settle().await;
    assert_eq!(available.count(), 1);
    assert_eq!(joins.count(), 0);

    // Let readiness land, then a brand-new guild arrives
    advance(Duration::from_secs(3)).await;
    client
        .deliver(shard, "GUILD_CREATE", guild_payload(900))
        .await
        .unwrap();
    settle().await;

    assert_eq!(available.count(), 1);
    assert_eq!(joins.count(), 1);
}

#[tokio::test(start_paused = true)]
async fn reset_starts_a_fresh_exactly_once_lifetime() {
    let client = TestClient::new(two_second_window());
    client.signal.set();
    let ready = EventRecorder::attach(&client.bus, names::READY);

    let shard = Shard::new(0, 1);
    client
        .deliver(shard, "READY", ready_payload(1, &[]))
        .await
        .unwrap();
    settle().await;
    advance(Duration::from_secs(2)).await;
    assert_eq!(ready.count(), 1);

    // Session invalidated: cache and readiness restart together
    client.cache.clear();
    client.dispatch.readiness().reset();

    client
        .deliver(shard, "READY", ready_payload(1, &[]))
        .await
        .unwrap();
    settle().await;
    advance(Duration::from_secs(2)).await;

    assert_eq!(ready.count(), 2);
}
