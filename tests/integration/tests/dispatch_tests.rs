//! Dispatch routing scenarios: unknown titles, debug re-emission, cache
//! synchronization, and error propagation

use chatter_common::GatewayConfig;
use chatter_core::Snowflake;
use chatter_gateway::{names, DispatchError, Shard};
use integration_tests::{
    guild_payload, member_add_payload, role_payload, settle, EventRecorder, TestClient,
};
use serde_json::json;

fn shard() -> Shard {
    Shard::new(0, 1)
}

#[tokio::test]
async fn unknown_titles_are_ignored_without_error() {
    let client = TestClient::with_defaults();

    client
        .deliver(shard(), "SOME_FUTURE_EVENT", json!({"anything": true}))
        .await
        .unwrap();
    client
        .deliver(shard(), "PRESENCE_UPDATE", json!({"user": {"id": "1"}}))
        .await
        .unwrap();
}

#[tokio::test]
async fn debug_mode_emits_raw_dispatch_exactly_once_per_event() {
    let client = TestClient::new(GatewayConfig {
        debug_events: true,
        ..GatewayConfig::default()
    });
    let raw = EventRecorder::attach(&client.bus, names::GATEWAY_DISPATCH);
    let roles = EventRecorder::attach(&client.bus, names::ROLE_CREATE);

    // A handled title and an unknown one both re-emit the raw dispatch
    client
        .deliver(shard(), "GUILD_ROLE_CREATE", role_payload(100, 7, "ops"))
        .await
        .unwrap();
    client
        .deliver(shard(), "SOME_FUTURE_EVENT", json!({}))
        .await
        .unwrap();
    settle().await;

    assert_eq!(raw.count(), 2);
    assert_eq!(roles.count(), 1);
}

#[tokio::test]
async fn cache_follows_a_guild_lifecycle() {
    let client = TestClient::with_defaults();

    client
        .deliver(shard(), "GUILD_CREATE", guild_payload(100))
        .await
        .unwrap();
    assert_eq!(client.cache.guild_count(), 1);
    assert!(client.cache.role(Snowflake::new(100)).is_some());
    assert!(client.cache.channel(Snowflake::new(101)).is_some());

    client
        .deliver(shard(), "GUILD_ROLE_CREATE", role_payload(100, 7, "ops"))
        .await
        .unwrap();
    assert_eq!(client.cache.role(Snowflake::new(7)).unwrap().name, "ops");

    client
        .deliver(shard(), "GUILD_ROLE_UPDATE", role_payload(100, 7, "admins"))
        .await
        .unwrap();
    assert_eq!(client.cache.role(Snowflake::new(7)).unwrap().name, "admins");

    client
        .deliver(shard(), "GUILD_MEMBER_ADD", member_add_payload(100, 9, "nelly"))
        .await
        .unwrap();
    assert_eq!(client.cache.user(Snowflake::new(9)).unwrap().username, "nelly");

    // Leaving the guild evicts it and everything indexed under it
    client
        .deliver(shard(), "GUILD_DELETE", json!({"id": "100"}))
        .await
        .unwrap();
    assert_eq!(client.cache.guild_count(), 0);
    assert!(client.cache.role(Snowflake::new(7)).is_none());
    assert!(client.cache.channel(Snowflake::new(101)).is_none());
}

#[tokio::test]
async fn handler_failure_propagates_and_later_events_still_flow() {
    let client = TestClient::with_defaults();

    let err = client
        .deliver(shard(), "GUILD_ROLE_CREATE", json!({"guild_id": 3.5}))
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::Payload { .. }));

    // The dispatcher is unaffected by the failed event
    client
        .deliver(shard(), "GUILD_ROLE_CREATE", role_payload(100, 7, "ops"))
        .await
        .unwrap();
    assert!(client.cache.role(Snowflake::new(7)).is_some());
}

#[tokio::test]
async fn member_events_fan_out_with_guild_context() {
    let client = TestClient::with_defaults();
    let joins = EventRecorder::attach(&client.bus, names::MEMBER_JOIN);
    let removes = EventRecorder::attach(&client.bus, names::MEMBER_REMOVE);

    client
        .deliver(shard(), "GUILD_MEMBER_ADD", member_add_payload(100, 9, "nelly"))
        .await
        .unwrap();
    client
        .deliver(
            shard(),
            "GUILD_MEMBER_REMOVE",
            json!({
                "guild_id": "100",
                "user": {"id": "9", "username": "nelly", "discriminator": "1337", "avatar": null},
            }),
        )
        .await
        .unwrap();
    settle().await;

    assert_eq!(joins.count(), 1);
    assert_eq!(removes.count(), 1);
}
