//! Payload fixtures shaped like real gateway dispatches

use serde_json::{json, Value};

/// READY payload for a session seeing `guild_ids` as unavailable stubs
#[must_use]
pub fn ready_payload(user_id: u64, guild_ids: &[u64]) -> Value {
    let guilds: Vec<Value> = guild_ids
        .iter()
        .map(|id| json!({"id": id.to_string(), "unavailable": true}))
        .collect();

    json!({
        "v": 10,
        "user": {
            "id": user_id.to_string(),
            "username": "fixture-bot",
            "discriminator": "0001",
            "avatar": null,
            "bot": true,
        },
        "guilds": guilds,
        "session_id": "fixture-session",
    })
}

/// GUILD_CREATE payload for an available guild with one role and channel
#[must_use]
pub fn guild_payload(guild_id: u64) -> Value {
    json!({
        "id": guild_id.to_string(),
        "name": format!("guild-{guild_id}"),
        "icon": null,
        "owner_id": "1",
        "member_count": 3,
        "roles": [
            {"id": guild_id.to_string(), "name": "@everyone", "permissions": "1071698529857"},
        ],
        "channels": [
            {
                "id": (guild_id + 1).to_string(),
                "type": 0,
                "guild_id": guild_id.to_string(),
                "name": "general",
            },
        ],
    })
}

/// GUILD_CREATE payload for a guild that is still unavailable
#[must_use]
pub fn unavailable_guild_payload(guild_id: u64) -> Value {
    json!({
        "id": guild_id.to_string(),
        "unavailable": true,
    })
}

/// GUILD_ROLE_CREATE / GUILD_ROLE_UPDATE payload
#[must_use]
pub fn role_payload(guild_id: u64, role_id: u64, name: &str) -> Value {
    json!({
        "guild_id": guild_id.to_string(),
        "role": {
            "id": role_id.to_string(),
            "name": name,
            "permissions": "0",
            "position": 2,
        },
    })
}

/// GUILD_MEMBER_ADD payload
#[must_use]
pub fn member_add_payload(guild_id: u64, user_id: u64, username: &str) -> Value {
    json!({
        "guild_id": guild_id.to_string(),
        "user": {
            "id": user_id.to_string(),
            "username": username,
            "discriminator": "1337",
            "avatar": null,
        },
        "nick": null,
        "roles": [],
        "joined_at": "2022-03-01T12:00:00+00:00",
    })
}
