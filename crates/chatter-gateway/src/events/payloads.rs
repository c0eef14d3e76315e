//! Wire payload shapes consumed by the named dispatch handlers

use chatter_core::{CurrentUser, GuildMember, Role, Snowflake, User};
use serde::Deserialize;

/// READY payload: the session identity plus guild stubs to backfill
#[derive(Debug, Deserialize)]
pub(crate) struct ReadyPayload {
    pub user: CurrentUser,
    #[serde(default)]
    pub guilds: Vec<GuildStub>,
    #[allow(dead_code)]
    pub session_id: Option<String>,
}

/// Stub guild reference carried in READY
#[derive(Debug, Deserialize)]
pub(crate) struct GuildStub {
    #[allow(dead_code)]
    pub id: Snowflake,
    #[serde(default)]
    #[allow(dead_code)]
    pub unavailable: bool,
}

/// GUILD_DELETE payload: `unavailable` distinguishes outage from removal
#[derive(Debug, Deserialize)]
pub(crate) struct GuildDeletePayload {
    pub id: Snowflake,
    #[serde(default)]
    pub unavailable: bool,
}

/// GUILD_ROLE_CREATE / GUILD_ROLE_UPDATE payload
#[derive(Debug, Deserialize)]
pub(crate) struct RolePayload {
    pub guild_id: Snowflake,
    pub role: Role,
}

/// GUILD_ROLE_DELETE payload
#[derive(Debug, Deserialize)]
pub(crate) struct RoleDeletePayload {
    pub guild_id: Snowflake,
    pub role_id: Snowflake,
}

/// GUILD_MEMBER_ADD / GUILD_MEMBER_UPDATE payload: a member object with
/// the guild id spliced in
#[derive(Debug, Deserialize)]
pub(crate) struct MemberPayload {
    pub guild_id: Snowflake,
    #[serde(flatten)]
    pub member: GuildMember,
}

/// GUILD_MEMBER_REMOVE payload
#[derive(Debug, Deserialize)]
pub(crate) struct MemberRemovePayload {
    pub guild_id: Snowflake,
    pub user: User,
}
