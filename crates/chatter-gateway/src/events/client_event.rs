//! Typed events delivered to user listeners

use crate::shard::Shard;
use chatter_core::{Channel, Guild, GuildMember, Role, Snowflake, User};
use serde_json::Value;

/// Listener registration names, one per [`Event`] variant
pub mod names {
    /// Every raw dispatch, emitted only in debug mode
    pub const GATEWAY_DISPATCH: &str = "gateway_dispatch";
    /// One shard finished its guild backfill
    pub const SHARD_READY: &str = "shard_ready";
    /// All shards finished their guild backfill
    pub const READY: &str = "ready";

    pub const GUILD_AVAILABLE: &str = "guild_available";
    pub const GUILD_UNAVAILABLE: &str = "guild_unavailable";
    pub const GUILD_JOIN: &str = "guild_join";
    pub const GUILD_LEAVE: &str = "guild_leave";
    pub const GUILD_UPDATE: &str = "guild_update";

    pub const ROLE_CREATE: &str = "role_create";
    pub const ROLE_UPDATE: &str = "role_update";
    pub const ROLE_DELETE: &str = "role_delete";

    pub const MEMBER_JOIN: &str = "member_join";
    pub const MEMBER_UPDATE: &str = "member_update";
    pub const MEMBER_REMOVE: &str = "member_remove";

    pub const CHANNEL_CREATE: &str = "channel_create";
    pub const CHANNEL_UPDATE: &str = "channel_update";
    pub const CHANNEL_DELETE: &str = "channel_delete";
}

/// A typed event fanned out to user listeners
#[derive(Debug, Clone)]
pub enum Event {
    /// Raw dispatch re-emission; fires for every inbound event when debug
    /// mode is on, whether or not a named handler exists
    GatewayDispatch {
        shard: Shard,
        title: String,
        data: Value,
    },

    /// A shard's guild backfill has quieted down
    ShardReady { shard: Shard },
    /// Guild backfill across all shards has quieted down
    Ready,

    /// Guild became available during backfill or after an outage
    GuildAvailable { guild: Guild },
    /// Guild dropped to unavailable (remote outage)
    GuildUnavailable { guild_id: Snowflake },
    /// The client was added to a new guild
    GuildJoin { guild: Guild },
    /// The client left or was removed from a guild
    GuildLeave { guild_id: Snowflake },
    /// Guild settings changed
    GuildUpdate { guild: Guild },

    RoleCreate { guild_id: Snowflake, role: Role },
    RoleUpdate { guild_id: Snowflake, role: Role },
    RoleDelete { guild_id: Snowflake, role_id: Snowflake },

    MemberJoin { guild_id: Snowflake, member: GuildMember },
    MemberUpdate { guild_id: Snowflake, member: GuildMember },
    MemberRemove { guild_id: Snowflake, user: User },

    ChannelCreate { channel: Channel },
    ChannelUpdate { channel: Channel },
    ChannelDelete { channel: Channel },
}

impl Event {
    /// The registration name listeners subscribe under
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::GatewayDispatch { .. } => names::GATEWAY_DISPATCH,
            Self::ShardReady { .. } => names::SHARD_READY,
            Self::Ready => names::READY,
            Self::GuildAvailable { .. } => names::GUILD_AVAILABLE,
            Self::GuildUnavailable { .. } => names::GUILD_UNAVAILABLE,
            Self::GuildJoin { .. } => names::GUILD_JOIN,
            Self::GuildLeave { .. } => names::GUILD_LEAVE,
            Self::GuildUpdate { .. } => names::GUILD_UPDATE,
            Self::RoleCreate { .. } => names::ROLE_CREATE,
            Self::RoleUpdate { .. } => names::ROLE_UPDATE,
            Self::RoleDelete { .. } => names::ROLE_DELETE,
            Self::MemberJoin { .. } => names::MEMBER_JOIN,
            Self::MemberUpdate { .. } => names::MEMBER_UPDATE,
            Self::MemberRemove { .. } => names::MEMBER_REMOVE,
            Self::ChannelCreate { .. } => names::CHANNEL_CREATE,
            Self::ChannelUpdate { .. } => names::CHANNEL_UPDATE,
            Self::ChannelDelete { .. } => names::CHANNEL_DELETE,
        }
    }
}
