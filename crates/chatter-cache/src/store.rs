//! Client object cache
//!
//! Uses `DashMap` for concurrent access. Guild payloads are the unit of
//! ingestion; roles and channels are additionally indexed by their own id
//! so cross-guild lookups stay O(1).

use chatter_core::{Channel, CurrentUser, Guild, Role, Snowflake, User};
use dashmap::DashMap;
use parking_lot::RwLock;

/// A role together with the guild it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedRole {
    pub guild_id: Snowflake,
    pub role: Role,
}

/// In-memory cache of entities observed on the gateway
///
/// Writes come exclusively from dispatch-handling tasks; all operations
/// upsert, overwriting on key collision.
pub struct ClientCache {
    /// The authenticated user, set by the initial session payload
    current_user: RwLock<Option<CurrentUser>>,
    /// Users by id
    users: DashMap<Snowflake, User>,
    /// Guilds by id
    guilds: DashMap<Snowflake, Guild>,
    /// Role index across all guilds
    roles: DashMap<Snowflake, CachedRole>,
    /// Channel index across all guilds
    channels: DashMap<Snowflake, Channel>,
}

impl ClientCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self {
            current_user: RwLock::new(None),
            users: DashMap::new(),
            guilds: DashMap::new(),
            roles: DashMap::new(),
            channels: DashMap::new(),
        }
    }

    /// Record the authenticated user
    pub fn set_current_user(&self, user: CurrentUser) {
        *self.current_user.write() = Some(user);
    }

    /// Get the authenticated user, if the session payload has arrived
    pub fn current_user(&self) -> Option<CurrentUser> {
        self.current_user.read().clone()
    }

    /// Upsert a user
    pub fn add_user(&self, user: User) {
        self.users.insert(user.id, user);
    }

    /// Get a user by id
    pub fn user(&self, id: Snowflake) -> Option<User> {
        self.users.get(&id).map(|entry| entry.clone())
    }

    /// Upsert a guild and index its roles and channels
    pub fn add_guild(&self, guild: Guild) {
        for role in &guild.roles {
            self.roles.insert(
                role.id,
                CachedRole {
                    guild_id: guild.id,
                    role: role.clone(),
                },
            );
        }
        for channel in &guild.channels {
            self.channels.insert(channel.id, channel.clone());
        }

        tracing::trace!(guild_id = %guild.id, roles = guild.roles.len(), "Guild cached");
        self.guilds.insert(guild.id, guild);
    }

    /// Get a guild by id
    pub fn guild(&self, id: Snowflake) -> Option<Guild> {
        self.guilds.get(&id).map(|entry| entry.clone())
    }

    /// Remove a guild and everything indexed under it
    pub fn remove_guild(&self, id: Snowflake) -> Option<Guild> {
        self.roles.retain(|_, cached| cached.guild_id != id);
        self.channels.retain(|_, channel| channel.guild_id != Some(id));
        self.guilds.remove(&id).map(|(_, guild)| guild)
    }

    /// Upsert a single role
    pub fn add_role(&self, guild_id: Snowflake, role: Role) {
        self.roles.insert(role.id, CachedRole { guild_id, role });
    }

    /// Get a role by id, looked up across all cached guilds
    pub fn role(&self, id: Snowflake) -> Option<Role> {
        self.roles.get(&id).map(|entry| entry.role.clone())
    }

    /// Get a role together with its owning guild id
    pub fn role_entry(&self, id: Snowflake) -> Option<CachedRole> {
        self.roles.get(&id).map(|entry| entry.clone())
    }

    /// Remove a role by id
    pub fn remove_role(&self, id: Snowflake) -> Option<Role> {
        self.roles.remove(&id).map(|(_, cached)| cached.role)
    }

    /// Upsert a single channel
    pub fn add_channel(&self, channel: Channel) {
        self.channels.insert(channel.id, channel);
    }

    /// Get a channel by id, looked up across all cached guilds
    pub fn channel(&self, id: Snowflake) -> Option<Channel> {
        self.channels.get(&id).map(|entry| entry.clone())
    }

    /// Remove a channel by id
    pub fn remove_channel(&self, id: Snowflake) -> Option<Channel> {
        self.channels.remove(&id).map(|(_, channel)| channel)
    }

    /// Number of cached guilds
    pub fn guild_count(&self) -> usize {
        self.guilds.len()
    }

    /// Number of cached users
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Number of indexed roles
    pub fn role_count(&self) -> usize {
        self.roles.len()
    }

    /// Number of indexed channels
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Drop everything; used when the session is invalidated
    pub fn clear(&self) {
        *self.current_user.write() = None;
        self.users.clear();
        self.guilds.clear();
        self.roles.clear();
        self.channels.clear();
        tracing::debug!("Client cache cleared");
    }
}

impl Default for ClientCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ClientCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCache")
            .field("users", &self.users.len())
            .field("guilds", &self.guilds.len())
            .field("roles", &self.roles.len())
            .field("channels", &self.channels.len())
            .finish()
    }
}
