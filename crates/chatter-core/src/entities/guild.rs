//! Guild entity - a server the client is a member of
//!
//! During startup backfill the remote service may send a stub carrying only
//! `id` and `unavailable`; every other field defaults accordingly.

use serde::Deserialize;

use crate::entities::{Channel, Role};
use crate::value_objects::Snowflake;

/// Guild (server) entity
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Guild {
    pub id: Snowflake,
    #[serde(default)]
    pub name: String,
    pub icon: Option<String>,
    pub description: Option<String>,
    pub owner_id: Option<Snowflake>,
    #[serde(default)]
    pub unavailable: bool,
    pub member_count: Option<u64>,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub channels: Vec<Channel>,
}

impl Guild {
    /// Whether the guild's data is currently available
    #[inline]
    pub fn available(&self) -> bool {
        !self.unavailable
    }

    /// Check if a user is the guild owner
    #[inline]
    pub fn is_owner(&self, user_id: Snowflake) -> bool {
        self.owner_id == Some(user_id)
    }

    /// The guild's @everyone role, when role data is present
    pub fn everyone_role(&self) -> Option<&Role> {
        self.roles.iter().find(|role| role.id == self.id)
    }
}
