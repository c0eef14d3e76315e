//! Role entity - a guild role and its permission set

use serde::Deserialize;

use crate::value_objects::{Permissions, Snowflake};

/// Role attached to a guild
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Role {
    pub id: Snowflake,
    pub name: String,
    #[serde(default)]
    pub color: u32,
    #[serde(default)]
    pub hoist: bool,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    pub permissions: Permissions,
    #[serde(default)]
    pub managed: bool,
    #[serde(default)]
    pub mentionable: bool,
}

impl Role {
    /// Whether this is the guild's @everyone role
    ///
    /// The @everyone role always shares the guild's id.
    #[inline]
    pub fn is_everyone(&self, guild_id: Snowflake) -> bool {
        self.id == guild_id
    }

    /// Get the mention string for this role
    pub fn mention(&self) -> String {
        format!("<@&{}>", self.id)
    }
}
