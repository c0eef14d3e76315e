//! Guild member entity - a user's membership in one guild

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::entities::User;
use crate::value_objects::Snowflake;

/// Membership of a user in a guild
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GuildMember {
    pub user: User,
    pub nick: Option<String>,
    #[serde(default)]
    pub roles: Vec<Snowflake>,
    pub joined_at: Option<DateTime<Utc>>,
    pub premium_since: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deaf: bool,
    #[serde(default)]
    pub mute: bool,
    #[serde(default)]
    pub pending: bool,
}

impl GuildMember {
    /// Display name: nickname when set, username otherwise
    pub fn display_name(&self) -> &str {
        self.nick.as_deref().unwrap_or(&self.user.username)
    }

    /// Whether the member carries the given role
    #[inline]
    pub fn has_role(&self, role_id: Snowflake) -> bool {
        self.roles.contains(&role_id)
    }
}
