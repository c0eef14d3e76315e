//! Channel entity - guild channels, categories, and DMs

use serde::Deserialize;

use crate::value_objects::Snowflake;

/// Channel type discriminant from the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "u8")]
pub enum ChannelType {
    /// Guild text channel
    Text,
    /// Direct message between users
    Dm,
    /// Guild voice channel
    Voice,
    /// Group direct message
    Group,
    /// Category for organizing channels
    Category,
    /// Guild announcement channel
    News,
    /// Unrecognized type, retained for forward compatibility
    Unknown(u8),
}

impl ChannelType {
    /// Get the numeric wire value
    #[must_use]
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Text => 0,
            Self::Dm => 1,
            Self::Voice => 2,
            Self::Group => 3,
            Self::Category => 4,
            Self::News => 5,
            Self::Unknown(value) => value,
        }
    }
}

impl From<u8> for ChannelType {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Text,
            1 => Self::Dm,
            2 => Self::Voice,
            3 => Self::Group,
            4 => Self::Category,
            5 => Self::News,
            other => Self::Unknown(other),
        }
    }
}

/// Channel entity
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Channel {
    pub id: Snowflake,
    #[serde(rename = "type")]
    pub kind: ChannelType,
    pub guild_id: Option<Snowflake>,
    pub name: Option<String>,
    pub position: Option<i32>,
    pub topic: Option<String>,
    pub parent_id: Option<Snowflake>,
}

impl Channel {
    /// Whether this channel lives inside a guild
    #[inline]
    pub fn is_guild_channel(&self) -> bool {
        self.guild_id.is_some()
    }

    /// Get the mention string for this channel
    pub fn mention(&self) -> String {
        format!("<#{}>", self.id)
    }
}
