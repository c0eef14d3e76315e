//! Permission bitflags carried on roles
//!
//! Stored as a 64-bit integer bitfield, serialized as a string on the wire.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

bitflags! {
    /// Permission flags attached to a role
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Permissions: u64 {
        /// Create invites to the guild
        const CREATE_INSTANT_INVITE = 1 << 0;
        /// Kick members from the guild
        const KICK_MEMBERS          = 1 << 1;
        /// Ban members from the guild
        const BAN_MEMBERS           = 1 << 2;
        /// Bypass all permission checks
        const ADMINISTRATOR         = 1 << 3;
        /// Create, edit, delete channels
        const MANAGE_CHANNELS       = 1 << 4;
        /// Edit guild settings
        const MANAGE_GUILD          = 1 << 5;
        /// Add emoji reactions
        const ADD_REACTIONS         = 1 << 6;
        /// View the guild audit log
        const VIEW_AUDIT_LOG        = 1 << 7;
        /// View channels and read messages
        const VIEW_CHANNEL          = 1 << 10;
        /// Send messages in text channels
        const SEND_MESSAGES         = 1 << 11;
        /// Delete other users' messages
        const MANAGE_MESSAGES       = 1 << 13;
        /// Upload files and images
        const ATTACH_FILES          = 1 << 15;
        /// Mention @everyone and @here
        const MENTION_EVERYONE      = 1 << 17;
        /// Create, edit, delete, assign roles
        const MANAGE_ROLES          = 1 << 28;
    }
}

impl Permissions {
    /// Check if the permission set contains a required permission
    ///
    /// Administrators bypass all permission checks.
    #[inline]
    pub fn has(&self, permission: Permissions) -> bool {
        if self.contains(Permissions::ADMINISTRATOR) {
            return true;
        }
        self.contains(permission)
    }

    /// Check if the permission set has any of the given permissions
    #[inline]
    pub fn has_any(&self, permissions: Permissions) -> bool {
        if self.contains(Permissions::ADMINISTRATOR) {
            return true;
        }
        self.intersects(permissions)
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

// The wire carries permission bitfields as decimal strings
impl Serialize for Permissions {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.bits().to_string())
    }
}

// Deserialize from string or number; unknown bits are retained
impl<'de> Deserialize<'de> for Permissions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct PermissionsVisitor;

        impl<'de> Visitor<'de> for PermissionsVisitor {
            type Value = Permissions;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or integer permission bitfield")
            }

            fn visit_u64<E>(self, value: u64) -> Result<Permissions, E>
            where
                E: de::Error,
            {
                Ok(Permissions::from_bits_retain(value))
            }

            fn visit_str<E>(self, value: &str) -> Result<Permissions, E>
            where
                E: de::Error,
            {
                value
                    .parse::<u64>()
                    .map(Permissions::from_bits_retain)
                    .map_err(|_| de::Error::custom("invalid permission bitfield string"))
            }
        }

        deserializer.deserialize_any(PermissionsVisitor)
    }
}
