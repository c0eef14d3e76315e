//! User entities - remote accounts and the authenticated account

use serde::Deserialize;

use crate::value_objects::Snowflake;

/// A user account as seen by the client
///
/// Unknown payload fields are ignored for forward compatibility.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    pub id: Snowflake,
    pub username: String,
    #[serde(default)]
    pub discriminator: String,
    pub avatar: Option<String>,
    #[serde(default)]
    pub bot: bool,
    #[serde(default)]
    pub system: bool,
}

impl User {
    /// Get the full tag: username#discriminator
    pub fn tag(&self) -> String {
        format!("{}#{}", self.username, self.discriminator)
    }

    /// Get the mention string for this user
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }

    /// When the account was created, derived from the id
    pub fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.id.created_at()
    }
}

/// The user account the client is authenticated as
///
/// Carries the private fields the remote service only exposes for the
/// session owner.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CurrentUser {
    #[serde(flatten)]
    pub user: User,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub mfa_enabled: bool,
    pub email: Option<String>,
    pub locale: Option<String>,
}

impl CurrentUser {
    /// The id of the authenticated account
    #[inline]
    pub fn id(&self) -> Snowflake {
        self.user.id
    }
}
