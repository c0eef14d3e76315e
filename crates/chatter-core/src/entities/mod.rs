//! Entity records deserialized from gateway and REST payloads

mod channel;
mod guild;
mod member;
mod role;
mod user;

pub use channel::{Channel, ChannelType};
pub use guild::Guild;
pub use member::GuildMember;
pub use role::Role;
pub use user::{CurrentUser, User};
