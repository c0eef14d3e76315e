//! Value objects - identifiers and permission flags

mod permissions;
mod snowflake;

pub use permissions::Permissions;
pub use snowflake::{Snowflake, SnowflakeParseError};
