//! # chatter-cache
//!
//! In-memory object cache for entities received over the gateway. The
//! dispatch layer is the only writer; readers may query from any task.

mod store;

pub use store::{CachedRole, ClientCache};
