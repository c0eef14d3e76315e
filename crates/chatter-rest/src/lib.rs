//! # chatter-rest
//!
//! Outbound REST layer: route descriptors, the two-phase rate-limit
//! registry, and the request loop that honors the remote service's
//! throttling contract.

mod client;
mod error;
mod ratelimit;
mod routes;

pub use client::RestClient;
pub use error::RestError;
pub use ratelimit::{BucketGuard, RatelimitRegistry};
pub use routes::{Route, RouteError};

// The HTTP method type used by route constructors
pub use reqwest::Method;
