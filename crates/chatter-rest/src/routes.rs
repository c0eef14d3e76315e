//! Route descriptors for REST endpoints
//!
//! A [`Route`] is a pure value describing one endpoint invocation. The URL
//! is rendered eagerly so that a missing path parameter fails at
//! construction, not at request time. The `ratelimit_path` groups requests
//! that share a throttle bucket before the server has revealed the real
//! bucket id; it is deliberately coarser than that id, which is why the
//! registry migrates gates once the id is learned.

use chatter_core::Snowflake;
use reqwest::Method;
use std::fmt;

/// Marker used in grouping keys for an absent path parameter
const ABSENT_PARAM: &str = "None";

/// Error constructing a route
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("path template {path:?} references parameter {name:?} which was not supplied")]
    MissingParam { path: &'static str, name: String },

    #[error("path template {path:?} has an unclosed placeholder")]
    UnclosedPlaceholder { path: &'static str },
}

/// One REST endpoint invocation
///
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    method: Method,
    path: &'static str,
    rendered: String,
    ratelimit_path: String,
    requires_auth: bool,
}

impl Route {
    /// Build a route, rendering `{name}` placeholders from `params`
    ///
    /// # Errors
    /// Fails when the template references a parameter that is not
    /// supplied. Extra parameters are allowed; they only participate in
    /// the grouping key.
    pub fn new(
        method: Method,
        path: &'static str,
        params: &[(&'static str, Snowflake)],
    ) -> Result<Self, RouteError> {
        Self::build(method, path, params, true)
    }

    /// Build a route for an endpoint that does not require a token
    pub fn unauthenticated(
        method: Method,
        path: &'static str,
        params: &[(&'static str, Snowflake)],
    ) -> Result<Self, RouteError> {
        Self::build(method, path, params, false)
    }

    fn build(
        method: Method,
        path: &'static str,
        params: &[(&'static str, Snowflake)],
        requires_auth: bool,
    ) -> Result<Self, RouteError> {
        let rendered = render(path, params)?;
        let ratelimit_path = grouping_key(&method, path, params);

        Ok(Self {
            method,
            path,
            rendered,
            ratelimit_path,
            requires_auth,
        })
    }

    /// HTTP method of this invocation
    #[inline]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The unrendered path template
    #[inline]
    pub fn path(&self) -> &'static str {
        self.path
    }

    /// Whether this endpoint needs an authorization token
    #[inline]
    pub fn requires_auth(&self) -> bool {
        self.requires_auth
    }

    /// Full request URL under the given API base
    pub fn url(&self, base: &str) -> String {
        format!("{}{}", base.trim_end_matches('/'), self.rendered)
    }

    /// Provisional rate-limit grouping key
    ///
    /// Stable for every request the remote service throttles together
    /// before the bucket id is known.
    #[inline]
    pub fn ratelimit_path(&self) -> &str {
        &self.ratelimit_path
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.rendered)
    }
}

/// Substitute `{name}` placeholders in a path template
fn render(path: &'static str, params: &[(&'static str, Snowflake)]) -> Result<String, RouteError> {
    let mut out = String::with_capacity(path.len() + 16);
    let mut rest = path;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after
            .find('}')
            .ok_or(RouteError::UnclosedPlaceholder { path })?;
        let name = &after[..end];

        let value = params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
            .ok_or_else(|| RouteError::MissingParam {
                path,
                name: name.to_string(),
            })?;

        out.push_str(&value.to_string());
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

/// Derive the provisional grouping key from the major path parameters
fn grouping_key(method: &Method, path: &'static str, params: &[(&'static str, Snowflake)]) -> String {
    let major = |name: &str| {
        params
            .iter()
            .find(|(key, _)| *key == name)
            .map_or_else(|| ABSENT_PARAM.to_string(), |(_, value)| value.to_string())
    };

    format!("{}-{}-{}:{}", method, path, major("guild_id"), major("channel_id"))
}
