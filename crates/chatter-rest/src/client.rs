//! REST client
//!
//! Drives the request loop against the remote API: per-bucket gate
//! acquisition, bucket learning from response headers, ratelimit retries,
//! and the global throttle.

use crate::error::RestError;
use crate::ratelimit::RatelimitRegistry;
use crate::routes::Route;
use chatter_common::{ClientConfig, RestConfig};
use chatter_core::{Channel, CurrentUser, Guild, GuildMember, Role, Snowflake, User};
use reqwest::header::{HeaderMap, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// Bucket id assigned by the server to the route's real limit group
const HEADER_BUCKET: &str = "X-RateLimit-Bucket";
/// Requests left in the current window for this bucket
const HEADER_REMAINING: &str = "X-RateLimit-Remaining";
/// Seconds until the current window resets
const HEADER_RESET_AFTER: &str = "X-RateLimit-Reset-After";
/// Present on every response that passed through the API's proxy layer
const HEADER_VIA: &str = "Via";
/// Free-form reason recorded in the guild audit log
const HEADER_AUDIT_REASON: &str = "X-Audit-Log-Reason";

const USER_AGENT_VALUE: &str = concat!(
    "DiscordBot (https://github.com/chatter-rs/chatter, ",
    env!("CARGO_PKG_VERSION"),
    ")"
);

/// Outbound REST client with cooperative rate limiting
pub struct RestClient {
    http: reqwest::Client,
    ratelimits: RatelimitRegistry,
    base_url: String,
    token: Option<String>,
    max_retries: u8,
}

impl RestClient {
    /// Create a client from REST configuration and an optional bot token
    #[must_use]
    pub fn new(config: RestConfig, token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            ratelimits: RatelimitRegistry::new(),
            base_url: config.base_url,
            // A retry budget outside 1..=5 is never useful against this API
            max_retries: config.max_retries.clamp(1, 5),
            token,
        }
    }

    /// Create a client from the full client configuration
    #[must_use]
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.rest.clone(), config.token.clone())
    }

    /// The rate-limit registry backing this client
    pub fn ratelimits(&self) -> &RatelimitRegistry {
        &self.ratelimits
    }

    /// Perform a request with no body
    pub async fn request(&self, route: &Route) -> Result<Option<Value>, RestError> {
        self.request_with(route, None, None).await
    }

    /// Perform a request with an optional JSON body and audit-log reason
    pub async fn request_with(
        &self,
        route: &Route,
        body: Option<&Value>,
        reason: Option<&str>,
    ) -> Result<Option<Value>, RestError> {
        let token = if route.requires_auth() {
            Some(self.token.as_deref().ok_or(RestError::SetupRequired)?)
        } else {
            None
        };

        let url = route.url(&self.base_url);
        let rl_path = route.ratelimit_path();

        for attempt in 1..=self.max_retries {
            // Both gates are re-taken on every attempt, including retries
            self.ratelimits.acquire_global().await;
            let mut guard = Some(self.ratelimits.acquire(route).await);

            let mut builder = self
                .http
                .request(route.method().clone(), &url)
                .header(USER_AGENT, USER_AGENT_VALUE);
            if let Some(token) = token {
                builder = builder.header(AUTHORIZATION, format!("Bot {token}"));
            }
            if let Some(reason) = reason {
                builder = builder.header(HEADER_AUDIT_REASON, reason);
            }
            if let Some(body) = body {
                builder = builder.json(body);
            }

            let response = builder.send().await?;
            let status = response.status();
            let headers = response.headers();

            if let Some(bucket) = header_str(headers, HEADER_BUCKET) {
                self.ratelimits.record_bucket(rl_path, &bucket);
            }

            // An exhausted window means the next request on this bucket
            // would 429; keep the gate held until the window resets.
            if header_str(headers, HEADER_REMAINING).as_deref() == Some("0")
                && status != StatusCode::TOO_MANY_REQUESTS
            {
                let reset_after = header_str(headers, HEADER_RESET_AFTER)
                    .and_then(|value| value.parse::<f64>().ok());
                if let (Some(delay), Some(held)) = (reset_after, guard.take()) {
                    tracing::debug!(
                        route = %route,
                        retry_after = delay,
                        "Request budget exhausted for bucket, delaying gate release"
                    );
                    tokio::spawn(async move {
                        tokio::time::sleep(Duration::from_secs_f64(delay)).await;
                        drop(held);
                    });
                }
            }

            if status == StatusCode::NO_CONTENT {
                return Ok(None);
            }

            let via_present = headers.contains_key(HEADER_VIA);
            let data = resolve_body(response).await?;

            if status.is_success() {
                return Ok(Some(data));
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                if !via_present {
                    // Responses that never reached the API proxy carry no
                    // usable ratelimit body
                    return Err(RestError::Unexpected {
                        status: status.as_u16(),
                        message: "ratelimit response did not originate from the API".to_string(),
                    });
                }

                let retry_after = data
                    .get("retry_after")
                    .and_then(Value::as_f64)
                    .unwrap_or(1.0);
                let is_global = data.get("global").and_then(Value::as_bool).unwrap_or(false);

                if is_global {
                    self.ratelimits.set_global();
                }
                tracing::warn!(
                    route = %route,
                    retry_after,
                    global = is_global,
                    attempt,
                    "Ratelimit hit, retrying after delay"
                );

                // The bucket gate stays held through the wait so peers on
                // the same bucket do not pile onto a throttled window
                tokio::time::sleep(Duration::from_secs_f64(retry_after)).await;
                drop(guard);

                if is_global {
                    self.ratelimits.reset_global();
                }
                continue;
            }

            let message = data
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();

            return Err(match status.as_u16() {
                400 => RestError::BadRequest { message },
                403 => RestError::Forbidden { message },
                404 => RestError::NotFound { message },
                status if status >= 500 => RestError::ServerError { status, message },
                status => RestError::Unexpected { status, message },
            });
        }

        Err(RestError::RetriesExhausted {
            attempts: self.max_retries,
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, route: Route) -> Result<T, RestError> {
        let data = self.request(&route).await?.ok_or(RestError::EmptyResponse)?;
        Ok(serde_json::from_value(data)?)
    }

    // ----- Gateway -----

    /// Fetch gateway connection information
    pub async fn get_gateway(&self) -> Result<Value, RestError> {
        let route = Route::unauthenticated(Method::GET, "/gateway", &[])?;
        self.request(&route).await?.ok_or(RestError::EmptyResponse)
    }

    /// Fetch gateway connection information for the authenticated bot
    pub async fn get_bot_gateway(&self) -> Result<Value, RestError> {
        let route = Route::new(Method::GET, "/gateway/bot", &[])?;
        self.request(&route).await?.ok_or(RestError::EmptyResponse)
    }

    // ----- Users -----

    /// Fetch the authenticated user
    pub async fn get_current_user(&self) -> Result<CurrentUser, RestError> {
        self.fetch(Route::new(Method::GET, "/users/@me", &[])?).await
    }

    /// Edit the authenticated user
    pub async fn edit_current_user(&self, fields: &Value) -> Result<CurrentUser, RestError> {
        let route = Route::new(Method::PATCH, "/users/@me", &[])?;
        let data = self
            .request_with(&route, Some(fields), None)
            .await?
            .ok_or(RestError::EmptyResponse)?;
        Ok(serde_json::from_value(data)?)
    }

    /// Fetch a user by id
    pub async fn get_user(&self, user_id: Snowflake) -> Result<User, RestError> {
        self.fetch(Route::new(
            Method::GET,
            "/users/{user_id}",
            &[("user_id", user_id)],
        )?)
        .await
    }

    // ----- Guilds -----

    /// Fetch a guild by id
    pub async fn get_guild(&self, guild_id: Snowflake) -> Result<Guild, RestError> {
        self.fetch(Route::new(
            Method::GET,
            "/guilds/{guild_id}",
            &[("guild_id", guild_id)],
        )?)
        .await
    }

    /// Leave a guild
    pub async fn leave_guild(&self, guild_id: Snowflake) -> Result<(), RestError> {
        let route = Route::new(
            Method::DELETE,
            "/users/@me/guilds/{guild_id}",
            &[("guild_id", guild_id)],
        )?;
        self.request(&route).await?;
        Ok(())
    }

    // ----- Roles -----

    /// List a guild's roles
    pub async fn get_roles(&self, guild_id: Snowflake) -> Result<Vec<Role>, RestError> {
        self.fetch(Route::new(
            Method::GET,
            "/guilds/{guild_id}/roles",
            &[("guild_id", guild_id)],
        )?)
        .await
    }

    /// Create a role
    pub async fn create_role(
        &self,
        guild_id: Snowflake,
        fields: &Value,
        reason: Option<&str>,
    ) -> Result<Role, RestError> {
        let route = Route::new(
            Method::POST,
            "/guilds/{guild_id}/roles",
            &[("guild_id", guild_id)],
        )?;
        let data = self
            .request_with(&route, Some(fields), reason)
            .await?
            .ok_or(RestError::EmptyResponse)?;
        Ok(serde_json::from_value(data)?)
    }

    /// Edit a role
    pub async fn edit_role(
        &self,
        guild_id: Snowflake,
        role_id: Snowflake,
        fields: &Value,
        reason: Option<&str>,
    ) -> Result<Role, RestError> {
        let route = Route::new(
            Method::PATCH,
            "/guilds/{guild_id}/roles/{role_id}",
            &[("guild_id", guild_id), ("role_id", role_id)],
        )?;
        let data = self
            .request_with(&route, Some(fields), reason)
            .await?
            .ok_or(RestError::EmptyResponse)?;
        Ok(serde_json::from_value(data)?)
    }

    /// Delete a role
    pub async fn delete_role(
        &self,
        guild_id: Snowflake,
        role_id: Snowflake,
        reason: Option<&str>,
    ) -> Result<(), RestError> {
        let route = Route::new(
            Method::DELETE,
            "/guilds/{guild_id}/roles/{role_id}",
            &[("guild_id", guild_id), ("role_id", role_id)],
        )?;
        self.request_with(&route, None, reason).await?;
        Ok(())
    }

    // ----- Members -----

    /// Fetch a guild member
    pub async fn get_guild_member(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
    ) -> Result<GuildMember, RestError> {
        self.fetch(Route::new(
            Method::GET,
            "/guilds/{guild_id}/members/{user_id}",
            &[("guild_id", guild_id), ("user_id", user_id)],
        )?)
        .await
    }

    /// Kick a member from a guild
    pub async fn kick_guild_member(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        reason: Option<&str>,
    ) -> Result<(), RestError> {
        let route = Route::new(
            Method::DELETE,
            "/guilds/{guild_id}/members/{user_id}",
            &[("guild_id", guild_id), ("user_id", user_id)],
        )?;
        self.request_with(&route, None, reason).await?;
        Ok(())
    }

    /// Assign a role to a member
    pub async fn add_guild_member_role(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        role_id: Snowflake,
        reason: Option<&str>,
    ) -> Result<(), RestError> {
        let route = Route::new(
            Method::PUT,
            "/guilds/{guild_id}/members/{user_id}/roles/{role_id}",
            &[
                ("guild_id", guild_id),
                ("user_id", user_id),
                ("role_id", role_id),
            ],
        )?;
        self.request_with(&route, None, reason).await?;
        Ok(())
    }

    /// Remove a role from a member
    pub async fn remove_guild_member_role(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        role_id: Snowflake,
        reason: Option<&str>,
    ) -> Result<(), RestError> {
        let route = Route::new(
            Method::DELETE,
            "/guilds/{guild_id}/members/{user_id}/roles/{role_id}",
            &[
                ("guild_id", guild_id),
                ("user_id", user_id),
                ("role_id", role_id),
            ],
        )?;
        self.request_with(&route, None, reason).await?;
        Ok(())
    }

    // ----- Channels -----

    /// List a guild's channels
    pub async fn get_guild_channels(&self, guild_id: Snowflake) -> Result<Vec<Channel>, RestError> {
        self.fetch(Route::new(
            Method::GET,
            "/guilds/{guild_id}/channels",
            &[("guild_id", guild_id)],
        )?)
        .await
    }

    /// Create a guild channel
    pub async fn create_guild_channel(
        &self,
        guild_id: Snowflake,
        fields: &Value,
        reason: Option<&str>,
    ) -> Result<Channel, RestError> {
        let route = Route::new(
            Method::POST,
            "/guilds/{guild_id}/channels",
            &[("guild_id", guild_id)],
        )?;
        let data = self
            .request_with(&route, Some(fields), reason)
            .await?
            .ok_or(RestError::EmptyResponse)?;
        Ok(serde_json::from_value(data)?)
    }

    /// Fetch a channel by id
    pub async fn get_channel(&self, channel_id: Snowflake) -> Result<Channel, RestError> {
        self.fetch(Route::new(
            Method::GET,
            "/channels/{channel_id}",
            &[("channel_id", channel_id)],
        )?)
        .await
    }

    /// Edit a channel
    pub async fn edit_channel(
        &self,
        channel_id: Snowflake,
        fields: &Value,
        reason: Option<&str>,
    ) -> Result<Channel, RestError> {
        let route = Route::new(
            Method::PATCH,
            "/channels/{channel_id}",
            &[("channel_id", channel_id)],
        )?;
        let data = self
            .request_with(&route, Some(fields), reason)
            .await?
            .ok_or(RestError::EmptyResponse)?;
        Ok(serde_json::from_value(data)?)
    }

    /// Delete a channel
    pub async fn delete_channel(
        &self,
        channel_id: Snowflake,
        reason: Option<&str>,
    ) -> Result<(), RestError> {
        let route = Route::new(
            Method::DELETE,
            "/channels/{channel_id}",
            &[("channel_id", channel_id)],
        )?;
        self.request_with(&route, None, reason).await?;
        Ok(())
    }

    // ----- Messages -----
    //
    // The message object is outside the modeled entity set; these endpoints
    // surface the raw payload.

    /// Fetch a message
    pub async fn get_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
    ) -> Result<Value, RestError> {
        let route = Route::new(
            Method::GET,
            "/channels/{channel_id}/messages/{message_id}",
            &[("channel_id", channel_id), ("message_id", message_id)],
        )?;
        self.request(&route).await?.ok_or(RestError::EmptyResponse)
    }

    /// Send a message to a channel
    pub async fn send_message(
        &self,
        channel_id: Snowflake,
        fields: &Value,
    ) -> Result<Value, RestError> {
        let route = Route::new(
            Method::POST,
            "/channels/{channel_id}/messages",
            &[("channel_id", channel_id)],
        )?;
        self.request_with(&route, Some(fields), None)
            .await?
            .ok_or(RestError::EmptyResponse)
    }

    /// Edit a message
    pub async fn edit_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        fields: &Value,
    ) -> Result<Value, RestError> {
        let route = Route::new(
            Method::PATCH,
            "/channels/{channel_id}/messages/{message_id}",
            &[("channel_id", channel_id), ("message_id", message_id)],
        )?;
        self.request_with(&route, Some(fields), None)
            .await?
            .ok_or(RestError::EmptyResponse)
    }

    /// Delete a message
    pub async fn delete_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
    ) -> Result<(), RestError> {
        let route = Route::new(
            Method::DELETE,
            "/channels/{channel_id}/messages/{message_id}",
            &[("channel_id", channel_id), ("message_id", message_id)],
        )?;
        self.request(&route).await?;
        Ok(())
    }
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.token.is_some())
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// Decode the response body; non-JSON payloads surface as plain strings
async fn resolve_body(response: reqwest::Response) -> Result<Value, RestError> {
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));

    if is_json {
        Ok(response.json().await?)
    } else {
        Ok(Value::String(response.text().await?))
    }
}
