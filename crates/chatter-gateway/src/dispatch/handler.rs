//! Gateway dispatch handler
//!
//! Routes each decoded `(shard, title, payload)` tuple to its named
//! handler through a table built from an explicit registration list.
//! Unknown titles are expected (the protocol grows new events) and are
//! silently ignored; handler failures propagate to the transport caller,
//! which owns the log-and-continue policy.

use crate::bus::EventBus;
use crate::dispatch::{DispatchError, ReadinessCoordinator};
use crate::events::payloads::{
    GuildDeletePayload, MemberPayload, MemberRemovePayload, ReadyPayload, RoleDeletePayload,
    RolePayload,
};
use crate::events::{Event, EventType};
use crate::shard::{ConnectSignal, Shard};
use chatter_cache::ClientCache;
use chatter_common::GatewayConfig;
use chatter_core::{Channel, Guild};
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

type HandlerFuture<'a> = BoxFuture<'a, Result<(), DispatchError>>;
type HandlerFn = for<'a> fn(&'a DispatchHandler, Shard, Value) -> HandlerFuture<'a>;

fn decode<T: DeserializeOwned>(event: EventType, data: Value) -> Result<T, DispatchError> {
    serde_json::from_value(data).map_err(|source| DispatchError::Payload { event, source })
}

/// Routes gateway dispatches to named handlers
///
/// All collaborators are injected at construction; the handler owns no
/// transport or HTTP state.
pub struct DispatchHandler {
    cache: Arc<ClientCache>,
    bus: Arc<EventBus>,
    readiness: Arc<ReadinessCoordinator>,
    debug_events: bool,
    handlers: HashMap<EventType, HandlerFn>,
}

impl DispatchHandler {
    /// Wire a dispatch handler from its collaborators
    ///
    /// # Panics
    /// Panics if the registration list maps one event title twice; that is
    /// a programming error, not a runtime condition.
    #[must_use]
    pub fn new(
        config: &GatewayConfig,
        cache: Arc<ClientCache>,
        bus: Arc<EventBus>,
        connect_signal: Arc<ConnectSignal>,
    ) -> Self {
        let readiness = Arc::new(ReadinessCoordinator::new(
            config.ready_timeout,
            connect_signal,
            Arc::clone(&bus),
        ));

        let table = Self::handler_table();
        let mut handlers = HashMap::with_capacity(table.len());
        for (event_type, handler) in table {
            let previous = handlers.insert(event_type, handler);
            assert!(
                previous.is_none(),
                "duplicate dispatch handler registered for {event_type}"
            );
        }

        Self {
            cache,
            bus,
            readiness,
            debug_events: config.debug_events,
            handlers,
        }
    }

    /// The explicit registration list: one entry per handled title
    fn handler_table() -> Vec<(EventType, HandlerFn)> {
        vec![
            (EventType::Ready, Self::on_ready as HandlerFn),
            (EventType::GuildCreate, Self::on_guild_create as HandlerFn),
            (EventType::GuildUpdate, Self::on_guild_update as HandlerFn),
            (EventType::GuildDelete, Self::on_guild_delete as HandlerFn),
            (EventType::GuildRoleCreate, Self::on_role_create as HandlerFn),
            (EventType::GuildRoleUpdate, Self::on_role_update as HandlerFn),
            (EventType::GuildRoleDelete, Self::on_role_delete as HandlerFn),
            (EventType::GuildMemberAdd, Self::on_member_add as HandlerFn),
            (EventType::GuildMemberUpdate, Self::on_member_update as HandlerFn),
            (EventType::GuildMemberRemove, Self::on_member_remove as HandlerFn),
            (EventType::ChannelCreate, Self::on_channel_create as HandlerFn),
            (EventType::ChannelUpdate, Self::on_channel_update as HandlerFn),
            (EventType::ChannelDelete, Self::on_channel_delete as HandlerFn),
        ]
    }

    /// The readiness coordinator driving `shard_ready` / `ready` emission
    pub fn readiness(&self) -> &Arc<ReadinessCoordinator> {
        &self.readiness
    }

    /// The bus events are fanned out on
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Handle one decoded gateway dispatch
    ///
    /// The transport must await this per shard so events from one shard
    /// are handled in strict arrival order; events from different shards
    /// may interleave freely.
    pub async fn handle(&self, shard: Shard, title: &str, data: Value) -> Result<(), DispatchError> {
        if self.debug_events {
            self.bus.invoke(Event::GatewayDispatch {
                shard,
                title: title.to_string(),
                data: data.clone(),
            });
        }

        let Some(event_type) = EventType::parse(title) else {
            tracing::trace!(%shard, title, "Ignoring unrecognized gateway event");
            return Ok(());
        };

        match self.handlers.get(&event_type) {
            Some(handler) => handler(self, shard, data).await,
            None => Ok(()),
        }
    }

    fn on_ready(&self, shard: Shard, data: Value) -> HandlerFuture<'_> {
        Box::pin(async move {
            let payload: ReadyPayload = decode(EventType::Ready, data)?;
            let guild_count = payload.guilds.len();

            self.cache.add_user(payload.user.user.clone());
            self.cache.set_current_user(payload.user);

            self.readiness.begin_shard(shard, guild_count);
            Ok(())
        })
    }

    fn on_guild_create(&self, _shard: Shard, data: Value) -> HandlerFuture<'_> {
        Box::pin(async move {
            let guild: Guild = decode(EventType::GuildCreate, data)?;
            let collecting = self.readiness.collecting();
            let available = guild.available();

            // Unavailable guilds are deliberately not cached here; they
            // surface once a later GUILD_CREATE delivers their data
            if available {
                self.cache.add_guild(guild.clone());
            }

            // Every arrival feeds the readiness debounce, cached or not
            self.readiness.notify_guild_arrival();

            if !available {
                tracing::debug!(guild_id = %guild.id, "Guild arrived unavailable, not cached");
                return Ok(());
            }

            if collecting {
                self.bus.invoke(Event::GuildAvailable { guild });
            } else {
                self.bus.invoke(Event::GuildJoin { guild });
            }
            Ok(())
        })
    }

    fn on_guild_update(&self, _shard: Shard, data: Value) -> HandlerFuture<'_> {
        Box::pin(async move {
            let guild: Guild = decode(EventType::GuildUpdate, data)?;
            self.cache.add_guild(guild.clone());
            self.bus.invoke(Event::GuildUpdate { guild });
            Ok(())
        })
    }

    fn on_guild_delete(&self, _shard: Shard, data: Value) -> HandlerFuture<'_> {
        Box::pin(async move {
            let payload: GuildDeletePayload = decode(EventType::GuildDelete, data)?;
            self.cache.remove_guild(payload.id);

            if payload.unavailable {
                self.bus.invoke(Event::GuildUnavailable {
                    guild_id: payload.id,
                });
            } else {
                self.bus.invoke(Event::GuildLeave {
                    guild_id: payload.id,
                });
            }
            Ok(())
        })
    }

    fn on_role_create(&self, _shard: Shard, data: Value) -> HandlerFuture<'_> {
        Box::pin(async move {
            let payload: RolePayload = decode(EventType::GuildRoleCreate, data)?;
            self.cache.add_role(payload.guild_id, payload.role.clone());
            self.bus.invoke(Event::RoleCreate {
                guild_id: payload.guild_id,
                role: payload.role,
            });
            Ok(())
        })
    }

    fn on_role_update(&self, _shard: Shard, data: Value) -> HandlerFuture<'_> {
        Box::pin(async move {
            let payload: RolePayload = decode(EventType::GuildRoleUpdate, data)?;
            self.cache.add_role(payload.guild_id, payload.role.clone());
            self.bus.invoke(Event::RoleUpdate {
                guild_id: payload.guild_id,
                role: payload.role,
            });
            Ok(())
        })
    }

    fn on_role_delete(&self, _shard: Shard, data: Value) -> HandlerFuture<'_> {
        Box::pin(async move {
            let payload: RoleDeletePayload = decode(EventType::GuildRoleDelete, data)?;
            self.cache.remove_role(payload.role_id);
            self.bus.invoke(Event::RoleDelete {
                guild_id: payload.guild_id,
                role_id: payload.role_id,
            });
            Ok(())
        })
    }

    fn on_member_add(&self, _shard: Shard, data: Value) -> HandlerFuture<'_> {
        Box::pin(async move {
            let payload: MemberPayload = decode(EventType::GuildMemberAdd, data)?;
            self.cache.add_user(payload.member.user.clone());
            self.bus.invoke(Event::MemberJoin {
                guild_id: payload.guild_id,
                member: payload.member,
            });
            Ok(())
        })
    }

    fn on_member_update(&self, _shard: Shard, data: Value) -> HandlerFuture<'_> {
        Box::pin(async move {
            let payload: MemberPayload = decode(EventType::GuildMemberUpdate, data)?;
            self.cache.add_user(payload.member.user.clone());
            self.bus.invoke(Event::MemberUpdate {
                guild_id: payload.guild_id,
                member: payload.member,
            });
            Ok(())
        })
    }

    fn on_member_remove(&self, _shard: Shard, data: Value) -> HandlerFuture<'_> {
        Box::pin(async move {
            let payload: MemberRemovePayload = decode(EventType::GuildMemberRemove, data)?;
            self.bus.invoke(Event::MemberRemove {
                guild_id: payload.guild_id,
                user: payload.user,
            });
            Ok(())
        })
    }

    fn on_channel_create(&self, _shard: Shard, data: Value) -> HandlerFuture<'_> {
        Box::pin(async move {
            let channel: Channel = decode(EventType::ChannelCreate, data)?;
            self.cache.add_channel(channel.clone());
            self.bus.invoke(Event::ChannelCreate { channel });
            Ok(())
        })
    }

    fn on_channel_update(&self, _shard: Shard, data: Value) -> HandlerFuture<'_> {
        Box::pin(async move {
            let channel: Channel = decode(EventType::ChannelUpdate, data)?;
            self.cache.add_channel(channel.clone());
            self.bus.invoke(Event::ChannelUpdate { channel });
            Ok(())
        })
    }

    fn on_channel_delete(&self, _shard: Shard, data: Value) -> HandlerFuture<'_> {
        Box::pin(async move {
            let channel: Channel = decode(EventType::ChannelDelete, data)?;
            self.cache.remove_channel(channel.id);
            self.bus.invoke(Event::ChannelDelete { channel });
            Ok(())
        })
    }
}

impl std::fmt::Debug for DispatchHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchHandler")
            .field("debug_events", &self.debug_events)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
