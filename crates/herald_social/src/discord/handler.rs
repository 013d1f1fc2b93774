//! Gateway event handler.
//!
//! Translates serenity events into [`OccupancyChange`] and [`PresenceChange`]
//! notifications for the [`AlertEngine`]. Serenity dispatches every event on
//! its own task, so slow alert delivery never blocks the gateway.
//!
//! [`OccupancyChange`]: herald_core::OccupancyChange
//! [`PresenceChange`]: herald_core::PresenceChange

use super::conversions::{
    channel_id, guild_id, occupancy_change, online_status, presence_change, user_id,
};

use async_trait::async_trait;
use herald_core::{GuildId, OnlineStatus, UserId};
use herald_relay::AlertEngine;
use parking_lot::Mutex;
use serenity::client::{Context, EventHandler};
use serenity::model::channel::{GuildChannel, Message, PartialGuildChannel};
use serenity::model::gateway::{GatewayIntents, Presence, Ready};
use serenity::model::guild::{Guild, Member};
use serenity::model::id as discord;
use serenity::model::user::User;
use serenity::model::voice::VoiceState;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, trace, warn};

/// Last known online status per guild member.
///
/// Presence updates carry only the new status, so the previous one is kept
/// here. Seeded from the presences delivered with each guild.
#[derive(Debug, Clone, Default)]
pub struct PresenceTracker {
    statuses: Arc<Mutex<HashMap<(GuildId, UserId), OnlineStatus>>>,
}

impl PresenceTracker {
    /// Record a new status, returning the previous one if known.
    pub fn observe(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        status: OnlineStatus,
    ) -> Option<OnlineStatus> {
        self.statuses.lock().insert((guild_id, user_id), status)
    }

    /// Forget one member, returning whether it was tracked.
    pub fn forget(&self, guild_id: GuildId, user_id: UserId) -> bool {
        self.statuses.lock().remove(&(guild_id, user_id)).is_some()
    }

    /// Forget every member of a guild.
    pub fn forget_guild(&self, guild_id: GuildId) {
        self.statuses.lock().retain(|(guild, _), _| *guild != guild_id);
    }

    /// Number of tracked members.
    pub fn len(&self) -> usize {
        self.statuses.lock().len()
    }

    /// Whether nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.statuses.lock().is_empty()
    }
}

/// Serenity event handler for Herald.
#[derive(Debug, Clone)]
pub struct HeraldHandler {
    engine: AlertEngine,
    presences: PresenceTracker,
}

impl HeraldHandler {
    /// Create a handler feeding `engine`.
    pub fn new(engine: AlertEngine) -> Self {
        Self {
            engine,
            presences: PresenceTracker::default(),
        }
    }

    /// Gateway intents the handler relies on.
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS
            | GatewayIntents::GUILD_VOICE_STATES
            | GatewayIntents::GUILD_MEMBERS
            | GatewayIntents::GUILD_PRESENCES
    }

    /// Resolve a member from the cache, falling back to the REST API.
    async fn member(
        &self,
        ctx: &Context,
        guild: discord::GuildId,
        user: discord::UserId,
    ) -> Option<Member> {
        let cached = ctx.cache.member(guild, user).map(|member| (*member).clone());
        if cached.is_some() {
            return cached;
        }
        match ctx.http.get_member(guild, user).await {
            Ok(member) => Some(member),
            Err(e) => {
                warn!(error = %e, user_id = %user, "Member lookup failed");
                None
            }
        }
    }
}

#[async_trait]
impl EventHandler for HeraldHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            user = %ready.user.name,
            guilds = ready.guilds.len(),
            "Connected to Discord"
        );
    }

    async fn guild_create(&self, _ctx: Context, guild: Guild, _is_new: Option<bool>) {
        let id = guild_id(guild.id);
        for (user, presence) in &guild.presences {
            self.presences
                .observe(id, user_id(*user), online_status(presence.status));
        }
        debug!(guild_id = %id, seeded = guild.presences.len(), "Presences seeded");
    }

    #[instrument(skip_all, fields(user_id = %new.user_id))]
    async fn voice_state_update(&self, ctx: Context, old: Option<VoiceState>, new: VoiceState) {
        let Some(guild) = new.guild_id else {
            return;
        };
        let old_room = old.as_ref().and_then(|state| state.channel_id);
        if old_room == new.channel_id {
            trace!("Voice state change without a room change");
            return;
        }

        let member = match new.member.clone() {
            Some(member) => member,
            None => match self.member(&ctx, guild, new.user_id).await {
                Some(member) => member,
                None => return,
            },
        };

        let change = occupancy_change(guild, old_room, new.channel_id, &member);
        self.engine.handle_occupancy(change).await;
    }

    #[instrument(skip_all, fields(user_id = %new_data.user.id))]
    async fn presence_update(&self, ctx: Context, new_data: Presence) {
        let Some(guild) = new_data.guild_id else {
            return;
        };
        let status = online_status(new_data.status);
        let previous = self
            .presences
            .observe(guild_id(guild), user_id(new_data.user.id), status);
        if status != OnlineStatus::Online || previous == Some(OnlineStatus::Online) {
            trace!(?previous, %status, "Presence change not announced");
            return;
        }

        let Some(member) = self.member(&ctx, guild, new_data.user.id).await else {
            return;
        };
        let change = presence_change(guild, &member, previous, status);
        self.engine.handle_presence(change).await;
    }

    async fn guild_delete(
        &self,
        _ctx: Context,
        incomplete: serenity::model::guild::UnavailableGuild,
        _full: Option<Guild>,
    ) {
        self.presences.forget_guild(guild_id(incomplete.id));
    }

    async fn guild_member_removal(
        &self,
        _ctx: Context,
        guild: discord::GuildId,
        user: User,
        _member_data_if_available: Option<Member>,
    ) {
        if self.presences.forget(guild_id(guild), user_id(user.id)) {
            trace!(guild_id = %guild, user_id = %user.id, "Forgot departed member");
        }
    }

    async fn channel_delete(
        &self,
        _ctx: Context,
        channel: GuildChannel,
        _messages: Option<Vec<Message>>,
    ) {
        if self.engine.on_room_deleted(channel_id(channel.id)) {
            debug!(room_id = %channel.id, "Deleted room released its thread");
        }
    }

    async fn thread_delete(
        &self,
        _ctx: Context,
        thread: PartialGuildChannel,
        _full_thread_data: Option<GuildChannel>,
    ) {
        if self.engine.on_thread_deleted(channel_id(thread.id)) {
            debug!(thread_id = %thread.id, "Tracked thread deleted externally");
        }
    }
}
