//! REST-backed [`AlertPlatform`] over serenity's HTTP client.

use super::conversions::{
    channel_id, everyone_permissions, member_ref, thread_state, to_channel, to_guild, to_user,
    voice_room,
};
use super::error::SerenityResultExt;
use async_trait::async_trait;
use herald_core::{
    AlertPayload, ChannelId, GuildId, MemberRef, MessageId, RoleId, TextChannelRef, ThreadHandle,
    ThreadState, UserId, VoiceRoom,
};
use herald_error::{PlatformError, PlatformErrorKind, PlatformResult};
use herald_interface::AlertPlatform;
use serenity::builder::{
    CreateEmbed, CreateEmbedAuthor, CreateEmbedFooter, CreateMessage, CreateThread,
};
use serenity::cache::Cache;
use serenity::http::Http;
use serenity::model::Timestamp;
use serenity::model::channel::{AutoArchiveDuration, Channel, ChannelType, GuildChannel};
use serenity::model::id as discord;
use std::sync::{Arc, OnceLock};
use tracing::{debug, instrument, trace};

/// Largest page the member list endpoint returns.
const MEMBER_PAGE: u64 = 1000;

/// Whether a cached member list holds the whole guild.
///
/// Large guilds arrive with a partial member list until chunked, so the
/// cache can only answer role queries once every member is present.
pub(crate) fn member_list_complete(cached: usize, member_count: u64) -> bool {
    member_count > 0 && cached as u64 >= member_count
}

/// Discord implementation of [`AlertPlatform`].
///
/// Reads go to the gateway cache once one is attached, falling back to REST.
#[derive(Clone)]
pub struct DiscordPlatform {
    http: Arc<Http>,
    cache: Arc<OnceLock<Arc<Cache>>>,
}

impl std::fmt::Debug for DiscordPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordPlatform").finish_non_exhaustive()
    }
}

impl DiscordPlatform {
    /// Wrap an HTTP client.
    pub fn new(http: Arc<Http>) -> Self {
        Self {
            http,
            cache: Arc::new(OnceLock::new()),
        }
    }

    /// Serve member reads from the gateway cache.
    ///
    /// Only the first attached cache is used.
    pub fn attach_cache(&self, cache: Arc<Cache>) {
        if self.cache.set(cache).is_err() {
            debug!("Gateway cache already attached");
        }
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &Arc<Http> {
        &self.http
    }

    async fn guild_channel(&self, id: ChannelId) -> PlatformResult<GuildChannel> {
        match self.http.get_channel(to_channel(id)).await.or_platform(id.get())? {
            Channel::Guild(channel) => Ok(channel),
            _ => Err(PlatformError::new(PlatformErrorKind::ChannelNotFound(
                id.get(),
            ))),
        }
    }

    /// Role members from the gateway cache, when it holds the full guild.
    fn cached_role_members(&self, guild_id: GuildId, role_id: RoleId) -> Option<Vec<MemberRef>> {
        let cache = self.cache.get()?;
        let guild = cache.guild(to_guild(guild_id))?;
        if !member_list_complete(guild.members.len(), guild.member_count) {
            trace!(
                cached = guild.members.len(),
                total = guild.member_count,
                "Cached member list incomplete"
            );
            return None;
        }
        let role = discord::RoleId::new(role_id.get());
        let everyone = role_id == guild_id.everyone_role();
        Some(
            guild
                .members
                .values()
                .filter(|member| everyone || member.roles.contains(&role))
                .map(member_ref)
                .collect(),
        )
    }

    fn cached_member(&self, guild_id: GuildId, user_id: UserId) -> Option<MemberRef> {
        let cache = self.cache.get()?;
        let member = cache.member(to_guild(guild_id), to_user(user_id))?;
        Some(member_ref(&member))
    }

    async fn channel_in(&self, guild_id: GuildId, id: ChannelId) -> PlatformResult<GuildChannel> {
        let channel = self.guild_channel(id).await?;
        if channel.guild_id.get() != guild_id.get() {
            return Err(PlatformError::new(PlatformErrorKind::ChannelNotFound(
                id.get(),
            )));
        }
        Ok(channel)
    }
}

#[async_trait]
impl AlertPlatform for DiscordPlatform {
    #[instrument(skip(self))]
    async fn fetch_text_channel(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> PlatformResult<TextChannelRef> {
        let channel = self.channel_in(guild_id, channel_id).await?;
        match channel.kind {
            ChannelType::Text | ChannelType::News => Ok(TextChannelRef {
                id: channel_id,
                name: channel.name,
            }),
            _ => Err(PlatformError::new(PlatformErrorKind::NotTextChannel(
                channel_id.get(),
            ))),
        }
    }

    #[instrument(skip(self))]
    async fn fetch_room(&self, guild_id: GuildId, room_id: ChannelId) -> PlatformResult<VoiceRoom> {
        let channel = self.channel_in(guild_id, room_id).await?;
        let everyone = match self.http.get_guild_roles(to_guild(guild_id)).await {
            Ok(roles) => everyone_permissions(guild_id, &roles),
            Err(e) => {
                debug!(error = %e, "Guild roles unavailable");
                None
            }
        };
        Ok(voice_room(&channel, everyone))
    }

    #[instrument(skip(self))]
    async fn members_with_role(
        &self,
        guild_id: GuildId,
        role_id: RoleId,
    ) -> PlatformResult<Vec<MemberRef>> {
        if let Some(members) = self.cached_role_members(guild_id, role_id) {
            debug!(count = members.len(), "Role members listed from cache");
            return Ok(members);
        }

        let role = discord::RoleId::new(role_id.get());
        let everyone = role_id == guild_id.everyone_role();
        let mut members = Vec::new();
        let mut after = None;

        loop {
            let page = self
                .http
                .get_guild_members(to_guild(guild_id), Some(MEMBER_PAGE), after)
                .await
                .or_platform(guild_id.get())?;
            after = page.last().map(|member| member.user.id.get());
            members.extend(
                page.iter()
                    .filter(|member| everyone || member.roles.contains(&role))
                    .map(member_ref),
            );
            if (page.len() as u64) < MEMBER_PAGE {
                break;
            }
        }

        debug!(count = members.len(), "Role members listed");
        Ok(members)
    }

    #[instrument(skip(self))]
    async fn fetch_member(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> PlatformResult<Option<MemberRef>> {
        if let Some(member) = self.cached_member(guild_id, user_id) {
            return Ok(Some(member));
        }
        match self
            .http
            .get_member(to_guild(guild_id), to_user(user_id))
            .await
            .or_platform(user_id.get())
        {
            Ok(member) => Ok(Some(member_ref(&member))),
            Err(e) if matches!(e.kind, PlatformErrorKind::UnknownMember(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self))]
    async fn create_private_thread(
        &self,
        parent: ChannelId,
        name: &str,
        reason: &str,
    ) -> PlatformResult<ThreadHandle> {
        let builder = CreateThread::new(name)
            .kind(ChannelType::PrivateThread)
            .invitable(false)
            .auto_archive_duration(AutoArchiveDuration::OneHour)
            .audit_log_reason(reason);
        let thread = to_channel(parent)
            .create_thread(&self.http, builder)
            .await
            .or_platform(parent.get())?;

        Ok(ThreadHandle {
            id: channel_id(thread.id),
            parent_id: thread.parent_id.map(channel_id).unwrap_or(parent),
            name: thread.name,
        })
    }

    #[instrument(skip(self))]
    async fn fetch_thread(&self, thread_id: ChannelId) -> PlatformResult<Option<ThreadState>> {
        match self.guild_channel(thread_id).await {
            Ok(channel) => Ok(Some(thread_state(&channel))),
            Err(e) if matches!(e.kind, PlatformErrorKind::ChannelNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self))]
    async fn add_thread_member(&self, thread_id: ChannelId, user_id: UserId) -> PlatformResult<()> {
        to_channel(thread_id)
            .add_thread_member(&self.http, to_user(user_id))
            .await
            .or_platform(user_id.get())
    }

    #[instrument(skip(self))]
    async fn delete_thread(&self, thread_id: ChannelId) -> PlatformResult<()> {
        to_channel(thread_id)
            .delete(&self.http)
            .await
            .or_platform(thread_id.get())?;
        Ok(())
    }

    #[instrument(skip(self, alert), fields(kind = %alert.kind))]
    async fn send_alert(
        &self,
        channel_id: ChannelId,
        alert: &AlertPayload,
    ) -> PlatformResult<MessageId> {
        let embed = CreateEmbed::new()
            .author(CreateEmbedAuthor::new(alert.title.as_str()))
            .description(alert.description.as_str())
            .colour(alert.color)
            .footer(CreateEmbedFooter::new(alert.footer.as_str()))
            .timestamp(Timestamp::now());
        let message = to_channel(channel_id)
            .send_message(&self.http, CreateMessage::new().embed(embed))
            .await
            .or_platform(channel_id.get())?;
        Ok(MessageId::new(message.id.get()))
    }

    #[instrument(skip(self))]
    async fn delete_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> PlatformResult<()> {
        to_channel(channel_id)
            .delete_message(&self.http, discord::MessageId::new(message_id.get()))
            .await
            .or_platform(channel_id.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_list_complete() {
        assert!(member_list_complete(12, 12));
        assert!(!member_list_complete(250, 12_000));
        // Unknown member count never trusts the cache.
        assert!(!member_list_complete(0, 0));
    }
}
