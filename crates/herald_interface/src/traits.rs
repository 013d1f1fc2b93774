//! Trait definitions for storage and platform collaborators.

use async_trait::async_trait;
use herald_core::{
    ActivityLogEntry, AlertPayload, ChannelId, GuildAlertConfig, GuildId, MemberRef, MessageId,
    RoleId, TextChannelRef, ThreadHandle, ThreadState, UserId, VoiceRoom,
};
use herald_error::{PlatformResult, StoreResult};

/// Durable per-guild configuration storage.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Load the stored configuration, `None` when the guild has no row.
    async fn get(&self, guild_id: GuildId) -> StoreResult<Option<GuildAlertConfig>>;

    /// Insert a new row.
    ///
    /// Fails with [`herald_error::StoreErrorKind::DuplicateKey`] when a row
    /// already exists.
    async fn insert(&self, config: &GuildAlertConfig) -> StoreResult<()>;

    /// Insert or replace the row for `config.guild_id`.
    async fn upsert(&self, config: &GuildAlertConfig) -> StoreResult<()>;

    /// Remove the row for a guild. Deleting a missing row succeeds.
    async fn delete(&self, guild_id: GuildId) -> StoreResult<()>;
}

/// Append-only record of announced events.
#[async_trait]
pub trait ActivityLog: Send + Sync {
    /// Append one entry.
    async fn append(&self, entry: &ActivityLogEntry) -> StoreResult<()>;
}

/// The chat platform the relay reads from and posts to.
///
/// Implementations map platform failures onto
/// [`herald_error::PlatformErrorKind`]; in particular, add-member calls must
/// report `AlreadyMember` and `UnknownMember` distinctly so membership sync
/// can tolerate them.
#[async_trait]
pub trait AlertPlatform: Send + Sync {
    /// Resolve a guild text channel that can host alerts and threads.
    async fn fetch_text_channel(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> PlatformResult<TextChannelRef>;

    /// Fetch a voice room with its permission data.
    async fn fetch_room(&self, guild_id: GuildId, room_id: ChannelId) -> PlatformResult<VoiceRoom>;

    /// Every guild member holding `role_id`.
    async fn members_with_role(
        &self,
        guild_id: GuildId,
        role_id: RoleId,
    ) -> PlatformResult<Vec<MemberRef>>;

    /// Look up one member, `None` if they are not in the guild.
    async fn fetch_member(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> PlatformResult<Option<MemberRef>>;

    /// Create a private thread under `parent`.
    async fn create_private_thread(
        &self,
        parent: ChannelId,
        name: &str,
        reason: &str,
    ) -> PlatformResult<ThreadHandle>;

    /// Current state of a thread, `None` if it no longer exists.
    async fn fetch_thread(&self, thread_id: ChannelId) -> PlatformResult<Option<ThreadState>>;

    /// Add a member to a thread.
    async fn add_thread_member(&self, thread_id: ChannelId, user_id: UserId) -> PlatformResult<()>;

    /// Delete a thread.
    async fn delete_thread(&self, thread_id: ChannelId) -> PlatformResult<()>;

    /// Post an alert, returning the sent message id.
    async fn send_alert(
        &self,
        channel_id: ChannelId,
        alert: &AlertPayload,
    ) -> PlatformResult<MessageId>;

    /// Delete a previously sent message.
    async fn delete_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> PlatformResult<()>;
}
