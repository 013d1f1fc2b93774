//! Channel and member snapshots fetched from the platform.

use crate::{ChannelId, GuildId, PermissionOverwrite, Permissions, UserId};
use serde::{Deserialize, Serialize};

/// A voice room with the permission data needed to classify it.
///
/// `everyone_permissions` and `overwrites` are `None` when the platform did
/// not return them; such rooms are treated as public.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceRoom {
    /// Room id
    pub id: ChannelId,
    /// Guild owning the room
    pub guild_id: GuildId,
    /// Display name
    pub name: String,
    /// Base permissions of the guild's @everyone role
    pub everyone_permissions: Option<Permissions>,
    /// Channel-level permission overwrites
    pub overwrites: Option<Vec<PermissionOverwrite>>,
}

/// A resolved destination text channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChannelRef {
    /// Channel id
    pub id: ChannelId,
    /// Display name
    pub name: String,
}

/// A guild member reduced to what membership sync needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberRef {
    /// User id
    pub id: UserId,
    /// Bot account
    pub is_bot: bool,
}

/// A private thread created by the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadHandle {
    /// Thread id
    pub id: ChannelId,
    /// Parent text channel
    pub parent_id: ChannelId,
    /// Thread name
    pub name: String,
}

/// Liveness of an existing thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadState {
    /// Thread has been archived
    pub archived: bool,
    /// Thread has been locked
    pub locked: bool,
}

impl ThreadState {
    /// A thread that can still receive alerts.
    pub fn is_usable(&self) -> bool {
        !self.archived && !self.locked
    }
}
