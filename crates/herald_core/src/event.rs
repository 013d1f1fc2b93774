//! Gateway notifications, reduced to what the relay needs.

use crate::{ChannelId, GuildId, RoleId, UserId};
use serde::{Deserialize, Serialize};

/// A member's voice-room occupancy changed.
///
/// `old_room` and `new_room` both present and equal means a mute or deafen
/// change; both present and different is a move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancyChange {
    /// Guild the rooms belong to
    pub guild_id: GuildId,
    /// Room the member was in
    pub old_room: Option<ChannelId>,
    /// Room the member is in now
    pub new_room: Option<ChannelId>,
    /// Acting member
    pub actor_id: UserId,
    /// Display name used in alert text
    pub actor_name: String,
    /// Unique tag recorded in the activity log
    pub actor_tag: String,
    /// Actor is a bot account
    pub actor_is_service: bool,
    /// Roles the actor holds
    pub actor_roles: Vec<RoleId>,
}

/// Online status as reported by the gateway.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum OnlineStatus {
    /// Online
    Online,
    /// Idle
    Idle,
    /// Do not disturb
    #[strum(serialize = "dnd")]
    DoNotDisturb,
    /// Invisible
    Invisible,
    /// Offline, or never seen
    #[default]
    Offline,
}

/// A member's online status changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceChange {
    /// Guild the presence was observed in
    pub guild_id: GuildId,
    /// Acting member
    pub actor_id: UserId,
    /// Display name used in alert text
    pub actor_name: String,
    /// Unique tag recorded in the activity log
    pub actor_tag: String,
    /// Actor is a bot account
    pub actor_is_service: bool,
    /// Roles the actor holds
    pub actor_roles: Vec<RoleId>,
    /// Status before this update, if known
    pub previous_status: Option<OnlineStatus>,
    /// Status after this update
    pub new_status: OnlineStatus,
}
