//! Event classification.

use herald_core::{
    AlertKind, ChannelId, GuildAlertConfig, OccupancyChange, OnlineStatus, PresenceChange,
};

/// What an occupancy change means for alerting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccupancyClass {
    /// Member joined the room
    Join(ChannelId),
    /// Member left the room
    Leave(ChannelId),
    /// Member moved between rooms; never announced
    IgnoredMove,
    /// Filtered by configuration, actor, or kind of change
    IgnoredFiltered,
}

impl OccupancyClass {
    /// The alert to send, if any.
    pub fn alert(self) -> Option<(AlertKind, ChannelId)> {
        match self {
            OccupancyClass::Join(room) => Some((AlertKind::Join, room)),
            OccupancyClass::Leave(room) => Some((AlertKind::Leave, room)),
            OccupancyClass::IgnoredMove | OccupancyClass::IgnoredFiltered => None,
        }
    }
}

/// What a presence change means for alerting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceClass {
    /// Member came online
    Online,
    /// Not announced
    Ignored,
}

/// Classify a voice occupancy change against a guild's configuration.
///
/// # Examples
///
/// ```
/// use herald_core::{ChannelId, GuildAlertConfig, GuildId, OccupancyChange, UserId};
/// use herald_relay::{OccupancyClass, classify_occupancy};
///
/// let mut config = GuildAlertConfig::new(GuildId::new(1));
/// config.alerts_enabled = true;
/// config.text_channel_id = Some(ChannelId::new(2));
///
/// let change = OccupancyChange {
///     guild_id: GuildId::new(1),
///     old_room: None,
///     new_room: Some(ChannelId::new(3)),
///     actor_id: UserId::new(4),
///     actor_name: "ada".into(),
///     actor_tag: "ada".into(),
///     actor_is_service: false,
///     actor_roles: vec![],
/// };
/// assert_eq!(classify_occupancy(&change, &config), OccupancyClass::Join(ChannelId::new(3)));
/// ```
pub fn classify_occupancy(change: &OccupancyChange, config: &GuildAlertConfig) -> OccupancyClass {
    if change.actor_is_service
        || config.destination().is_none()
        || config.is_ignored(&change.actor_roles)
    {
        return OccupancyClass::IgnoredFiltered;
    }

    match (change.old_room, change.new_room) {
        (Some(old), Some(new)) if old != new => OccupancyClass::IgnoredMove,
        (None, Some(new)) if config.join_alerts => OccupancyClass::Join(new),
        (Some(old), None) if config.leave_alerts => OccupancyClass::Leave(old),
        _ => OccupancyClass::IgnoredFiltered,
    }
}

/// Classify a presence change against a guild's configuration.
///
/// Only a transition into [`OnlineStatus::Online`] from any other status is
/// announced; an unknown previous status counts as not online.
pub fn classify_presence(change: &PresenceChange, config: &GuildAlertConfig) -> PresenceClass {
    let came_online = change.new_status == OnlineStatus::Online
        && change.previous_status != Some(OnlineStatus::Online);

    if came_online
        && !change.actor_is_service
        && config.online_alerts
        && config.destination().is_some()
        && !config.is_ignored(&change.actor_roles)
    {
        PresenceClass::Online
    } else {
        PresenceClass::Ignored
    }
}
