//! Per-guild alert configuration.

use crate::{ChannelId, GuildId, RoleId};
use serde::{Deserialize, Serialize};

/// Alert settings for one guild.
///
/// Exactly one logical configuration exists per guild. [`GuildAlertConfig::new`]
/// yields the documented defaults: alerts off, no destination, every alert
/// kind on, auto-delete on, no ignored role.
///
/// # Examples
///
/// ```
/// use herald_core::{GuildAlertConfig, GuildId};
///
/// let config = GuildAlertConfig::new(GuildId::new(1));
/// assert!(!config.alerts_enabled);
/// assert!(config.join_alerts && config.leave_alerts && config.online_alerts);
/// assert!(config.text_channel_id.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildAlertConfig {
    /// Guild this configuration belongs to
    pub guild_id: GuildId,
    /// Master switch for all alerts
    pub alerts_enabled: bool,
    /// Destination text channel
    pub text_channel_id: Option<ChannelId>,
    /// Send alerts when members join a voice room
    pub join_alerts: bool,
    /// Send alerts when members leave a voice room
    pub leave_alerts: bool,
    /// Send alerts when members come online
    pub online_alerts: bool,
    /// Route private-room alerts through a private thread
    pub private_thread_alerts: bool,
    /// Delete sent alerts after a short delay
    pub auto_delete: bool,
    /// Members holding this role are not announced
    pub ignored_role_id: Option<RoleId>,
    /// Whether the ignored-role filter is active
    pub ignore_role_enabled: bool,
}

impl GuildAlertConfig {
    /// Default configuration for a guild.
    pub fn new(guild_id: GuildId) -> Self {
        Self {
            guild_id,
            alerts_enabled: false,
            text_channel_id: None,
            join_alerts: true,
            leave_alerts: true,
            online_alerts: true,
            private_thread_alerts: true,
            auto_delete: true,
            ignored_role_id: None,
            ignore_role_enabled: false,
        }
    }

    /// Alerts are on and have somewhere to go.
    pub fn destination(&self) -> Option<ChannelId> {
        if self.alerts_enabled {
            self.text_channel_id
        } else {
            None
        }
    }

    /// Whether a member with `roles` is silenced by the ignored-role filter.
    ///
    /// ```
    /// use herald_core::{GuildAlertConfig, GuildId, RoleId};
    ///
    /// let mut config = GuildAlertConfig::new(GuildId::new(1));
    /// config.ignored_role_id = Some(RoleId::new(9));
    /// assert!(!config.is_ignored(&[RoleId::new(9)]));
    ///
    /// config.ignore_role_enabled = true;
    /// assert!(config.is_ignored(&[RoleId::new(3), RoleId::new(9)]));
    /// ```
    pub fn is_ignored(&self, roles: &[RoleId]) -> bool {
        match (self.ignore_role_enabled, self.ignored_role_id) {
            (true, Some(role)) => roles.contains(&role),
            _ => false,
        }
    }

    /// Flip one boolean setting and return its new value.
    pub fn toggle(&mut self, setting: SettingToggle) -> bool {
        let flag = match setting {
            SettingToggle::JoinAlerts => &mut self.join_alerts,
            SettingToggle::LeaveAlerts => &mut self.leave_alerts,
            SettingToggle::OnlineAlerts => &mut self.online_alerts,
            SettingToggle::PrivateThreadAlerts => &mut self.private_thread_alerts,
            SettingToggle::AutoDelete => &mut self.auto_delete,
            SettingToggle::IgnoreRole => &mut self.ignore_role_enabled,
        };
        *flag = !*flag;
        *flag
    }
}

/// A boolean setting the settings panel can flip.
///
/// Parses from the panel's button ids.
///
/// ```
/// use herald_core::SettingToggle;
/// use std::str::FromStr;
///
/// assert_eq!(
///     SettingToggle::from_str("toggleAutoDelete").ok(),
///     Some(SettingToggle::AutoDelete)
/// );
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::EnumIter,
    strum::Display,
    strum::AsRefStr,
)]
pub enum SettingToggle {
    /// Join alerts
    #[strum(serialize = "toggleJoinAlerts")]
    JoinAlerts,
    /// Leave alerts
    #[strum(serialize = "toggleLeaveAlerts")]
    LeaveAlerts,
    /// Online alerts
    #[strum(serialize = "toggleOnlineAlerts")]
    OnlineAlerts,
    /// Private-thread routing
    #[strum(serialize = "togglePrivateThreads")]
    PrivateThreadAlerts,
    /// Auto-deletion of sent alerts
    #[strum(serialize = "toggleAutoDelete")]
    AutoDelete,
    /// Ignored-role filter
    #[strum(serialize = "toggleIgnoreRole")]
    IgnoreRole,
}
