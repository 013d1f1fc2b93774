//! Administrative settings mutations.

use herald_cache::WriteBackCache;
use herald_core::{ChannelId, GuildAlertConfig, GuildId, RoleId, SettingToggle};
use tracing::{info, instrument};

/// Result of an activation or deactivation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsChange {
    /// The configuration changed
    Applied(GuildAlertConfig),
    /// Alerts were already enabled for the requested channel
    AlreadyActive(GuildAlertConfig),
    /// Alerts were already disabled
    AlreadyDisabled(GuildAlertConfig),
}

impl SettingsChange {
    /// Configuration after the request.
    pub fn config(&self) -> &GuildAlertConfig {
        match self {
            SettingsChange::Applied(config)
            | SettingsChange::AlreadyActive(config)
            | SettingsChange::AlreadyDisabled(config) => config,
        }
    }

    /// Whether anything changed.
    pub fn is_applied(&self) -> bool {
        matches!(self, SettingsChange::Applied(_))
    }
}

/// The operations behind the settings panel and admin commands.
///
/// Every mutation is read through the cache and written back with
/// [`WriteBackCache::update`], so it is visible at once and persisted within
/// one flush window.
#[derive(Debug, Clone)]
pub struct SettingsService {
    cache: WriteBackCache,
}

impl SettingsService {
    /// Create a service over `cache`.
    pub fn new(cache: WriteBackCache) -> Self {
        Self { cache }
    }

    /// Current configuration.
    pub async fn current(&self, guild_id: GuildId) -> GuildAlertConfig {
        self.cache.get(guild_id).await
    }

    /// Enable alerts and send them to `channel_id`.
    #[instrument(skip(self))]
    pub async fn activate(&self, guild_id: GuildId, channel_id: ChannelId) -> SettingsChange {
        let mut config = self.cache.get(guild_id).await;
        if config.alerts_enabled && config.text_channel_id == Some(channel_id) {
            return SettingsChange::AlreadyActive(config);
        }
        config.alerts_enabled = true;
        config.text_channel_id = Some(channel_id);
        self.cache.update(config.clone());
        info!("Alerts activated");
        SettingsChange::Applied(config)
    }

    /// Disable alerts, keeping the destination channel.
    #[instrument(skip(self))]
    pub async fn deactivate(&self, guild_id: GuildId) -> SettingsChange {
        let mut config = self.cache.get(guild_id).await;
        if !config.alerts_enabled {
            return SettingsChange::AlreadyDisabled(config);
        }
        config.alerts_enabled = false;
        self.cache.update(config.clone());
        info!("Alerts deactivated");
        SettingsChange::Applied(config)
    }

    /// Flip one boolean setting.
    #[instrument(skip(self))]
    pub async fn toggle(&self, guild_id: GuildId, setting: SettingToggle) -> GuildAlertConfig {
        let mut config = self.cache.get(guild_id).await;
        let enabled = config.toggle(setting);
        self.cache.update(config.clone());
        info!(enabled, "Setting toggled");
        config
    }

    /// Silence members holding `role_id` and turn the filter on.
    #[instrument(skip(self))]
    pub async fn set_ignored_role(&self, guild_id: GuildId, role_id: RoleId) -> GuildAlertConfig {
        let mut config = self.cache.get(guild_id).await;
        config.ignored_role_id = Some(role_id);
        config.ignore_role_enabled = true;
        self.cache.update(config.clone());
        config
    }

    /// Remove the ignored role and turn the filter off.
    #[instrument(skip(self))]
    pub async fn clear_ignored_role(&self, guild_id: GuildId) -> GuildAlertConfig {
        let mut config = self.cache.get(guild_id).await;
        config.ignored_role_id = None;
        config.ignore_role_enabled = false;
        self.cache.update(config.clone());
        config
    }

    /// Restore the documented defaults.
    #[instrument(skip(self))]
    pub async fn reset(&self, guild_id: GuildId) -> GuildAlertConfig {
        let config = self.cache.reset(guild_id).await;
        info!("Settings reset to defaults");
        config
    }
}
