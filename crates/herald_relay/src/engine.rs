//! The alert engine.

use crate::{
    AlertDispatcher, PresenceClass, RelayConfig, RoomPrivacy, SettingsService, ThreadManager,
    classify_occupancy, classify_presence, classify_room,
};
use herald_cache::WriteBackCache;
use herald_core::{
    ActivityLogEntry, AlertKind, AlertPayload, ChannelId, GuildAlertConfig, OccupancyChange,
    PresenceChange,
};
use herald_error::{RelayError, RelayErrorKind, RelayResult};
use herald_interface::{ActivityLog, AlertPlatform, ConfigStore};
use std::sync::Arc;
use tracing::{debug, info, instrument, trace, warn};

struct EngineInner {
    cache: WriteBackCache,
    platform: Arc<dyn AlertPlatform>,
    activity: Arc<dyn ActivityLog>,
    dispatcher: AlertDispatcher,
    threads: ThreadManager,
}

/// Turns gateway notifications into alerts.
///
/// Owns the configuration cache and the thread registry; nothing is global,
/// so independent engines can run side by side. Entry points never return
/// errors: every failure is logged and confined to the event that caused it.
///
/// # Example
///
/// ```no_run
/// # use std::sync::Arc;
/// # use herald_relay::{AlertEngine, RelayConfig};
/// # async fn demo(
/// #     store: Arc<dyn herald_interface::ConfigStore>,
/// #     log: Arc<dyn herald_interface::ActivityLog>,
/// #     platform: Arc<dyn herald_interface::AlertPlatform>,
/// #     change: herald_core::OccupancyChange,
/// # ) {
/// let engine = AlertEngine::new(store, log, platform, &RelayConfig::default());
/// engine.handle_occupancy(change).await;
/// engine.shutdown().await;
/// # }
/// ```
#[derive(Clone)]
pub struct AlertEngine {
    inner: Arc<EngineInner>,
}

impl std::fmt::Debug for AlertEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertEngine")
            .field("cache", &self.inner.cache)
            .field("threads", &self.inner.threads)
            .finish_non_exhaustive()
    }
}

impl AlertEngine {
    /// Wire an engine over its collaborators.
    pub fn new(
        store: Arc<dyn ConfigStore>,
        activity: Arc<dyn ActivityLog>,
        platform: Arc<dyn AlertPlatform>,
        config: &RelayConfig,
    ) -> Self {
        let cache = WriteBackCache::new(store, config.write_back());
        let dispatcher = AlertDispatcher::new(platform.clone(), config.auto_delete_after());
        let threads = ThreadManager::new(platform.clone(), dispatcher.clone(), config);
        Self {
            inner: Arc::new(EngineInner {
                cache,
                platform,
                activity,
                dispatcher,
                threads,
            }),
        }
    }

    /// Configuration cache.
    pub fn cache(&self) -> &WriteBackCache {
        &self.inner.cache
    }

    /// Private-room thread manager.
    pub fn threads(&self) -> &ThreadManager {
        &self.inner.threads
    }

    /// Administrative mutations over this engine's cache.
    pub fn settings(&self) -> SettingsService {
        SettingsService::new(self.inner.cache.clone())
    }

    /// Handle a voice occupancy change.
    #[instrument(
        skip_all,
        fields(guild_id = %change.guild_id, actor_id = %change.actor_id)
    )]
    pub async fn handle_occupancy(&self, change: OccupancyChange) {
        let config = self.inner.cache.get(change.guild_id).await;
        let class = classify_occupancy(&change, &config);
        let Some((kind, room_id)) = class.alert() else {
            trace!(?class, "Occupancy change not announced");
            return;
        };

        if let Err(e) = self.relay_room_alert(&change, &config, kind, room_id).await {
            warn!(error = %e, "Voice alert dropped");
        }
    }

    /// Handle an online status change.
    #[instrument(
        skip_all,
        fields(guild_id = %change.guild_id, actor_id = %change.actor_id)
    )]
    pub async fn handle_presence(&self, change: PresenceChange) {
        let config = self.inner.cache.get(change.guild_id).await;
        if classify_presence(&change, &config) != PresenceClass::Online {
            return;
        }
        let Some(channel_id) = config.destination() else {
            return;
        };

        let channel = match self
            .inner
            .platform
            .fetch_text_channel(change.guild_id, channel_id)
            .await
        {
            Ok(channel) => channel,
            Err(source) => {
                let err = resolution_error(channel_id, source);
                warn!(error = %err, "Online alert dropped");
                return;
            }
        };

        self.record(ActivityLogEntry::now(
            change.guild_id,
            change.actor_id,
            change.actor_tag.as_str(),
            channel.name.as_str(),
            AlertKind::Online,
        ));
        let alert = AlertPayload::online(&change.actor_name);
        self.inner
            .dispatcher
            .dispatch(channel.id, &alert, config.auto_delete)
            .await;
    }

    /// A voice room was deleted; drop its thread tracking.
    pub fn on_room_deleted(&self, room_id: ChannelId) -> bool {
        self.inner.threads.forget_room(room_id)
    }

    /// A thread was deleted; drop the entry that tracked it.
    pub fn on_thread_deleted(&self, thread_id: ChannelId) -> bool {
        self.inner.threads.forget_thread(thread_id)
    }

    /// Persist pending configuration and cancel all inactivity timers.
    ///
    /// Threads are left in place; the platform archives them on its own.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) {
        let forgotten = self.inner.threads.clear();
        let flushed = self.inner.cache.flush().await;
        info!(forgotten, flushed, "Alert engine stopped");
    }

    async fn relay_room_alert(
        &self,
        change: &OccupancyChange,
        config: &GuildAlertConfig,
        kind: AlertKind,
        room_id: ChannelId,
    ) -> RelayResult<()> {
        let Some(channel_id) = config.destination() else {
            return Ok(());
        };
        let platform = &self.inner.platform;

        let channel = platform
            .fetch_text_channel(change.guild_id, channel_id)
            .await
            .map_err(|source| resolution_error(channel_id, source))?;
        let room = platform
            .fetch_room(change.guild_id, room_id)
            .await
            .map_err(|source| resolution_error(room_id, source))?;

        self.record(ActivityLogEntry::now(
            change.guild_id,
            change.actor_id,
            change.actor_tag.as_str(),
            room.name.as_str(),
            kind,
        ));

        let alert = match kind {
            AlertKind::Leave => AlertPayload::leave(&change.actor_name, &room.name),
            AlertKind::Join | AlertKind::Online => {
                AlertPayload::join(&change.actor_name, &room.name)
            }
        };

        match classify_room(&room) {
            RoomPrivacy::Private if config.private_thread_alerts => {
                self.inner
                    .threads
                    .deliver(&channel, &room, &alert, config.auto_delete)
                    .await?;
            }
            privacy => {
                debug!(?privacy, room = %room.name, "Sending to alert channel");
                self.inner
                    .dispatcher
                    .dispatch(channel.id, &alert, config.auto_delete)
                    .await;
            }
        }
        Ok(())
    }

    /// Append to the activity log without waiting.
    fn record(&self, entry: ActivityLogEntry) {
        let activity = self.inner.activity.clone();
        tokio::spawn(async move {
            if let Err(e) = activity.append(&entry).await {
                warn!(
                    guild_id = %entry.guild_id(),
                    kind = %entry.kind(),
                    error = %e,
                    "Failed to record activity"
                );
            }
        });
    }
}

#[track_caller]
fn resolution_error(channel_id: ChannelId, source: herald_error::PlatformError) -> RelayError {
    RelayError::new(RelayErrorKind::ChannelResolution {
        channel_id: channel_id.get(),
        source,
    })
}
