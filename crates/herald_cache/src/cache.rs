//! Write-back configuration cache implementation.

use derive_getters::Getters;
use futures::future::join_all;
use herald_core::{GuildAlertConfig, GuildId};
use herald_error::{RelayError, RelayErrorKind};
use herald_interface::ConfigStore;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Configuration for the write-back cache.
#[derive(
    Debug, Clone, Serialize, Deserialize, Getters, derive_setters::Setters, derive_builder::Builder,
)]
#[setters(prefix = "with_")]
pub struct WriteBackConfig {
    /// Coalescing window between the first mutation and its flush (milliseconds)
    #[serde(default = "default_flush_window_ms")]
    #[builder(default = "default_flush_window_ms()")]
    flush_window_ms: u64,
}

fn default_flush_window_ms() -> u64 {
    700
}

impl Default for WriteBackConfig {
    fn default() -> Self {
        Self {
            flush_window_ms: default_flush_window_ms(),
        }
    }
}

impl WriteBackConfig {
    /// The flush window as a duration.
    pub fn flush_window(&self) -> Duration {
        Duration::from_millis(self.flush_window_ms)
    }
}

/// Snapshots waiting to be persisted, plus the timer that will persist them.
#[derive(Default)]
struct PendingWrites {
    queue: HashMap<GuildId, GuildAlertConfig>,
    timer: Option<JoinHandle<()>>,
}

struct CacheInner {
    store: Arc<dyn ConfigStore>,
    config: WriteBackConfig,
    entries: RwLock<HashMap<GuildId, GuildAlertConfig>>,
    pending: Mutex<PendingWrites>,
    /// Held while a batch is being persisted.
    persisting: tokio::sync::Mutex<()>,
}

/// In-memory guild configuration with debounced persistence.
///
/// Cloning is cheap; clones share the same entries and write queue. Several
/// independent caches may coexist (one per engine instance).
///
/// # Example
///
/// ```no_run
/// # use std::sync::Arc;
/// # use herald_cache::{WriteBackCache, WriteBackConfig};
/// # use herald_core::{ChannelId, GuildId};
/// # async fn demo(store: Arc<dyn herald_interface::ConfigStore>) {
/// let cache = WriteBackCache::new(store, WriteBackConfig::default());
///
/// let mut config = cache.get(GuildId::new(1)).await;
/// config.alerts_enabled = true;
/// config.text_channel_id = Some(ChannelId::new(2));
/// cache.update(config);
///
/// // Visible immediately, persisted within one flush window.
/// assert!(cache.get(GuildId::new(1)).await.alerts_enabled);
/// # }
/// ```
#[derive(Clone)]
pub struct WriteBackCache {
    inner: Arc<CacheInner>,
}

impl std::fmt::Debug for WriteBackCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteBackCache")
            .field("config", &self.inner.config)
            .field("entries", &self.inner.entries.read().len())
            .field("pending", &self.inner.pending.lock().queue.len())
            .finish()
    }
}

impl WriteBackCache {
    /// Create an empty cache in front of `store`.
    pub fn new(store: Arc<dyn ConfigStore>, config: WriteBackConfig) -> Self {
        tracing::debug!(
            flush_window_ms = config.flush_window_ms,
            "Creating new WriteBackCache"
        );
        Self {
            inner: Arc::new(CacheInner {
                store,
                config,
                entries: RwLock::new(HashMap::new()),
                pending: Mutex::new(PendingWrites::default()),
                persisting: tokio::sync::Mutex::new(()),
            }),
        }
    }

    /// Cache configuration.
    pub fn config(&self) -> &WriteBackConfig {
        &self.inner.config
    }

    /// Configuration for a guild.
    ///
    /// On a miss the store is consulted. A guild without a row gets the
    /// default configuration, which is persisted right away; losing that
    /// insert to a concurrent initializer is not an error. If the store
    /// cannot be read the defaults are returned but neither cached nor
    /// persisted, so the next call tries the store again.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, guild_id: GuildId) -> GuildAlertConfig {
        if let Some(config) = self.cached(guild_id) {
            return config;
        }

        let loaded = match self.inner.store.get(guild_id).await {
            Ok(Some(config)) => config,
            Ok(None) => {
                let defaults = GuildAlertConfig::new(guild_id);
                match self.inner.store.insert(&defaults).await {
                    Ok(()) => tracing::debug!("Materialized default configuration"),
                    Err(e) if e.is_duplicate_key() => {
                        tracing::debug!("Default configuration already inserted elsewhere")
                    }
                    Err(e) => tracing::warn!(error = %e, "Failed to persist default configuration"),
                }
                defaults
            }
            Err(source) => {
                let err = RelayError::new(RelayErrorKind::ConfigRead {
                    guild_id: guild_id.get(),
                    source,
                });
                tracing::warn!(error = %err, "Using in-memory defaults");
                return GuildAlertConfig::new(guild_id);
            }
        };

        // A concurrent update() may have landed while the store was read.
        self.inner
            .entries
            .write()
            .entry(guild_id)
            .or_insert(loaded)
            .clone()
    }

    /// Cached configuration without touching the store.
    pub fn cached(&self, guild_id: GuildId) -> Option<GuildAlertConfig> {
        self.inner.entries.read().get(&guild_id).cloned()
    }

    /// Replace a guild's configuration.
    ///
    /// The new value is visible to readers immediately and queued for
    /// persistence. The first mutation after a flush schedules the next one;
    /// later mutations inside the window overwrite the queued snapshot.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn update(&self, config: GuildAlertConfig) {
        let guild_id = config.guild_id;
        self.inner
            .entries
            .write()
            .insert(guild_id, config.clone());

        let mut pending = self.inner.pending.lock();
        pending.queue.insert(guild_id, config);
        if pending.timer.is_none() {
            let cache = self.clone();
            let window = self.inner.config.flush_window();
            pending.timer = Some(tokio::spawn(async move {
                tokio::time::sleep(window).await;
                cache.flush_scheduled().await;
            }));
            tracing::trace!(guild_id = %guild_id, "Scheduled configuration flush");
        }
    }

    /// Number of guilds with a write waiting to be persisted.
    pub fn pending_writes(&self) -> usize {
        self.inner.pending.lock().queue.len()
    }

    /// Persist every pending write now and cancel the scheduled flush.
    ///
    /// Used on shutdown. Waits for a scheduled batch that is already being
    /// persisted, so every write queued before the call is durable on return.
    /// Returns the number of guilds this call persisted successfully; failures
    /// are logged per guild.
    #[tracing::instrument(skip(self))]
    pub async fn flush(&self) -> usize {
        let _persisting = self.inner.persisting.lock().await;
        let batch = {
            let mut pending = self.inner.pending.lock();
            if let Some(timer) = pending.timer.take() {
                timer.abort();
            }
            std::mem::take(&mut pending.queue)
        };
        self.persist(batch).await
    }

    /// Reset a guild to defaults.
    ///
    /// Drops any queued write for the guild, deletes the stored row and the
    /// cache entry, then materializes defaults as [`WriteBackCache::get`] does.
    /// A batch already being persisted finishes first, so it cannot land on
    /// top of the reset row.
    #[tracing::instrument(skip(self))]
    pub async fn reset(&self, guild_id: GuildId) -> GuildAlertConfig {
        let _persisting = self.inner.persisting.lock().await;
        if self
            .inner
            .pending
            .lock()
            .queue
            .remove(&guild_id)
            .is_some()
        {
            tracing::debug!("Dropped pending write");
        }

        if let Err(e) = self.inner.store.delete(guild_id).await {
            tracing::warn!(error = %e, "Failed to delete stored configuration");
        }
        self.inner.entries.write().remove(&guild_id);

        self.get(guild_id).await
    }

    /// Timer path: the handle being cleared belongs to the running task, so
    /// it is dropped rather than aborted.
    async fn flush_scheduled(&self) {
        let _persisting = self.inner.persisting.lock().await;
        let batch = {
            let mut pending = self.inner.pending.lock();
            pending.timer = None;
            std::mem::take(&mut pending.queue)
        };
        self.persist(batch).await;
    }

    async fn persist(&self, batch: HashMap<GuildId, GuildAlertConfig>) -> usize {
        if batch.is_empty() {
            return 0;
        }
        let attempted = batch.len();

        let results = join_all(batch.into_values().map(|config| async move {
            let guild_id = config.guild_id;
            self.inner
                .store
                .upsert(&config)
                .await
                .map_err(|source| {
                    RelayError::new(RelayErrorKind::ConfigWrite {
                        guild_id: guild_id.get(),
                        source,
                    })
                })
        }))
        .await;

        let mut persisted = 0;
        for result in results {
            match result {
                Ok(()) => persisted += 1,
                Err(e) => tracing::error!(error = %e, "Configuration write failed"),
            }
        }

        tracing::debug!(attempted, persisted, "Flushed configuration writes");
        persisted
    }
}
