//! Write-back cache behaviour against an in-memory store.

use async_trait::async_trait;
use herald_cache::{WriteBackCache, WriteBackConfig, WriteBackConfigBuilder};
use herald_core::{ChannelId, GuildAlertConfig, GuildId, SettingToggle};
use herald_error::{StoreError, StoreErrorKind, StoreResult};
use herald_interface::ConfigStore;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// In-memory store that counts calls and can be told to fail.
#[derive(Default)]
struct MemoryStore {
    rows: Mutex<HashMap<GuildId, GuildAlertConfig>>,
    reads: AtomicUsize,
    inserts: AtomicUsize,
    upserts: AtomicUsize,
    fail_reads: AtomicBool,
    fail_upserts_for: Mutex<HashSet<GuildId>>,
    upsert_delay: Mutex<Duration>,
}

impl MemoryStore {
    fn row(&self, guild_id: GuildId) -> Option<GuildAlertConfig> {
        self.rows.lock().unwrap().get(&guild_id).cloned()
    }

    fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn get(&self, guild_id: GuildId) -> StoreResult<Option<GuildAlertConfig>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let row = self.row(guild_id);
        // Let concurrent readers observe the same snapshot.
        tokio::task::yield_now().await;
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::new(StoreErrorKind::Unavailable(
                "connection refused".to_string(),
            )));
        }
        Ok(row)
    }

    async fn insert(&self, config: &GuildAlertConfig) -> StoreResult<()> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();
        if rows.contains_key(&config.guild_id) {
            return Err(StoreError::new(StoreErrorKind::DuplicateKey(
                config.guild_id.get(),
            )));
        }
        rows.insert(config.guild_id, config.clone());
        Ok(())
    }

    async fn upsert(&self, config: &GuildAlertConfig) -> StoreResult<()> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        let delay = *self.upsert_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.fail_upserts_for.lock().unwrap().contains(&config.guild_id) {
            return Err(StoreError::new(StoreErrorKind::Query(
                "disk full".to_string(),
            )));
        }
        self.rows
            .lock()
            .unwrap()
            .insert(config.guild_id, config.clone());
        Ok(())
    }

    async fn delete(&self, guild_id: GuildId) -> StoreResult<()> {
        self.rows.lock().unwrap().remove(&guild_id);
        Ok(())
    }
}

const GUILD: GuildId = GuildId::new(100);

fn cache_with(store: &Arc<MemoryStore>) -> WriteBackCache {
    WriteBackCache::new(store.clone(), WriteBackConfig::default())
}

async fn past_window() {
    tokio::time::sleep(Duration::from_millis(750)).await;
}

#[tokio::test(start_paused = true)]
async fn test_first_read_materializes_defaults() {
    let store = Arc::new(MemoryStore::default());
    let cache = cache_with(&store);

    let config = cache.get(GUILD).await;
    assert_eq!(config, GuildAlertConfig::new(GUILD));
    assert_eq!(store.row(GUILD), Some(GuildAlertConfig::new(GUILD)));
    assert_eq!(store.inserts.load(Ordering::SeqCst), 1);

    // Served from memory afterwards.
    cache.get(GUILD).await;
    assert_eq!(store.reads.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_existing_row_is_loaded_not_overwritten() {
    let store = Arc::new(MemoryStore::default());
    let mut stored = GuildAlertConfig::new(GUILD);
    stored.alerts_enabled = true;
    stored.text_channel_id = Some(ChannelId::new(5));
    store.rows.lock().unwrap().insert(GUILD, stored.clone());

    let cache = cache_with(&store);
    assert_eq!(cache.get(GUILD).await, stored);
    assert_eq!(store.inserts.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_initialization_stores_one_row() {
    let store = Arc::new(MemoryStore::default());
    let first = cache_with(&store);
    let second = cache_with(&store);

    let (a, b) = tokio::join!(first.get(GUILD), second.get(GUILD));

    assert_eq!(a, GuildAlertConfig::new(GUILD));
    assert_eq!(b, GuildAlertConfig::new(GUILD));
    assert_eq!(store.row_count(), 1);
    // Both saw an empty store; the loser's duplicate insert was tolerated.
    assert_eq!(store.inserts.load(Ordering::SeqCst), 2);
    assert!(first.cached(GUILD).is_some());
    assert!(second.cached(GUILD).is_some());
}

#[tokio::test(start_paused = true)]
async fn test_read_failure_falls_back_without_caching() {
    let store = Arc::new(MemoryStore::default());
    store.fail_reads.store(true, Ordering::SeqCst);
    let cache = cache_with(&store);

    assert_eq!(cache.get(GUILD).await, GuildAlertConfig::new(GUILD));
    assert!(cache.cached(GUILD).is_none());
    assert_eq!(store.inserts.load(Ordering::SeqCst), 0);
    assert_eq!(store.row_count(), 0);

    store.fail_reads.store(false, Ordering::SeqCst);
    cache.get(GUILD).await;
    assert_eq!(store.reads.load(Ordering::SeqCst), 2);
    assert_eq!(store.row_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_update_is_visible_before_flush() {
    let store = Arc::new(MemoryStore::default());
    let cache = cache_with(&store);

    let mut config = cache.get(GUILD).await;
    config.alerts_enabled = true;
    config.text_channel_id = Some(ChannelId::new(1));
    cache.update(config.clone());

    assert_eq!(cache.get(GUILD).await, config);
    assert!(!store.row(GUILD).unwrap().alerts_enabled);
    assert_eq!(cache.pending_writes(), 1);

    past_window().await;
    assert_eq!(store.row(GUILD), Some(config));
    assert_eq!(cache.pending_writes(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_rapid_toggles_coalesce_into_one_upsert() {
    let store = Arc::new(MemoryStore::default());
    let cache = cache_with(&store);

    let toggles = [
        SettingToggle::JoinAlerts,
        SettingToggle::LeaveAlerts,
        SettingToggle::OnlineAlerts,
        SettingToggle::AutoDelete,
        SettingToggle::JoinAlerts,
    ];
    for toggle in toggles {
        let mut config = cache.get(GUILD).await;
        config.toggle(toggle);
        cache.update(config);
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    let expected = cache.get(GUILD).await;

    past_window().await;
    assert_eq!(store.upserts.load(Ordering::SeqCst), 1);
    let stored = store.row(GUILD).unwrap();
    assert_eq!(stored, expected);
    assert!(stored.join_alerts);
    assert!(!stored.leave_alerts);
    assert!(!stored.online_alerts);
    assert!(!stored.auto_delete);
}

#[tokio::test(start_paused = true)]
async fn test_mutation_after_flush_schedules_a_new_window() {
    let store = Arc::new(MemoryStore::default());
    let cache = cache_with(&store);

    let mut config = cache.get(GUILD).await;
    config.alerts_enabled = true;
    cache.update(config.clone());
    past_window().await;

    config.auto_delete = false;
    cache.update(config.clone());
    past_window().await;

    assert_eq!(store.upserts.load(Ordering::SeqCst), 2);
    assert_eq!(store.row(GUILD), Some(config));
}

#[tokio::test(start_paused = true)]
async fn test_custom_flush_window() {
    let store = Arc::new(MemoryStore::default());
    let config = WriteBackConfigBuilder::default()
        .flush_window_ms(2_000)
        .build()
        .expect("Valid config");
    let cache = WriteBackCache::new(store.clone(), config);

    let mut settings = cache.get(GUILD).await;
    settings.alerts_enabled = true;
    cache.update(settings);

    past_window().await;
    assert_eq!(store.upserts.load(Ordering::SeqCst), 0);

    tokio::time::sleep(Duration::from_millis(1_500)).await;
    assert_eq!(store.upserts.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_one_failing_guild_does_not_block_others() {
    let store = Arc::new(MemoryStore::default());
    let failing = GuildId::new(1);
    let healthy = GuildId::new(2);
    store.fail_upserts_for.lock().unwrap().insert(failing);
    let cache = cache_with(&store);

    for guild in [failing, healthy] {
        let mut config = cache.get(guild).await;
        config.alerts_enabled = true;
        cache.update(config);
    }

    assert_eq!(cache.flush().await, 1);
    assert!(store.row(healthy).unwrap().alerts_enabled);
    assert!(!store.row(failing).unwrap().alerts_enabled);
    // Still correct in memory.
    assert!(cache.get(failing).await.alerts_enabled);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_flush_persists_and_cancels_timer() {
    let store = Arc::new(MemoryStore::default());
    let cache = cache_with(&store);

    let mut config = cache.get(GUILD).await;
    config.alerts_enabled = true;
    cache.update(config.clone());

    assert_eq!(cache.flush().await, 1);
    assert_eq!(store.row(GUILD), Some(config));

    past_window().await;
    assert_eq!(store.upserts.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_flush_waits_for_inflight_batch() {
    let store = Arc::new(MemoryStore::default());
    *store.upsert_delay.lock().unwrap() = Duration::from_secs(1);
    let cache = cache_with(&store);

    let mut config = cache.get(GUILD).await;
    config.alerts_enabled = true;
    config.text_channel_id = Some(ChannelId::new(9));
    cache.update(config.clone());

    // The scheduled batch is mid-upsert when shutdown starts.
    past_window().await;
    assert_eq!(store.upserts.load(Ordering::SeqCst), 1);
    assert!(store.row(GUILD).is_some_and(|row| !row.alerts_enabled));

    assert_eq!(cache.flush().await, 0);
    assert_eq!(store.row(GUILD), Some(config));
    assert_eq!(store.upserts.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_reset_waits_for_inflight_batch() {
    let store = Arc::new(MemoryStore::default());
    *store.upsert_delay.lock().unwrap() = Duration::from_secs(1);
    let cache = cache_with(&store);

    let mut config = cache.get(GUILD).await;
    config.alerts_enabled = true;
    config.text_channel_id = Some(ChannelId::new(9));
    cache.update(config);

    past_window().await;
    let reset = cache.reset(GUILD).await;
    assert_eq!(reset, GuildAlertConfig::new(GUILD));

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(cache.get(GUILD).await, GuildAlertConfig::new(GUILD));
    assert_eq!(store.row(GUILD), Some(GuildAlertConfig::new(GUILD)));
    assert_eq!(store.upserts.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_reset_drops_pending_write_and_restores_defaults() {
    let store = Arc::new(MemoryStore::default());
    let cache = cache_with(&store);

    let mut config = cache.get(GUILD).await;
    config.alerts_enabled = true;
    config.text_channel_id = Some(ChannelId::new(9));
    cache.update(config);

    let reset = cache.reset(GUILD).await;
    assert_eq!(reset, GuildAlertConfig::new(GUILD));

    past_window().await;
    assert_eq!(store.upserts.load(Ordering::SeqCst), 0);
    assert_eq!(store.row(GUILD), Some(GuildAlertConfig::new(GUILD)));
    assert_eq!(store.row_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_delete_then_read_yields_defaults() {
    let store = Arc::new(MemoryStore::default());
    let cache = cache_with(&store);

    let mut config = cache.get(GUILD).await;
    config.online_alerts = false;
    cache.update(config);
    cache.flush().await;

    store.delete(GUILD).await.unwrap();
    let fresh = cache_with(&store);
    assert_eq!(fresh.get(GUILD).await, GuildAlertConfig::new(GUILD));
}
