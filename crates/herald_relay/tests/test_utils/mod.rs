//! In-memory collaborators for engine tests.

#![allow(dead_code)]

use async_trait::async_trait;
use herald_core::{
    ActivityLogEntry, AlertPayload, ChannelId, GuildAlertConfig, GuildId, MemberRef, MessageId,
    OccupancyChange, OverwriteTarget, PermissionOverwrite, Permissions, RoleId, TextChannelRef,
    ThreadHandle, ThreadState, UserId, VoiceRoom,
};
use herald_error::{
    PlatformError, PlatformErrorKind, PlatformResult, StoreError, StoreErrorKind, StoreResult,
};
use herald_interface::{ActivityLog, AlertPlatform, ConfigStore};
use herald_relay::{AlertEngine, RelayConfig};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const GUILD: GuildId = GuildId::new(1);
pub const TEXT: ChannelId = ChannelId::new(10);
pub const STAFF_ROLE: RoleId = RoleId::new(50);

/// Config store backed by a map.
#[derive(Default)]
pub struct MockStore {
    pub rows: Mutex<HashMap<GuildId, GuildAlertConfig>>,
    pub upserts: AtomicUsize,
}

impl MockStore {
    pub fn row(&self, guild_id: GuildId) -> Option<GuildAlertConfig> {
        self.rows.lock().unwrap().get(&guild_id).cloned()
    }
}

#[async_trait]
impl ConfigStore for MockStore {
    async fn get(&self, guild_id: GuildId) -> StoreResult<Option<GuildAlertConfig>> {
        Ok(self.row(guild_id))
    }

    async fn insert(&self, config: &GuildAlertConfig) -> StoreResult<()> {
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

/// Activity log that keeps entries in memory.
#[derive(Default)]
pub struct MockActivityLog {
    pub entries: Mutex<Vec<ActivityLogEntry>>,
}

impl MockActivityLog {
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

#[async_trait]
impl ActivityLog for MockActivityLog {
    async fn append(&self, entry: &ActivityLogEntry) -> StoreResult<()> {
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }
}

/// A sent alert.
#[derive(Debug, Clone)]
pub struct SentAlert {
    pub channel_id: ChannelId,
    pub alert: AlertPayload,
    pub message_id: MessageId,
}

/// Scriptable platform recording every call.
pub struct MockPlatform {
    pub text_channels: Mutex<HashMap<ChannelId, TextChannelRef>>,
    pub rooms: Mutex<HashMap<ChannelId, VoiceRoom>>,
    pub role_members: Mutex<HashMap<RoleId, Vec<MemberRef>>>,
    pub members: Mutex<HashMap<UserId, MemberRef>>,
    pub threads: Mutex<HashMap<ChannelId, ThreadState>>,
    pub thread_names: Mutex<Vec<String>>,
    pub thread_members: Mutex<HashMap<ChannelId, HashSet<UserId>>>,
    pub sent: Mutex<Vec<SentAlert>>,
    pub deleted_messages: Mutex<Vec<MessageId>>,
    pub deleted_threads: Mutex<Vec<ChannelId>>,
    pub creations: AtomicUsize,
    pub add_calls: AtomicUsize,
    pub create_delay: Mutex<Duration>,
    pub fail_create: AtomicBool,
    pub fail_send: AtomicBool,
    pub fail_fetch_thread: AtomicBool,
    pub unknown_members: Mutex<HashSet<UserId>>,
    pub flaky_members: Mutex<HashSet<UserId>>,
    next_id: AtomicU64,
}

impl Default for MockPlatform {
    fn default() -> Self {
        let platform = Self {
            text_channels: Mutex::new(HashMap::new()),
            rooms: Mutex::new(HashMap::new()),
            role_members: Mutex::new(HashMap::new()),
            members: Mutex::new(HashMap::new()),
            threads: Mutex::new(HashMap::new()),
            thread_names: Mutex::new(Vec::new()),
            thread_members: Mutex::new(HashMap::new()),
            sent: Mutex::new(Vec::new()),
            deleted_messages: Mutex::new(Vec::new()),
            deleted_threads: Mutex::new(Vec::new()),
            creations: AtomicUsize::new(0),
            add_calls: AtomicUsize::new(0),
            create_delay: Mutex::new(Duration::ZERO),
            fail_create: AtomicBool::new(false),
            fail_send: AtomicBool::new(false),
            fail_fetch_thread: AtomicBool::new(false),
            unknown_members: Mutex::new(HashSet::new()),
            flaky_members: Mutex::new(HashSet::new()),
            next_id: AtomicU64::new(1_000),
        };
        platform.text_channels.lock().unwrap().insert(
            TEXT,
            TextChannelRef {
                id: TEXT,
                name: "vc-alerts".to_string(),
            },
        );
        platform
    }
}

impl MockPlatform {
    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    pub fn add_room(&self, room: VoiceRoom) {
        self.rooms.lock().unwrap().insert(room.id, room);
    }

    pub fn add_role_member(&self, role_id: RoleId, user: u64, is_bot: bool) {
        let member = MemberRef {
            id: UserId::new(user),
            is_bot,
        };
        self.members.lock().unwrap().insert(member.id, member);
        self.role_members
            .lock()
            .unwrap()
            .entry(role_id)
            .or_default()
            .push(member);
    }

    pub fn add_member(&self, user: u64, is_bot: bool) {
        let member = MemberRef {
            id: UserId::new(user),
            is_bot,
        };
        self.members.lock().unwrap().insert(member.id, member);
    }

    pub fn creations(&self) -> usize {
        self.creations.load(Ordering::SeqCst)
    }

    pub fn add_calls(&self) -> usize {
        self.add_calls.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<SentAlert> {
        self.sent.lock().unwrap().clone()
    }

    pub fn deleted_threads(&self) -> Vec<ChannelId> {
        self.deleted_threads.lock().unwrap().clone()
    }

    pub fn thread_members(&self, thread_id: ChannelId) -> HashSet<UserId> {
        self.thread_members
            .lock()
            .unwrap()
            .get(&thread_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn set_thread_state(&self, thread_id: ChannelId, state: ThreadState) {
        self.threads.lock().unwrap().insert(thread_id, state);
    }
}

fn platform_error(kind: PlatformErrorKind) -> PlatformError {
    PlatformError::new(kind)
}

#[async_trait]
impl AlertPlatform for MockPlatform {
    async fn fetch_text_channel(
        &self,
        _guild_id: GuildId,
        channel_id: ChannelId,
    ) -> PlatformResult<TextChannelRef> {
        self.text_channels
            .lock()
            .unwrap()
            .get(&channel_id)
            .cloned()
            .ok_or_else(|| platform_error(PlatformErrorKind::ChannelNotFound(channel_id.get())))
    }

    async fn fetch_room(
        &self,
        _guild_id: GuildId,
        room_id: ChannelId,
    ) -> PlatformResult<VoiceRoom> {
        self.rooms
            .lock()
            .unwrap()
            .get(&room_id)
            .cloned()
            .ok_or_else(|| platform_error(PlatformErrorKind::ChannelNotFound(room_id.get())))
    }

    async fn members_with_role(
        &self,
        _guild_id: GuildId,
        role_id: RoleId,
    ) -> PlatformResult<Vec<MemberRef>> {
        Ok(self
            .role_members
            .lock()
            .unwrap()
            .get(&role_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_member(
        &self,
        _guild_id: GuildId,
        user_id: UserId,
    ) -> PlatformResult<Option<MemberRef>> {
        Ok(self.members.lock().unwrap().get(&user_id).copied())
    }

    async fn create_private_thread(
        &self,
        parent: ChannelId,
        name: &str,
        _reason: &str,
    ) -> PlatformResult<ThreadHandle> {
        self.creations.fetch_add(1, Ordering::SeqCst);
        let delay = *self.create_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(platform_error(PlatformErrorKind::MissingPermissions(
                "CREATE_PRIVATE_THREADS".to_string(),
            )));
        }

        let thread = ThreadHandle {
            id: ChannelId::new(self.next_id()),
            parent_id: parent,
            name: name.to_string(),
        };
        self.threads.lock().unwrap().insert(
            thread.id,
            ThreadState {
                archived: false,
                locked: false,
            },
        );
        self.thread_names.lock().unwrap().push(name.to_string());
        Ok(thread)
    }

    async fn fetch_thread(&self, thread_id: ChannelId) -> PlatformResult<Option<ThreadState>> {
        if self.fail_fetch_thread.load(Ordering::SeqCst) {
            return Err(platform_error(PlatformErrorKind::Api(
                "gateway timeout".to_string(),
            )));
        }
        Ok(self.threads.lock().unwrap().get(&thread_id).copied())
    }

    async fn add_thread_member(&self, thread_id: ChannelId, user_id: UserId) -> PlatformResult<()> {
        self.add_calls.fetch_add(1, Ordering::SeqCst);
        if self.unknown_members.lock().unwrap().contains(&user_id) {
            return Err(platform_error(PlatformErrorKind::UnknownMember(user_id.get())));
        }
        if self.flaky_members.lock().unwrap().contains(&user_id) {
            return Err(platform_error(PlatformErrorKind::RateLimited(
                "retry after 1s".to_string(),
            )));
        }
        let mut members = self.thread_members.lock().unwrap();
        if !members.entry(thread_id).or_default().insert(user_id) {
            return Err(platform_error(PlatformErrorKind::AlreadyMember(user_id.get())));
        }
        Ok(())
    }

    async fn delete_thread(&self, thread_id: ChannelId) -> PlatformResult<()> {
        self.deleted_threads.lock().unwrap().push(thread_id);
        self.threads.lock().unwrap().remove(&thread_id);
        Ok(())
    }

    async fn send_alert(
        &self,
        channel_id: ChannelId,
        alert: &AlertPayload,
    ) -> PlatformResult<MessageId> {
        if self.fail_send.load(Ordering::SeqCst) {
            return Err(platform_error(PlatformErrorKind::Api(
                "503 Service Unavailable".to_string(),
            )));
        }
        let message_id = MessageId::new(self.next_id());
        self.sent.lock().unwrap().push(SentAlert {
            channel_id,
            alert: alert.clone(),
            message_id,
        });
        Ok(message_id)
    }

    async fn delete_message(
        &self,
        _channel_id: ChannelId,
        message_id: MessageId,
    ) -> PlatformResult<()> {
        self.deleted_messages.lock().unwrap().push(message_id);
        Ok(())
    }
}

/// A room everyone can see.
pub fn public_room(id: u64, name: &str) -> VoiceRoom {
    VoiceRoom {
        id: ChannelId::new(id),
        guild_id: GUILD,
        name: name.to_string(),
        everyone_permissions: Some(Permissions::VIEW_CHANNEL),
        overwrites: Some(vec![]),
    }
}

/// A room hidden from @everyone and opened to the staff role.
pub fn private_room(id: u64, name: &str) -> VoiceRoom {
    VoiceRoom {
        id: ChannelId::new(id),
        guild_id: GUILD,
        name: name.to_string(),
        everyone_permissions: Some(Permissions::VIEW_CHANNEL),
        overwrites: Some(vec![
            PermissionOverwrite {
                target: OverwriteTarget::Role(GUILD.everyone_role()),
                allow: Permissions::NONE,
                deny: Permissions::VIEW_CHANNEL,
            },
            PermissionOverwrite {
                target: OverwriteTarget::Role(STAFF_ROLE),
                allow: Permissions::VIEW_CHANNEL,
                deny: Permissions::NONE,
            },
        ]),
    }
}

pub fn member_overwrite(user: u64, allow: Permissions, deny: Permissions) -> PermissionOverwrite {
    PermissionOverwrite {
        target: OverwriteTarget::Member(UserId::new(user)),
        allow,
        deny,
    }
}

pub fn joined(room: u64, user: u64) -> OccupancyChange {
    OccupancyChange {
        guild_id: GUILD,
        old_room: None,
        new_room: Some(ChannelId::new(room)),
        actor_id: UserId::new(user),
        actor_name: format!("user{user}"),
        actor_tag: format!("user{user}#0001"),
        actor_is_service: false,
        actor_roles: vec![],
    }
}

pub fn left(room: u64, user: u64) -> OccupancyChange {
    OccupancyChange {
        old_room: Some(ChannelId::new(room)),
        new_room: None,
        ..joined(room, user)
    }
}

/// An engine over fresh mocks.
pub struct Harness {
    pub engine: AlertEngine,
    pub platform: Arc<MockPlatform>,
    pub store: Arc<MockStore>,
    pub log: Arc<MockActivityLog>,
}

impl Harness {
    pub fn new() -> Self {
        let platform = Arc::new(MockPlatform::default());
        let store = Arc::new(MockStore::default());
        let log = Arc::new(MockActivityLog::default());
        let engine = AlertEngine::new(
            store.clone(),
            log.clone(),
            platform.clone(),
            &RelayConfig::default(),
        );
        Self {
            engine,
            platform,
            store,
            log,
        }
    }

    /// Enable alerts into the mock text channel.
    pub async fn activated() -> Self {
        let harness = Self::new();
        harness.engine.settings().activate(GUILD, TEXT).await;
        harness
    }
}

/// Let spawned fire-and-forget work run.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

pub async fn advance(secs: u64) {
    tokio::time::sleep(Duration::from_secs(secs)).await;
}
