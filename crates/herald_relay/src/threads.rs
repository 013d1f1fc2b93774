//! Private-room thread lifecycle.
//!
//! Each private voice room with recent activity owns one private thread
//! under the guild's alert channel. Per room the state moves
//! absent → active → active (timer reset) → evicted (absent again):
//!
//! - the first alert creates the thread and arms an inactivity timer
//! - every later alert validates the thread, recreating it if it was deleted
//!   or archived, and re-arms the timer
//! - a timer that fires uninterrupted deletes the thread
//!
//! All of this, including membership sync and the alert send, runs under
//! the room's [`RoomLocks`] slot.

use crate::{AlertDispatcher, RelayConfig, RoomLocks, ViewerOverwrites};
use futures::{StreamExt, stream};
use herald_core::{
    AlertPayload, ChannelId, GuildId, MessageId, RoleId, TextChannelRef, ThreadHandle, UserId,
    VoiceRoom,
};
use herald_error::{PlatformError, RelayError, RelayErrorKind, RelayResult};
use herald_interface::AlertPlatform;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::AbortHandle;
use tracing::{debug, info, instrument, trace, warn};

/// Name of the thread for a room, cut to `limit` characters.
///
/// ```
/// use herald_relay::thread_name;
///
/// assert_eq!(thread_name("Lounge", 100), "🔊 VC Alert (Lounge)");
/// assert_eq!(thread_name("Lounge", 8).chars().count(), 8);
/// ```
pub fn thread_name(room_name: &str, limit: usize) -> String {
    format!("🔊 VC Alert ({room_name})")
        .chars()
        .take(limit)
        .collect()
}

struct ThreadEntry {
    thread: ThreadHandle,
    timer: Option<AbortHandle>,
    /// Identifies the live timer; a timer whose generation is stale must not evict.
    generation: u64,
    synced: HashSet<UserId>,
}

impl ThreadEntry {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

struct ManagerInner {
    platform: Arc<dyn AlertPlatform>,
    dispatcher: AlertDispatcher,
    inactivity: Duration,
    name_limit: usize,
    sync_concurrency: usize,
    locks: RoomLocks<ChannelId>,
    registry: Mutex<HashMap<ChannelId, ThreadEntry>>,
    generations: AtomicU64,
}

/// Creates, reuses and evicts private-room threads.
///
/// Cloning is cheap; clones share one registry.
#[derive(Clone)]
pub struct ThreadManager {
    inner: Arc<ManagerInner>,
}

impl std::fmt::Debug for ThreadManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadManager")
            .field("inactivity", &self.inner.inactivity)
            .field("active", &self.inner.registry.lock().len())
            .field("locks", &self.inner.locks)
            .finish_non_exhaustive()
    }
}

impl ThreadManager {
    /// Create a manager with no active threads.
    pub fn new(
        platform: Arc<dyn AlertPlatform>,
        dispatcher: AlertDispatcher,
        config: &RelayConfig,
    ) -> Self {
        Self {
            inner: Arc::new(ManagerInner {
                platform,
                dispatcher,
                inactivity: config.thread_inactivity(),
                name_limit: *config.thread_name_limit(),
                sync_concurrency: *config.member_sync_concurrency(),
                locks: RoomLocks::new(),
                registry: Mutex::new(HashMap::new()),
                generations: AtomicU64::new(0),
            }),
        }
    }

    /// Deliver an alert for a private room through its thread.
    ///
    /// Ensures a live thread exists, re-arms the inactivity timer, adds
    /// newly permitted viewers, then sends. Returns the sent message id, or
    /// `None` when the send itself failed (already logged).
    ///
    /// # Errors
    ///
    /// `ChannelResolution` when the existing thread could not be checked (the
    /// entry and its timer are left as they were), `ThreadCreation` when a
    /// new thread could not be created (no entry is registered).
    #[instrument(skip_all, fields(room_id = %room.id, room = %room.name))]
    pub async fn deliver(
        &self,
        parent: &TextChannelRef,
        room: &VoiceRoom,
        alert: &AlertPayload,
        auto_delete: bool,
    ) -> RelayResult<Option<MessageId>> {
        self.inner
            .locks
            .run(room.id, async {
                let thread = self.ensure_thread(parent, room).await?;
                self.arm_timer(room.id);
                self.sync_members(room, &thread).await;
                let sent = self
                    .inner
                    .dispatcher
                    .dispatch(thread.id, alert, auto_delete)
                    .await;
                Ok::<_, RelayError>(sent)
            })
            .await
    }

    /// Thread currently tracked for a room.
    pub fn active_thread(&self, room_id: ChannelId) -> Option<ThreadHandle> {
        self.inner
            .registry
            .lock()
            .get(&room_id)
            .map(|entry| entry.thread.clone())
    }

    /// Number of rooms with a tracked thread.
    pub fn active_rooms(&self) -> usize {
        self.inner.registry.lock().len()
    }

    /// Number of rooms with work running or queued.
    pub fn busy_rooms(&self) -> usize {
        self.inner.locks.len()
    }

    /// Drop tracking for a room deleted out of band.
    ///
    /// Cancels the inactivity timer without waiting for the room's lock.
    /// Returns whether a thread was tracked.
    pub fn forget_room(&self, room_id: ChannelId) -> bool {
        let removed = self.inner.registry.lock().remove(&room_id);
        match removed {
            Some(mut entry) => {
                entry.cancel_timer();
                info!(
                    room_id = %room_id,
                    thread_id = %entry.thread.id,
                    "Room deleted, thread forgotten"
                );
                true
            }
            None => false,
        }
    }

    /// Drop tracking for a thread deleted out of band.
    pub fn forget_thread(&self, thread_id: ChannelId) -> bool {
        let mut registry = self.inner.registry.lock();
        let room_id = registry
            .iter()
            .find(|(_, entry)| entry.thread.id == thread_id)
            .map(|(room_id, _)| *room_id);
        match room_id.and_then(|room_id| registry.remove(&room_id)) {
            Some(mut entry) => {
                entry.cancel_timer();
                info!(thread_id = %thread_id, "Thread deleted, entry forgotten");
                true
            }
            None => false,
        }
    }

    /// Cancel every timer and forget every thread without deleting them.
    ///
    /// Returns the number of entries dropped.
    pub fn clear(&self) -> usize {
        let drained: Vec<_> = self.inner.registry.lock().drain().collect();
        let count = drained.len();
        for (_, mut entry) in drained {
            entry.cancel_timer();
        }
        count
    }

    async fn ensure_thread(
        &self,
        parent: &TextChannelRef,
        room: &VoiceRoom,
    ) -> RelayResult<ThreadHandle> {
        let existing = self.active_thread(room.id);
        if let Some(thread) = existing {
            match self.inner.platform.fetch_thread(thread.id).await {
                Ok(Some(state)) if state.is_usable() => {
                    trace!(thread_id = %thread.id, "Reusing thread");
                    return Ok(thread);
                }
                Ok(state) => {
                    debug!(thread_id = %thread.id, ?state, "Thread gone or archived, recreating");
                    if let Some(mut stale) = self.inner.registry.lock().remove(&room.id) {
                        stale.cancel_timer();
                    }
                }
                Err(source) => {
                    return Err(RelayError::new(RelayErrorKind::ChannelResolution {
                        channel_id: thread.id.get(),
                        source,
                    }));
                }
            }
        }

        let name = thread_name(&room.name, self.inner.name_limit);
        let reason = format!("Private VC alert for {}", room.name);
        let thread = self
            .inner
            .platform
            .create_private_thread(parent.id, &name, &reason)
            .await
            .map_err(|source| {
                RelayError::new(RelayErrorKind::ThreadCreation {
                    room_id: room.id.get(),
                    source,
                })
            })?;
        info!(thread_id = %thread.id, name = %thread.name, "Created private thread");

        self.inner.registry.lock().insert(
            room.id,
            ThreadEntry {
                thread: thread.clone(),
                timer: None,
                generation: 0,
                synced: HashSet::new(),
            },
        );
        Ok(thread)
    }

    /// Replace the room's inactivity timer with a fresh one.
    fn arm_timer(&self, room_id: ChannelId) {
        let generation = self.inner.generations.fetch_add(1, Ordering::Relaxed) + 1;
        let manager = self.clone();
        let inactivity = self.inner.inactivity;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(inactivity).await;
            manager.evict(room_id, generation).await;
        })
        .abort_handle();

        let mut registry = self.inner.registry.lock();
        match registry.get_mut(&room_id) {
            Some(entry) => {
                entry.cancel_timer();
                entry.timer = Some(timer);
                entry.generation = generation;
            }
            None => timer.abort(),
        }
    }

    /// Timer body: delete the thread unless the timer was superseded.
    async fn evict(&self, room_id: ChannelId, generation: u64) {
        self.inner
            .locks
            .run(room_id, async {
                let thread = {
                    let mut registry = self.inner.registry.lock();
                    let current = registry
                        .get(&room_id)
                        .is_some_and(|entry| entry.generation == generation);
                    if current {
                        registry.remove(&room_id).map(|entry| entry.thread)
                    } else {
                        None
                    }
                };
                let Some(thread) = thread else {
                    trace!(room_id = %room_id, generation, "Stale inactivity timer");
                    return;
                };

                match self.inner.platform.delete_thread(thread.id).await {
                    Ok(()) => {
                        info!(room_id = %room_id, thread_id = %thread.id, "Deleted idle thread")
                    }
                    Err(e) => warn!(
                        room_id = %room_id,
                        thread_id = %thread.id,
                        error = %e,
                        "Failed to delete idle thread"
                    ),
                }
            })
            .await
    }

    /// Add every permitted viewer not yet synced into the thread.
    async fn sync_members(&self, room: &VoiceRoom, thread: &ThreadHandle) {
        let permitted = self.permitted_viewers(room).await;
        let pending: Vec<UserId> = {
            let registry = self.inner.registry.lock();
            let synced = registry.get(&room.id).map(|entry| &entry.synced);
            permitted
                .into_iter()
                .filter(|user| !synced.is_some_and(|synced| synced.contains(user)))
                .collect()
        };
        if pending.is_empty() {
            return;
        }

        let attempted = pending.len();
        let platform = &self.inner.platform;
        let outcomes: Vec<(UserId, Result<(), PlatformError>)> = stream::iter(pending)
            .map(|user| async move { (user, platform.add_thread_member(thread.id, user).await) })
            .buffer_unordered(self.inner.sync_concurrency)
            .collect()
            .await;

        let mut synced = Vec::with_capacity(attempted);
        let mut failed = 0;
        for (user, outcome) in outcomes {
            match outcome {
                Ok(()) => synced.push(user),
                Err(e) if e.is_expected_member_outcome() => {
                    debug!(user_id = %user, error = %e, "Member add skipped");
                    synced.push(user);
                }
                Err(e) => {
                    warn!(user_id = %user, error = %e, "Failed to add member to thread");
                    failed += 1;
                }
            }
        }

        if let Some(entry) = self.inner.registry.lock().get_mut(&room.id) {
            entry.synced.extend(synced);
        }

        if failed > 0 {
            let err = RelayError::new(RelayErrorKind::MembershipSync {
                thread_id: thread.id.get(),
                attempted,
                failed,
            });
            warn!(error = %err, "Membership sync incomplete");
        } else {
            debug!(attempted, "Membership synced");
        }
    }

    /// Allowed viewers minus denied ones, bots excluded.
    async fn permitted_viewers(&self, room: &VoiceRoom) -> HashSet<UserId> {
        let overwrites = ViewerOverwrites::of(room);
        let guild_id = room.guild_id;

        let mut allowed = HashSet::new();
        for role in &overwrites.allow_roles {
            allowed.extend(
                self.role_members(guild_id, *role)
                    .await
                    .into_iter()
                    .filter(|(_, is_bot)| !is_bot)
                    .map(|(user, _)| user),
            );
        }
        for user in &overwrites.allow_members {
            match self.inner.platform.fetch_member(guild_id, *user).await {
                Ok(Some(member)) if !member.is_bot => {
                    allowed.insert(member.id);
                }
                Ok(Some(_)) => {}
                Ok(None) => {
                    debug!(user_id = %user, "Overwrite for a member no longer in the guild")
                }
                Err(e) => warn!(user_id = %user, error = %e, "Failed to fetch member"),
            }
        }

        let mut denied: HashSet<UserId> = overwrites.deny_members.iter().copied().collect();
        for role in &overwrites.deny_roles {
            denied.extend(
                self.role_members(guild_id, *role)
                    .await
                    .into_iter()
                    .map(|(user, _)| user),
            );
        }

        allowed.retain(|user| !denied.contains(user));
        allowed
    }

    async fn role_members(&self, guild_id: GuildId, role_id: RoleId) -> Vec<(UserId, bool)> {
        match self
            .inner
            .platform
            .members_with_role(guild_id, role_id)
            .await
        {
            Ok(members) => members
                .into_iter()
                .map(|member| (member.id, member.is_bot))
                .collect(),
            Err(e) => {
                warn!(role_id = %role_id, error = %e, "Failed to list role members");
                Vec::new()
            }
        }
    }
}
