//! Keyed async mutual exclusion.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::Mutex as SlotMutex;

type Slot = Arc<SlotMutex<()>>;

/// One async lock per key, created on demand and dropped when idle.
///
/// Tasks for the same key run strictly one after another in arrival order
/// (tokio's mutex is fair); tasks for different keys never wait on each
/// other. A key's slot is removed once no task holds or waits on it.
///
/// # Example
///
/// ```
/// use herald_relay::RoomLocks;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let locks = RoomLocks::new();
/// let value = locks.run(7u64, async { 41 + 1 }).await;
/// assert_eq!(value, 42);
/// assert_eq!(locks.len(), 0);
/// # }
/// ```
pub struct RoomLocks<K> {
    slots: Mutex<HashMap<K, Slot>>,
}

impl<K> Default for RoomLocks<K> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<K> std::fmt::Debug for RoomLocks<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomLocks")
            .field("slots", &self.slots.lock().len())
            .finish()
    }
}

impl<K: Eq + Hash + Clone> RoomLocks<K> {
    /// Create an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` while holding the lock for `key`.
    pub async fn run<F, T>(&self, key: K, task: F) -> T
    where
        F: Future<Output = T>,
    {
        let checkout = self.checkout(key);
        let _guard = checkout.slot.lock().await;
        task.await
    }

    /// Number of keys with a task running or waiting.
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    /// Whether no key has work outstanding.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn checkout(&self, key: K) -> Checkout<'_, K> {
        let slot = self.slots.lock().entry(key.clone()).or_default().clone();
        Checkout {
            locks: self,
            key,
            slot,
        }
    }
}

/// A task's claim on a slot. Dropping the last claim removes the slot.
struct Checkout<'a, K: Eq + Hash> {
    locks: &'a RoomLocks<K>,
    key: K,
    slot: Slot,
}

impl<K: Eq + Hash> Drop for Checkout<'_, K> {
    fn drop(&mut self) {
        let mut slots = self.locks.slots.lock();
        // One reference in the table, one here: nobody else is queued.
        let idle = Arc::strong_count(&self.slot) == 2
            && slots
                .get(&self.key)
                .is_some_and(|slot| Arc::ptr_eq(slot, &self.slot));
        if idle {
            slots.remove(&self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn same_key_runs_sequentially() {
        let locks = Arc::new(RoomLocks::new());
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let locks = locks.clone();
                let running = running.clone();
                let peak = peak.clone();
                tokio::spawn(async move {
                    locks
                        .run(1u64, async {
                            let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                            peak.fetch_max(now, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(10)).await;
                            running.fetch_sub(1, Ordering::SeqCst);
                        })
                        .await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(peak.load(Ordering::SeqCst), 1);
        assert!(locks.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn different_keys_do_not_block() {
        let locks = Arc::new(RoomLocks::new());
        let (held_tx, held_rx) = tokio::sync::oneshot::channel::<()>();
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

        let blocker = {
            let locks = locks.clone();
            tokio::spawn(async move {
                locks
                    .run(1u64, async {
                        let _ = held_tx.send(());
                        let _ = release_rx.await;
                    })
                    .await
            })
        };
        held_rx.await.unwrap();

        // Completes while key 1 is still held.
        assert_eq!(locks.run(2u64, async { "free" }).await, "free");
        assert_eq!(locks.len(), 1);

        release_tx.send(()).unwrap();
        blocker.await.unwrap();
        assert!(locks.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn aborted_task_releases_its_slot() {
        let locks = Arc::new(RoomLocks::new());
        let task = {
            let locks = locks.clone();
            tokio::spawn(async move {
                locks
                    .run(5u64, tokio::time::sleep(Duration::from_secs(60)))
                    .await
            })
        };
        tokio::task::yield_now().await;
        assert_eq!(locks.len(), 1);

        task.abort();
        let _ = task.await;
        assert!(locks.is_empty());
    }
}
