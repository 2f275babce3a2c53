use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

use tokio::sync::OwnedMutexGuard;

type LockMap<K> = Mutex<HashMap<K, Arc<tokio::sync::Mutex<()>>>>;

/// Per-key async mutexes, created on demand and dropped on release.
///
/// Serializes writers touching the same key while leaving unrelated keys
/// fully concurrent. Guards own their lock, so they can be held across
/// await points. When the last holder or waiter of a key releases, the
/// map entry is evicted, so the map tracks only keys under contention.
pub struct KeyedLocks<K> {
    locks: LockMap<K>,
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub async fn acquire(&self, key: K) -> KeyedGuard<'_, K> {
        let lock = {
            let mut locks = self.locks.lock().expect("keyed lock map poisoned");
            locks
                .entry(key.clone())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };

        let guard = lock.lock_owned().await;
        KeyedGuard {
            key,
            guard: Some(guard),
            locks: &self.locks,
        }
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.locks.lock().expect("keyed lock map poisoned").len()
    }
}

impl<K: Eq + Hash + Clone> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Lock guard that removes its map entry once nothing else references it
pub struct KeyedGuard<'a, K: Eq + Hash> {
    key: K,
    guard: Option<OwnedMutexGuard<()>>,
    locks: &'a LockMap<K>,
}

impl<K: Eq + Hash> Drop for KeyedGuard<'_, K> {
    fn drop(&mut self) {
        let mut locks = self.locks.lock().expect("keyed lock map poisoned");
        // Release our own Arc (held inside the guard) before counting.
        // Waiters cloned their Arc before blocking, so strong_count == 1
        // means the map holds the only remaining reference.
        self.guard.take();
        if let Some(entry) = locks.get(&self.key)
            && Arc::strong_count(entry) == 1
        {
            locks.remove(&self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_same_key_serializes() {
        let locks = Arc::new(KeyedLocks::new());
        let in_section = Arc::new(AtomicU32::new(0));
        let max_seen = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = locks.clone();
            let in_section = in_section.clone();
            let max_seen = max_seen.clone();
            handles.push(tokio::spawn(async move {
                let _guard = locks.acquire("company-a").await;
                let now = in_section.fetch_add(1, Ordering::SeqCst) + 1;
                max_seen.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(1)).await;
                in_section.fetch_sub(1, Ordering::SeqCst);
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
        assert_eq!(locks.tracked(), 0);
    }

    #[tokio::test]
    async fn test_different_keys_do_not_block() {
        let locks = KeyedLocks::new();

        let _a = locks.acquire("a").await;
        // Must not deadlock even while "a" is held
        let _b = locks.acquire("b").await;
    }

    #[tokio::test]
    async fn test_entries_are_evicted_on_release() {
        let locks = KeyedLocks::new();

        {
            let _a = locks.acquire("a").await;
            let _b = locks.acquire("b").await;
            assert_eq!(locks.tracked(), 2);
        }

        assert_eq!(locks.tracked(), 0);

        // A key stays tracked only while someone holds it
        let guard = locks.acquire("a").await;
        assert_eq!(locks.tracked(), 1);
        drop(guard);
        assert_eq!(locks.tracked(), 0);
    }

    #[tokio::test]
    async fn test_entry_survives_while_a_waiter_is_queued() {
        let locks = Arc::new(KeyedLocks::new());

        let guard = locks.acquire("a").await;
        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire("a").await;
            })
        };

        // Let the waiter queue up on the entry before releasing
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(locks.tracked(), 1);
        drop(guard);

        waiter.await.unwrap();
        assert_eq!(locks.tracked(), 0);
    }
}
