//! At-most-once response caches.
//!
//! Entries are created on first successful fetch and never overwritten or
//! expired; a failed fetch stores nothing, so a later call may retry.

use std::future::Future;

use dashmap::DashMap;
use tokio::sync::{Mutex, RwLock};

/// Singleton cache slot with at-most-once population.
pub struct FetchSlot<T> {
    value: RwLock<Option<T>>,
    populate: Mutex<()>,
}

impl<T: Clone> FetchSlot<T> {
    pub fn new() -> Self {
        Self {
            value: RwLock::new(None),
            populate: Mutex::new(()),
        }
    }

    /// Return the cached value, or await `fetch` to populate the slot.
    ///
    /// Population is serialized by a dedicated lock with double-checked
    /// presence, so across all concurrent callers `fetch` is awaited at most
    /// once per stored value. Hits after population take only the read lock.
    pub async fn get_or_fetch<F, E>(&self, fetch: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.value.read().await.clone() {
            return Ok(value);
        }

        let _guard = self.populate.lock().await;
        if let Some(value) = self.value.read().await.clone() {
            return Ok(value);
        }

        let value = fetch.await?;
        *self.value.write().await = Some(value.clone());
        Ok(value)
    }

    pub async fn get(&self) -> Option<T> {
        self.value.read().await.clone()
    }
}

impl<T: Clone> Default for FetchSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// String-keyed cache with the same at-most-once contract per key.
pub struct FetchMap<T> {
    entries: DashMap<String, T>,
    populate: Mutex<()>,
}

impl<T: Clone> FetchMap<T> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            populate: Mutex::new(()),
        }
    }

    /// Return the cached value for `key`, or await `fetch` to populate it.
    ///
    /// One population at a time per map keeps the per-key at-most-once
    /// guarantee without per-key lock bookkeeping; call volume is low.
    pub async fn get_or_fetch<F, E>(&self, key: &str, fetch: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
    {
        if let Some(entry) = self.entries.get(key) {
            return Ok(entry.value().clone());
        }

        let _guard = self.populate.lock().await;
        if let Some(entry) = self.entries.get(key) {
            return Ok(entry.value().clone());
        }

        let value = fetch.await?;
        self.entries.insert(key.to_string(), value.clone());
        Ok(value)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl<T: Clone> Default for FetchMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test]
    async fn slot_fetches_once_across_concurrent_callers() {
        let slot = Arc::new(FetchSlot::<u32>::new());
        let fetches = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let slot = Arc::clone(&slot);
                let fetches = Arc::clone(&fetches);
                tokio::spawn(async move {
                    slot.get_or_fetch(async {
                        fetches.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                        Ok::<_, ()>(99)
                    })
                    .await
                    .unwrap()
                })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap(), 99);
        }
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn slot_failed_fetch_is_not_cached() {
        let slot = FetchSlot::<u32>::new();

        let err = slot
            .get_or_fetch(async { Err::<u32, &str>("backend down") })
            .await
            .unwrap_err();
        assert_eq!(err, "backend down");
        assert!(slot.get().await.is_none());

        let value = slot.get_or_fetch(async { Ok::<_, &str>(7) }).await.unwrap();
        assert_eq!(value, 7);
        assert_eq!(slot.get().await, Some(7));
    }

    #[tokio::test]
    async fn slot_hit_skips_fetch_entirely() {
        let slot = FetchSlot::<u32>::new();
        slot.get_or_fetch(async { Ok::<_, ()>(1) }).await.unwrap();

        let fetched = AtomicUsize::new(0);
        let value = slot
            .get_or_fetch(async {
                fetched.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ()>(2)
            })
            .await
            .unwrap();

        assert_eq!(value, 1);
        assert_eq!(fetched.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn map_keys_are_independent() {
        let map = FetchMap::<String>::new();
        let fetches = AtomicUsize::new(0);

        for key in ["a", "b", "a"] {
            let value = map
                .get_or_fetch(key, async {
                    fetches.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ()>(key.to_uppercase())
                })
                .await
                .unwrap();
            assert_eq!(value, key.to_uppercase());
        }

        assert_eq!(fetches.load(Ordering::SeqCst), 2);
        assert!(map.contains("a"));
        assert!(map.contains("b"));
    }

    #[tokio::test]
    async fn map_fetches_once_per_key_across_concurrent_callers() {
        let map = Arc::new(FetchMap::<u32>::new());
        let fetches = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let map = Arc::clone(&map);
                let fetches = Arc::clone(&fetches);
                tokio::spawn(async move {
                    map.get_or_fetch("k", async {
                        fetches.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                        Ok::<_, ()>(3)
                    })
                    .await
                    .unwrap()
                })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap(), 3);
        }
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn map_failed_fetch_is_not_cached() {
        let map = FetchMap::<u32>::new();

        map.get_or_fetch("k", async { Err::<u32, ()>(()) })
            .await
            .unwrap_err();
        assert!(!map.contains("k"));

        let value = map
            .get_or_fetch("k", async { Ok::<_, ()>(5) })
            .await
            .unwrap();
        assert_eq!(value, 5);
    }
}
