//! Cache Service Module
//!
//! Shared, thread-safe handle over a [`CacheStore`] that owns the background
//! sweep task, namespaces keys with an optional prefix and offers batch
//! operations.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::{CacheStore, GlobPattern, SizeEstimator, StatsSnapshot};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::tasks::spawn_cleanup_task;

// == Cache Service ==
/// Cloneable handle to a shared cache.
///
/// Methods are `async` only because they wait for the store lock; none of
/// them perform I/O. Clones share the same store and sweep task.
pub struct CacheService<V> {
    store: Arc<RwLock<CacheStore<V>>>,
    cleanup_handle: Arc<Mutex<Option<JoinHandle<()>>>>,
    prefix: Arc<str>,
}

impl<V> Clone for CacheService<V> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cleanup_handle: Arc::clone(&self.cleanup_handle),
            prefix: Arc::clone(&self.prefix),
        }
    }
}

impl<V> CacheService<V>
where
    V: Serialize + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates the store and starts its background sweep.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: CacheConfig) -> Result<Self> {
        let store = CacheStore::new(config)?;
        Ok(Self::from_store(store))
    }
}

impl<V> CacheService<V>
where
    V: Send + Sync + 'static,
{
    /// Creates the store with a custom size estimator and starts its sweep.
    pub fn with_estimator<E>(config: CacheConfig, estimator: E) -> Result<Self>
    where
        E: SizeEstimator<V> + 'static,
    {
        let store = CacheStore::with_estimator(config, estimator)?;
        Ok(Self::from_store(store))
    }

    fn from_store(store: CacheStore<V>) -> Self {
        let interval = store.config().cleanup_interval;
        let store = Arc::new(RwLock::new(store));
        let handle = spawn_cleanup_task(&store, interval);

        Self {
            store,
            cleanup_handle: Arc::new(Mutex::new(Some(handle))),
            prefix: Arc::from(""),
        }
    }

    /// Returns a handle onto the same store that prepends `prefix` to keys.
    pub fn with_prefix(&self, prefix: impl Into<String>) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cleanup_handle: Arc::clone(&self.cleanup_handle),
            prefix: Arc::from(prefix.into()),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    // == Single-key Operations ==
    pub async fn get(&self, key: &str) -> Option<V>
    where
        V: Clone,
    {
        self.store.write().await.get(&self.full_key(key))
    }

    /// Stores a value; `ttl` of None uses the configured default, zero never expires.
    pub async fn set(&self, key: &str, value: V, ttl: Option<Duration>) {
        self.store.write().await.set(self.full_key(key), value, ttl);
    }

    /// Same side effects as `get`: counts a hit or miss and refreshes recency.
    pub async fn has(&self, key: &str) -> bool
    where
        V: Clone,
    {
        self.store.write().await.has(&self.full_key(key))
    }

    pub async fn delete(&self, key: &str) -> bool {
        self.store.write().await.delete(&self.full_key(key))
    }

    // == Batch Operations ==
    /// Looks up several keys under one lock; missing keys are left out.
    pub async fn get_many<K>(&self, keys: &[K]) -> HashMap<String, V>
    where
        K: AsRef<str>,
        V: Clone,
    {
        let mut store = self.store.write().await;
        keys.iter()
            .filter_map(|key| {
                let key = key.as_ref();
                store
                    .get(&self.full_key(key))
                    .map(|value| (key.to_string(), value))
            })
            .collect()
    }

    /// Stores several entries under one lock with a shared TTL.
    pub async fn set_many<I>(&self, entries: I, ttl: Option<Duration>) -> usize
    where
        I: IntoIterator<Item = (String, V)>,
    {
        let mut store = self.store.write().await;
        let mut count = 0;
        for (key, value) in entries {
            store.set(self.full_key(&key), value, ttl);
            count += 1;
        }
        count
    }

    /// Deletes several keys under one lock, returning how many existed.
    pub async fn delete_many<K>(&self, keys: &[K]) -> usize
    where
        K: AsRef<str>,
    {
        let mut store = self.store.write().await;
        let mut removed = 0;
        for key in keys {
            if store.delete(&self.full_key(key.as_ref())) {
                removed += 1;
            }
        }
        removed
    }

    // == Introspection ==
    /// Lists keys under this handle's prefix with the prefix stripped,
    /// optionally filtered by a glob pattern applied to the stripped key.
    pub async fn keys(&self, pattern: Option<&str>) -> Vec<String> {
        let glob = match pattern {
            Some(pattern) => match GlobPattern::new(pattern) {
                Some(glob) => Some(glob),
                None => return Vec::new(),
            },
            None => None,
        };

        let store = self.store.read().await;
        store
            .keys(None)
            .into_iter()
            .filter_map(|key| key.strip_prefix(&*self.prefix).map(str::to_string))
            .filter(|key| glob.as_ref().map_or(true, |glob| glob.matches(key)))
            .collect()
    }

    /// Raw number of entries in the whole store.
    pub async fn size(&self) -> usize {
        self.store.read().await.size()
    }

    pub async fn stats(&self) -> StatsSnapshot {
        self.store.read().await.stats()
    }

    /// Clears the whole store, every prefix included, and resets statistics.
    pub async fn clear(&self) {
        self.store.write().await.clear();
    }

    /// Sweeps expired entries now, independently of the background timer.
    pub async fn cleanup(&self) -> usize {
        let removed = self.store.write().await.cleanup();
        debug!(removed, "manual cleanup");
        removed
    }

    // == Destroy ==
    /// Stops the background sweep and releases every entry.
    ///
    /// The sweep task has fully terminated by the time this returns, so no
    /// further sweep can fire. Calling it again only clears the store.
    pub async fn destroy(&self) {
        let handle = self.cleanup_handle.lock().await.take();
        if let Some(handle) = handle {
            handle.abort();
            // Cancellation is the expected outcome
            let _ = handle.await;
            info!("Background cleanup task stopped");
        }
        self.store.write().await.clear();
    }

    /// Returns true while the background sweep task is running.
    pub async fn is_sweeping(&self) -> bool {
        self.cleanup_handle
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::EvictionPolicy;

    fn config() -> CacheConfig {
        CacheConfig::default().with_max_entries(100)
    }

    fn new_service() -> CacheService<String> {
        CacheService::new(config()).unwrap()
    }

    #[tokio::test]
    async fn test_service_set_get_has_delete() {
        let cache = new_service();

        cache.set("key", "value".to_string(), None).await;
        assert_eq!(cache.get("key").await, Some("value".to_string()));
        assert!(cache.has("key").await);
        assert!(cache.delete("key").await);
        assert!(!cache.delete("key").await);
        assert_eq!(cache.get("key").await, None);
    }

    #[tokio::test]
    async fn test_service_rejects_invalid_config() {
        let result = CacheService::<String>::new(config().with_max_entries(0));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_service_clones_share_store() {
        let cache = new_service();
        let other = cache.clone();

        cache.set("shared", "v".to_string(), None).await;
        assert_eq!(other.get("shared").await, Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_service_prefix_namespacing() {
        let root = new_service();
        let users = root.with_prefix("users:");
        let posts = root.with_prefix("posts:");

        users.set("1", "ada".to_string(), None).await;
        users.set("22", "bob".to_string(), None).await;
        posts.set("1", "hello".to_string(), None).await;

        assert_eq!(users.get("1").await, Some("ada".to_string()));
        assert_eq!(posts.get("1").await, Some("hello".to_string()));
        assert_eq!(root.get("users:1").await, Some("ada".to_string()));

        assert_eq!(users.keys(None).await, vec!["1", "22"]);
        assert_eq!(users.keys(Some("?")).await, vec!["1"]);
        assert_eq!(posts.keys(Some("*")).await, vec!["1"]);
        assert_eq!(root.keys(Some("*:1")).await, vec!["users:1", "posts:1"]);
        assert_eq!(users.size().await, 3);
    }

    #[tokio::test]
    async fn test_service_prefix_with_glob_characters_is_literal() {
        let root = new_service();
        let odd = root.with_prefix("a*?:");

        odd.set("x", "1".to_string(), None).await;
        root.set("abc:x", "2".to_string(), None).await;

        assert_eq!(odd.keys(Some("*")).await, vec!["x"]);
    }

    #[tokio::test]
    async fn test_service_batch_operations() {
        let cache = new_service().with_prefix("batch:");

        let stored = cache
            .set_many(
                vec![
                    ("a".to_string(), "1".to_string()),
                    ("b".to_string(), "2".to_string()),
                ],
                None,
            )
            .await;
        assert_eq!(stored, 2);

        let found = cache.get_many(&["a", "b", "missing"]).await;
        assert_eq!(found.len(), 2);
        assert_eq!(found.get("a"), Some(&"1".to_string()));
        assert_eq!(found.get("b"), Some(&"2".to_string()));

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);

        assert_eq!(cache.delete_many(&["a", "missing"]).await, 1);
        assert_eq!(cache.keys(None).await, vec!["b"]);
    }

    #[tokio::test]
    async fn test_service_manual_cleanup() {
        let cache = new_service();

        cache
            .set("short", "v".to_string(), Some(Duration::from_millis(10)))
            .await;
        cache.set("long", "v".to_string(), None).await;
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(cache.size().await, 2);
        assert_eq!(cache.cleanup().await, 1);
        assert_eq!(cache.cleanup().await, 0);
        assert_eq!(cache.size().await, 1);
    }

    #[tokio::test]
    async fn test_service_background_sweep() {
        let cache: CacheService<String> =
            CacheService::new(config().with_cleanup_interval(Duration::from_millis(20))).unwrap();

        cache
            .set("short", "v".to_string(), Some(Duration::from_millis(10)))
            .await;
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(cache.size().await, 0);
    }

    #[tokio::test]
    async fn test_service_destroy_stops_sweep_and_clears() {
        let cache = new_service();
        let other = cache.clone();
        cache.set("key", "v".to_string(), None).await;
        assert!(cache.is_sweeping().await);

        cache.destroy().await;

        assert!(!other.is_sweeping().await);
        assert_eq!(other.size().await, 0);

        // Idempotent
        other.destroy().await;
        assert_eq!(cache.size().await, 0);
    }

    #[tokio::test]
    async fn test_service_fifo_policy() {
        let cache: CacheService<String> = CacheService::new(
            config()
                .with_max_entries(3)
                .with_eviction_policy(EvictionPolicy::Fifo),
        )
        .unwrap();

        for key in ["k1", "k2", "k3"] {
            cache.set(key, "v".to_string(), None).await;
        }
        cache.get("k1").await;
        cache.set("k4", "v".to_string(), None).await;

        assert_eq!(cache.keys(None).await, vec!["k2", "k3", "k4"]);
    }
}
