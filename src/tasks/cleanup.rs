//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns a background task that periodically sweeps expired cache entries.
///
/// The task sleeps for `interval`, takes the write lock, sweeps the whole
/// table and goes back to sleep. Sweeps run one after another inside a single
/// loop, so two sweeps never overlap.
///
/// The task only holds a weak reference to the store and exits on its own
/// once every strong reference has been dropped.
///
/// # Returns
/// A JoinHandle for the spawned task, used to abort it on shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(RwLock::new(CacheStore::<String>::new(CacheConfig::default())?));
/// let cleanup_handle = spawn_cleanup_task(&cache, Duration::from_secs(300));
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task<V>(
    cache: &Arc<RwLock<CacheStore<V>>>,
    interval: Duration,
) -> JoinHandle<()>
where
    V: Send + Sync + 'static,
{
    let cache: Weak<RwLock<CacheStore<V>>> = Arc::downgrade(cache);
    let interval_ms = interval.as_millis() as u64;

    tokio::spawn(async move {
        info!(interval_ms, "Starting TTL cleanup task");

        loop {
            tokio::time::sleep(interval).await;

            let Some(cache) = cache.upgrade() else {
                debug!("Cache dropped, stopping TTL cleanup task");
                break;
            };

            let removed = {
                let mut cache_guard = cache.write().await;
                cache_guard.cleanup()
            };

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;

    fn shared_store() -> Arc<RwLock<CacheStore<String>>> {
        Arc::new(RwLock::new(CacheStore::new(CacheConfig::default()).unwrap()))
    }

    #[tokio::test]
    async fn test_cleanup_task_removes_expired_entries() {
        let cache = shared_store();

        cache.write().await.set(
            "expire_soon",
            "value".to_string(),
            Some(Duration::from_millis(10)),
        );

        let handle = spawn_cleanup_task(&cache, Duration::from_millis(20));

        tokio::time::sleep(Duration::from_millis(100)).await;

        // Swept without any read touching it, and without counting a miss
        {
            let cache_guard = cache.read().await;
            assert_eq!(cache_guard.size(), 0, "Expired entry should have been cleaned up");
            assert_eq!(cache_guard.stats().misses, 0);
        }

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_preserves_valid_entries() {
        let cache = shared_store();

        cache.write().await.set(
            "long_lived",
            "value".to_string(),
            Some(Duration::from_secs(3600)),
        );

        let handle = spawn_cleanup_task(&cache, Duration::from_millis(20));

        tokio::time::sleep(Duration::from_millis(80)).await;

        {
            let mut cache_guard = cache.write().await;
            assert_eq!(cache_guard.get("long_lived"), Some("value".to_string()));
        }

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let cache = shared_store();

        let handle = spawn_cleanup_task(&cache, Duration::from_millis(20));

        handle.abort();
        let result = handle.await;
        assert!(result.unwrap_err().is_cancelled());
    }

    #[tokio::test]
    async fn test_cleanup_task_stops_when_cache_dropped() {
        let cache = shared_store();
        let handle = spawn_cleanup_task(&cache, Duration::from_millis(10));

        drop(cache);

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("task should exit after the cache is dropped")
            .expect("task should finish cleanly");
    }
}
