//! Stale Entry Sweep Task
//!
//! Optional background task that drops stale cache entries so an unbounded
//! cache does not keep payloads nobody can read any more.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns a task that sweeps stale entries every `interval`.
///
/// Reads check freshness on their own; the sweep only reclaims memory.
///
/// # Returns
/// A JoinHandle for the spawned task, aborted during graceful shutdown.
pub fn spawn_cleanup_task(cache: Arc<RwLock<CacheStore>>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting cache sweep task with interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.write().await.cleanup_expired();

            if removed > 0 {
                info!("Cache sweep: removed {} stale entries", removed);
            } else {
                debug!("Cache sweep: no stale entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheKey;
    use crate::upstream::{Endpoint, Location, Units};
    use serde_json::json;

    fn key(city: &str) -> CacheKey {
        CacheKey::derive(Endpoint::Current, &Location::City(city.to_string()), Units::Metric)
    }

    #[tokio::test]
    async fn test_sweep_removes_stale_entries() {
        let cache = Arc::new(RwLock::new(CacheStore::new(Duration::from_millis(50))));
        cache.write().await.put(key("Gaya"), json!({"temp": 30}));

        let handle = spawn_cleanup_task(cache.clone(), Duration::from_millis(100));
        tokio::time::sleep(Duration::from_millis(350)).await;

        assert!(cache.read().await.is_empty(), "Stale entry should have been swept");
        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_preserves_fresh_entries() {
        let cache = Arc::new(RwLock::new(CacheStore::new(Duration::from_secs(3600))));
        cache.write().await.put(key("Gaya"), json!({"temp": 30}));

        let handle = spawn_cleanup_task(cache.clone(), Duration::from_millis(50));
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(cache.read().await.is_valid(&key("Gaya")));
        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_can_be_aborted() {
        let cache = Arc::new(RwLock::new(CacheStore::new(Duration::from_secs(1))));

        let handle = spawn_cleanup_task(cache, Duration::from_secs(1));
        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
