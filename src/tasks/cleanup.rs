//! TTL Cleanup Task
//!
//! Background task that periodically sweeps expired cache entries, so keys
//! that are never read again still get freed.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::TtlCache;

/// Spawns a background task that periodically cleans up expired cache entries.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between sweeps. Each sweep holds the cache lock once for a single pass
/// over the entries.
///
/// # Arguments
/// * `name` - Label used in log lines
/// * `cache` - Shared reference to the cache
/// * `cleanup_interval_secs` - Interval in seconds between cleanup runs
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(TtlCache::<String>::new(30_000));
/// let cleanup_handle = spawn_cleanup_task("sessions", cache.clone(), 300);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task<V>(
    name: &'static str,
    cache: Arc<TtlCache<V>>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
{
    let interval = Duration::from_secs(cleanup_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting {} cache cleanup task with interval of {} seconds",
            name, cleanup_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.cleanup();

            if removed > 0 {
                info!("{} cache cleanup: removed {} expired entries", name, removed);
            } else {
                debug!("{} cache cleanup: no expired entries found", name);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;

    fn manual_cache() -> (Arc<TtlCache<String>>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_000_000));
        let cache = Arc::new(TtlCache::with_clock(30_000, clock.clone()));
        (cache, clock)
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_task_removes_expired_entries() {
        let (cache, clock) = manual_cache();
        cache.set("expire_soon", "value".to_string(), Some(1_000));
        cache.set("long_lived", "value".to_string(), Some(3_600_000));

        let handle = spawn_cleanup_task("test", cache.clone(), 1);

        clock.advance(2_000);
        tokio::time::sleep(Duration::from_millis(1_500)).await;

        // Swept without anyone reading the key
        assert_eq!(cache.len(), 1, "Expired entry should have been cleaned up");
        assert_eq!(cache.get("long_lived").as_deref(), Some("value"));

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_task_preserves_valid_entries() {
        let (cache, _) = manual_cache();
        cache.set("long_lived", "value".to_string(), Some(3_600_000));

        let handle = spawn_cleanup_task("test", cache.clone(), 1);
        tokio::time::sleep(Duration::from_millis(3_500)).await;

        assert_eq!(cache.get("long_lived").as_deref(), Some("value"));
        assert_eq!(cache.stats().expired, 0);

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let (cache, _) = manual_cache();

        let handle = spawn_cleanup_task("test", cache, 1);
        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
