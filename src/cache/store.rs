//! Cache Store Module
//!
//! Process-local TTL cache shared between request handlers and the cleanup task.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::cache::{CacheEntry, CacheStats, Clock, SystemClock};

/// Lifetime applied when a caller doesn't pass one.
pub const DEFAULT_TTL_MS: u64 = 30_000;

#[derive(Debug)]
struct Inner<V> {
    entries: HashMap<String, CacheEntry<V>>,
    stats: CacheStats,
}

// == TTL Cache ==
/// In-memory key-value cache with per-entry expiry.
///
/// All state sits behind one mutex. Every operation completes without
/// awaiting, so the lock is never held across a suspension point; the
/// fetcher passed to [`TtlCache::get_or_set`] runs with the lock released.
///
/// Memory is bounded only by [`TtlCache::cleanup`] and by hot keys being
/// overwritten. There is no size cap.
#[derive(Debug)]
pub struct TtlCache<V> {
    inner: Mutex<Inner<V>>,
    clock: Arc<dyn Clock>,
    default_ttl_ms: u64,
}

impl<V: Clone> TtlCache<V> {
    // == Constructor ==
    /// Creates an empty cache on the system clock.
    ///
    /// # Arguments
    /// * `default_ttl_ms` - Lifetime used by `set`/`get_or_set` when none is given
    pub fn new(default_ttl_ms: u64) -> Self {
        Self::with_clock(default_ttl_ms, Arc::new(SystemClock))
    }

    /// Creates an empty cache reading time from `clock`.
    pub fn with_clock(default_ttl_ms: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                stats: CacheStats::new(),
            }),
            clock,
            default_ttl_ms,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<V>> {
        // Every critical section leaves the map consistent, so a panic
        // elsewhere can't have corrupted it
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any previous entry.
    ///
    /// The expiry window restarts from now.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `ttl_ms` - Optional lifetime in milliseconds (uses the default if None)
    pub fn set(&self, key: impl Into<String>, value: V, ttl_ms: Option<u64>) {
        let ttl_ms = ttl_ms.unwrap_or(self.default_ttl_ms);
        let entry = CacheEntry::new(value, self.clock.now_ms(), ttl_ms);

        let mut inner = self.lock();
        inner.entries.insert(key.into(), entry);
        let len = inner.entries.len();
        inner.stats.set_total_entries(len);
    }

    // == Get ==
    /// Returns the live value for `key`.
    ///
    /// An expired entry is removed under the same lock that observed it,
    /// so a concurrent `set` of a fresh value is never lost.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now_ms();
        let mut guard = self.lock();
        let inner = &mut *guard;

        match inner.entries.get(key) {
            None => {
                inner.stats.record_miss();
                return None;
            }
            Some(entry) if !entry.is_expired(now) => {
                inner.stats.record_hit();
                return Some(entry.value.clone());
            }
            Some(_) => {}
        }

        inner.entries.remove(key);
        inner.stats.set_total_entries(inner.entries.len());
        inner.stats.record_expired(1);
        inner.stats.record_miss();
        None
    }

    // == Delete ==
    /// Removes `key`. Returns whether an entry was present.
    pub fn delete(&self, key: &str) -> bool {
        let mut inner = self.lock();
        let removed = inner.entries.remove(key).is_some();
        let len = inner.entries.len();
        inner.stats.set_total_entries(len);
        removed
    }

    // == Clear ==
    /// Drops every entry. Counters are kept.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.stats.set_total_entries(0);
    }

    // == Cleanup ==
    /// Removes all expired entries.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup(&self) -> usize {
        let now = self.clock.now_ms();
        let mut inner = self.lock();

        let before = inner.entries.len();
        inner.entries.retain(|_, entry| !entry.is_expired(now));
        let after = inner.entries.len();

        let removed = before - after;
        inner.stats.record_expired(removed);
        inner.stats.set_total_entries(after);
        removed
    }

    // == Get Or Set ==
    /// Returns the live value for `key`, or produces, stores and returns a new one.
    ///
    /// `fetcher` is not called when a live entry exists. A fetcher error is
    /// returned as-is and nothing is stored. Concurrent misses on the same
    /// key each run their own fetcher; the last one to finish wins.
    ///
    /// # Arguments
    /// * `key` - The key to look up and populate
    /// * `fetcher` - Async producer invoked on a miss
    /// * `ttl_ms` - Optional lifetime for the new entry (uses the default if None)
    pub async fn get_or_set<F, Fut, E>(
        &self,
        key: &str,
        fetcher: F,
        ttl_ms: Option<u64>,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let value = fetcher().await?;
        self.set(key, value.clone(), ttl_ms);
        Ok(value)
    }

    // == Stats ==
    /// Returns a snapshot of the counters.
    pub fn stats(&self) -> CacheStats {
        let inner = self.lock();
        let mut stats = inner.stats.clone();
        stats.set_total_entries(inner.entries.len());
        stats
    }

    /// Number of stored entries, expired-but-unswept ones included.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    pub fn default_ttl_ms(&self) -> u64 {
        self.default_ttl_ms
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL_MS)
    }
}
