//! Cache Entry Module
//!
//! Defines a single cached value together with its expiry window.

// == Cache Entry ==
/// A cached value stamped with the time it was stored.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Insertion timestamp (Unix milliseconds)
    pub stored_at: u64,
    /// Lifetime in milliseconds, measured from `stored_at`
    pub ttl_ms: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry stored at `now_ms` that lives for `ttl_ms`.
    pub fn new(value: V, now_ms: u64, ttl_ms: u64) -> Self {
        Self {
            value,
            stored_at: now_ms,
            ttl_ms,
        }
    }

    // == Is Expired ==
    /// Checks whether the entry is past its lifetime at `now_ms`.
    ///
    /// Boundary condition: an entry is still readable when exactly `ttl_ms`
    /// has elapsed and expires one millisecond later. A clock that reads
    /// earlier than `stored_at` counts as zero elapsed time.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.stored_at) > self.ttl_ms
    }

    // == Time To Live ==
    /// Returns the remaining lifetime in milliseconds, or 0 once expired.
    pub fn ttl_remaining_ms(&self, now_ms: u64) -> u64 {
        let elapsed = now_ms.saturating_sub(self.stored_at);
        self.ttl_ms.saturating_sub(elapsed)
    }
}
