//! Cache Module
//!
//! Provides a process-local in-memory cache with per-entry TTL expiration.

mod clock;
mod entry;
mod key;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use key::{generate_cache_key, KeyParam, KEY_DELIMITER};
pub use stats::CacheStats;
pub use store::{TtlCache, DEFAULT_TTL_MS};
