//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// TTL in milliseconds for cache writes that don't name one
    pub default_ttl_ms: u64,
    /// TTL in milliseconds for unfiltered bookmark listings
    pub bookmarks_ttl_ms: u64,
    /// TTL in milliseconds for group lookups
    pub group_ttl_ms: u64,
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Expired entry sweep frequency in seconds (default: 300)
    /// - `DEFAULT_TTL_MS` - Fallback cache TTL (default: 30000)
    /// - `BOOKMARKS_TTL_MS` - Bookmark listing cache TTL (default: 60000)
    /// - `GROUP_TTL_MS` - Group lookup cache TTL (default: 30000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            default_ttl_ms: env_or("DEFAULT_TTL_MS", defaults.default_ttl_ms),
            bookmarks_ttl_ms: env_or("BOOKMARKS_TTL_MS", defaults.bookmarks_ttl_ms),
            group_ttl_ms: env_or("GROUP_TTL_MS", defaults.group_ttl_ms),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cleanup_interval: 300,
            default_ttl_ms: 30_000,
            bookmarks_ttl_ms: 60_000,
            group_ttl_ms: 30_000,
        }
    }
}
