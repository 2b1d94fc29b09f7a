//! Response DTOs for the placebook API
//!
//! Defines the structure of outgoing HTTP response bodies that aren't
//! domain types serialized as-is.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::places::{ServiceCacheStats, ThemedBookmark};

/// Counters for one cache, with the derived hit rate
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsBody {
    pub hits: u64,
    pub misses: u64,
    pub expired: u64,
    pub total_entries: usize,
    pub hit_rate: f64,
}

impl From<CacheStats> for CacheStatsBody {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            expired: stats.expired,
            total_entries: stats.total_entries,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub groups: CacheStatsBody,
    pub bookmarks: CacheStatsBody,
}

impl From<ServiceCacheStats> for StatsResponse {
    fn from(stats: ServiceCacheStats) -> Self {
        Self {
            groups: stats.groups.into(),
            bookmarks: stats.bookmarks.into(),
        }
    }
}

/// Response body for DELETE /bookmarks/:bookmark_id and DELETE /themes/:theme_id
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub id: String,
}

impl DeleteResponse {
    /// `kind` names the deleted record, e.g. "Bookmark".
    pub fn new(kind: &str, id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            message: format!("{} '{}' deleted successfully", kind, id),
            id,
        }
    }
}

/// Response body for GET /groups/:group_id/available
#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityResponse {
    pub group_id: String,
    pub available: bool,
}

/// Response body for GET /themes/:theme_id/bookmarks
#[derive(Debug, Clone, Serialize)]
pub struct ThemeBookmarksResponse {
    pub bookmarks: Vec<ThemedBookmark>,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_stats_body_hit_rate() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            expired: 5,
            total_entries: 100,
        };
        let body = CacheStatsBody::from(stats);
        assert!((body.hit_rate - 0.8).abs() < 0.001);
        assert_eq!(body.expired, 5);
    }

    #[test]
    fn test_delete_response_serialize() {
        let resp = DeleteResponse::new("Bookmark", "bm123");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("bm123"));
        assert!(json.contains("deleted"));

        let theme = DeleteResponse::new("Theme", "th9");
        assert_eq!(theme.message, "Theme 'th9' deleted successfully");
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
