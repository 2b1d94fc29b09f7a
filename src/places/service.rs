//! Place Service Module
//!
//! Group, bookmark and theme workflows. Reads of groups and unfiltered
//! bookmark listings go through TTL caches; every write invalidates what it
//! touched.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::cache::{CacheStats, TtlCache};
use crate::cache_key;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::geo::{compute_bounds, Coordinate, HasCoordinates, Viewport};
use crate::places::model::{
    generate_group_id, validate_group_id, validate_group_name, Bookmark, BookmarkDraft, Category,
    Group, Theme,
};
use crate::places::repository::{
    BookmarkFilter, BookmarkStats, PlaceRepository, ThemeWithCount, ThemedBookmark,
};

const GROUP_KEY_PREFIX: &str = "group";
const BOOKMARKS_KEY_PREFIX: &str = "bookmarks";

/// Attempts at drawing an unused group id before giving up.
const MAX_GROUP_ID_ATTEMPTS: usize = 10;

// == Bookmark Listing ==
/// A group's bookmarks with their themes, plus group-wide counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookmarkListing {
    pub bookmarks: Vec<ThemedBookmark>,
    pub total: usize,
    pub stats: BookmarkStats,
}

// == Map View ==
/// One located bookmark as drawn on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub id: String,
    pub title: String,
    pub category: Category,
    pub pin: &'static str,
    pub visited: bool,
    pub position: Coordinate,
}

/// Everything needed to render a group's map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub viewport: Viewport,
    /// True when no bookmark is located and the default viewport is used
    pub fallback: bool,
    pub markers: Vec<MapMarker>,
}

/// Counters for both caches the service owns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceCacheStats {
    pub groups: CacheStats,
    pub bookmarks: CacheStats,
}

// == Place Service ==
/// Workflows over groups and bookmarks.
///
/// Owns its caches explicitly; nothing here is process-global, so each
/// service instance (and each test) has its own cache state.
#[derive(Debug, Clone)]
pub struct PlaceService {
    repo: Arc<PlaceRepository>,
    groups: Arc<TtlCache<Group>>,
    listings: Arc<TtlCache<BookmarkListing>>,
    group_ttl_ms: u64,
    bookmarks_ttl_ms: u64,
}

fn group_key(group_id: &str) -> String {
    cache_key!(GROUP_KEY_PREFIX, group_id)
}

fn bookmarks_key(group_id: &str) -> String {
    cache_key!(BOOKMARKS_KEY_PREFIX, group_id)
}

impl PlaceService {
    pub fn new(
        repo: Arc<PlaceRepository>,
        groups: Arc<TtlCache<Group>>,
        listings: Arc<TtlCache<BookmarkListing>>,
        group_ttl_ms: u64,
        bookmarks_ttl_ms: u64,
    ) -> Self {
        Self {
            repo,
            groups,
            listings,
            group_ttl_ms,
            bookmarks_ttl_ms,
        }
    }

    /// Builds a service with an empty repository and fresh caches.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(PlaceRepository::new()),
            Arc::new(TtlCache::new(config.default_ttl_ms)),
            Arc::new(TtlCache::new(config.default_ttl_ms)),
            config.group_ttl_ms,
            config.bookmarks_ttl_ms,
        )
    }

    pub fn group_cache(&self) -> &Arc<TtlCache<Group>> {
        &self.groups
    }

    pub fn listing_cache(&self) -> &Arc<TtlCache<BookmarkListing>> {
        &self.listings
    }

    fn invalidate_bookmarks(&self, group_id: &str) {
        if self.listings.delete(&bookmarks_key(group_id)) {
            debug!("Invalidated bookmark listing cache for group {}", group_id);
        }
    }

    // == Groups ==

    /// Creates a group under a freshly drawn unused id.
    pub async fn create_group(&self, name: &str, description: Option<&str>) -> Result<Group> {
        validate_group_name(name)?;

        for _ in 0..MAX_GROUP_ID_ATTEMPTS {
            let group = Group::new(&generate_group_id(), name, description)?;
            if let Some(saved) = self.repo.insert_group_if_absent(group).await {
                info!("Created group {}", saved.id);
                return Ok(saved);
            }
        }

        Err(AppError::Conflict(
            "Failed to generate unique group id".to_string(),
        ))
    }

    /// Whether `group_id` is well formed and not yet taken.
    pub async fn is_group_id_available(&self, group_id: &str) -> Result<bool> {
        validate_group_id(group_id)?;
        Ok(!self.repo.group_exists(group_id).await)
    }

    /// Looks a group up, serving repeats from cache.
    ///
    /// A missing group is reported as `NotFound` and is not cached.
    pub async fn get_group(&self, group_id: &str) -> Result<Group> {
        validate_group_id(group_id)?;

        self.groups
            .get_or_set(
                &group_key(group_id),
                || async {
                    self.repo
                        .find_group(group_id)
                        .await
                        .ok_or_else(|| AppError::NotFound(format!("Group {}", group_id)))
                },
                Some(self.group_ttl_ms),
            )
            .await
    }

    pub async fn update_group(
        &self,
        group_id: &str,
        name: &str,
        description: Option<&str>,
    ) -> Result<Group> {
        let mut group = self.get_group(group_id).await?;
        group.update_info(name, description)?;

        let saved = self.repo.save_group(group).await;
        self.groups.delete(&group_key(group_id));
        debug!("Invalidated group cache for {}", group_id);
        Ok(saved)
    }

    // == Bookmarks ==

    async fn load_listing(&self, group_id: &str, filter: &BookmarkFilter) -> BookmarkListing {
        let found = self.repo.find_by_group(group_id, filter).await;
        let bookmarks = self.repo.attach_themes(found).await;
        let stats = self.repo.stats(group_id).await;
        BookmarkListing {
            total: bookmarks.len(),
            bookmarks,
            stats,
        }
    }

    /// Lists a group's bookmarks.
    ///
    /// Only the unfiltered listing is cached; filtered queries always hit
    /// the repository.
    pub async fn list_bookmarks(
        &self,
        group_id: &str,
        filter: &BookmarkFilter,
    ) -> Result<BookmarkListing> {
        self.get_group(group_id).await?;

        if !filter.is_empty() {
            return Ok(self.load_listing(group_id, filter).await);
        }

        self.listings
            .get_or_set(
                &bookmarks_key(group_id),
                || async { Ok(self.load_listing(group_id, filter).await) },
                Some(self.bookmarks_ttl_ms),
            )
            .await
    }

    pub async fn get_bookmark(&self, bookmark_id: &str) -> Result<Bookmark> {
        self.repo
            .find_bookmark(bookmark_id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("Bookmark {}", bookmark_id)))
    }

    pub async fn create_bookmark(&self, group_id: &str, draft: BookmarkDraft) -> Result<Bookmark> {
        self.get_group(group_id).await?;

        let bookmark = Bookmark::create(group_id, draft)?;
        let saved = self.repo.save_bookmark(bookmark).await;
        self.invalidate_bookmarks(group_id);
        Ok(saved)
    }

    pub async fn update_bookmark(&self, bookmark_id: &str, draft: BookmarkDraft) -> Result<Bookmark> {
        let mut bookmark = self.get_bookmark(bookmark_id).await?;
        bookmark.apply(draft)?;

        let saved = self.repo.save_bookmark(bookmark).await;
        self.invalidate_bookmarks(&saved.group_id);
        Ok(saved)
    }

    pub async fn set_visited(&self, bookmark_id: &str, visited: bool) -> Result<Bookmark> {
        let mut bookmark = self.get_bookmark(bookmark_id).await?;
        if visited {
            bookmark.mark_visited();
        } else {
            bookmark.mark_unvisited();
        }

        let saved = self.repo.save_bookmark(bookmark).await;
        self.invalidate_bookmarks(&saved.group_id);
        Ok(saved)
    }

    pub async fn delete_bookmark(&self, bookmark_id: &str) -> Result<()> {
        let removed = self
            .repo
            .delete_bookmark(bookmark_id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("Bookmark {}", bookmark_id)))?;

        self.invalidate_bookmarks(&removed.group_id);
        Ok(())
    }

    // == Map ==

    /// Markers for every located bookmark and a viewport fitting them all.
    pub async fn map_view(&self, group_id: &str) -> Result<MapView> {
        let listing = self
            .list_bookmarks(group_id, &BookmarkFilter::default())
            .await?;

        let bookmarks: Vec<&Bookmark> = listing.bookmarks.iter().map(|t| &t.bookmark).collect();

        let markers: Vec<MapMarker> = bookmarks
            .iter()
            .filter_map(|b| {
                b.coordinate().map(|position| MapMarker {
                    id: b.id.clone(),
                    title: b.title.clone(),
                    category: b.category,
                    pin: b.category.pin_emoji(),
                    visited: b.visited,
                    position,
                })
            })
            .collect();

        let (viewport, fallback) = match compute_bounds(&bookmarks) {
            Some(viewport) => (viewport, false),
            None => (Viewport::fallback(), true),
        };

        Ok(MapView {
            viewport,
            fallback,
            markers,
        })
    }

    // == Themes ==

    pub async fn list_themes(&self, group_id: &str) -> Result<Vec<ThemeWithCount>> {
        self.get_group(group_id).await?;
        Ok(self.repo.find_themes_by_group(group_id).await)
    }

    pub async fn get_theme(&self, theme_id: &str) -> Result<ThemeWithCount> {
        self.repo
            .find_theme(theme_id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("Theme {}", theme_id)))
    }

    /// A new theme has no bookmarks yet, so cached listings stay valid.
    pub async fn create_theme(
        &self,
        group_id: &str,
        name: &str,
        icon: Option<&str>,
    ) -> Result<Theme> {
        self.get_group(group_id).await?;

        let theme = Theme::new(group_id, name, icon)?;
        let saved = self.repo.save_theme(theme).await;
        info!("Created theme {} in group {}", saved.id, group_id);
        Ok(saved)
    }

    pub async fn update_theme(
        &self,
        theme_id: &str,
        name: &str,
        icon: Option<&str>,
    ) -> Result<Theme> {
        let mut theme = self.get_theme(theme_id).await?.theme;
        theme.update_info(name, icon)?;

        let saved = self.repo.save_theme(theme).await;
        self.invalidate_bookmarks(&saved.group_id);
        Ok(saved)
    }

    pub async fn delete_theme(&self, theme_id: &str) -> Result<()> {
        let removed = self
            .repo
            .delete_theme(theme_id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("Theme {}", theme_id)))?;

        self.invalidate_bookmarks(&removed.group_id);
        Ok(())
    }

    pub async fn themes_for_bookmark(&self, bookmark_id: &str) -> Result<Vec<Theme>> {
        self.get_bookmark(bookmark_id).await?;
        Ok(self.repo.find_themes_by_bookmark(bookmark_id).await)
    }

    /// Replaces the themes assigned to a bookmark. Duplicate ids collapse.
    pub async fn assign_themes(
        &self,
        bookmark_id: &str,
        theme_ids: &[String],
    ) -> Result<ThemedBookmark> {
        let bookmark = self.get_bookmark(bookmark_id).await?;
        let theme_ids: BTreeSet<String> = theme_ids.iter().cloned().collect();

        let themes = self
            .repo
            .replace_bookmark_themes(bookmark_id, &theme_ids)
            .await?;
        self.invalidate_bookmarks(&bookmark.group_id);
        debug!("Bookmark {} now has {} themes", bookmark_id, themes.len());

        Ok(ThemedBookmark { bookmark, themes })
    }

    pub async fn bookmarks_by_theme(&self, theme_id: &str) -> Result<Vec<ThemedBookmark>> {
        self.get_theme(theme_id).await?;
        Ok(self.repo.find_bookmarks_by_theme(theme_id).await)
    }

    pub fn cache_stats(&self) -> ServiceCacheStats {
        ServiceCacheStats {
            groups: self.groups.stats(),
            bookmarks: self.listings.stats(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use crate::geo::{FALLBACK_ZOOM, FINEST_ZOOM};

    fn test_service() -> (PlaceService, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_000_000));
        let service = PlaceService::new(
            Arc::new(PlaceRepository::new()),
            Arc::new(TtlCache::with_clock(30_000, clock.clone())),
            Arc::new(TtlCache::with_clock(30_000, clock.clone())),
            30_000,
            60_000,
        );
        (service, clock)
    }

    fn draft(title: &str, coords: Option<(f64, f64)>) -> BookmarkDraft {
        BookmarkDraft {
            title: title.to_string(),
            url: "https://example.com".to_string(),
            category: Category::Sightseeing,
            memo: None,
            address: None,
            latitude: coords.map(|c| c.0),
            longitude: coords.map(|c| c.1),
            priority: None,
        }
    }

    #[tokio::test]
    async fn test_get_group_is_cached() {
        let (service, _) = test_service();
        let group = service.create_group("Trip", None).await.unwrap();

        service.get_group(&group.id).await.unwrap();
        service.get_group(&group.id).await.unwrap();

        let stats = service.cache_stats().groups;
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
    }

    #[tokio::test]
    async fn test_missing_group_is_not_cached() {
        let (service, _) = test_service();

        let result = service.get_group("zzzz0000").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert!(service.group_cache().is_empty());
    }

    #[tokio::test]
    async fn test_create_group_validates_before_drawing_ids() {
        let (service, _) = test_service();
        let result = service.create_group("   ", None).await;
        assert!(matches!(result, Err(AppError::Validation { field: "name", .. })));
    }

    #[tokio::test]
    async fn test_group_id_availability() {
        let (service, _) = test_service();
        let group = service.create_group("Trip", None).await.unwrap();

        assert!(!service.is_group_id_available(&group.id).await.unwrap());
        assert!(service.is_group_id_available("zzzz0000").await.unwrap());
        assert!(matches!(
            service.is_group_id_available("Bad-Id").await,
            Err(AppError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_group_id_rejected() {
        let (service, _) = test_service();
        let result = service.get_group("NOT-VALID").await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_update_group_invalidates_cache() {
        let (service, _) = test_service();
        let group = service.create_group("Trip", None).await.unwrap();
        service.get_group(&group.id).await.unwrap();

        service
            .update_group(&group.id, "Renamed", Some("Autumn"))
            .await
            .unwrap();

        let fetched = service.get_group(&group.id).await.unwrap();
        assert_eq!(fetched.name, "Renamed");
        assert_eq!(fetched.description.as_deref(), Some("Autumn"));
    }

    #[tokio::test]
    async fn test_unfiltered_listing_cached_and_invalidated() {
        let (service, _) = test_service();
        let group = service.create_group("Trip", None).await.unwrap();
        service
            .create_bookmark(&group.id, draft("Temple", None))
            .await
            .unwrap();

        let all = BookmarkFilter::default();
        let first = service.list_bookmarks(&group.id, &all).await.unwrap();
        assert_eq!(first.total, 1);
        assert_eq!(service.listing_cache().len(), 1);

        service
            .create_bookmark(&group.id, draft("Shrine", None))
            .await
            .unwrap();
        assert!(service.listing_cache().is_empty(), "Write should invalidate");

        let second = service.list_bookmarks(&group.id, &all).await.unwrap();
        assert_eq!(second.total, 2);
        assert_eq!(second.stats.total_count, 2);
    }

    #[tokio::test]
    async fn test_filtered_listing_bypasses_cache() {
        let (service, _) = test_service();
        let group = service.create_group("Trip", None).await.unwrap();
        let bookmark = service
            .create_bookmark(&group.id, draft("Temple", None))
            .await
            .unwrap();
        service.set_visited(&bookmark.id, true).await.unwrap();

        let visited = BookmarkFilter {
            visited: Some(true),
            ..Default::default()
        };
        let listing = service.list_bookmarks(&group.id, &visited).await.unwrap();

        assert_eq!(listing.total, 1);
        assert!(service.listing_cache().is_empty());
    }

    #[tokio::test]
    async fn test_listing_expires_with_clock() {
        let (service, clock) = test_service();
        let group = service.create_group("Trip", None).await.unwrap();
        let all = BookmarkFilter::default();

        service.list_bookmarks(&group.id, &all).await.unwrap();
        clock.advance(60_001);
        service.list_bookmarks(&group.id, &all).await.unwrap();

        let stats = service.cache_stats().bookmarks;
        assert_eq!(stats.expired, 1);
        assert_eq!(stats.hits, 0);
    }

    #[tokio::test]
    async fn test_delete_bookmark() {
        let (service, _) = test_service();
        let group = service.create_group("Trip", None).await.unwrap();
        let bookmark = service
            .create_bookmark(&group.id, draft("Temple", None))
            .await
            .unwrap();

        service.delete_bookmark(&bookmark.id).await.unwrap();

        assert!(matches!(
            service.get_bookmark(&bookmark.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_bookmark(&bookmark.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_map_view_fallback_without_coordinates() {
        let (service, _) = test_service();
        let group = service.create_group("Trip", None).await.unwrap();
        service
            .create_bookmark(&group.id, draft("Somewhere", None))
            .await
            .unwrap();

        let view = service.map_view(&group.id).await.unwrap();

        assert!(view.fallback);
        assert!(view.markers.is_empty());
        assert_eq!(view.viewport.zoom, FALLBACK_ZOOM);
    }

    #[tokio::test]
    async fn test_map_view_fits_markers() {
        let (service, _) = test_service();
        let group = service.create_group("Trip", None).await.unwrap();
        service
            .create_bookmark(&group.id, draft("Tokyo Tower", Some((35.6586, 139.7454))))
            .await
            .unwrap();
        service
            .create_bookmark(&group.id, draft("Unplaced", None))
            .await
            .unwrap();

        let view = service.map_view(&group.id).await.unwrap();

        assert!(!view.fallback);
        assert_eq!(view.markers.len(), 1);
        assert_eq!(view.markers[0].pin, Category::Sightseeing.pin_emoji());
        assert_eq!(view.viewport.zoom, FINEST_ZOOM);
        assert_eq!(view.viewport.center, Coordinate::new(35.6586, 139.7454));
    }

    #[tokio::test]
    async fn test_theme_crud() {
        let (service, _) = test_service();
        let group = service.create_group("Trip", None).await.unwrap();

        let theme = service
            .create_theme(&group.id, "Food", Some("🍜"))
            .await
            .unwrap();
        let listed = service.list_themes(&group.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].bookmark_count, 0);

        let renamed = service.update_theme(&theme.id, "Eats", None).await.unwrap();
        assert_eq!(renamed.name, "Eats");
        assert_eq!(renamed.icon, None);

        service.delete_theme(&theme.id).await.unwrap();
        assert!(matches!(
            service.get_theme(&theme.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_theme(&theme.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_theme_for_unknown_group() {
        let (service, _) = test_service();
        assert!(matches!(
            service.create_theme("zzzz0000", "Food", None).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.list_themes("zzzz0000").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_assign_themes_shows_in_listing() {
        let (service, _) = test_service();
        let group = service.create_group("Trip", None).await.unwrap();
        let bookmark = service
            .create_bookmark(&group.id, draft("Temple", None))
            .await
            .unwrap();
        let theme = service.create_theme(&group.id, "Day 1", None).await.unwrap();
        let all = BookmarkFilter::default();

        let before = service.list_bookmarks(&group.id, &all).await.unwrap();
        assert!(before.bookmarks[0].themes.is_empty());

        let ids = vec![theme.id.clone(), theme.id.clone()];
        let assigned = service.assign_themes(&bookmark.id, &ids).await.unwrap();
        assert_eq!(assigned.themes, vec![theme.clone()]);
        assert!(service.listing_cache().is_empty(), "Assignment should invalidate");

        let after = service.list_bookmarks(&group.id, &all).await.unwrap();
        assert_eq!(after.bookmarks[0].themes, vec![theme.clone()]);
        assert_eq!(
            service.themes_for_bookmark(&bookmark.id).await.unwrap(),
            vec![theme.clone()]
        );

        let tagged = service.bookmarks_by_theme(&theme.id).await.unwrap();
        assert_eq!(tagged.len(), 1);
        assert_eq!(tagged[0].bookmark.id, bookmark.id);
    }

    #[tokio::test]
    async fn test_theme_writes_invalidate_listing() {
        let (service, _) = test_service();
        let group = service.create_group("Trip", None).await.unwrap();
        let bookmark = service
            .create_bookmark(&group.id, draft("Temple", None))
            .await
            .unwrap();
        let theme = service.create_theme(&group.id, "Day 1", None).await.unwrap();
        service
            .assign_themes(&bookmark.id, &[theme.id.clone()])
            .await
            .unwrap();
        let all = BookmarkFilter::default();

        service.list_bookmarks(&group.id, &all).await.unwrap();
        service.update_theme(&theme.id, "Day 2", None).await.unwrap();
        let renamed = service.list_bookmarks(&group.id, &all).await.unwrap();
        assert_eq!(renamed.bookmarks[0].themes[0].name, "Day 2");

        service.delete_theme(&theme.id).await.unwrap();
        let cleared = service.list_bookmarks(&group.id, &all).await.unwrap();
        assert!(cleared.bookmarks[0].themes.is_empty());
    }

    #[tokio::test]
    async fn test_assign_theme_from_other_group_rejected() {
        let (service, _) = test_service();
        let home = service.create_group("Home", None).await.unwrap();
        let away = service.create_group("Away", None).await.unwrap();
        let bookmark = service
            .create_bookmark(&home.id, draft("Temple", None))
            .await
            .unwrap();
        let foreign = service.create_theme(&away.id, "Other", None).await.unwrap();

        let result = service.assign_themes(&bookmark.id, &[foreign.id]).await;
        assert!(matches!(
            result,
            Err(AppError::Validation { field: "theme_ids", .. })
        ));
        assert!(service.themes_for_bookmark(&bookmark.id).await.unwrap().is_empty());
    }
}
