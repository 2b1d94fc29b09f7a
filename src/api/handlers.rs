//! API Handlers
//!
//! HTTP request handlers for each placebook endpoint.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::config::Config;
use crate::error::Result;
use crate::models::{
    AvailabilityResponse, BookmarkQuery, BookmarkRequest, DeleteResponse, GroupRequest,
    HealthResponse, StatsResponse, ThemeAssignmentRequest, ThemeBookmarksResponse, ThemeRequest,
    VisitedRequest,
};
use crate::places::{
    Bookmark, BookmarkListing, Group, MapView, PlaceService, Theme, ThemeWithCount, ThemedBookmark,
};

/// Application state shared across all handlers.
///
/// The service owns the repository and the caches; cloning the state only
/// clones `Arc`s.
#[derive(Clone)]
pub struct AppState {
    pub places: PlaceService,
}

impl AppState {
    /// Creates a new AppState around an existing service.
    pub fn new(places: PlaceService) -> Self {
        Self { places }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(PlaceService::from_config(config))
    }
}

/// Handler for POST /groups
pub async fn create_group_handler(
    State(state): State<AppState>,
    Json(req): Json<GroupRequest>,
) -> Result<(StatusCode, Json<Group>)> {
    let group = state
        .places
        .create_group(&req.name, req.description.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(group)))
}

/// Handler for GET /groups/:group_id
pub async fn get_group_handler(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> Result<Json<Group>> {
    let group = state.places.get_group(&group_id).await?;
    Ok(Json(group))
}

/// Handler for PUT /groups/:group_id
pub async fn update_group_handler(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    Json(req): Json<GroupRequest>,
) -> Result<Json<Group>> {
    let group = state
        .places
        .update_group(&group_id, &req.name, req.description.as_deref())
        .await?;
    Ok(Json(group))
}

/// Handler for GET /groups/:group_id/available
pub async fn group_availability_handler(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> Result<Json<AvailabilityResponse>> {
    let available = state.places.is_group_id_available(&group_id).await?;
    Ok(Json(AvailabilityResponse {
        group_id,
        available,
    }))
}

/// Handler for GET /groups/:group_id/bookmarks
///
/// Accepts `category`, `visited` and `search` query parameters.
pub async fn list_bookmarks_handler(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    Query(query): Query<BookmarkQuery>,
) -> Result<Json<BookmarkListing>> {
    let filter = query.to_filter()?;
    let listing = state.places.list_bookmarks(&group_id, &filter).await?;
    Ok(Json(listing))
}

/// Handler for POST /groups/:group_id/bookmarks
pub async fn create_bookmark_handler(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    Json(req): Json<BookmarkRequest>,
) -> Result<(StatusCode, Json<Bookmark>)> {
    let draft = req.into_draft()?;
    let bookmark = state.places.create_bookmark(&group_id, draft).await?;
    Ok((StatusCode::CREATED, Json(bookmark)))
}

/// Handler for GET /groups/:group_id/map
pub async fn map_handler(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> Result<Json<MapView>> {
    let view = state.places.map_view(&group_id).await?;
    Ok(Json(view))
}

/// Handler for GET /bookmarks/:bookmark_id
pub async fn get_bookmark_handler(
    State(state): State<AppState>,
    Path(bookmark_id): Path<String>,
) -> Result<Json<Bookmark>> {
    let bookmark = state.places.get_bookmark(&bookmark_id).await?;
    Ok(Json(bookmark))
}

/// Handler for PUT /bookmarks/:bookmark_id
pub async fn update_bookmark_handler(
    State(state): State<AppState>,
    Path(bookmark_id): Path<String>,
    Json(req): Json<BookmarkRequest>,
) -> Result<Json<Bookmark>> {
    let draft = req.into_draft()?;
    let bookmark = state.places.update_bookmark(&bookmark_id, draft).await?;
    Ok(Json(bookmark))
}

/// Handler for PUT /bookmarks/:bookmark_id/visited
pub async fn set_visited_handler(
    State(state): State<AppState>,
    Path(bookmark_id): Path<String>,
    Json(req): Json<VisitedRequest>,
) -> Result<Json<Bookmark>> {
    let bookmark = state.places.set_visited(&bookmark_id, req.visited).await?;
    Ok(Json(bookmark))
}

/// Handler for DELETE /bookmarks/:bookmark_id
pub async fn delete_bookmark_handler(
    State(state): State<AppState>,
    Path(bookmark_id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    state.places.delete_bookmark(&bookmark_id).await?;
    Ok(Json(DeleteResponse::new("Bookmark", bookmark_id)))
}

/// Handler for GET /bookmarks/:bookmark_id/themes
pub async fn bookmark_themes_handler(
    State(state): State<AppState>,
    Path(bookmark_id): Path<String>,
) -> Result<Json<Vec<Theme>>> {
    let themes = state.places.themes_for_bookmark(&bookmark_id).await?;
    Ok(Json(themes))
}

/// Handler for PUT /bookmarks/:bookmark_id/themes
pub async fn assign_themes_handler(
    State(state): State<AppState>,
    Path(bookmark_id): Path<String>,
    Json(req): Json<ThemeAssignmentRequest>,
) -> Result<Json<ThemedBookmark>> {
    let bookmark = state
        .places
        .assign_themes(&bookmark_id, &req.theme_ids)
        .await?;
    Ok(Json(bookmark))
}

/// Handler for GET /groups/:group_id/themes
pub async fn list_themes_handler(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> Result<Json<Vec<ThemeWithCount>>> {
    let themes = state.places.list_themes(&group_id).await?;
    Ok(Json(themes))
}

/// Handler for POST /groups/:group_id/themes
pub async fn create_theme_handler(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    Json(req): Json<ThemeRequest>,
) -> Result<(StatusCode, Json<Theme>)> {
    let theme = state
        .places
        .create_theme(&group_id, &req.name, req.icon.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(theme)))
}

/// Handler for GET /themes/:theme_id
pub async fn get_theme_handler(
    State(state): State<AppState>,
    Path(theme_id): Path<String>,
) -> Result<Json<ThemeWithCount>> {
    let theme = state.places.get_theme(&theme_id).await?;
    Ok(Json(theme))
}

/// Handler for PUT /themes/:theme_id
pub async fn update_theme_handler(
    State(state): State<AppState>,
    Path(theme_id): Path<String>,
    Json(req): Json<ThemeRequest>,
) -> Result<Json<Theme>> {
    let theme = state
        .places
        .update_theme(&theme_id, &req.name, req.icon.as_deref())
        .await?;
    Ok(Json(theme))
}

/// Handler for DELETE /themes/:theme_id
pub async fn delete_theme_handler(
    State(state): State<AppState>,
    Path(theme_id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    state.places.delete_theme(&theme_id).await?;
    Ok(Json(DeleteResponse::new("Theme", theme_id)))
}

/// Handler for GET /themes/:theme_id/bookmarks
pub async fn theme_bookmarks_handler(
    State(state): State<AppState>,
    Path(theme_id): Path<String>,
) -> Result<Json<ThemeBookmarksResponse>> {
    let bookmarks = state.places.bookmarks_by_theme(&theme_id).await?;
    Ok(Json(ThemeBookmarksResponse { bookmarks }))
}

/// Handler for GET /stats
///
/// Returns counters for the group and bookmark listing caches.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.places.cache_stats().into())
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
