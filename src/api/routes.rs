//! API Routes
//!
//! Configures the Axum router with all placebook endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    assign_themes_handler, bookmark_themes_handler, create_bookmark_handler, create_group_handler,
    create_theme_handler, delete_bookmark_handler, delete_theme_handler, get_bookmark_handler,
    get_group_handler, get_theme_handler, group_availability_handler, health_handler,
    list_bookmarks_handler, list_themes_handler, map_handler, set_visited_handler, stats_handler,
    theme_bookmarks_handler, update_bookmark_handler, update_group_handler, update_theme_handler,
    AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `POST /groups` - Create a group
/// - `GET|PUT /groups/:group_id` - Read or rename a group
/// - `GET /groups/:group_id/available` - Whether a group id is free
/// - `GET|POST /groups/:group_id/bookmarks` - List or add bookmarks
/// - `GET|POST /groups/:group_id/themes` - List or add themes
/// - `GET /groups/:group_id/map` - Markers plus a fitted viewport
/// - `GET|PUT|DELETE /bookmarks/:bookmark_id` - Single bookmark
/// - `PUT /bookmarks/:bookmark_id/visited` - Toggle visit status
/// - `GET|PUT /bookmarks/:bookmark_id/themes` - Read or replace theme assignment
/// - `GET|PUT|DELETE /themes/:theme_id` - Single theme
/// - `GET /themes/:theme_id/bookmarks` - Bookmarks assigned to a theme
/// - `GET /stats` - Cache statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/groups", post(create_group_handler))
        .route(
            "/groups/:group_id",
            get(get_group_handler).put(update_group_handler),
        )
        .route("/groups/:group_id/available", get(group_availability_handler))
        .route(
            "/groups/:group_id/bookmarks",
            get(list_bookmarks_handler).post(create_bookmark_handler),
        )
        .route(
            "/groups/:group_id/themes",
            get(list_themes_handler).post(create_theme_handler),
        )
        .route("/groups/:group_id/map", get(map_handler))
        .route(
            "/bookmarks/:bookmark_id",
            get(get_bookmark_handler)
                .put(update_bookmark_handler)
                .delete(delete_bookmark_handler),
        )
        .route("/bookmarks/:bookmark_id/visited", put(set_visited_handler))
        .route(
            "/bookmarks/:bookmark_id/themes",
            get(bookmark_themes_handler).put(assign_themes_handler),
        )
        .route(
            "/themes/:theme_id",
            get(get_theme_handler)
                .put(update_theme_handler)
                .delete(delete_theme_handler),
        )
        .route("/themes/:theme_id/bookmarks", get(theme_bookmarks_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
