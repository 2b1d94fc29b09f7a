//! Placebook - shared place bookmarks for groups
//!
//! Groups collect places they want to visit, track visits, and see them on
//! a map. Reads go through a TTL cache; the map viewport is fitted to the
//! located bookmarks.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod geo;
pub mod models;
pub mod places;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use tasks::spawn_cleanup_task;
