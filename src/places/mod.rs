//! Places Module
//!
//! Groups of people collecting places they want to visit and sorting them
//! into themes.
//!
//! # Layers
//! - `model`: entities and validation
//! - `repository`: in-memory record store with filtering and stats
//! - `service`: cached read paths and cache-invalidating writes

pub mod model;
pub mod repository;
pub mod service;

pub use model::{Bookmark, BookmarkDraft, Category, Group, Theme};
pub use repository::{
    BookmarkFilter, BookmarkStats, PlaceRepository, ThemeWithCount, ThemedBookmark,
};
pub use service::{BookmarkListing, MapMarker, MapView, PlaceService, ServiceCacheStats};
