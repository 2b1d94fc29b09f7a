//! Request DTOs for the placebook API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;

use crate::error::Result;
use crate::places::{BookmarkDraft, BookmarkFilter};

/// Request body for creating or updating a group
#[derive(Debug, Clone, Deserialize)]
pub struct GroupRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Request body for creating or updating a bookmark
///
/// `category` is kept as text so an unknown value produces a readable
/// 400 instead of a deserialization rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct BookmarkRequest {
    pub title: String,
    pub url: String,
    pub category: String,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub priority: Option<i64>,
}

impl BookmarkRequest {
    /// Converts into a domain draft, resolving the category name.
    pub fn into_draft(self) -> Result<BookmarkDraft> {
        Ok(BookmarkDraft {
            category: self.category.parse()?,
            title: self.title,
            url: self.url,
            memo: self.memo,
            address: self.address,
            latitude: self.latitude,
            longitude: self.longitude,
            priority: self.priority,
        })
    }
}

/// Request body for PUT /bookmarks/:bookmark_id/visited
#[derive(Debug, Clone, Deserialize)]
pub struct VisitedRequest {
    pub visited: bool,
}

/// Request body for creating or updating a theme
#[derive(Debug, Clone, Deserialize)]
pub struct ThemeRequest {
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
}

/// Request body for PUT /bookmarks/:bookmark_id/themes
///
/// Replaces the whole assignment; an empty list clears it.
#[derive(Debug, Clone, Deserialize)]
pub struct ThemeAssignmentRequest {
    #[serde(default)]
    pub theme_ids: Vec<String>,
}

/// Query string for GET /groups/:group_id/bookmarks
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookmarkQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub visited: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}

impl BookmarkQuery {
    pub fn to_filter(&self) -> Result<BookmarkFilter> {
        BookmarkFilter::from_query(
            self.category.as_deref(),
            self.visited.as_deref(),
            self.search.as_deref(),
        )
    }
}
