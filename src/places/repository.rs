//! Place Repository Module
//!
//! In-memory record store for groups, bookmarks and themes. Bookmarks are
//! queryable by category, visit status and free-text search.

use std::cmp::Reverse;
use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use tokio::sync::RwLock;

use crate::error::{AppError, Result};
use crate::places::model::{Bookmark, Category, Group, Theme};

// == Bookmark Filter ==
/// Narrowing applied to a group's bookmark list. Empty means "everything".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookmarkFilter {
    pub category: Option<Category>,
    pub visited: Option<bool>,
    pub search: Option<String>,
}

impl BookmarkFilter {
    /// Builds a filter from raw query values.
    ///
    /// Blank values and `"all"` mean no restriction on that field.
    pub fn from_query(
        category: Option<&str>,
        visited: Option<&str>,
        search: Option<&str>,
    ) -> Result<Self> {
        fn meaningful(value: Option<&str>) -> Option<&str> {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
        }

        let category = meaningful(category)
            .map(str::parse::<Category>)
            .transpose()?;
        let visited = meaningful(visited).map(|v| v.eq_ignore_ascii_case("true"));
        let search = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(Self {
            category,
            visited,
            search,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.visited.is_none() && self.search.is_none()
    }

    pub fn matches(&self, bookmark: &Bookmark) -> bool {
        self.category.map_or(true, |c| bookmark.category == c)
            && self.visited.map_or(true, |v| bookmark.visited == v)
            && self
                .search
                .as_deref()
                .map_or(true, |needle| bookmark.matches_search(needle))
    }
}

// == Bookmark Stats ==
/// Per-group counts, independent of any filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BookmarkStats {
    pub total_count: usize,
    pub visited_count: usize,
    pub unvisited_count: usize,
    /// Mean priority rounded to one decimal, 0 for an empty group
    pub avg_priority: f64,
}

// == Theme Views ==
/// A bookmark together with the themes it is assigned to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThemedBookmark {
    #[serde(flatten)]
    pub bookmark: Bookmark,
    pub themes: Vec<Theme>,
}

/// A theme and how many bookmarks are assigned to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThemeWithCount {
    #[serde(flatten)]
    pub theme: Theme,
    pub bookmark_count: usize,
}

type ThemeLinks = HashMap<String, BTreeSet<String>>;

fn assigned_themes(
    themes: &HashMap<String, Theme>,
    links: &ThemeLinks,
    bookmark_id: &str,
) -> Vec<Theme> {
    let mut found: Vec<Theme> = links
        .get(bookmark_id)
        .into_iter()
        .flatten()
        .filter_map(|theme_id| themes.get(theme_id))
        .cloned()
        .collect();

    found.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    found
}

fn link_count(links: &ThemeLinks, theme_id: &str) -> usize {
    links.values().filter(|ids| ids.contains(theme_id)).count()
}

// == Place Repository ==
/// Stores groups, bookmarks and themes keyed by id.
///
/// Methods holding more than one lock take them in field order.
#[derive(Debug, Default)]
pub struct PlaceRepository {
    groups: RwLock<HashMap<String, Group>>,
    bookmarks: RwLock<HashMap<String, Bookmark>>,
    themes: RwLock<HashMap<String, Theme>>,
    /// Bookmark id to assigned theme ids
    bookmark_themes: RwLock<ThemeLinks>,
}

impl PlaceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    // == Groups ==

    /// Inserts or replaces a group.
    pub async fn save_group(&self, group: Group) -> Group {
        self.groups
            .write()
            .await
            .insert(group.id.clone(), group.clone());
        group
    }

    /// Inserts `group` unless its id is taken. The check and the insert
    /// happen under one write lock.
    pub async fn insert_group_if_absent(&self, group: Group) -> Option<Group> {
        match self.groups.write().await.entry(group.id.clone()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => Some(slot.insert(group).clone()),
        }
    }

    pub async fn find_group(&self, group_id: &str) -> Option<Group> {
        self.groups.read().await.get(group_id).cloned()
    }

    pub async fn group_exists(&self, group_id: &str) -> bool {
        self.groups.read().await.contains_key(group_id)
    }

    // == Bookmarks ==

    /// Inserts or replaces a bookmark.
    pub async fn save_bookmark(&self, bookmark: Bookmark) -> Bookmark {
        self.bookmarks
            .write()
            .await
            .insert(bookmark.id.clone(), bookmark.clone());
        bookmark
    }

    pub async fn find_bookmark(&self, bookmark_id: &str) -> Option<Bookmark> {
        self.bookmarks.read().await.get(bookmark_id).cloned()
    }

    /// Removes a bookmark and its theme assignments, returning it if it
    /// existed.
    pub async fn delete_bookmark(&self, bookmark_id: &str) -> Option<Bookmark> {
        let mut bookmarks = self.bookmarks.write().await;
        let removed = bookmarks.remove(bookmark_id)?;
        self.bookmark_themes.write().await.remove(bookmark_id);
        Some(removed)
    }

    /// Bookmarks in `group_id` matching `filter`, highest priority first,
    /// newest first within a priority.
    pub async fn find_by_group(&self, group_id: &str, filter: &BookmarkFilter) -> Vec<Bookmark> {
        let bookmarks = self.bookmarks.read().await;
        let mut found: Vec<Bookmark> = bookmarks
            .values()
            .filter(|b| b.group_id == group_id && filter.matches(b))
            .cloned()
            .collect();

        found.sort_by_key(|b| (Reverse(b.priority), Reverse(b.created_at), b.id.clone()));
        found
    }

    /// Counts over every bookmark in `group_id`.
    pub async fn stats(&self, group_id: &str) -> BookmarkStats {
        let bookmarks = self.bookmarks.read().await;
        let in_group: Vec<&Bookmark> = bookmarks
            .values()
            .filter(|b| b.group_id == group_id)
            .collect();

        let total_count = in_group.len();
        let visited_count = in_group.iter().filter(|b| b.visited).count();
        let avg_priority = if total_count == 0 {
            0.0
        } else {
            let sum: u32 = in_group.iter().map(|b| u32::from(b.priority)).sum();
            (sum as f64 / total_count as f64 * 10.0).round() / 10.0
        };

        BookmarkStats {
            total_count,
            visited_count,
            unvisited_count: total_count - visited_count,
            avg_priority,
        }
    }

    /// Pairs each bookmark with its themes, oldest theme first.
    pub async fn attach_themes(&self, bookmarks: Vec<Bookmark>) -> Vec<ThemedBookmark> {
        let themes = self.themes.read().await;
        let links = self.bookmark_themes.read().await;

        bookmarks
            .into_iter()
            .map(|bookmark| ThemedBookmark {
                themes: assigned_themes(&themes, &links, &bookmark.id),
                bookmark,
            })
            .collect()
    }

    // == Themes ==

    /// Inserts or replaces a theme.
    pub async fn save_theme(&self, theme: Theme) -> Theme {
        self.themes
            .write()
            .await
            .insert(theme.id.clone(), theme.clone());
        theme
    }

    pub async fn find_theme(&self, theme_id: &str) -> Option<ThemeWithCount> {
        let themes = self.themes.read().await;
        let links = self.bookmark_themes.read().await;

        themes.get(theme_id).map(|theme| ThemeWithCount {
            theme: theme.clone(),
            bookmark_count: link_count(&links, theme_id),
        })
    }

    /// Themes of `group_id`, oldest first.
    pub async fn find_themes_by_group(&self, group_id: &str) -> Vec<ThemeWithCount> {
        let themes = self.themes.read().await;
        let links = self.bookmark_themes.read().await;

        let mut found: Vec<ThemeWithCount> = themes
            .values()
            .filter(|t| t.group_id == group_id)
            .map(|theme| ThemeWithCount {
                theme: theme.clone(),
                bookmark_count: link_count(&links, &theme.id),
            })
            .collect();

        found.sort_by(|a, b| {
            a.theme
                .created_at
                .cmp(&b.theme.created_at)
                .then_with(|| a.theme.id.cmp(&b.theme.id))
        });
        found
    }

    /// Removes a theme and unassigns it from every bookmark.
    pub async fn delete_theme(&self, theme_id: &str) -> Option<Theme> {
        let mut themes = self.themes.write().await;
        let removed = themes.remove(theme_id)?;

        let mut links = self.bookmark_themes.write().await;
        links.retain(|_, ids| {
            ids.remove(theme_id);
            !ids.is_empty()
        });
        Some(removed)
    }

    pub async fn find_themes_by_bookmark(&self, bookmark_id: &str) -> Vec<Theme> {
        let themes = self.themes.read().await;
        let links = self.bookmark_themes.read().await;
        assigned_themes(&themes, &links, bookmark_id)
    }

    /// Replaces the full set of themes assigned to a bookmark.
    ///
    /// Every theme must exist and belong to the bookmark's group; otherwise
    /// nothing changes. Returns the new assignment, oldest theme first.
    pub async fn replace_bookmark_themes(
        &self,
        bookmark_id: &str,
        theme_ids: &BTreeSet<String>,
    ) -> Result<Vec<Theme>> {
        let bookmarks = self.bookmarks.read().await;
        let bookmark = bookmarks
            .get(bookmark_id)
            .ok_or_else(|| AppError::NotFound(format!("Bookmark {}", bookmark_id)))?;

        let themes = self.themes.read().await;
        for theme_id in theme_ids {
            match themes.get(theme_id) {
                Some(theme) if theme.group_id == bookmark.group_id => {}
                Some(_) => {
                    return Err(AppError::validation(
                        "theme_ids",
                        format!("Theme {} belongs to another group", theme_id),
                    ))
                }
                None => {
                    return Err(AppError::validation(
                        "theme_ids",
                        format!("Unknown theme: {}", theme_id),
                    ))
                }
            }
        }

        let mut links = self.bookmark_themes.write().await;
        if theme_ids.is_empty() {
            links.remove(bookmark_id);
        } else {
            links.insert(bookmark_id.to_string(), theme_ids.clone());
        }
        Ok(assigned_themes(&themes, &links, bookmark_id))
    }

    /// Bookmarks assigned to `theme_id`, newest first.
    pub async fn find_bookmarks_by_theme(&self, theme_id: &str) -> Vec<ThemedBookmark> {
        let bookmarks = self.bookmarks.read().await;
        let themes = self.themes.read().await;
        let links = self.bookmark_themes.read().await;

        let mut found: Vec<ThemedBookmark> = links
            .iter()
            .filter(|(_, ids)| ids.contains(theme_id))
            .filter_map(|(bookmark_id, _)| bookmarks.get(bookmark_id))
            .map(|bookmark| ThemedBookmark {
                bookmark: bookmark.clone(),
                themes: assigned_themes(&themes, &links, &bookmark.id),
            })
            .collect();

        found.sort_by_key(|t| (Reverse(t.bookmark.created_at), t.bookmark.id.clone()));
        found
    }
}
