//! Place Model Module
//!
//! Groups, bookmarks, themes and the validation rules applied when they
//! change.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::geo::HasCoordinates;

pub const GROUP_ID_LEN: usize = 8;
pub const MAX_GROUP_NAME_LEN: usize = 100;
pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_THEME_NAME_LEN: usize = 50;
pub const MAX_THEME_ICON_LEN: usize = 10;
pub const DEFAULT_PRIORITY: u8 = 3;
pub const MIN_PRIORITY: u8 = 1;
pub const MAX_PRIORITY: u8 = 5;

const GROUP_ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

// == Category ==
/// What kind of place a bookmark points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Restaurant,
    Sightseeing,
    Shopping,
    Activity,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Restaurant,
        Category::Sightseeing,
        Category::Shopping,
        Category::Activity,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Restaurant => "restaurant",
            Category::Sightseeing => "sightseeing",
            Category::Shopping => "shopping",
            Category::Activity => "activity",
            Category::Other => "other",
        }
    }

    /// Emoji drawn on the map marker.
    pub fn pin_emoji(&self) -> &'static str {
        match self {
            Category::Restaurant => "🍽️",
            Category::Sightseeing => "🏛️",
            Category::Shopping => "🛍️",
            Category::Activity => "🎯",
            Category::Other => "📍",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::InvalidRequest(format!("Unknown category: {}", s)))
    }
}

// == Validation ==
/// Accepts exactly eight characters from `[0-9a-z]`.
pub fn validate_group_id(group_id: &str) -> Result<&str> {
    let well_formed = group_id.len() == GROUP_ID_LEN
        && group_id
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase());

    if well_formed {
        Ok(group_id)
    } else {
        Err(AppError::InvalidRequest(format!(
            "Invalid group id: {}",
            group_id
        )))
    }
}

/// Random group id, each character drawn uniformly from `[0-9a-z]`.
pub fn generate_group_id() -> String {
    let mut rng = rand::thread_rng();
    (0..GROUP_ID_LEN)
        .map(|_| char::from(GROUP_ID_ALPHABET[rng.gen_range(0..GROUP_ID_ALPHABET.len())]))
        .collect()
}

pub fn generate_bookmark_id() -> String {
    format!("bm{}", Uuid::new_v4().simple())
}

pub fn generate_theme_id() -> String {
    format!("th{}", Uuid::new_v4().simple())
}

pub fn validate_group_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("name", "Group name is required"));
    }
    if trimmed.chars().count() > MAX_GROUP_NAME_LEN {
        return Err(AppError::validation(
            "name",
            format!("Group name too long (max {} characters)", MAX_GROUP_NAME_LEN),
        ));
    }
    Ok(trimmed.to_string())
}

pub fn validate_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("title", "Bookmark title is required"));
    }
    if trimmed.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::validation(
            "title",
            format!("Bookmark title too long (max {} characters)", MAX_TITLE_LEN),
        ));
    }
    Ok(trimmed.to_string())
}

pub fn validate_url(url: &str) -> Result<String> {
    Url::parse(url.trim())
        .map(|_| url.trim().to_string())
        .map_err(|_| AppError::validation("url", format!("Invalid URL format: {}", url)))
}

pub fn validate_priority(priority: i64) -> Result<u8> {
    if (MIN_PRIORITY as i64..=MAX_PRIORITY as i64).contains(&priority) {
        Ok(priority as u8)
    } else {
        Err(AppError::validation(
            "priority",
            format!(
                "Priority must be an integer between {} and {}, got: {}",
                MIN_PRIORITY, MAX_PRIORITY, priority
            ),
        ))
    }
}

pub fn validate_theme_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("name", "Theme name is required"));
    }
    if trimmed.chars().count() > MAX_THEME_NAME_LEN {
        return Err(AppError::validation(
            "name",
            format!(
                "Theme name must be {} characters or less",
                MAX_THEME_NAME_LEN
            ),
        ));
    }
    Ok(trimmed.to_string())
}

/// Trims the icon; blank becomes `None`.
pub fn validate_theme_icon(icon: Option<&str>) -> Result<Option<String>> {
    let icon = normalize_text(icon);
    if let Some(icon) = &icon {
        if icon.chars().count() > MAX_THEME_ICON_LEN {
            return Err(AppError::validation(
                "icon",
                format!(
                    "Theme icon must be {} characters or less",
                    MAX_THEME_ICON_LEN
                ),
            ));
        }
    }
    Ok(icon)
}

/// Trims free text; blank becomes `None`.
pub fn normalize_text(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Both or neither, and within the valid degree ranges.
pub fn validate_coordinates(
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<(Option<f64>, Option<f64>)> {
    match (latitude, longitude) {
        (None, None) => Ok((None, None)),
        (Some(lat), Some(lng)) => {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(AppError::validation(
                    "latitude",
                    format!("Latitude out of range: {}", lat),
                ));
            }
            if !(-180.0..=180.0).contains(&lng) {
                return Err(AppError::validation(
                    "longitude",
                    format!("Longitude out of range: {}", lng),
                ));
            }
            Ok((Some(lat), Some(lng)))
        }
        (Some(_), None) => Err(AppError::validation(
            "longitude",
            "Longitude is required when latitude is given",
        )),
        (None, Some(_)) => Err(AppError::validation(
            "latitude",
            "Latitude is required when longitude is given",
        )),
    }
}

// == Group ==
/// A set of people sharing one bookmark list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Group {
    pub fn new(id: &str, name: &str, description: Option<&str>) -> Result<Self> {
        let now = Utc::now();
        Ok(Self {
            id: validate_group_id(id)?.to_string(),
            name: validate_group_name(name)?,
            description: normalize_text(description),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update_info(&mut self, name: &str, description: Option<&str>) -> Result<()> {
        self.name = validate_group_name(name)?;
        self.description = normalize_text(description);
        self.updated_at = Utc::now();
        Ok(())
    }
}

// == Theme ==
/// A named collection inside a group, e.g. "Day 1" or "Rainy day".
///
/// Bookmarks are assigned to any number of themes of their own group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Theme {
    pub id: String,
    pub group_id: String,
    pub name: String,
    pub icon: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Theme {
    pub fn new(group_id: &str, name: &str, icon: Option<&str>) -> Result<Self> {
        let now = Utc::now();
        Ok(Self {
            id: generate_theme_id(),
            group_id: validate_group_id(group_id)?.to_string(),
            name: validate_theme_name(name)?,
            icon: validate_theme_icon(icon)?,
            created_at: now,
            updated_at: now,
        })
    }

    /// Nothing changes unless both fields validate.
    pub fn update_info(&mut self, name: &str, icon: Option<&str>) -> Result<()> {
        let name = validate_theme_name(name)?;
        let icon = validate_theme_icon(icon)?;

        self.name = name;
        self.icon = icon;
        self.updated_at = Utc::now();
        Ok(())
    }
}

// == Bookmark Draft ==
/// Unvalidated bookmark fields as submitted by a user.
#[derive(Debug, Clone, PartialEq)]
pub struct BookmarkDraft {
    pub title: String,
    pub url: String,
    pub category: Category,
    pub memo: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub priority: Option<i64>,
}

// == Bookmark ==
/// A place someone in the group wants to visit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bookmark {
    pub id: String,
    pub group_id: String,
    pub title: String,
    pub url: String,
    pub category: Category,
    pub memo: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub priority: u8,
    pub visited: bool,
    pub visited_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Bookmark {
    /// Validates `draft` and creates an unvisited bookmark in `group_id`.
    pub fn create(group_id: &str, draft: BookmarkDraft) -> Result<Self> {
        let (latitude, longitude) = validate_coordinates(draft.latitude, draft.longitude)?;
        let priority = validate_priority(draft.priority.unwrap_or(DEFAULT_PRIORITY as i64))?;
        let now = Utc::now();

        Ok(Self {
            id: generate_bookmark_id(),
            group_id: validate_group_id(group_id)?.to_string(),
            title: validate_title(&draft.title)?,
            url: validate_url(&draft.url)?,
            category: draft.category,
            memo: normalize_text(draft.memo.as_deref()),
            address: normalize_text(draft.address.as_deref()),
            latitude,
            longitude,
            priority,
            visited: false,
            visited_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replaces the editable fields. A missing priority keeps the current one.
    ///
    /// Nothing changes unless every field validates.
    pub fn apply(&mut self, draft: BookmarkDraft) -> Result<()> {
        let title = validate_title(&draft.title)?;
        let url = validate_url(&draft.url)?;
        let (latitude, longitude) = validate_coordinates(draft.latitude, draft.longitude)?;
        let priority = match draft.priority {
            Some(p) => validate_priority(p)?,
            None => self.priority,
        };

        self.title = title;
        self.url = url;
        self.category = draft.category;
        self.memo = normalize_text(draft.memo.as_deref());
        self.address = normalize_text(draft.address.as_deref());
        self.latitude = latitude;
        self.longitude = longitude;
        self.priority = priority;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn mark_visited(&mut self) {
        let now = Utc::now();
        self.visited = true;
        self.visited_at = Some(now);
        self.updated_at = now;
    }

    pub fn mark_unvisited(&mut self) {
        self.visited = false;
        self.visited_at = None;
        self.updated_at = Utc::now();
    }

    /// Case-insensitive substring match on title, memo and address.
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        std::iter::once(Some(self.title.as_str()))
            .chain([self.memo.as_deref(), self.address.as_deref()])
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

impl HasCoordinates for Bookmark {
    fn latitude(&self) -> Option<f64> {
        self.latitude
    }

    fn longitude(&self) -> Option<f64> {
        self.longitude
    }
}
