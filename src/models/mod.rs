//! Request and Response models for the placebook API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{
    BookmarkQuery, BookmarkRequest, GroupRequest, ThemeAssignmentRequest, ThemeRequest,
    VisitedRequest,
};
pub use responses::{
    AvailabilityResponse, CacheStatsBody, DeleteResponse, HealthResponse, StatsResponse,
    ThemeBookmarksResponse,
};
