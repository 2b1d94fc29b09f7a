//! Error types for the placebook server
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == App Error Enum ==
/// Unified error type for the placebook server.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    /// Group, bookmark or theme does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A field failed domain validation
    #[error("{message}")]
    Validation { field: &'static str, message: String },

    /// Identifier collision that could not be resolved
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl AppError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field,
            message: message.into(),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Conflict(_) => StatusCode::CONFLICT,
        };

        let body = match &self {
            AppError::Validation { field, message } => Json(json!({
                "error": message,
                "field": field,
            })),
            other => Json(json!({
                "error": other.to_string()
            })),
        };

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the placebook server.
pub type Result<T> = std::result::Result<T, AppError>;
