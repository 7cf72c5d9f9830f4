//! Custom error types for the API service

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::{error::DatabaseError, password::PasswordError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

const CREATED_BY_FKEY: &str = "projects_created_by_fkey";
const MEMBER_FKEY: &str = "project_developers_user_id_fkey";

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or invalid bearer token
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but not allowed to do this
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request with message
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error; the detail is logged, never returned
    #[error("Internal server error: {0}")]
    InternalServerError(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Database(DatabaseError::UniqueViolation { constraint })
                if constraint.contains("user_name") =>
            {
                (
                    StatusCode::BAD_REQUEST,
                    "UserName already taken.".to_string(),
                )
            }
            ApiError::Database(DatabaseError::UniqueViolation { constraint })
                if constraint.contains("email") =>
            {
                (StatusCode::BAD_REQUEST, "User already exists".to_string())
            }
            // The token outlived its user
            ApiError::Database(DatabaseError::ForeignKeyViolation { constraint })
                if constraint == CREATED_BY_FKEY =>
            {
                (
                    StatusCode::UNAUTHORIZED,
                    "Not authorized, token failed".to_string(),
                )
            }
            // A member was deleted after the ids were resolved
            ApiError::Database(DatabaseError::ForeignKeyViolation { constraint })
                if constraint == MEMBER_FKEY =>
            {
                (
                    StatusCode::BAD_REQUEST,
                    "Invalid developer IDs".to_string(),
                )
            }
            ApiError::Database(e) => {
                error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
            }
            ApiError::InternalServerError(detail) => {
                error!("Internal error: {}", detail);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalServerError(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
