//! Error type for the authentication service

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::{error::DatabaseError, jwt::JwtError, password::PasswordError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::repositories::user::CreateUserError;

/// Custom error type for authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// Invalid input (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Bad credentials (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Too many attempts for one key (429)
    #[error("Too many requests: {0}")]
    TooManyRequests(String),

    /// Anything the caller cannot fix (500); the detail is only logged
    #[error("Internal error: {detail}")]
    Internal { message: String, detail: String },
}

impl AuthError {
    pub fn internal(message: &str, detail: impl ToString) -> Self {
        AuthError::Internal {
            message: message.to_string(),
            detail: detail.to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AuthError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AuthError::TooManyRequests(msg) => (StatusCode::TOO_MANY_REQUESTS, msg),
            AuthError::Internal { message, detail } => {
                error!("{}: {}", message, detail);
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

impl From<DatabaseError> for AuthError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::UniqueViolation { constraint } if constraint.contains("email") => {
                AuthError::BadRequest("User already exists".to_string())
            }
            DatabaseError::UniqueViolation { constraint } if constraint.contains("user_name") => {
                AuthError::BadRequest("UserName already taken.".to_string())
            }
            other => AuthError::internal("Server error", other),
        }
    }
}

impl From<CreateUserError> for AuthError {
    fn from(err: CreateUserError) -> Self {
        match err {
            CreateUserError::Password(e) => e.into(),
            CreateUserError::Database(e) => e.into(),
        }
    }
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        AuthError::internal("Server error", err)
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        AuthError::internal("Server error", err)
    }
}

impl From<JsonRejection> for AuthError {
    fn from(rejection: JsonRejection) -> Self {
        AuthError::BadRequest(rejection.body_text())
    }
}

pub type AuthResult<T> = Result<T, AuthError>;
