//! Authentication middleware for JWT token validation

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use common::{Role, jwt::JwtError};
use tracing::warn;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

/// Authenticated user information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Validate the bearer token and attach the caller to the request
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(TypedHeader(Authorization(bearer))) = bearer else {
        return Err(ApiError::Unauthorized(
            "Not authorized, no token".to_string(),
        ));
    };

    let claims = state
        .jwt_service
        .validate_token(bearer.token())
        .map_err(|e| {
            match &e {
                JwtError::Expired => warn!("Rejected expired token"),
                other => warn!("Rejected token: {}", other),
            }
            ApiError::Unauthorized("Not authorized, token failed".to_string())
        })?;

    req.extensions_mut().insert(AuthUser {
        id: claims.sub,
        role: claims.role,
    });

    Ok(next.run(req).await)
}

/// Refuse callers whose role does not satisfy `required`.
///
/// Must run inside [`auth_middleware`].
pub async fn require_role(required: Role, req: Request, next: Next) -> Result<Response, ApiError> {
    let user = req
        .extensions()
        .get::<AuthUser>()
        .copied()
        .ok_or_else(|| ApiError::Unauthorized("Not authorized, no token".to_string()))?;

    if !user.role.satisfies(required) {
        return Err(ApiError::Forbidden(format!(
            "Not authorized as an {}",
            required
        )));
    }

    Ok(next.run(req).await)
}
