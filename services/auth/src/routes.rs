//! Authentication service routes

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::WithRejection;
use common::validation;
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::{
    AppState,
    error::{AuthError, AuthResult},
    models::{
        LoginRequest, LoginResponse, LoginUser, RegisterRequest, RegisterResponse,
        SendOtpRequest, VerifyOtpRequest,
    },
    otp::OtpError,
    rate_limiter::Attempt,
};

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/auth/send-otp", post(send_otp))
        .route("/auth/verify-otp", post(verify_otp))
        .route("/users/register", post(register))
        .route("/users/login", post(login))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "auth-service"
    }))
}

/// Issue a one-time passcode and mail it
pub async fn send_otp(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<SendOtpRequest>, AuthError>,
) -> AuthResult<impl IntoResponse> {
    let email = payload
        .email
        .as_deref()
        .map(validation::normalize_email)
        .filter(|email| !email.is_empty())
        .ok_or_else(|| AuthError::BadRequest("Email is required".to_string()))?;
    validation::validate_email(&email).map_err(AuthError::BadRequest)?;

    let attempt = state.rate_limiter.attempt(&format!("otp:{}", email)).await;
    if attempt != Attempt::Allowed {
        return Err(AuthError::TooManyRequests(format!(
            "Too many OTP requests, try again in {} minutes",
            attempt.retry_minutes()
        )));
    }

    state.otp_service.issue(&email).await.map_err(|e| match e {
        OtpError::Delivery(e) => AuthError::internal("Failed to send OTP", e),
        OtpError::Storage(e) => AuthError::internal("Failed to send OTP", e),
    })?;

    Ok(Json(json!({ "message": "OTP sent successfully" })))
}

/// Check a submitted passcode
pub async fn verify_otp(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<VerifyOtpRequest>, AuthError>,
) -> AuthResult<impl IntoResponse> {
    let (Some(email), Some(otp)) = (payload.email, payload.otp) else {
        return Err(AuthError::BadRequest(
            "Email and OTP are required".to_string(),
        ));
    };
    let email = validation::normalize_email(&email);
    if email.is_empty() || otp.trim().is_empty() {
        return Err(AuthError::BadRequest(
            "Email and OTP are required".to_string(),
        ));
    }

    let verified = state
        .otp_service
        .verify(&email, &otp)
        .await
        .map_err(|e| AuthError::internal("Failed to verify OTP", e))?;

    if verified {
        Ok(Json(json!({ "message": "OTP verified successfully" })))
    } else {
        Err(AuthError::BadRequest("Invalid or expired OTP".to_string()))
    }
}

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<RegisterRequest>, AuthError>,
) -> AuthResult<impl IntoResponse> {
    let new_user = payload
        .validate(state.settings.allow_role_selection)
        .map_err(AuthError::BadRequest)?;
    info!("Registration attempt for {}", new_user.email);

    if state.settings.require_email_verification {
        let verified = state
            .otp_service
            .is_verified(&new_user.email)
            .await
            .map_err(|e| AuthError::internal("Server error", e))?;
        if !verified {
            return Err(AuthError::BadRequest(
                "Email has not been verified".to_string(),
            ));
        }
    }

    if state.user_repository.email_exists(&new_user.email).await? {
        return Err(AuthError::BadRequest("User already exists".to_string()));
    }

    let user = state.user_repository.create(&new_user).await?;
    let token = state.jwt_service.generate_token(user.id, user.role)?;

    if state.settings.require_email_verification {
        if let Err(e) = state.otp_service.consume_verification(&user.email).await {
            warn!("Failed to clear verification marker for {}: {}", user.email, e);
        }
    }

    let response = RegisterResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        token,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<LoginRequest>, AuthError>,
) -> AuthResult<impl IntoResponse> {
    let email = payload
        .email
        .as_deref()
        .map(validation::normalize_email)
        .unwrap_or_default();
    let password = payload.password.unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        return Err(AuthError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    info!("Login attempt for user: {}", email);

    let limiter_key = format!("login:{}", email);
    let attempt = state.rate_limiter.attempt(&limiter_key).await;
    if attempt != Attempt::Allowed {
        return Err(AuthError::TooManyRequests(format!(
            "Too many login attempts, try again in {} minutes",
            attempt.retry_minutes()
        )));
    }

    let invalid = || AuthError::Unauthorized("Invalid email or password".to_string());

    let user = state
        .user_repository
        .find_by_email(&email)
        .await?
        .ok_or_else(invalid)?;

    if !state.user_repository.verify_password(&user, &password)? {
        return Err(invalid());
    }

    state.rate_limiter.reset(&limiter_key).await;

    let token = state.jwt_service.generate_token(user.id, user.role)?;

    let response = LoginResponse {
        token,
        user: LoginUser {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        },
    };

    Ok(Json(response))
}
