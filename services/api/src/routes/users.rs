//! `/users` handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use common::{PublicUser, User, password, validation};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{
    AppState, analytics,
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    models::{
        DeveloperListResponse, ProfileResponse, TotalEarningsResponse, TotalRevenueResponse,
        UpdatePasswordRequest, UpdateProfileRequest, UserProject, UserProjectsResponse,
    },
};

fn user_not_found() -> ApiError {
    ApiError::NotFound("User not found".to_string())
}

async fn profile_of(state: &AppState, user: User) -> ApiResult<ProfileResponse> {
    let projects = state
        .project_repository
        .project_ids_for_developer(user.id)
        .await?;

    Ok(ProfileResponse {
        user: PublicUser::from(user),
        projects,
    })
}

/// The caller's profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .user_repository
        .find_by_id(auth.id)
        .await?
        .ok_or_else(user_not_found)?;

    Ok(Json(profile_of(&state, user).await?))
}

/// Change name, phone or user name
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateProfileRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let changes = payload.validate().map_err(ApiError::BadRequest)?;

    let user = state
        .user_repository
        .update_profile(auth.id, &changes)
        .await?
        .ok_or_else(user_not_found)?;

    info!("Updated profile of user {}", user.id);
    Ok(Json(profile_of(&state, user).await?))
}

pub async fn update_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdatePasswordRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let (Some(current), Some(new)) = (payload.current_password, payload.new_password) else {
        return Err(ApiError::BadRequest(
            "Current and new password are required".to_string(),
        ));
    };

    let user = state
        .user_repository
        .find_by_id(auth.id)
        .await?
        .ok_or_else(user_not_found)?;

    if !state.user_repository.verify_password(&user, &current)? {
        return Err(ApiError::BadRequest(
            "Current password is incorrect".to_string(),
        ));
    }

    validation::validate_password(&new).map_err(ApiError::BadRequest)?;
    let password_hash = password::hash_password(&new)?;

    if !state
        .user_repository
        .update_password_hash(user.id, &password_hash)
        .await?
    {
        return Err(user_not_found());
    }

    info!("Password changed for user {}", user.id);
    Ok(Json(json!({ "message": "Password updated successfully" })))
}

/// Everyone who can be picked as a project member
pub async fn get_all_developers(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let users = state.user_repository.list_developers().await?;

    Ok(Json(DeveloperListResponse {
        count: users.len(),
        users,
    }))
}

/// All users, admin only
pub async fn get_all_users(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let users: Vec<PublicUser> = state
        .user_repository
        .get_all()
        .await?
        .into_iter()
        .map(PublicUser::from)
        .collect();

    Ok(Json(users))
}

/// Delete a user, admin only
pub async fn delete_user(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    if !state.user_repository.delete(id).await? {
        return Err(user_not_found());
    }

    Ok(Json(json!({ "message": "User deleted successfully" })))
}

/// The caller's projects with their share and earnings in each
pub async fn get_projects(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let projects: Vec<UserProject> = state
        .project_repository
        .find_for_developer(auth.id)
        .await?
        .into_iter()
        .map(|project| {
            let share = analytics::share_for(&project.developer_shares, auth.id);
            UserProject {
                id: project.id,
                user_earnings: analytics::earnings(project.price, project.sales, share),
                user_share: share,
                project_name: project.project_name,
                project_desc: project.project_desc,
                project_url: project.project_url,
                sales: project.sales,
                price: project.price,
                created_at: project.created_at,
            }
        })
        .collect();

    Ok(Json(UserProjectsResponse {
        count: projects.len(),
        projects,
    }))
}

pub async fn get_total_earnings(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let projects = state
        .project_repository
        .find_for_developer(auth.id)
        .await?;

    let total_earning = analytics::total_earnings(projects.iter().map(|project| {
        let share = analytics::share_for(&project.developer_shares, auth.id);
        analytics::earnings(project.price, project.sales, share)
    }));

    Ok(Json(TotalEarningsResponse { total_earning }))
}

/// Gross revenue of the projects a user belongs to; self or admin only
pub async fn get_total_sales(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    WithRejection(Path(user_id), _): WithRejection<Path<Uuid>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    if auth.id != user_id && !auth.is_admin() {
        return Err(ApiError::Forbidden(
            "Not authorized to view this user's sales".to_string(),
        ));
    }

    let figures = state
        .project_repository
        .figures_for_developer(user_id)
        .await?;

    Ok(Json(TotalRevenueResponse {
        total_revenue: analytics::total_revenue(&figures),
    }))
}

/// Per-month project count and revenue for the caller's projects
pub async fn get_projects_by_month(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let figures = state
        .project_repository
        .figures_for_developer(auth.id)
        .await?;

    Ok(Json(analytics::monthly_breakdown(&figures)))
}
