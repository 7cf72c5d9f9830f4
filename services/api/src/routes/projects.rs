//! `/projects` handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    AppState, analytics,
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    models::project::{
        CreateProjectRequest, ProjectDetail, ProjectResponse, SalesOverviewResponse,
        UpdateSalesRequest,
    },
};

fn project_not_found() -> ApiError {
    ApiError::NotFound("Project not found".to_string())
}

/// Resolve raw member ids to existing users, or name the ones that do not
/// resolve
async fn resolve_developers(state: &AppState, raw_ids: &[String]) -> ApiResult<Vec<Uuid>> {
    let parsed: Vec<(&str, Option<Uuid>)> = raw_ids
        .iter()
        .map(|raw| (raw.as_str(), Uuid::parse_str(raw).ok()))
        .collect();
    let candidates: Vec<Uuid> = parsed.iter().filter_map(|(_, id)| *id).collect();

    let existing = if candidates.is_empty() {
        Vec::new()
    } else {
        state.user_repository.existing_ids(&candidates).await?
    };

    let mut resolved = Vec::with_capacity(candidates.len());
    let mut unknown = Vec::new();
    for (raw, id) in parsed {
        match id {
            Some(id) if existing.contains(&id) => resolved.push(id),
            _ => unknown.push(raw),
        }
    }

    if !unknown.is_empty() {
        return Err(ApiError::BadRequest(format!(
            "Invalid developer IDs: {}",
            unknown.join(", ")
        )));
    }

    Ok(resolved)
}

pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateProjectRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let new_project = payload.validate().map_err(ApiError::BadRequest)?;
    let developers = resolve_developers(&state, &new_project.selected_developers).await?;

    let project = state
        .project_repository
        .create(&new_project, &developers, auth.id)
        .await?;

    Ok((StatusCode::CREATED, Json(project)))
}

/// A project with its members expanded; needs no token
pub async fn get_project(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let project = state
        .project_repository
        .find_by_id(id)
        .await?
        .ok_or_else(project_not_found)?;
    let developers = state.project_repository.developers(id).await?;

    Ok(Json(ProjectResponse {
        project: ProjectDetail::new(project, developers),
    }))
}

/// Delete a project; creator only
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let project = state
        .project_repository
        .find_by_id(id)
        .await?
        .ok_or_else(project_not_found)?;

    if project.created_by != Some(auth.id) {
        warn!("User {} tried to delete project {} they did not create", auth.id, id);
        return Err(ApiError::Forbidden(
            "Not authorized to delete this project".to_string(),
        ));
    }

    if !state.project_repository.delete(id).await? {
        return Err(project_not_found());
    }

    info!("Deleted project {}", id);
    Ok(Json(json!({ "message": "Project deleted successfully" })))
}

/// Overwrite the sales count; creator or admin
pub async fn update_sales(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateSalesRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let sales = payload.validate().map_err(ApiError::BadRequest)?;

    let project = state
        .project_repository
        .find_by_id(id)
        .await?
        .ok_or_else(project_not_found)?;

    if project.created_by != Some(auth.id) && !auth.is_admin() {
        return Err(ApiError::Forbidden(
            "Not authorized to update this project".to_string(),
        ));
    }

    let project = state
        .project_repository
        .update_sales(id, sales)
        .await?
        .ok_or_else(project_not_found)?;

    Ok(Json(project))
}

/// Revenue, mean price and units sold across all projects
pub async fn sales_overview(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let figures = state.project_repository.all_figures().await?;

    Ok(Json(SalesOverviewResponse {
        sales_data: vec![analytics::sales_overview(&figures)],
    }))
}
