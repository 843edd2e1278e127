use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, put},
    Json, Router,
};
use tracing::instrument;

use crate::{
    adapters::inbound::http::{
        CreateProjectCodePayload, ProjectCodeResponse, SetProjectCodeStatusPayload,
    },
    app_state::AppState,
    auth::AuthUser,
    domain::models::{NewProjectCode, ProjectCodeId},
    routes::ApiError,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_project_codes).post(create_project_code))
        .route("/:id/status", put(set_status))
        .route("/:id", delete(delete_project_code))
}

#[instrument(name = "list_project_codes", skip(app_state))]
async fn list_project_codes(
    user: AuthUser,
    State(app_state): State<AppState>,
) -> Result<Json<Vec<ProjectCodeResponse>>, ApiError> {
    let codes = app_state.directory.list_project_codes(&user.actor()).await?;

    Ok(Json(codes.into_iter().map(Into::into).collect()))
}

#[instrument(name = "create_project_code", skip(app_state))]
async fn create_project_code(
    user: AuthUser,
    State(app_state): State<AppState>,
    Json(payload): Json<CreateProjectCodePayload>,
) -> Result<(StatusCode, Json<ProjectCodeResponse>), ApiError> {
    let code = app_state
        .directory
        .create_project_code(&user.actor(), &NewProjectCode::from(payload))
        .await?;

    Ok((StatusCode::CREATED, Json(code.into())))
}

#[instrument(name = "set_project_code_status", skip(app_state))]
async fn set_status(
    user: AuthUser,
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<SetProjectCodeStatusPayload>,
) -> Result<Json<ProjectCodeResponse>, ApiError> {
    let code = app_state
        .directory
        .set_project_code_status(&user.actor(), ProjectCodeId::new(id), payload.status)
        .await?;

    Ok(Json(code.into()))
}

#[instrument(name = "delete_project_code", skip(app_state))]
async fn delete_project_code(
    user: AuthUser,
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    app_state
        .directory
        .delete_project_code(&user.actor(), ProjectCodeId::new(id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
