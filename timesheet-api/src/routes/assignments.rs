use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::instrument;

use crate::{
    adapters::inbound::http::{
        AssignmentCheckQuery, AssignmentCheckResponse, AssignmentResponse,
        CloseAssignmentPayload, CreateAssignmentPayload, ListAssignmentsQuery,
    },
    app_state::AppState,
    auth::AuthUser,
    domain::models::{AssignmentId, NewAssignment},
    routes::ApiError,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_assignments).post(create_assignment))
        .route("/check", get(check_assignment))
        .route("/:id/end", put(close_assignment))
}

#[instrument(name = "list_assignments", skip(app_state))]
async fn list_assignments(
    user: AuthUser,
    State(app_state): State<AppState>,
    Query(query): Query<ListAssignmentsQuery>,
) -> Result<Json<Vec<AssignmentResponse>>, ApiError> {
    let employee_id = query.employee_id.unwrap_or(user.id);
    let assignments = app_state
        .assignments
        .list_for_employee(&user.actor(), employee_id)
        .await?;

    Ok(Json(assignments.into_iter().map(Into::into).collect()))
}

#[instrument(name = "create_assignment", skip(app_state))]
async fn create_assignment(
    user: AuthUser,
    State(app_state): State<AppState>,
    Json(payload): Json<CreateAssignmentPayload>,
) -> Result<(StatusCode, Json<AssignmentResponse>), ApiError> {
    let assignment = app_state
        .assignments
        .assign(&user.actor(), &NewAssignment::from(payload))
        .await?;

    Ok((StatusCode::CREATED, Json(assignment.into())))
}

#[instrument(name = "close_assignment", skip(app_state))]
async fn close_assignment(
    user: AuthUser,
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<CloseAssignmentPayload>,
) -> Result<Json<AssignmentResponse>, ApiError> {
    let assignment = app_state
        .assignments
        .close(&user.actor(), AssignmentId::new(id), payload.end_date)
        .await?;

    Ok(Json(assignment.into()))
}

#[instrument(name = "check_assignment", skip(app_state))]
async fn check_assignment(
    user: AuthUser,
    State(app_state): State<AppState>,
    Query(query): Query<AssignmentCheckQuery>,
) -> Result<Json<AssignmentCheckResponse>, ApiError> {
    let employee_id = query.employee_id.unwrap_or(user.id);
    let assigned = app_state
        .assignments
        .is_assigned(&user.actor(), employee_id, query.project_code_id, query.date)
        .await?;

    Ok(Json(AssignmentCheckResponse { assigned }))
}
