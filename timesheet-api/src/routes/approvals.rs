use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    adapters::inbound::http::{ApprovePayload, RejectPayload, TimesheetResponse},
    app_state::AppState,
    auth::AuthUser,
    domain::models::TimesheetId,
    routes::ApiError,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pending", get(pending))
        .route("/:id/approve", post(approve))
        .route("/:id/reject", post(reject))
}

#[instrument(name = "pending_approvals", skip(app_state))]
async fn pending(
    user: AuthUser,
    State(app_state): State<AppState>,
) -> Result<Json<Vec<TimesheetResponse>>, ApiError> {
    let timesheets = app_state.approvals.pending(&user.actor()).await?;

    Ok(Json(timesheets.into_iter().map(Into::into).collect()))
}

/// The body is optional; `{"comments": "..."}` leaves a note.
#[instrument(name = "approve_timesheet", skip(app_state))]
async fn approve(
    user: AuthUser,
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
    payload: Option<Json<ApprovePayload>>,
) -> Result<Json<TimesheetResponse>, ApiError> {
    let Json(payload) = payload.unwrap_or_default();
    let timesheet = app_state
        .approvals
        .approve(&user.actor(), TimesheetId::new(id), payload.comments)
        .await?;

    Ok(Json(timesheet.into()))
}

#[instrument(name = "reject_timesheet", skip(app_state))]
async fn reject(
    user: AuthUser,
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<RejectPayload>,
) -> Result<Json<TimesheetResponse>, ApiError> {
    let timesheet = app_state
        .approvals
        .reject(&user.actor(), TimesheetId::new(id), &payload.comments)
        .await?;

    Ok(Json(timesheet.into()))
}
