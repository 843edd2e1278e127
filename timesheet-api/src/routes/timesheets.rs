use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    adapters::inbound::http::{
        ListTimesheetsQuery, SubmitWeekPayload, TimesheetPayload, TimesheetResponse,
    },
    app_state::AppState,
    auth::AuthUser,
    domain::models::TimesheetId,
    routes::ApiError,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_timesheets).post(create_timesheet))
        .route("/week", post(submit_week))
        .route(
            "/:id",
            get(get_timesheet)
                .put(update_timesheet)
                .delete(delete_timesheet),
        )
        .route("/:id/submit", post(submit_timesheet))
}

/// Timesheets of the caller, or of `employeeId` for managers.
#[instrument(name = "list_timesheets", skip(app_state))]
async fn list_timesheets(
    user: AuthUser,
    State(app_state): State<AppState>,
    Query(query): Query<ListTimesheetsQuery>,
) -> Result<Json<Vec<TimesheetResponse>>, ApiError> {
    let employee_id = query.employee_id.unwrap_or(user.id);
    let timesheets = app_state
        .timesheets
        .list_timesheets(&user.actor(), employee_id, query.from, query.to)
        .await?;

    Ok(Json(timesheets.into_iter().map(Into::into).collect()))
}

#[instrument(name = "create_timesheet", skip(app_state))]
async fn create_timesheet(
    user: AuthUser,
    State(app_state): State<AppState>,
    Json(payload): Json<TimesheetPayload>,
) -> Result<(StatusCode, Json<TimesheetResponse>), ApiError> {
    let entry = payload.into_entry()?;
    let timesheet = app_state
        .timesheets
        .create_timesheet(&user.actor(), user.id, &entry)
        .await?;

    Ok((StatusCode::CREATED, Json(timesheet.into())))
}

#[instrument(name = "get_timesheet", skip(app_state))]
async fn get_timesheet(
    user: AuthUser,
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<TimesheetResponse>, ApiError> {
    let timesheet = app_state
        .timesheets
        .get_timesheet(&user.actor(), TimesheetId::new(id))
        .await?;

    Ok(Json(timesheet.into()))
}

#[instrument(name = "update_timesheet", skip(app_state))]
async fn update_timesheet(
    user: AuthUser,
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<TimesheetPayload>,
) -> Result<Json<TimesheetResponse>, ApiError> {
    let entry = payload.into_entry()?;
    let timesheet = app_state
        .timesheets
        .update_timesheet(&user.actor(), TimesheetId::new(id), &entry)
        .await?;

    Ok(Json(timesheet.into()))
}

#[instrument(name = "delete_timesheet", skip(app_state))]
async fn delete_timesheet(
    user: AuthUser,
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    app_state
        .timesheets
        .delete_timesheet(&user.actor(), TimesheetId::new(id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[instrument(name = "submit_timesheet", skip(app_state))]
async fn submit_timesheet(
    user: AuthUser,
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<TimesheetResponse>, ApiError> {
    let timesheet = app_state
        .timesheets
        .submit_timesheet(&user.actor(), TimesheetId::new(id))
        .await?;

    Ok(Json(timesheet.into()))
}

/// Create and submit several entries at once; nothing is stored if one fails.
#[instrument(name = "submit_week", skip(app_state, payload), fields(entries = payload.entries.len()))]
async fn submit_week(
    user: AuthUser,
    State(app_state): State<AppState>,
    Json(payload): Json<SubmitWeekPayload>,
) -> Result<(StatusCode, Json<Vec<TimesheetResponse>>), ApiError> {
    let entries = payload.into_entries()?;
    let timesheets = app_state
        .timesheets
        .submit_week(&user.actor(), user.id, &entries)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(timesheets.into_iter().map(Into::into).collect()),
    ))
}
