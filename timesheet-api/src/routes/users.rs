use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, put},
    Json, Router,
};
use tracing::instrument;

use crate::{
    adapters::inbound::http::{CreateUserPayload, SetActivePayload, UserResponse},
    app_state::AppState,
    auth::AuthUser,
    domain::{models::UserId, NewUser},
    routes::ApiError,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/me", get(me))
        .route("/:id/active", put(set_active))
        .route("/:id", delete(delete_user))
}

#[instrument(name = "me", skip(app_state))]
async fn me(
    user: AuthUser,
    State(app_state): State<AppState>,
) -> Result<Json<UserResponse>, ApiError> {
    let me = app_state.directory.get_user(&user.actor(), user.id).await?;

    Ok(Json(me.into()))
}

#[instrument(name = "list_users", skip(app_state))]
async fn list_users(
    user: AuthUser,
    State(app_state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = app_state.directory.list_users(&user.actor()).await?;

    Ok(Json(users.into_iter().map(Into::into).collect()))
}

#[instrument(name = "create_user", skip(app_state))]
async fn create_user(
    user: AuthUser,
    State(app_state): State<AppState>,
    Json(payload): Json<CreateUserPayload>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let password_hash = app_state.passwords.hash(&payload.password).await?;
    let created = app_state
        .directory
        .create_user(
            &user.actor(),
            &NewUser {
                email: payload.email,
                full_name: payload.full_name,
                role: payload.role,
                password_hash,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

#[instrument(name = "set_user_active", skip(app_state))]
async fn set_active(
    user: AuthUser,
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<SetActivePayload>,
) -> Result<Json<UserResponse>, ApiError> {
    let updated = app_state
        .directory
        .set_user_active(&user.actor(), UserId::new(id), payload.active)
        .await?;

    Ok(Json(updated.into()))
}

#[instrument(name = "delete_user", skip(app_state))]
async fn delete_user(
    user: AuthUser,
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    app_state
        .directory
        .delete_user(&user.actor(), UserId::new(id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
