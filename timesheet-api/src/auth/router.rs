use axum::{extract::State, routing::post, Json, Router};
use tracing::instrument;

use crate::{
    adapters::inbound::http::{LoginPayload, LoginResponse},
    app_state::AppState,
    domain::{ActorContext, TimesheetError},
    routes::ApiError,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

/// Exchange email and password for a bearer token.
///
/// Unknown email, wrong password and deactivated account all answer 401
/// with the same message.
#[instrument(name = "login", skip(app_state, payload), fields(email = %payload.email))]
async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = app_state
        .directory
        .find_by_email(&payload.email)
        .await?
        .filter(|user| user.is_active);

    let verified = match &user {
        Some(user) => app_state
            .passwords
            .verify(&payload.password, &user.password_hash)
            .await
            .unwrap_or_else(|err| {
                tracing::warn!(user_id = %user.id, error = %err, "stored password hash is unusable");
                false
            }),
        None => app_state.passwords.verify_missing(&payload.password).await,
    };
    let Some(user) = user.filter(|_| verified) else {
        return Err(TimesheetError::AuthenticationFailed.into());
    };

    let issued = app_state
        .tokens
        .issue(&ActorContext::new(user.id, user.role))?;
    tracing::info!(user_id = %user.id, "issued access token");

    Ok(Json(LoginResponse {
        token: issued.token,
        expires_at: issued.expires_at,
        user: user.into(),
    }))
}
