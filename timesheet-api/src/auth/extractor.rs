use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{
    app_state::AppState,
    domain::{models::UserId, ActorContext, Role, TimesheetError},
    routes::ApiError,
};

/// The caller behind a valid bearer token.
///
/// The token only has to be authentic and unexpired; the role and the active
/// flag are re-read from the directory so a deactivated user is locked out
/// before the token expires. Returns 401 otherwise; a failing directory
/// lookup surfaces as its own error.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: UserId,
    pub role: Role,
}

impl AuthUser {
    pub fn actor(&self) -> ActorContext {
        ActorContext::new(self.id, self.role)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::unauthorized("Not authenticated"))?;

        let app_state = AppState::from_ref(state);
        let claims = app_state.tokens.verify(bearer.token())?;
        let actor = claims.actor();

        let user = app_state
            .directory
            .get_user(&actor, actor.user_id)
            .await
            .map_err(|err| match err {
                TimesheetError::NotFound { .. } => ApiError::unauthorized("Not authenticated"),
                other => other.into(),
            })?;
        if !user.is_active {
            return Err(ApiError::unauthorized("Account is deactivated"));
        }

        Ok(AuthUser {
            id: user.id,
            role: user.role,
        })
    }
}
