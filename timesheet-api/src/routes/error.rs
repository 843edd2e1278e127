use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;

use crate::domain::TimesheetError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationFailed,
    Conflict,
    InvalidState,
    NotFound,
    Forbidden,
    Unauthenticated,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<ErrorCode>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    code: Option<ErrorCode>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message).with_code(ErrorCode::ValidationFailed)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message).with_code(ErrorCode::NotFound)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message).with_code(ErrorCode::Unauthenticated)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message).with_code(ErrorCode::Forbidden)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message).with_code(ErrorCode::Conflict)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            code: self.code,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<TimesheetError> for ApiError {
    fn from(err: TimesheetError) -> Self {
        match err {
            TimesheetError::Validation(_) => Self::bad_request(err.to_string()),
            TimesheetError::Conflict(_) => Self::conflict(err.to_string()),
            TimesheetError::InvalidState(_) => {
                Self::conflict(err.to_string()).with_code(ErrorCode::InvalidState)
            }
            TimesheetError::NotFound { .. } => Self::not_found(err.to_string()),
            TimesheetError::Authorization(_) => Self::forbidden(err.to_string()),
            TimesheetError::AuthenticationFailed => Self::unauthorized("authentication failed"),
            TimesheetError::Storage(message) => {
                tracing::error!("Storage error: {}", message);
                Self::internal("internal storage error")
            }
            TimesheetError::Internal(message) => {
                tracing::error!("Internal error: {}", message);
                Self::internal("internal error")
            }
        }
    }
}
