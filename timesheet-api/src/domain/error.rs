use thiserror::Error;

/// Errors that can occur during timesheet operations.
///
/// Every variant is recoverable at the caller boundary; the HTTP layer maps
/// them onto status codes in `routes::error`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimesheetError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("not authorized: {0}")]
    Authorization(String),
    #[error("authentication failed")]
    AuthenticationFailed,
    #[error("storage error: {0}")]
    Storage(String),
    /// Failures outside storage, such as hashing or token signing.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TimesheetError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Authorization(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Prefix the message with the position of a batch entry, keeping the kind.
    pub fn for_entry(self, index: usize) -> Self {
        match self {
            Self::Validation(msg) => Self::Validation(format!("entry {index}: {msg}")),
            Self::Conflict(msg) => Self::Conflict(format!("entry {index}: {msg}")),
            Self::InvalidState(msg) => Self::InvalidState(format!("entry {index}: {msg}")),
            Self::Authorization(msg) => Self::Authorization(format!("entry {index}: {msg}")),
            other => other,
        }
    }
}

pub type TimesheetResult<T> = Result<T, TimesheetError>;
