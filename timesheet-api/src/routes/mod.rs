pub(crate) mod approvals;
pub(crate) mod assignments;
pub(crate) mod error;
pub(crate) mod project_codes;
pub(crate) mod timesheets;
pub(crate) mod users;

pub(crate) use error::ApiError;
