use sqlx::error::ErrorKind;

use crate::domain::TimesheetError;

/// Translate a driver error, keeping constraint violations distinguishable.
pub(super) fn db_error(err: sqlx::Error) -> TimesheetError {
    if let Some(db_err) = err.as_database_error() {
        match db_err.kind() {
            ErrorKind::UniqueViolation => {
                return TimesheetError::conflict(unique_message(db_err.constraint()));
            }
            ErrorKind::ForeignKeyViolation => {
                return TimesheetError::conflict(
                    "record is still referenced by other records or references a missing one",
                );
            }
            ErrorKind::CheckViolation => {
                return TimesheetError::validation(check_message(db_err.constraint()));
            }
            _ => {}
        }
    }

    tracing::error!(error = %err, "database error");
    TimesheetError::storage(err.to_string())
}

fn unique_message(constraint: Option<&str>) -> String {
    match constraint {
        Some("users_email_key") => "email is already in use".to_string(),
        Some("project_codes_code_key") => "project code already exists".to_string(),
        Some("timesheets_employee_project_date_key") => {
            "a timesheet already exists for this employee, project code and date".to_string()
        }
        Some(other) => format!("unique constraint {other} violated"),
        None => "unique constraint violated".to_string(),
    }
}

fn check_message(constraint: Option<&str>) -> String {
    match constraint {
        Some("timesheets_hours_range") => {
            "hours worked must be greater than 0 and at most 24".to_string()
        }
        Some("timesheets_rejected_has_comments") => {
            "rejected timesheets require manager comments".to_string()
        }
        Some("project_assignments_date_order") => {
            "assignment end date is before its start date".to_string()
        }
        Some(other) => format!("check constraint {other} violated"),
        None => "check constraint violated".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_constraints_have_readable_messages() {
        assert_eq!(
            check_message(Some("timesheets_rejected_has_comments")),
            "rejected timesheets require manager comments"
        );
        assert_eq!(
            unique_message(Some("users_email_key")),
            "email is already in use"
        );
        assert_eq!(unique_message(Some("x_key")), "unique constraint x_key violated");
    }

    #[test]
    fn non_database_errors_are_storage_errors() {
        let err = db_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, TimesheetError::Storage(_)));
    }
}
