use std::str::FromStr;

use sqlx::FromRow;
use time::{Date, OffsetDateTime};

use crate::domain::{
    models::{Hours, ProjectAssignment, ProjectCode, Timesheet},
    TimesheetError, User,
};

fn parse_enum<T: FromStr>(column: &str, value: &str) -> Result<T, TimesheetError> {
    T::from_str(value)
        .map_err(|_| TimesheetError::storage(format!("unexpected {column} value '{value}'")))
}

#[derive(Debug, FromRow)]
pub(super) struct UserRow {
    id: i32,
    email: String,
    full_name: String,
    role: String,
    is_active: bool,
    password_hash: String,
    created_at: OffsetDateTime,
}

impl TryFrom<UserRow> for User {
    type Error = TimesheetError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id.into(),
            email: row.email,
            full_name: row.full_name,
            role: parse_enum("role", &row.role)?,
            is_active: row.is_active,
            password_hash: row.password_hash,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(super) struct ProjectCodeRow {
    id: i32,
    code: String,
    name: String,
    is_billable: bool,
    status: String,
}

impl TryFrom<ProjectCodeRow> for ProjectCode {
    type Error = TimesheetError;

    fn try_from(row: ProjectCodeRow) -> Result<Self, Self::Error> {
        Ok(ProjectCode {
            id: row.id.into(),
            code: row.code,
            name: row.name,
            is_billable: row.is_billable,
            status: parse_enum("project code status", &row.status)?,
        })
    }
}

#[derive(Debug, FromRow)]
pub(super) struct AssignmentRow {
    id: i32,
    employee_id: i32,
    project_code_id: i32,
    start_date: Date,
    end_date: Option<Date>,
    assigned_by: i32,
}

impl From<AssignmentRow> for ProjectAssignment {
    fn from(row: AssignmentRow) -> Self {
        ProjectAssignment {
            id: row.id.into(),
            employee_id: row.employee_id.into(),
            project_code_id: row.project_code_id.into(),
            start_date: row.start_date,
            end_date: row.end_date,
            assigned_by: row.assigned_by.into(),
        }
    }
}

/// `hours_hundredths` is `hours_worked * 100` cast to an integer in SQL.
#[derive(Debug, FromRow)]
pub(super) struct TimesheetRow {
    id: i32,
    employee_id: i32,
    project_code_id: i32,
    work_date: Date,
    hours_hundredths: i32,
    description: String,
    status: String,
    manager_comments: Option<String>,
    reviewed_by: Option<i32>,
    reviewed_at: Option<OffsetDateTime>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl TryFrom<TimesheetRow> for Timesheet {
    type Error = TimesheetError;

    fn try_from(row: TimesheetRow) -> Result<Self, Self::Error> {
        Ok(Timesheet {
            id: row.id.into(),
            employee_id: row.employee_id.into(),
            project_code_id: row.project_code_id.into(),
            work_date: row.work_date,
            hours: Hours::from_hundredths(row.hours_hundredths),
            description: row.description,
            status: parse_enum("timesheet status", &row.status)?,
            manager_comments: row.manager_comments,
            reviewed_by: row.reviewed_by.map(Into::into),
            reviewed_at: row.reviewed_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Convert a batch of rows, failing on the first malformed one.
pub(super) fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, TimesheetError>
where
    T: TryFrom<R, Error = TimesheetError>,
{
    rows.into_iter().map(T::try_from).collect()
}
