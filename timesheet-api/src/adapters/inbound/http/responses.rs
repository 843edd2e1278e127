//! HTTP response types.
//!
//! Serialized as camelCase JSON. Dates are `YYYY-MM-DD`, timestamps RFC 3339.

use serde::Serialize;
use time::{Date, OffsetDateTime};

use crate::domain::{
    models::{
        AssignmentId, ProjectAssignment, ProjectCode, ProjectCodeId, ProjectCodeStatus,
        Timesheet, TimesheetId, TimesheetStatus, UserId,
    },
    Role, User,
};

/// A user without credentials.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCodeResponse {
    pub id: ProjectCodeId,
    pub code: String,
    pub name: String,
    pub is_billable: bool,
    pub status: ProjectCodeStatus,
}

impl From<ProjectCode> for ProjectCodeResponse {
    fn from(code: ProjectCode) -> Self {
        Self {
            id: code.id,
            code: code.code,
            name: code.name,
            is_billable: code.is_billable,
            status: code.status,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentResponse {
    pub id: AssignmentId,
    pub employee_id: UserId,
    pub project_code_id: ProjectCodeId,
    #[serde(with = "super::iso_date")]
    pub start_date: Date,
    #[serde(with = "super::iso_date::option")]
    pub end_date: Option<Date>,
    pub assigned_by: UserId,
}

impl From<ProjectAssignment> for AssignmentResponse {
    fn from(assignment: ProjectAssignment) -> Self {
        Self {
            id: assignment.id,
            employee_id: assignment.employee_id,
            project_code_id: assignment.project_code_id,
            start_date: assignment.start_date,
            end_date: assignment.end_date,
            assigned_by: assignment.assigned_by,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AssignmentCheckResponse {
    pub assigned: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetResponse {
    pub id: TimesheetId,
    pub employee_id: UserId,
    pub project_code_id: ProjectCodeId,
    #[serde(with = "super::iso_date")]
    pub work_date: Date,
    pub hours: f64,
    pub description: String,
    pub status: TimesheetStatus,
    pub manager_comments: Option<String>,
    pub reviewed_by: Option<UserId>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub reviewed_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Timesheet> for TimesheetResponse {
    fn from(timesheet: Timesheet) -> Self {
        Self {
            id: timesheet.id,
            employee_id: timesheet.employee_id,
            project_code_id: timesheet.project_code_id,
            work_date: timesheet.work_date,
            hours: timesheet.hours.as_f64(),
            description: timesheet.description,
            status: timesheet.status,
            manager_comments: timesheet.manager_comments,
            reviewed_by: timesheet.reviewed_by,
            reviewed_at: timesheet.reviewed_at,
            created_at: timesheet.created_at,
            updated_at: timesheet.updated_at,
        }
    }
}
