use std::fmt;

use serde::Deserialize;
use time::Date;

use crate::domain::{
    models::{
        Hours, NewAssignment, NewProjectCode, ProjectCodeId, ProjectCodeStatus, TimesheetEntry,
        UserId,
    },
    Role, TimesheetResult,
};

#[derive(Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginPayload")
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .finish()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserPayload {
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub password: String,
}

impl fmt::Debug for CreateUserPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateUserPayload")
            .field("email", &self.email)
            .field("full_name", &self.full_name)
            .field("role", &self.role)
            .field("password", &"[redacted]")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
pub struct SetActivePayload {
    pub active: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectCodePayload {
    pub code: String,
    pub name: String,
    pub is_billable: Option<bool>,
}

impl From<CreateProjectCodePayload> for NewProjectCode {
    fn from(payload: CreateProjectCodePayload) -> Self {
        NewProjectCode {
            code: payload.code,
            name: payload.name,
            is_billable: payload.is_billable.unwrap_or(true),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SetProjectCodeStatusPayload {
    pub status: ProjectCodeStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssignmentPayload {
    pub employee_id: UserId,
    pub project_code_id: ProjectCodeId,
    #[serde(with = "super::iso_date")]
    pub start_date: Date,
    #[serde(default, with = "super::iso_date::option")]
    pub end_date: Option<Date>,
}

impl From<CreateAssignmentPayload> for NewAssignment {
    fn from(payload: CreateAssignmentPayload) -> Self {
        NewAssignment {
            employee_id: payload.employee_id,
            project_code_id: payload.project_code_id,
            start_date: payload.start_date,
            end_date: payload.end_date,
        }
    }
}

/// `endDate: null` reopens the assignment.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseAssignmentPayload {
    #[serde(default, with = "super::iso_date::option")]
    pub end_date: Option<Date>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAssignmentsQuery {
    pub employee_id: Option<UserId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentCheckQuery {
    pub employee_id: Option<UserId>,
    pub project_code_id: ProjectCodeId,
    #[serde(with = "super::iso_date")]
    pub date: Date,
}

/// One timesheet line as sent by clients.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetPayload {
    pub project_code_id: ProjectCodeId,
    #[serde(with = "super::iso_date")]
    pub work_date: Date,
    pub hours: f64,
    #[serde(default)]
    pub description: String,
}

impl TimesheetPayload {
    pub fn into_entry(self) -> TimesheetResult<TimesheetEntry> {
        let hours = Hours::try_from_f64(self.hours)?;
        Ok(TimesheetEntry::new(self.project_code_id, self.work_date, hours)
            .with_description(self.description.trim()))
    }
}

#[derive(Debug, Deserialize)]
pub struct SubmitWeekPayload {
    pub entries: Vec<TimesheetPayload>,
}

impl SubmitWeekPayload {
    /// Convert every entry, naming the first one that fails.
    pub fn into_entries(self) -> TimesheetResult<Vec<TimesheetEntry>> {
        self.entries
            .into_iter()
            .enumerate()
            .map(|(index, payload)| payload.into_entry().map_err(|e| e.for_entry(index)))
            .collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTimesheetsQuery {
    pub employee_id: Option<UserId>,
    #[serde(with = "super::iso_date")]
    pub from: Date,
    #[serde(with = "super::iso_date")]
    pub to: Date,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApprovePayload {
    pub comments: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RejectPayload {
    pub comments: String,
}
