//! Entity store port (outbound).
//!
//! Typed data-access functions per entity, all running inside one explicit
//! store transaction. The store enforces the referential and uniqueness
//! invariants itself; services pre-check them only to produce friendlier
//! errors.

use async_trait::async_trait;
use time::Date;

use crate::domain::{
    models::{
        AssignmentId, NewAssignment, NewProjectCode, NewTimesheet, ProjectAssignment,
        ProjectCode, ProjectCodeId, ProjectCodeStatus, Timesheet, TimesheetId, TimesheetStatus,
        UserId,
    },
    NewUser, TimesheetResult, User,
};

/// Opens store transactions.
#[async_trait]
pub trait TimesheetStore: Send + Sync + 'static {
    type Tx: StoreTransaction;

    async fn begin(&self) -> TimesheetResult<Self::Tx>;
}

/// One open transaction against the entity store.
///
/// Constraint violations surface as errors from the write that caused them
/// or, at the latest, from [`flush`](Self::flush) / [`commit`](Self::commit):
/// a duplicate `(employee, project code, date)` timesheet or a delete of a
/// parent with children is a `Conflict`, a violated check is a `Validation`.
#[async_trait]
pub trait StoreTransaction: Send {
    /// Push pending writes to the store without committing.
    async fn flush(&mut self) -> TimesheetResult<()>;

    async fn commit(&mut self) -> TimesheetResult<()>;

    /// Discard all writes. Safe to call on a finished transaction.
    async fn rollback(&mut self) -> TimesheetResult<()>;

    // Users

    async fn user(&mut self, id: UserId) -> TimesheetResult<Option<User>>;

    async fn user_by_email(&mut self, email: &str) -> TimesheetResult<Option<User>>;

    async fn users(&mut self) -> TimesheetResult<Vec<User>>;

    async fn insert_user(&mut self, user: &NewUser) -> TimesheetResult<User>;

    async fn set_user_active(&mut self, id: UserId, active: bool) -> TimesheetResult<()>;

    async fn delete_user(&mut self, id: UserId) -> TimesheetResult<()>;

    // Project codes

    async fn project_code(&mut self, id: ProjectCodeId) -> TimesheetResult<Option<ProjectCode>>;

    async fn project_codes(&mut self) -> TimesheetResult<Vec<ProjectCode>>;

    async fn insert_project_code(&mut self, code: &NewProjectCode)
        -> TimesheetResult<ProjectCode>;

    async fn set_project_code_status(
        &mut self,
        id: ProjectCodeId,
        status: ProjectCodeStatus,
    ) -> TimesheetResult<()>;

    async fn delete_project_code(&mut self, id: ProjectCodeId) -> TimesheetResult<()>;

    // Assignments

    async fn assignment(&mut self, id: AssignmentId) -> TimesheetResult<Option<ProjectAssignment>>;

    /// Assignments linking `employee_id` to `project_code_id`, oldest first.
    async fn assignments_for(
        &mut self,
        employee_id: UserId,
        project_code_id: ProjectCodeId,
    ) -> TimesheetResult<Vec<ProjectAssignment>>;

    async fn assignments_of_employee(
        &mut self,
        employee_id: UserId,
    ) -> TimesheetResult<Vec<ProjectAssignment>>;

    async fn insert_assignment(
        &mut self,
        assignment: &NewAssignment,
        assigned_by: UserId,
    ) -> TimesheetResult<ProjectAssignment>;

    async fn set_assignment_end(
        &mut self,
        id: AssignmentId,
        end_date: Option<Date>,
    ) -> TimesheetResult<()>;

    // Timesheets

    async fn timesheet(&mut self, id: TimesheetId) -> TimesheetResult<Option<Timesheet>>;

    async fn timesheet_for_day(
        &mut self,
        employee_id: UserId,
        project_code_id: ProjectCodeId,
        work_date: Date,
    ) -> TimesheetResult<Option<Timesheet>>;

    /// Timesheets of one employee with `from <= work_date <= to`, ordered by
    /// date then id.
    async fn timesheets_of_employee(
        &mut self,
        employee_id: UserId,
        from: Date,
        to: Date,
    ) -> TimesheetResult<Vec<Timesheet>>;

    async fn timesheets_with_status(
        &mut self,
        status: TimesheetStatus,
    ) -> TimesheetResult<Vec<Timesheet>>;

    async fn insert_timesheet(&mut self, timesheet: &NewTimesheet) -> TimesheetResult<Timesheet>;

    /// Persist every mutable column of `timesheet` and return the stored row.
    async fn update_timesheet(&mut self, timesheet: &Timesheet) -> TimesheetResult<Timesheet>;

    async fn delete_timesheet(&mut self, id: TimesheetId) -> TimesheetResult<()>;
}
