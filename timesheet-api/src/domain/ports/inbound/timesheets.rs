use async_trait::async_trait;
use time::Date;

use crate::domain::{
    models::{Timesheet, TimesheetEntry, TimesheetId, UserId},
    ActorContext, TimesheetResult,
};

/// Inbound port for the timesheet lifecycle of an employee.
///
/// Every operation runs in its own unit of work; nothing is written when an
/// operation fails.
#[async_trait]
pub trait TimesheetService: Send + Sync + 'static {
    /// Create a Draft timesheet for `employee_id`.
    ///
    /// Requires an assignment covering the date, `0 < hours <= 24` and no
    /// existing timesheet for the same employee, project code and date.
    async fn create_timesheet(
        &self,
        actor: &ActorContext,
        employee_id: UserId,
        entry: &TimesheetEntry,
    ) -> TimesheetResult<Timesheet>;

    /// Replace the editable fields of a Draft timesheet.
    async fn update_timesheet(
        &self,
        actor: &ActorContext,
        id: TimesheetId,
        entry: &TimesheetEntry,
    ) -> TimesheetResult<Timesheet>;

    /// Move a Draft timesheet to Submitted, enforcing the daily hour cap.
    async fn submit_timesheet(
        &self,
        actor: &ActorContext,
        id: TimesheetId,
    ) -> TimesheetResult<Timesheet>;

    /// Delete a Draft timesheet. Reviewed or submitted ones are kept for audit.
    async fn delete_timesheet(&self, actor: &ActorContext, id: TimesheetId)
        -> TimesheetResult<()>;

    /// Create and submit a batch of entries, all or nothing.
    async fn submit_week(
        &self,
        actor: &ActorContext,
        employee_id: UserId,
        entries: &[TimesheetEntry],
    ) -> TimesheetResult<Vec<Timesheet>>;

    async fn get_timesheet(
        &self,
        actor: &ActorContext,
        id: TimesheetId,
    ) -> TimesheetResult<Timesheet>;

    /// Timesheets of `employee_id` dated within `[from, to]`.
    async fn list_timesheets(
        &self,
        actor: &ActorContext,
        employee_id: UserId,
        from: Date,
        to: Date,
    ) -> TimesheetResult<Vec<Timesheet>>;
}
