use async_trait::async_trait;

use crate::domain::{
    models::{Timesheet, TimesheetId},
    ActorContext, TimesheetResult,
};

/// Inbound port for manager review of submitted timesheets.
#[async_trait]
pub trait ApprovalService: Send + Sync + 'static {
    /// Approve a Submitted timesheet, optionally leaving a comment.
    async fn approve(
        &self,
        actor: &ActorContext,
        id: TimesheetId,
        comments: Option<String>,
    ) -> TimesheetResult<Timesheet>;

    /// Reject a Submitted timesheet. `comments` must not be blank.
    async fn reject(
        &self,
        actor: &ActorContext,
        id: TimesheetId,
        comments: &str,
    ) -> TimesheetResult<Timesheet>;

    /// All timesheets waiting for review.
    async fn pending(&self, actor: &ActorContext) -> TimesheetResult<Vec<Timesheet>>;
}
