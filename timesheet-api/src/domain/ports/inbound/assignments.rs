use async_trait::async_trait;
use time::Date;

use crate::domain::{
    models::{AssignmentId, NewAssignment, ProjectAssignment, ProjectCodeId, UserId},
    ActorContext, TimesheetResult,
};

/// Inbound port for granting project codes to employees.
#[async_trait]
pub trait AssignmentService: Send + Sync + 'static {
    async fn assign(
        &self,
        actor: &ActorContext,
        assignment: &NewAssignment,
    ) -> TimesheetResult<ProjectAssignment>;

    /// Set (or clear) the last day of an assignment.
    async fn close(
        &self,
        actor: &ActorContext,
        id: AssignmentId,
        end_date: Option<Date>,
    ) -> TimesheetResult<ProjectAssignment>;

    async fn list_for_employee(
        &self,
        actor: &ActorContext,
        employee_id: UserId,
    ) -> TimesheetResult<Vec<ProjectAssignment>>;

    async fn is_assigned(
        &self,
        actor: &ActorContext,
        employee_id: UserId,
        project_code_id: ProjectCodeId,
        date: Date,
    ) -> TimesheetResult<bool>;
}
