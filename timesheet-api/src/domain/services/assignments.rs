use std::sync::Arc;

use async_trait::async_trait;
use time::Date;

use crate::domain::{
    models::{AssignmentId, NewAssignment, ProjectAssignment, ProjectCodeId, TimesheetStatus, UserId},
    ports::{
        inbound::AssignmentService,
        outbound::{StoreTransaction, TimesheetStore},
    },
    ActorContext, TimesheetError, TimesheetResult,
};

use super::{AssignmentValidator, UnitOfWork};

/// Implementation of the AssignmentService inbound port.
pub struct AssignmentServiceImpl<S> {
    store: Arc<S>,
    validator: AssignmentValidator<S>,
}

impl<S: TimesheetStore> AssignmentServiceImpl<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            validator: AssignmentValidator::new(store.clone()),
            store,
        }
    }
}

fn ensure_manager(actor: &ActorContext) -> TimesheetResult<()> {
    if !actor.is_manager() {
        return Err(TimesheetError::forbidden(
            "only managers can manage project assignments",
        ));
    }
    Ok(())
}

fn ensure_can_view(actor: &ActorContext, employee_id: UserId) -> TimesheetResult<()> {
    if !actor.can_view(employee_id) {
        return Err(TimesheetError::forbidden(
            "assignments are only visible to the employee and managers",
        ));
    }
    Ok(())
}

fn check_range(start: Date, end: Option<Date>) -> TimesheetResult<()> {
    if end.is_some_and(|end| end < start) {
        return Err(TimesheetError::validation(format!(
            "assignment end date is before its start date {start}"
        )));
    }
    Ok(())
}

async fn assign_in<T: StoreTransaction>(
    tx: &mut T,
    actor: &ActorContext,
    new: &NewAssignment,
) -> TimesheetResult<ProjectAssignment> {
    check_range(new.start_date, new.end_date)?;

    let employee = tx
        .user(new.employee_id)
        .await?
        .ok_or_else(|| TimesheetError::not_found("user", new.employee_id))?;
    if !employee.is_active {
        return Err(TimesheetError::validation(format!(
            "user {} is deactivated",
            employee.email
        )));
    }

    let project_code = tx
        .project_code(new.project_code_id)
        .await?
        .ok_or_else(|| TimesheetError::not_found("project code", new.project_code_id))?;
    if !project_code.is_active() {
        return Err(TimesheetError::validation(format!(
            "project code {} is inactive",
            project_code.code
        )));
    }

    let existing = tx
        .assignments_for(new.employee_id, new.project_code_id)
        .await?;
    if let Some(other) = existing
        .iter()
        .find(|a| a.overlaps(new.start_date, new.end_date))
    {
        return Err(TimesheetError::conflict(format!(
            "overlaps assignment {} starting {}",
            other.id, other.start_date
        )));
    }

    tx.insert_assignment(new, actor.user_id).await
}

async fn close_in<T: StoreTransaction>(
    tx: &mut T,
    id: AssignmentId,
    end_date: Option<Date>,
) -> TimesheetResult<ProjectAssignment> {
    let mut assignment = tx
        .assignment(id)
        .await?
        .ok_or_else(|| TimesheetError::not_found("assignment", id))?;
    check_range(assignment.start_date, end_date)?;

    let others: Vec<_> = tx
        .assignments_for(assignment.employee_id, assignment.project_code_id)
        .await?
        .into_iter()
        .filter(|a| a.id != id)
        .collect();
    if let Some(other) = others
        .iter()
        .find(|a| a.overlaps(assignment.start_date, end_date))
    {
        return Err(TimesheetError::conflict(format!(
            "overlaps assignment {} starting {}",
            other.id, other.start_date
        )));
    }

    if let Some(end) = end_date {
        // Timesheets after the new end must stay covered by some assignment.
        let stranded = tx
            .timesheets_of_employee(assignment.employee_id, end.next_day().unwrap_or(end), Date::MAX)
            .await?
            .into_iter()
            .filter(|t| t.project_code_id == assignment.project_code_id)
            .filter(|t| t.status != TimesheetStatus::Rejected)
            .filter(|t| assignment.covers(t.work_date))
            .find(|t| !others.iter().any(|a| a.covers(t.work_date)));
        if let Some(timesheet) = stranded {
            return Err(TimesheetError::conflict(format!(
                "timesheet {} on {} would no longer be covered",
                timesheet.id, timesheet.work_date
            )));
        }
    }

    tx.set_assignment_end(id, end_date).await?;
    assignment.end_date = end_date;
    Ok(assignment)
}

#[async_trait]
impl<S: TimesheetStore> AssignmentService for AssignmentServiceImpl<S> {
    async fn assign(
        &self,
        actor: &ActorContext,
        assignment: &NewAssignment,
    ) -> TimesheetResult<ProjectAssignment> {
        ensure_manager(actor)?;

        let mut uow = UnitOfWork::start(self.store.clone()).await?;
        let result = assign_in(uow.tx()?, actor, assignment).await;
        let assignment = uow.finish(result).await?;

        tracing::info!(
            assignment_id = %assignment.id,
            employee_id = %assignment.employee_id,
            project_code_id = %assignment.project_code_id,
            "created project assignment"
        );
        Ok(assignment)
    }

    async fn close(
        &self,
        actor: &ActorContext,
        id: AssignmentId,
        end_date: Option<Date>,
    ) -> TimesheetResult<ProjectAssignment> {
        ensure_manager(actor)?;

        let mut uow = UnitOfWork::start(self.store.clone()).await?;
        let result = close_in(uow.tx()?, id, end_date).await;
        let assignment = uow.finish(result).await?;

        tracing::info!(assignment_id = %id, end_date = ?end_date, "updated assignment end");
        Ok(assignment)
    }

    async fn list_for_employee(
        &self,
        actor: &ActorContext,
        employee_id: UserId,
    ) -> TimesheetResult<Vec<ProjectAssignment>> {
        ensure_can_view(actor, employee_id)?;

        let mut uow = UnitOfWork::start(self.store.clone()).await?;
        let result = uow.tx()?.assignments_of_employee(employee_id).await;
        uow.finish(result).await
    }

    async fn is_assigned(
        &self,
        actor: &ActorContext,
        employee_id: UserId,
        project_code_id: ProjectCodeId,
        date: Date,
    ) -> TimesheetResult<bool> {
        ensure_can_view(actor, employee_id)?;

        self.validator
            .is_employee_assigned_to_project(employee_id, project_code_id, date)
            .await
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;
    use crate::adapters::outbound::memory::{MemoryStore, Seeded};
    use crate::domain::{
        models::{Hours, ProjectCodeStatus, TimesheetEntry},
        ports::inbound::TimesheetService,
        services::TimesheetServiceImpl,
        Role,
    };

    async fn setup() -> (Arc<MemoryStore>, Seeded, AssignmentServiceImpl<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let seeded = store
            .seed_assigned_employee(date!(2025 - 01 - 01), Some(date!(2025 - 01 - 31)))
            .await;
        let service = AssignmentServiceImpl::new(store.clone());
        (store, seeded, service)
    }

    #[tokio::test]
    async fn manager_assigns_new_project() {
        let (store, seeded, service) = setup().await;
        let other = store.seed_project_code("P2").await;
        let manager = ActorContext::manager(seeded.manager.id);

        let created = service
            .assign(
                &manager,
                &NewAssignment::new(seeded.employee.id, other.id, date!(2025 - 02 - 01)),
            )
            .await
            .unwrap();

        assert_eq!(created.assigned_by, seeded.manager.id);
        assert_eq!(created.end_date, None);
        assert!(service
            .is_assigned(&manager, seeded.employee.id, other.id, date!(2025 - 06 - 01))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn employees_cannot_assign() {
        let (_, seeded, service) = setup().await;
        let err = service
            .assign(
                &ActorContext::employee(seeded.employee.id),
                &NewAssignment::new(seeded.employee.id, seeded.project_code.id, date!(2025 - 03 - 01)),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, TimesheetError::Authorization(_)));
    }

    #[tokio::test]
    async fn overlapping_assignment_conflicts() {
        let (_, seeded, service) = setup().await;
        let manager = ActorContext::manager(seeded.manager.id);

        let overlapping = NewAssignment::new(seeded.employee.id, seeded.project_code.id, date!(2025 - 01 - 31));
        assert!(matches!(
            service.assign(&manager, &overlapping).await,
            Err(TimesheetError::Conflict(_))
        ));

        let after = NewAssignment::new(seeded.employee.id, seeded.project_code.id, date!(2025 - 02 - 01));
        assert!(service.assign(&manager, &after).await.is_ok());
    }

    #[tokio::test]
    async fn assign_validates_range_and_references() {
        let (store, seeded, service) = setup().await;
        let manager = ActorContext::manager(seeded.manager.id);

        let backwards = NewAssignment::new(seeded.employee.id, seeded.project_code.id, date!(2025 - 05 - 10))
            .until(date!(2025 - 05 - 01));
        assert!(matches!(
            service.assign(&manager, &backwards).await,
            Err(TimesheetError::Validation(_))
        ));

        let unknown = NewAssignment::new(UserId::new(999), seeded.project_code.id, date!(2025 - 05 - 01));
        assert!(matches!(
            service.assign(&manager, &unknown).await,
            Err(TimesheetError::NotFound { .. })
        ));

        let retired = store.seed_project_code("OLD").await;
        let mut tx = store.begin().await.unwrap();
        tx.set_project_code_status(retired.id, ProjectCodeStatus::Inactive)
            .await
            .unwrap();
        tx.commit().await.unwrap();
        drop(tx);

        let inactive = NewAssignment::new(seeded.employee.id, retired.id, date!(2025 - 05 - 01));
        assert!(matches!(
            service.assign(&manager, &inactive).await,
            Err(TimesheetError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn close_sets_end_date() {
        let (_, seeded, service) = setup().await;
        let manager = ActorContext::manager(seeded.manager.id);

        let closed = service
            .close(&manager, seeded.assignment.id, Some(date!(2025 - 01 - 10)))
            .await
            .unwrap();

        assert_eq!(closed.end_date, Some(date!(2025 - 01 - 10)));
        assert!(!service
            .is_assigned(&manager, seeded.employee.id, seeded.project_code.id, date!(2025 - 01 - 11))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn close_refuses_to_strand_timesheets() {
        let (store, seeded, service) = setup().await;
        let manager = ActorContext::manager(seeded.manager.id);
        TimesheetServiceImpl::new(store.clone())
            .create_timesheet(
                &ActorContext::employee(seeded.employee.id),
                seeded.employee.id,
                &TimesheetEntry::new(seeded.project_code.id, date!(2025 - 01 - 20), Hours::whole(4)),
            )
            .await
            .unwrap();

        let err = service
            .close(&manager, seeded.assignment.id, Some(date!(2025 - 01 - 10)))
            .await
            .unwrap_err();
        assert!(matches!(err, TimesheetError::Conflict(_)), "{err:?}");

        assert!(service
            .close(&manager, seeded.assignment.id, Some(date!(2025 - 01 - 20)))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn reopening_into_a_later_assignment_conflicts() {
        let (_, seeded, service) = setup().await;
        let manager = ActorContext::manager(seeded.manager.id);
        service
            .assign(
                &manager,
                &NewAssignment::new(seeded.employee.id, seeded.project_code.id, date!(2025 - 03 - 01)),
            )
            .await
            .unwrap();

        assert!(matches!(
            service.close(&manager, seeded.assignment.id, None).await,
            Err(TimesheetError::Conflict(_))
        ));
        assert!(service
            .close(&manager, seeded.assignment.id, Some(date!(2025 - 02 - 28)))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn listing_is_scoped_to_owner_and_managers() {
        let (store, seeded, service) = setup().await;
        let stranger = store.seed_user("other@example.com", Role::Employee).await;

        let own = service
            .list_for_employee(&ActorContext::employee(seeded.employee.id), seeded.employee.id)
            .await
            .unwrap();
        assert_eq!(own, vec![seeded.assignment.clone()]);

        assert!(matches!(
            service
                .list_for_employee(&ActorContext::employee(stranger.id), seeded.employee.id)
                .await,
            Err(TimesheetError::Authorization(_))
        ));
    }
}
