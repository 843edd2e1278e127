use std::sync::Arc;

use time::Date;

use crate::domain::{
    models::{ProjectCodeId, UserId},
    ports::outbound::{StoreTransaction, TimesheetStore},
    TimesheetResult,
};

use super::UnitOfWork;

/// Answers whether an employee may book hours on a project code for a date.
pub struct AssignmentValidator<S> {
    store: Arc<S>,
}

impl<S> Clone for AssignmentValidator<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: TimesheetStore> AssignmentValidator<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// True iff an assignment for the pair covers `date`.
    pub async fn is_employee_assigned_to_project(
        &self,
        employee_id: UserId,
        project_code_id: ProjectCodeId,
        date: Date,
    ) -> TimesheetResult<bool> {
        let mut uow = UnitOfWork::start(self.store.clone()).await?;
        let result = check_in(uow.tx()?, employee_id, project_code_id, date).await;
        uow.finish(result).await
    }
}

/// Same check as [`AssignmentValidator::is_employee_assigned_to_project`],
/// inside an already open transaction.
pub async fn check_in<T: StoreTransaction>(
    tx: &mut T,
    employee_id: UserId,
    project_code_id: ProjectCodeId,
    date: Date,
) -> TimesheetResult<bool> {
    let assignments = tx.assignments_for(employee_id, project_code_id).await?;
    Ok(assignments.iter().any(|a| a.covers(date)))
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;
    use crate::adapters::outbound::memory::MemoryStore;

    #[tokio::test]
    async fn assigned_within_interval_only() {
        let store = Arc::new(MemoryStore::new());
        let seeded = store
            .seed_assigned_employee(date!(2025 - 01 - 01), Some(date!(2025 - 01 - 31)))
            .await;
        let validator = AssignmentValidator::new(store);
        let (employee, project) = (seeded.employee.id, seeded.project_code.id);

        for (day, expected) in [
            (date!(2024 - 12 - 31), false),
            (date!(2025 - 01 - 01), true),
            (date!(2025 - 01 - 15), true),
            (date!(2025 - 01 - 31), true),
            (date!(2025 - 02 - 01), false),
        ] {
            let assigned = validator
                .is_employee_assigned_to_project(employee, project, day)
                .await
                .unwrap();
            assert_eq!(assigned, expected, "{day}");
        }
    }

    #[tokio::test]
    async fn other_project_is_not_assigned() {
        let store = Arc::new(MemoryStore::new());
        let seeded = store.seed_assigned_employee(date!(2025 - 01 - 01), None).await;
        let other = store.seed_project_code("P2").await;
        let validator = AssignmentValidator::new(store);

        assert!(!validator
            .is_employee_assigned_to_project(seeded.employee.id, other.id, date!(2025 - 01 - 15))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn any_of_several_assignments_counts() {
        let store = Arc::new(MemoryStore::new());
        let seeded = store
            .seed_assigned_employee(date!(2025 - 01 - 01), Some(date!(2025 - 01 - 31)))
            .await;
        store
            .seed_assignment(
                &seeded.employee,
                &seeded.project_code,
                &seeded.manager,
                date!(2025 - 03 - 01),
                None,
            )
            .await;
        let validator = AssignmentValidator::new(store);
        let (employee, project) = (seeded.employee.id, seeded.project_code.id);

        assert!(!validator
            .is_employee_assigned_to_project(employee, project, date!(2025 - 02 - 15))
            .await
            .unwrap());
        assert!(validator
            .is_employee_assigned_to_project(employee, project, date!(2025 - 04 - 01))
            .await
            .unwrap());
    }
}
