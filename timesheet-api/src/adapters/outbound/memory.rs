//! In-memory entity store for tests.
//!
//! Transactions are serialised behind an async mutex; each one keeps a
//! snapshot of the tables taken at `begin` and restores it on rollback or
//! drop. The same constraints as the database schema are enforced on every
//! write.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use time::{Date, OffsetDateTime};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::{
    models::{
        AssignmentId, NewAssignment, NewProjectCode, NewTimesheet, ProjectAssignment,
        ProjectCode, ProjectCodeId, ProjectCodeStatus, Timesheet, TimesheetId, TimesheetStatus,
        UserId,
    },
    ports::outbound::{StoreTransaction, TimesheetStore},
    NewUser, Role, TimesheetError, TimesheetResult, User,
};

#[derive(Debug, Clone, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    project_codes: BTreeMap<ProjectCodeId, ProjectCode>,
    assignments: BTreeMap<AssignmentId, ProjectAssignment>,
    timesheets: BTreeMap<TimesheetId, Timesheet>,
    last_id: i32,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }

    fn user_has_children(&self, id: UserId) -> bool {
        self.assignments
            .values()
            .any(|a| a.employee_id == id || a.assigned_by == id)
            || self
                .timesheets
                .values()
                .any(|t| t.employee_id == id || t.reviewed_by == Some(id))
    }

    fn project_code_has_children(&self, id: ProjectCodeId) -> bool {
        self.assignments.values().any(|a| a.project_code_id == id)
            || self.timesheets.values().any(|t| t.project_code_id == id)
    }

    fn check_references(&self, employee_id: UserId, project_code_id: ProjectCodeId) -> TimesheetResult<()> {
        if !self.users.contains_key(&employee_id) {
            return Err(TimesheetError::conflict(format!(
                "user {employee_id} does not exist"
            )));
        }
        if !self.project_codes.contains_key(&project_code_id) {
            return Err(TimesheetError::conflict(format!(
                "project code {project_code_id} does not exist"
            )));
        }
        Ok(())
    }

    fn check_timesheet(&self, timesheet: &Timesheet) -> TimesheetResult<()> {
        self.check_references(timesheet.employee_id, timesheet.project_code_id)?;

        if !timesheet.hours.is_valid_entry() {
            return Err(TimesheetError::validation(
                "hours worked must be greater than 0 and at most 24",
            ));
        }
        if timesheet.status == TimesheetStatus::Rejected
            && timesheet
                .manager_comments
                .as_deref()
                .map_or(true, |c| c.trim().is_empty())
        {
            return Err(TimesheetError::validation(
                "rejected timesheets require manager comments",
            ));
        }

        let duplicate = self.timesheets.values().any(|other| {
            other.id != timesheet.id
                && other.employee_id == timesheet.employee_id
                && other.project_code_id == timesheet.project_code_id
                && other.work_date == timesheet.work_date
        });
        if duplicate {
            return Err(TimesheetError::conflict(
                "a timesheet already exists for this employee, project code and date",
            ));
        }

        Ok(())
    }
}

/// Entity store kept entirely in memory.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    fail_next_commit: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next transaction's commit fail with a storage error.
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl TimesheetStore for MemoryStore {
    type Tx = MemoryTransaction;

    async fn begin(&self) -> TimesheetResult<MemoryTransaction> {
        let guard = self.tables.clone().lock_owned().await;
        let snapshot = guard.clone();

        Ok(MemoryTransaction {
            guard: Some(guard),
            snapshot,
            fail_commit: self.fail_next_commit.swap(false, Ordering::SeqCst),
        })
    }
}

pub struct MemoryTransaction {
    guard: Option<OwnedMutexGuard<Tables>>,
    snapshot: Tables,
    fail_commit: bool,
}

impl MemoryTransaction {
    fn tables(&mut self) -> TimesheetResult<&mut Tables> {
        self.guard
            .as_deref_mut()
            .ok_or_else(|| TimesheetError::storage("transaction already finished"))
    }

    fn restore(&mut self) {
        if let Some(mut guard) = self.guard.take() {
            *guard = std::mem::take(&mut self.snapshot);
        }
    }
}

impl Drop for MemoryTransaction {
    fn drop(&mut self) {
        self.restore();
    }
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn flush(&mut self) -> TimesheetResult<()> {
        self.tables().map(|_| ())
    }

    async fn commit(&mut self) -> TimesheetResult<()> {
        self.tables()?;
        if self.fail_commit {
            self.fail_commit = false;
            return Err(TimesheetError::storage("simulated commit failure"));
        }

        self.guard.take();
        Ok(())
    }

    async fn rollback(&mut self) -> TimesheetResult<()> {
        self.restore();
        Ok(())
    }

    async fn user(&mut self, id: UserId) -> TimesheetResult<Option<User>> {
        Ok(self.tables()?.users.get(&id).cloned())
    }

    async fn user_by_email(&mut self, email: &str) -> TimesheetResult<Option<User>> {
        Ok(self
            .tables()?
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn users(&mut self) -> TimesheetResult<Vec<User>> {
        Ok(self.tables()?.users.values().cloned().collect())
    }

    async fn insert_user(&mut self, user: &NewUser) -> TimesheetResult<User> {
        let tables = self.tables()?;
        if tables
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(TimesheetError::conflict("email is already in use"));
        }

        let id = UserId::new(tables.next_id());
        let user = User {
            id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
            is_active: true,
            password_hash: user.password_hash.clone(),
            created_at: OffsetDateTime::now_utc(),
        };
        tables.users.insert(id, user.clone());
        Ok(user)
    }

    async fn set_user_active(&mut self, id: UserId, active: bool) -> TimesheetResult<()> {
        let user = self
            .tables()?
            .users
            .get_mut(&id)
            .ok_or_else(|| TimesheetError::not_found("user", id))?;
        user.is_active = active;
        Ok(())
    }

    async fn delete_user(&mut self, id: UserId) -> TimesheetResult<()> {
        let tables = self.tables()?;
        if !tables.users.contains_key(&id) {
            return Err(TimesheetError::not_found("user", id));
        }
        if tables.user_has_children(id) {
            return Err(TimesheetError::conflict(
                "record is still referenced by other records",
            ));
        }
        tables.users.remove(&id);
        Ok(())
    }

    async fn project_code(&mut self, id: ProjectCodeId) -> TimesheetResult<Option<ProjectCode>> {
        Ok(self.tables()?.project_codes.get(&id).cloned())
    }

    async fn project_codes(&mut self) -> TimesheetResult<Vec<ProjectCode>> {
        let mut codes: Vec<_> = self.tables()?.project_codes.values().cloned().collect();
        codes.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(codes)
    }

    async fn insert_project_code(
        &mut self,
        code: &NewProjectCode,
    ) -> TimesheetResult<ProjectCode> {
        let tables = self.tables()?;
        if tables.project_codes.values().any(|p| p.code == code.code) {
            return Err(TimesheetError::conflict("project code already exists"));
        }

        let id = ProjectCodeId::new(tables.next_id());
        let project_code = ProjectCode {
            id,
            code: code.code.clone(),
            name: code.name.clone(),
            is_billable: code.is_billable,
            status: ProjectCodeStatus::Active,
        };
        tables.project_codes.insert(id, project_code.clone());
        Ok(project_code)
    }

    async fn set_project_code_status(
        &mut self,
        id: ProjectCodeId,
        status: ProjectCodeStatus,
    ) -> TimesheetResult<()> {
        let code = self
            .tables()?
            .project_codes
            .get_mut(&id)
            .ok_or_else(|| TimesheetError::not_found("project code", id))?;
        code.status = status;
        Ok(())
    }

    async fn delete_project_code(&mut self, id: ProjectCodeId) -> TimesheetResult<()> {
        let tables = self.tables()?;
        if !tables.project_codes.contains_key(&id) {
            return Err(TimesheetError::not_found("project code", id));
        }
        if tables.project_code_has_children(id) {
            return Err(TimesheetError::conflict(
                "record is still referenced by other records",
            ));
        }
        tables.project_codes.remove(&id);
        Ok(())
    }

    async fn assignment(&mut self, id: AssignmentId) -> TimesheetResult<Option<ProjectAssignment>> {
        Ok(self.tables()?.assignments.get(&id).cloned())
    }

    async fn assignments_for(
        &mut self,
        employee_id: UserId,
        project_code_id: ProjectCodeId,
    ) -> TimesheetResult<Vec<ProjectAssignment>> {
        let mut assignments: Vec<_> = self
            .tables()?
            .assignments
            .values()
            .filter(|a| a.employee_id == employee_id && a.project_code_id == project_code_id)
            .cloned()
            .collect();
        assignments.sort_by_key(|a| (a.start_date, a.id));
        Ok(assignments)
    }

    async fn assignments_of_employee(
        &mut self,
        employee_id: UserId,
    ) -> TimesheetResult<Vec<ProjectAssignment>> {
        let mut assignments: Vec<_> = self
            .tables()?
            .assignments
            .values()
            .filter(|a| a.employee_id == employee_id)
            .cloned()
            .collect();
        assignments.sort_by_key(|a| (a.start_date, a.id));
        Ok(assignments)
    }

    async fn insert_assignment(
        &mut self,
        assignment: &NewAssignment,
        assigned_by: UserId,
    ) -> TimesheetResult<ProjectAssignment> {
        let tables = self.tables()?;
        tables.check_references(assignment.employee_id, assignment.project_code_id)?;
        if !tables.users.contains_key(&assigned_by) {
            return Err(TimesheetError::conflict(format!(
                "user {assigned_by} does not exist"
            )));
        }
        if assignment.end_date.is_some_and(|end| end < assignment.start_date) {
            return Err(TimesheetError::validation(
                "assignment end date is before its start date",
            ));
        }

        let id = AssignmentId::new(tables.next_id());
        let row = ProjectAssignment {
            id,
            employee_id: assignment.employee_id,
            project_code_id: assignment.project_code_id,
            start_date: assignment.start_date,
            end_date: assignment.end_date,
            assigned_by,
        };
        tables.assignments.insert(id, row.clone());
        Ok(row)
    }

    async fn set_assignment_end(
        &mut self,
        id: AssignmentId,
        end_date: Option<Date>,
    ) -> TimesheetResult<()> {
        let assignment = self
            .tables()?
            .assignments
            .get_mut(&id)
            .ok_or_else(|| TimesheetError::not_found("assignment", id))?;
        if end_date.is_some_and(|end| end < assignment.start_date) {
            return Err(TimesheetError::validation(
                "assignment end date is before its start date",
            ));
        }
        assignment.end_date = end_date;
        Ok(())
    }

    async fn timesheet(&mut self, id: TimesheetId) -> TimesheetResult<Option<Timesheet>> {
        Ok(self.tables()?.timesheets.get(&id).cloned())
    }

    async fn timesheet_for_day(
        &mut self,
        employee_id: UserId,
        project_code_id: ProjectCodeId,
        work_date: Date,
    ) -> TimesheetResult<Option<Timesheet>> {
        Ok(self
            .tables()?
            .timesheets
            .values()
            .find(|t| {
                t.employee_id == employee_id
                    && t.project_code_id == project_code_id
                    && t.work_date == work_date
            })
            .cloned())
    }

    async fn timesheets_of_employee(
        &mut self,
        employee_id: UserId,
        from: Date,
        to: Date,
    ) -> TimesheetResult<Vec<Timesheet>> {
        let mut rows: Vec<_> = self
            .tables()?
            .timesheets
            .values()
            .filter(|t| t.employee_id == employee_id && t.work_date >= from && t.work_date <= to)
            .cloned()
            .collect();
        rows.sort_by_key(|t| (t.work_date, t.id));
        Ok(rows)
    }

    async fn timesheets_with_status(
        &mut self,
        status: TimesheetStatus,
    ) -> TimesheetResult<Vec<Timesheet>> {
        let mut rows: Vec<_> = self
            .tables()?
            .timesheets
            .values()
            .filter(|t| t.status == status)
            .cloned()
            .collect();
        rows.sort_by_key(|t| (t.work_date, t.id));
        Ok(rows)
    }

    async fn insert_timesheet(&mut self, timesheet: &NewTimesheet) -> TimesheetResult<Timesheet> {
        let tables = self.tables()?;
        let now = OffsetDateTime::now_utc();
        let mut row = Timesheet {
            id: TimesheetId::new(0),
            employee_id: timesheet.employee_id,
            project_code_id: timesheet.entry.project_code_id,
            work_date: timesheet.entry.work_date,
            hours: timesheet.entry.hours,
            description: timesheet.entry.description.clone(),
            status: timesheet.status,
            manager_comments: None,
            reviewed_by: None,
            reviewed_at: None,
            created_at: now,
            updated_at: now,
        };
        tables.check_timesheet(&row)?;

        row.id = TimesheetId::new(tables.next_id());
        tables.timesheets.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_timesheet(&mut self, timesheet: &Timesheet) -> TimesheetResult<Timesheet> {
        let tables = self.tables()?;
        let Some(existing) = tables.timesheets.get(&timesheet.id) else {
            return Err(TimesheetError::not_found("timesheet", timesheet.id));
        };

        let mut row = timesheet.clone();
        row.created_at = existing.created_at;
        row.updated_at = OffsetDateTime::now_utc();
        tables.check_timesheet(&row)?;

        tables.timesheets.insert(row.id, row.clone());
        Ok(row)
    }

    async fn delete_timesheet(&mut self, id: TimesheetId) -> TimesheetResult<()> {
        self.tables()?
            .timesheets
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| TimesheetError::not_found("timesheet", id))
    }
}

/// Records created by [`MemoryStore::seed_assigned_employee`].
#[derive(Debug, Clone)]
pub struct Seeded {
    pub manager: User,
    pub employee: User,
    pub project_code: ProjectCode,
    pub assignment: ProjectAssignment,
}

impl MemoryStore {
    pub async fn seed_user(&self, email: &str, role: Role) -> User {
        let mut tx = self.begin().await.unwrap();
        let user = tx
            .insert_user(&NewUser {
                email: email.to_string(),
                full_name: email.split('@').next().unwrap_or(email).to_string(),
                role,
                password_hash: String::new(),
            })
            .await
            .unwrap();
        tx.commit().await.unwrap();
        user
    }

    pub async fn seed_project_code(&self, code: &str) -> ProjectCode {
        let mut tx = self.begin().await.unwrap();
        let project_code = tx
            .insert_project_code(&NewProjectCode::new(code, format!("Project {code}")))
            .await
            .unwrap();
        tx.commit().await.unwrap();
        project_code
    }

    pub async fn seed_assignment(
        &self,
        employee: &User,
        project_code: &ProjectCode,
        assigned_by: &User,
        start: Date,
        end: Option<Date>,
    ) -> ProjectAssignment {
        let mut tx = self.begin().await.unwrap();
        let mut new = NewAssignment::new(employee.id, project_code.id, start);
        new.end_date = end;
        let assignment = tx.insert_assignment(&new, assigned_by.id).await.unwrap();
        tx.commit().await.unwrap();
        assignment
    }

    /// A manager, an employee and project code "P1" assigned to the employee.
    pub async fn seed_assigned_employee(&self, start: Date, end: Option<Date>) -> Seeded {
        let manager = self.seed_user("manager@example.com", Role::Manager).await;
        let employee = self.seed_user("employee@example.com", Role::Employee).await;
        let project_code = self.seed_project_code("P1").await;
        let assignment = self
            .seed_assignment(&employee, &project_code, &manager, start, end)
            .await;

        Seeded {
            manager,
            employee,
            project_code,
            assignment,
        }
    }

    pub async fn timesheet_count(&self) -> usize {
        self.tables.lock().await.timesheets.len()
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;
    use crate::domain::models::{Hours, TimesheetEntry};

    fn draft(employee: &User, code: &ProjectCode, day: Date, hours: i32) -> NewTimesheet {
        NewTimesheet {
            employee_id: employee.id,
            entry: TimesheetEntry::new(code.id, day, Hours::whole(hours)),
            status: TimesheetStatus::Draft,
        }
    }

    #[tokio::test]
    async fn duplicate_timesheet_violates_unique_constraint() {
        let store = MemoryStore::new();
        let seeded = store.seed_assigned_employee(date!(2025 - 01 - 01), None).await;

        let mut tx = store.begin().await.unwrap();
        let day = date!(2025 - 01 - 15);
        tx.insert_timesheet(&draft(&seeded.employee, &seeded.project_code, day, 8))
            .await
            .unwrap();
        let err = tx
            .insert_timesheet(&draft(&seeded.employee, &seeded.project_code, day, 2))
            .await
            .unwrap_err();

        assert!(matches!(err, TimesheetError::Conflict(_)));
    }

    #[tokio::test]
    async fn deleting_parents_with_children_is_restricted() {
        let store = MemoryStore::new();
        let seeded = store.seed_assigned_employee(date!(2025 - 01 - 01), None).await;

        let mut tx = store.begin().await.unwrap();
        assert!(matches!(
            tx.delete_user(seeded.employee.id).await,
            Err(TimesheetError::Conflict(_))
        ));
        assert!(matches!(
            tx.delete_project_code(seeded.project_code.id).await,
            Err(TimesheetError::Conflict(_))
        ));
        assert!(tx.user(seeded.employee.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn dropped_transaction_discards_writes() {
        let store = MemoryStore::new();
        {
            let mut tx = store.begin().await.unwrap();
            tx.insert_project_code(&NewProjectCode::new("P9", "Dropped"))
                .await
                .unwrap();
        }

        let mut tx = store.begin().await.unwrap();
        assert!(tx.project_codes().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejected_timesheet_needs_comments() {
        let store = MemoryStore::new();
        let seeded = store.seed_assigned_employee(date!(2025 - 01 - 01), None).await;

        let mut tx = store.begin().await.unwrap();
        let mut row = tx
            .insert_timesheet(&draft(
                &seeded.employee,
                &seeded.project_code,
                date!(2025 - 01 - 02),
                4,
            ))
            .await
            .unwrap();
        row.status = TimesheetStatus::Rejected;

        assert!(matches!(
            tx.update_timesheet(&row).await,
            Err(TimesheetError::Validation(_))
        ));
    }
}
