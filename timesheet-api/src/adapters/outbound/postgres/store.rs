use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use time::Date;

use crate::domain::{
    models::{
        AssignmentId, NewAssignment, NewProjectCode, NewTimesheet, ProjectAssignment,
        ProjectCode, ProjectCodeId, ProjectCodeStatus, Timesheet, TimesheetId, TimesheetStatus,
        UserId,
    },
    ports::outbound::{StoreTransaction, TimesheetStore},
    NewUser, TimesheetError, TimesheetResult, User,
};

use super::{
    error::db_error,
    rows::{convert_all, AssignmentRow, ProjectCodeRow, TimesheetRow, UserRow},
};

/// Entity store backed by a PostgreSQL pool.
#[derive(Clone)]
pub struct PgTimesheetStore {
    pool: PgPool,
}

impl PgTimesheetStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TimesheetStore for PgTimesheetStore {
    type Tx = PgStoreTransaction;

    async fn begin(&self) -> TimesheetResult<PgStoreTransaction> {
        let tx = self.pool.begin().await.map_err(db_error)?;
        Ok(PgStoreTransaction { tx: Some(tx) })
    }
}

/// A database transaction. Statements run eagerly, so `flush` only checks the
/// transaction is still open; dropping it without commit rolls back.
pub struct PgStoreTransaction {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgStoreTransaction {
    fn conn(&mut self) -> TimesheetResult<&mut PgConnection> {
        self.tx
            .as_deref_mut()
            .ok_or_else(|| TimesheetError::storage("transaction already finished"))
    }
}

fn expect_affected(rows: u64, entity: &'static str, id: impl ToString) -> TimesheetResult<()> {
    if rows == 0 {
        return Err(TimesheetError::not_found(entity, id));
    }
    Ok(())
}

const USER_COLUMNS: &str = "id, email, full_name, role, is_active, password_hash, created_at";

const TIMESHEET_COLUMNS: &str = "id, employee_id, project_code_id, work_date, \
    (hours_worked * 100)::INTEGER AS hours_hundredths, description, status, \
    manager_comments, reviewed_by, reviewed_at, created_at, updated_at";

#[async_trait]
impl StoreTransaction for PgStoreTransaction {
    async fn flush(&mut self) -> TimesheetResult<()> {
        self.conn().map(|_| ())
    }

    async fn commit(&mut self) -> TimesheetResult<()> {
        let Some(tx) = self.tx.take() else {
            return Err(TimesheetError::storage("transaction already finished"));
        };
        tx.commit().await.map_err(db_error)
    }

    async fn rollback(&mut self) -> TimesheetResult<()> {
        match self.tx.take() {
            Some(tx) => tx.rollback().await.map_err(db_error),
            None => Ok(()),
        }
    }

    // Users

    async fn user(&mut self, id: UserId) -> TimesheetResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id.as_i32())
            .fetch_optional(self.conn()?)
            .await
            .map_err(db_error)?;

        row.map(User::try_from).transpose()
    }

    async fn user_by_email(&mut self, email: &str) -> TimesheetResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(self.conn()?)
            .await
            .map_err(db_error)?;

        row.map(User::try_from).transpose()
    }

    async fn users(&mut self) -> TimesheetResult<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id");
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .fetch_all(self.conn()?)
            .await
            .map_err(db_error)?;

        convert_all(rows)
    }

    async fn insert_user(&mut self, user: &NewUser) -> TimesheetResult<User> {
        let sql = format!(
            "INSERT INTO users (email, full_name, role, password_hash) \
             VALUES ($1, $2, $3, $4) RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&user.email)
            .bind(&user.full_name)
            .bind(user.role.to_string())
            .bind(&user.password_hash)
            .fetch_one(self.conn()?)
            .await
            .map_err(db_error)?;

        User::try_from(row)
    }

    async fn set_user_active(&mut self, id: UserId, active: bool) -> TimesheetResult<()> {
        let result = sqlx::query("UPDATE users SET is_active = $2 WHERE id = $1")
            .bind(id.as_i32())
            .bind(active)
            .execute(self.conn()?)
            .await
            .map_err(db_error)?;

        expect_affected(result.rows_affected(), "user", id)
    }

    async fn delete_user(&mut self, id: UserId) -> TimesheetResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.conn()?)
            .await
            .map_err(db_error)?;

        expect_affected(result.rows_affected(), "user", id)
    }

    // Project codes

    async fn project_code(&mut self, id: ProjectCodeId) -> TimesheetResult<Option<ProjectCode>> {
        let row = sqlx::query_as::<_, ProjectCodeRow>(
            r#"
            SELECT id, code, name, is_billable, status
            FROM project_codes
            WHERE id = $1
            "#,
        )
        .bind(id.as_i32())
        .fetch_optional(self.conn()?)
        .await
        .map_err(db_error)?;

        row.map(ProjectCode::try_from).transpose()
    }

    async fn project_codes(&mut self) -> TimesheetResult<Vec<ProjectCode>> {
        let rows = sqlx::query_as::<_, ProjectCodeRow>(
            r#"
            SELECT id, code, name, is_billable, status
            FROM project_codes
            ORDER BY code
            "#,
        )
        .fetch_all(self.conn()?)
        .await
        .map_err(db_error)?;

        convert_all(rows)
    }

    async fn insert_project_code(
        &mut self,
        code: &NewProjectCode,
    ) -> TimesheetResult<ProjectCode> {
        let row = sqlx::query_as::<_, ProjectCodeRow>(
            r#"
            INSERT INTO project_codes (code, name, is_billable)
            VALUES ($1, $2, $3)
            RETURNING id, code, name, is_billable, status
            "#,
        )
        .bind(&code.code)
        .bind(&code.name)
        .bind(code.is_billable)
        .fetch_one(self.conn()?)
        .await
        .map_err(db_error)?;

        ProjectCode::try_from(row)
    }

    async fn set_project_code_status(
        &mut self,
        id: ProjectCodeId,
        status: ProjectCodeStatus,
    ) -> TimesheetResult<()> {
        let result = sqlx::query("UPDATE project_codes SET status = $2 WHERE id = $1")
            .bind(id.as_i32())
            .bind(status.to_string())
            .execute(self.conn()?)
            .await
            .map_err(db_error)?;

        expect_affected(result.rows_affected(), "project code", id)
    }

    async fn delete_project_code(&mut self, id: ProjectCodeId) -> TimesheetResult<()> {
        let result = sqlx::query("DELETE FROM project_codes WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.conn()?)
            .await
            .map_err(db_error)?;

        expect_affected(result.rows_affected(), "project code", id)
    }

    // Assignments

    async fn assignment(&mut self, id: AssignmentId) -> TimesheetResult<Option<ProjectAssignment>> {
        let row = sqlx::query_as::<_, AssignmentRow>(
            r#"
            SELECT id, employee_id, project_code_id, start_date, end_date, assigned_by
            FROM project_assignments
            WHERE id = $1
            "#,
        )
        .bind(id.as_i32())
        .fetch_optional(self.conn()?)
        .await
        .map_err(db_error)?;

        Ok(row.map(ProjectAssignment::from))
    }

    async fn assignments_for(
        &mut self,
        employee_id: UserId,
        project_code_id: ProjectCodeId,
    ) -> TimesheetResult<Vec<ProjectAssignment>> {
        let rows = sqlx::query_as::<_, AssignmentRow>(
            r#"
            SELECT id, employee_id, project_code_id, start_date, end_date, assigned_by
            FROM project_assignments
            WHERE employee_id = $1 AND project_code_id = $2
            ORDER BY start_date, id
            "#,
        )
        .bind(employee_id.as_i32())
        .bind(project_code_id.as_i32())
        .fetch_all(self.conn()?)
        .await
        .map_err(db_error)?;

        Ok(rows.into_iter().map(ProjectAssignment::from).collect())
    }

    async fn assignments_of_employee(
        &mut self,
        employee_id: UserId,
    ) -> TimesheetResult<Vec<ProjectAssignment>> {
        let rows = sqlx::query_as::<_, AssignmentRow>(
            r#"
            SELECT id, employee_id, project_code_id, start_date, end_date, assigned_by
            FROM project_assignments
            WHERE employee_id = $1
            ORDER BY start_date, id
            "#,
        )
        .bind(employee_id.as_i32())
        .fetch_all(self.conn()?)
        .await
        .map_err(db_error)?;

        Ok(rows.into_iter().map(ProjectAssignment::from).collect())
    }

    async fn insert_assignment(
        &mut self,
        assignment: &NewAssignment,
        assigned_by: UserId,
    ) -> TimesheetResult<ProjectAssignment> {
        let row = sqlx::query_as::<_, AssignmentRow>(
            r#"
            INSERT INTO project_assignments (employee_id, project_code_id, start_date, end_date, assigned_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, employee_id, project_code_id, start_date, end_date, assigned_by
            "#,
        )
        .bind(assignment.employee_id.as_i32())
        .bind(assignment.project_code_id.as_i32())
        .bind(assignment.start_date)
        .bind(assignment.end_date)
        .bind(assigned_by.as_i32())
        .fetch_one(self.conn()?)
        .await
        .map_err(db_error)?;

        Ok(row.into())
    }

    async fn set_assignment_end(
        &mut self,
        id: AssignmentId,
        end_date: Option<Date>,
    ) -> TimesheetResult<()> {
        let result = sqlx::query("UPDATE project_assignments SET end_date = $2 WHERE id = $1")
            .bind(id.as_i32())
            .bind(end_date)
            .execute(self.conn()?)
            .await
            .map_err(db_error)?;

        expect_affected(result.rows_affected(), "assignment", id)
    }

    // Timesheets

    async fn timesheet(&mut self, id: TimesheetId) -> TimesheetResult<Option<Timesheet>> {
        let sql = format!("SELECT {TIMESHEET_COLUMNS} FROM timesheets WHERE id = $1");
        let row = sqlx::query_as::<_, TimesheetRow>(&sql)
            .bind(id.as_i32())
            .fetch_optional(self.conn()?)
            .await
            .map_err(db_error)?;

        row.map(Timesheet::try_from).transpose()
    }

    async fn timesheet_for_day(
        &mut self,
        employee_id: UserId,
        project_code_id: ProjectCodeId,
        work_date: Date,
    ) -> TimesheetResult<Option<Timesheet>> {
        let sql = format!(
            "SELECT {TIMESHEET_COLUMNS} FROM timesheets \
             WHERE employee_id = $1 AND project_code_id = $2 AND work_date = $3"
        );
        let row = sqlx::query_as::<_, TimesheetRow>(&sql)
            .bind(employee_id.as_i32())
            .bind(project_code_id.as_i32())
            .bind(work_date)
            .fetch_optional(self.conn()?)
            .await
            .map_err(db_error)?;

        row.map(Timesheet::try_from).transpose()
    }

    async fn timesheets_of_employee(
        &mut self,
        employee_id: UserId,
        from: Date,
        to: Date,
    ) -> TimesheetResult<Vec<Timesheet>> {
        let sql = format!(
            "SELECT {TIMESHEET_COLUMNS} FROM timesheets \
             WHERE employee_id = $1 AND work_date BETWEEN $2 AND $3 \
             ORDER BY work_date, id"
        );
        let rows = sqlx::query_as::<_, TimesheetRow>(&sql)
            .bind(employee_id.as_i32())
            .bind(from)
            .bind(to)
            .fetch_all(self.conn()?)
            .await
            .map_err(db_error)?;

        convert_all(rows)
    }

    async fn timesheets_with_status(
        &mut self,
        status: TimesheetStatus,
    ) -> TimesheetResult<Vec<Timesheet>> {
        let sql = format!(
            "SELECT {TIMESHEET_COLUMNS} FROM timesheets WHERE status = $1 ORDER BY work_date, id"
        );
        let rows = sqlx::query_as::<_, TimesheetRow>(&sql)
            .bind(status.to_string())
            .fetch_all(self.conn()?)
            .await
            .map_err(db_error)?;

        convert_all(rows)
    }

    async fn insert_timesheet(&mut self, timesheet: &NewTimesheet) -> TimesheetResult<Timesheet> {
        let sql = format!(
            "INSERT INTO timesheets \
                (employee_id, project_code_id, work_date, hours_worked, description, status) \
             VALUES ($1, $2, $3, $4::NUMERIC / 100, $5, $6) \
             RETURNING {TIMESHEET_COLUMNS}"
        );
        let entry = &timesheet.entry;
        let row = sqlx::query_as::<_, TimesheetRow>(&sql)
            .bind(timesheet.employee_id.as_i32())
            .bind(entry.project_code_id.as_i32())
            .bind(entry.work_date)
            .bind(entry.hours.hundredths())
            .bind(&entry.description)
            .bind(timesheet.status.to_string())
            .fetch_one(self.conn()?)
            .await
            .map_err(db_error)?;

        Timesheet::try_from(row)
    }

    async fn update_timesheet(&mut self, timesheet: &Timesheet) -> TimesheetResult<Timesheet> {
        let sql = format!(
            "UPDATE timesheets SET \
                project_code_id = $2, \
                work_date = $3, \
                hours_worked = $4::NUMERIC / 100, \
                description = $5, \
                status = $6, \
                manager_comments = $7, \
                reviewed_by = $8, \
                reviewed_at = $9, \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {TIMESHEET_COLUMNS}"
        );
        let row = sqlx::query_as::<_, TimesheetRow>(&sql)
            .bind(timesheet.id.as_i32())
            .bind(timesheet.project_code_id.as_i32())
            .bind(timesheet.work_date)
            .bind(timesheet.hours.hundredths())
            .bind(&timesheet.description)
            .bind(timesheet.status.to_string())
            .bind(&timesheet.manager_comments)
            .bind(timesheet.reviewed_by.map(|id| id.as_i32()))
            .bind(timesheet.reviewed_at)
            .fetch_optional(self.conn()?)
            .await
            .map_err(db_error)?;

        row.ok_or_else(|| TimesheetError::not_found("timesheet", timesheet.id))?
            .try_into()
    }

    async fn delete_timesheet(&mut self, id: TimesheetId) -> TimesheetResult<()> {
        let result = sqlx::query("DELETE FROM timesheets WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.conn()?)
            .await
            .map_err(db_error)?;

        expect_affected(result.rows_affected(), "timesheet", id)
    }
}
