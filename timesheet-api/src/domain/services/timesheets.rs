use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
use itertools::Itertools;
use time::Date;

use crate::domain::{
    models::{
        Hours, NewTimesheet, Timesheet, TimesheetAction, TimesheetEntry, TimesheetId,
        TimesheetStatus, UserId,
    },
    ports::{
        inbound::TimesheetService,
        outbound::{StoreTransaction, TimesheetStore},
    },
    ActorContext, TimesheetError, TimesheetResult,
};

use super::{assignment_validator::check_in, UnitOfWork};

/// Implementation of the TimesheetService inbound port.
///
/// Holds the timesheet rules: per-entry hour range, daily cap, duplicate
/// prevention, assignment gate and status transitions. Each call runs in
/// one unit of work.
pub struct TimesheetServiceImpl<S> {
    store: Arc<S>,
}

impl<S: TimesheetStore> TimesheetServiceImpl<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: TimesheetStore> TimesheetService for TimesheetServiceImpl<S> {
    async fn create_timesheet(
        &self,
        actor: &ActorContext,
        employee_id: UserId,
        entry: &TimesheetEntry,
    ) -> TimesheetResult<Timesheet> {
        let mut uow = UnitOfWork::start(self.store.clone()).await?;
        let result = create_in(uow.tx()?, actor, employee_id, entry).await;
        let timesheet = uow.finish(result).await?;

        tracing::info!(
            timesheet_id = %timesheet.id,
            employee_id = %employee_id,
            work_date = %timesheet.work_date,
            "created draft timesheet"
        );
        Ok(timesheet)
    }

    async fn update_timesheet(
        &self,
        actor: &ActorContext,
        id: TimesheetId,
        entry: &TimesheetEntry,
    ) -> TimesheetResult<Timesheet> {
        let mut uow = UnitOfWork::start(self.store.clone()).await?;
        let result = update_in(uow.tx()?, actor, id, entry).await;
        uow.finish(result).await
    }

    async fn submit_timesheet(
        &self,
        actor: &ActorContext,
        id: TimesheetId,
    ) -> TimesheetResult<Timesheet> {
        let mut uow = UnitOfWork::start(self.store.clone()).await?;
        let result = submit_in(uow.tx()?, actor, id).await;
        let timesheet = uow.finish(result).await?;

        tracing::info!(timesheet_id = %id, "submitted timesheet");
        Ok(timesheet)
    }

    async fn delete_timesheet(&self, actor: &ActorContext, id: TimesheetId) -> TimesheetResult<()> {
        let mut uow = UnitOfWork::start(self.store.clone()).await?;
        let result = delete_in(uow.tx()?, actor, id).await;
        uow.finish(result).await?;

        tracing::info!(timesheet_id = %id, "deleted draft timesheet");
        Ok(())
    }

    async fn submit_week(
        &self,
        actor: &ActorContext,
        employee_id: UserId,
        entries: &[TimesheetEntry],
    ) -> TimesheetResult<Vec<Timesheet>> {
        let mut uow = UnitOfWork::start(self.store.clone()).await?;
        let result = submit_week_in(uow.tx()?, actor, employee_id, entries).await;
        let timesheets = uow.finish(result).await?;

        tracing::info!(
            employee_id = %employee_id,
            count = timesheets.len(),
            "submitted timesheet batch"
        );
        Ok(timesheets)
    }

    async fn get_timesheet(
        &self,
        actor: &ActorContext,
        id: TimesheetId,
    ) -> TimesheetResult<Timesheet> {
        let mut uow = UnitOfWork::start(self.store.clone()).await?;
        let result = load(uow.tx()?, id).await.and_then(|timesheet| {
            if actor.can_view(timesheet.employee_id) {
                Ok(timesheet)
            } else {
                Err(TimesheetError::forbidden(
                    "timesheets are only visible to their owner and managers",
                ))
            }
        });
        uow.finish(result).await
    }

    async fn list_timesheets(
        &self,
        actor: &ActorContext,
        employee_id: UserId,
        from: Date,
        to: Date,
    ) -> TimesheetResult<Vec<Timesheet>> {
        if !actor.can_view(employee_id) {
            return Err(TimesheetError::forbidden(
                "timesheets are only visible to their owner and managers",
            ));
        }
        if from > to {
            return Err(TimesheetError::validation("date range start is after its end"));
        }

        let mut uow = UnitOfWork::start(self.store.clone()).await?;
        let result = uow.tx()?.timesheets_of_employee(employee_id, from, to).await;
        uow.finish(result).await
    }
}

fn ensure_owner(actor: &ActorContext, employee_id: UserId) -> TimesheetResult<()> {
    if actor.user_id != employee_id {
        return Err(TimesheetError::forbidden(
            "timesheets can only be changed by their owner",
        ));
    }
    Ok(())
}

async fn load<T: StoreTransaction>(tx: &mut T, id: TimesheetId) -> TimesheetResult<Timesheet> {
    tx.timesheet(id)
        .await?
        .ok_or_else(|| TimesheetError::not_found("timesheet", id))
}

/// Checks shared by create, update and batch submission.
///
/// `own_id` is the timesheet being edited, which may keep its own slot.
async fn validate_entry<T: StoreTransaction>(
    tx: &mut T,
    employee_id: UserId,
    entry: &TimesheetEntry,
    own_id: Option<TimesheetId>,
) -> TimesheetResult<()> {
    if !entry.hours.is_valid_entry() {
        return Err(TimesheetError::validation(format!(
            "hours worked must be greater than 0 and at most 24, got {}",
            entry.hours
        )));
    }

    let project_code = tx
        .project_code(entry.project_code_id)
        .await?
        .ok_or_else(|| TimesheetError::not_found("project code", entry.project_code_id))?;
    if !project_code.is_active() {
        return Err(TimesheetError::validation(format!(
            "project code {} is inactive",
            project_code.code
        )));
    }

    ensure_assigned(tx, employee_id, entry, &project_code.code).await?;

    if let Some(existing) = tx
        .timesheet_for_day(employee_id, entry.project_code_id, entry.work_date)
        .await?
    {
        if Some(existing.id) != own_id {
            return Err(TimesheetError::conflict(format!(
                "a timesheet for project code {} on {} already exists",
                project_code.code, entry.work_date
            )));
        }
    }

    Ok(())
}

async fn ensure_assigned<T: StoreTransaction>(
    tx: &mut T,
    employee_id: UserId,
    entry: &TimesheetEntry,
    code: &str,
) -> TimesheetResult<()> {
    if !check_in(tx, employee_id, entry.project_code_id, entry.work_date).await? {
        return Err(TimesheetError::validation(format!(
            "employee {employee_id} is not assigned to project code {code} on {}",
            entry.work_date
        )));
    }
    Ok(())
}

/// The employee's hours on `date` across all projects must not exceed 24.
async fn check_daily_cap<T: StoreTransaction>(
    tx: &mut T,
    employee_id: UserId,
    date: Date,
) -> TimesheetResult<()> {
    let total: Hours = tx
        .timesheets_of_employee(employee_id, date, date)
        .await?
        .iter()
        .map(Timesheet::counted_hours)
        .sum();

    if total > Hours::MAX_PER_DAY {
        return Err(TimesheetError::validation(format!(
            "total of {total} hours on {date} exceeds the daily limit of {}",
            Hours::MAX_PER_DAY
        )));
    }
    Ok(())
}

async fn create_in<T: StoreTransaction>(
    tx: &mut T,
    actor: &ActorContext,
    employee_id: UserId,
    entry: &TimesheetEntry,
) -> TimesheetResult<Timesheet> {
    ensure_owner(actor, employee_id)?;
    validate_entry(tx, employee_id, entry, None).await?;

    tx.insert_timesheet(&NewTimesheet {
        employee_id,
        entry: entry.clone(),
        status: TimesheetStatus::Draft,
    })
    .await
}

async fn update_in<T: StoreTransaction>(
    tx: &mut T,
    actor: &ActorContext,
    id: TimesheetId,
    entry: &TimesheetEntry,
) -> TimesheetResult<Timesheet> {
    let mut timesheet = load(tx, id).await?;
    ensure_owner(actor, timesheet.employee_id)?;
    timesheet.status = timesheet.status.require(TimesheetAction::Edit)?;
    validate_entry(tx, timesheet.employee_id, entry, Some(id)).await?;

    timesheet.apply_entry(entry);
    tx.update_timesheet(&timesheet).await
}

async fn submit_in<T: StoreTransaction>(
    tx: &mut T,
    actor: &ActorContext,
    id: TimesheetId,
) -> TimesheetResult<Timesheet> {
    let mut timesheet = load(tx, id).await?;
    ensure_owner(actor, timesheet.employee_id)?;
    let next = timesheet.status.require(TimesheetAction::Submit)?;

    let entry = TimesheetEntry::new(timesheet.project_code_id, timesheet.work_date, timesheet.hours);
    let code = tx
        .project_code(timesheet.project_code_id)
        .await?
        .map(|p| p.code)
        .unwrap_or_else(|| timesheet.project_code_id.to_string());
    ensure_assigned(tx, timesheet.employee_id, &entry, &code).await?;

    timesheet.status = next;
    let timesheet = tx.update_timesheet(&timesheet).await?;
    check_daily_cap(tx, timesheet.employee_id, timesheet.work_date).await?;

    Ok(timesheet)
}

async fn delete_in<T: StoreTransaction>(
    tx: &mut T,
    actor: &ActorContext,
    id: TimesheetId,
) -> TimesheetResult<()> {
    let timesheet = load(tx, id).await?;
    ensure_owner(actor, timesheet.employee_id)?;
    timesheet.status.require(TimesheetAction::Delete)?;

    tx.delete_timesheet(id).await
}

async fn submit_week_in<T: StoreTransaction>(
    tx: &mut T,
    actor: &ActorContext,
    employee_id: UserId,
    entries: &[TimesheetEntry],
) -> TimesheetResult<Vec<Timesheet>> {
    ensure_owner(actor, employee_id)?;
    if entries.is_empty() {
        return Err(TimesheetError::validation("no entries to submit"));
    }

    let mut seen = HashSet::new();
    for (index, entry) in entries.iter().enumerate() {
        if !seen.insert((entry.project_code_id, entry.work_date)) {
            return Err(TimesheetError::conflict(format!(
                "duplicate entry for project code {} on {} in batch",
                entry.project_code_id, entry.work_date
            ))
            .for_entry(index));
        }
        validate_entry(tx, employee_id, entry, None)
            .await
            .map_err(|e| e.for_entry(index))?;
    }

    let status = TimesheetStatus::Draft.require(TimesheetAction::Submit)?;
    let mut created = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let timesheet = tx
            .insert_timesheet(&NewTimesheet {
                employee_id,
                entry: entry.clone(),
                status,
            })
            .await
            .map_err(|e| e.for_entry(index))?;
        created.push(timesheet);
    }

    let dates: Vec<Date> = entries.iter().map(|e| e.work_date).unique().collect();
    for date in dates {
        check_daily_cap(tx, employee_id, date).await?;
    }

    Ok(created)
}
