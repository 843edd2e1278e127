use std::sync::Arc;

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::domain::{
    models::{Review, Timesheet, TimesheetAction, TimesheetId, TimesheetStatus},
    ports::{
        inbound::ApprovalService,
        outbound::{StoreTransaction, TimesheetStore},
    },
    ActorContext, TimesheetError, TimesheetResult,
};

use super::UnitOfWork;

/// Policy deciding whether a timesheet may be reviewed in its current state.
pub trait ApprovalStrategy: Send + Sync + 'static {
    fn can_approve(&self, timesheet: &Timesheet) -> bool;

    fn can_reject(&self, timesheet: &Timesheet, comments: &str) -> bool;
}

/// Only Submitted timesheets can be reviewed; rejections need a comment.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultApprovalStrategy;

impl ApprovalStrategy for DefaultApprovalStrategy {
    fn can_approve(&self, timesheet: &Timesheet) -> bool {
        timesheet.status == TimesheetStatus::Submitted
    }

    fn can_reject(&self, timesheet: &Timesheet, comments: &str) -> bool {
        timesheet.status == TimesheetStatus::Submitted && !comments.trim().is_empty()
    }
}

/// Implementation of the ApprovalService inbound port.
pub struct ApprovalServiceImpl<S, P = DefaultApprovalStrategy> {
    store: Arc<S>,
    strategy: P,
}

impl<S: TimesheetStore> ApprovalServiceImpl<S, DefaultApprovalStrategy> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            strategy: DefaultApprovalStrategy,
        }
    }
}

impl<S: TimesheetStore, P: ApprovalStrategy> ApprovalServiceImpl<S, P> {
    pub fn with_strategy(store: Arc<S>, strategy: P) -> Self {
        Self { store, strategy }
    }

    async fn review(
        &self,
        actor: &ActorContext,
        id: TimesheetId,
        action: TimesheetAction,
        comments: Option<String>,
    ) -> TimesheetResult<Timesheet> {
        let mut uow = UnitOfWork::start(self.store.clone()).await?;
        let result = self.review_in(uow.tx()?, actor, id, action, comments).await;
        uow.finish(result).await
    }

    async fn review_in<T: StoreTransaction>(
        &self,
        tx: &mut T,
        actor: &ActorContext,
        id: TimesheetId,
        action: TimesheetAction,
        comments: Option<String>,
    ) -> TimesheetResult<Timesheet> {
        let mut timesheet = tx
            .timesheet(id)
            .await?
            .ok_or_else(|| TimesheetError::not_found("timesheet", id))?;

        if timesheet.employee_id == actor.user_id {
            return Err(TimesheetError::forbidden(
                "managers cannot review their own timesheets",
            ));
        }

        let allowed = match action {
            TimesheetAction::Approve => self.strategy.can_approve(&timesheet),
            TimesheetAction::Reject => self
                .strategy
                .can_reject(&timesheet, comments.as_deref().unwrap_or_default()),
            TimesheetAction::Edit | TimesheetAction::Delete | TimesheetAction::Submit => false,
        };
        if !allowed {
            return Err(TimesheetError::invalid_state(format!(
                "cannot {action} a timesheet that is {}",
                timesheet.status.to_string().to_lowercase()
            )));
        }

        let status = timesheet.status.require(action)?;
        timesheet.apply_review(Review {
            status,
            reviewer: actor.user_id,
            comments,
            reviewed_at: OffsetDateTime::now_utc(),
        });

        let timesheet = tx.update_timesheet(&timesheet).await?;
        tracing::info!(
            timesheet_id = %timesheet.id,
            reviewer = %actor.user_id,
            status = %timesheet.status,
            "reviewed timesheet"
        );
        Ok(timesheet)
    }
}

fn ensure_manager(actor: &ActorContext) -> TimesheetResult<()> {
    if !actor.is_manager() {
        return Err(TimesheetError::forbidden("only managers can review timesheets"));
    }
    Ok(())
}

/// Trimmed comment, `None` when blank.
fn normalize(comments: &str) -> Option<String> {
    let trimmed = comments.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[async_trait]
impl<S: TimesheetStore, P: ApprovalStrategy> ApprovalService for ApprovalServiceImpl<S, P> {
    async fn approve(
        &self,
        actor: &ActorContext,
        id: TimesheetId,
        comments: Option<String>,
    ) -> TimesheetResult<Timesheet> {
        ensure_manager(actor)?;
        let comments = comments.as_deref().and_then(normalize);
        self.review(actor, id, TimesheetAction::Approve, comments)
            .await
    }

    async fn reject(
        &self,
        actor: &ActorContext,
        id: TimesheetId,
        comments: &str,
    ) -> TimesheetResult<Timesheet> {
        ensure_manager(actor)?;
        let Some(comments) = normalize(comments) else {
            return Err(TimesheetError::validation(
                "a comment is required when rejecting a timesheet",
            ));
        };

        self.review(actor, id, TimesheetAction::Reject, Some(comments))
            .await
    }

    async fn pending(&self, actor: &ActorContext) -> TimesheetResult<Vec<Timesheet>> {
        ensure_manager(actor)?;

        let mut uow = UnitOfWork::start(self.store.clone()).await?;
        let result = uow
            .tx()?
            .timesheets_with_status(TimesheetStatus::Submitted)
            .await;
        uow.finish(result).await
    }
}
