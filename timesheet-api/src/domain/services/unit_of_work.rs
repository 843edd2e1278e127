use std::sync::Arc;

use crate::domain::{
    ports::outbound::{StoreTransaction, TimesheetStore},
    TimesheetError, TimesheetResult,
};

/// Transactional boundary grouping several entity writes into one commit.
///
/// Holds at most one open store transaction. Dropping a unit of work with an
/// open transaction discards it.
pub struct UnitOfWork<S: TimesheetStore> {
    store: Arc<S>,
    tx: Option<S::Tx>,
}

impl<S: TimesheetStore> UnitOfWork<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store, tx: None }
    }

    /// Create a unit of work and begin its transaction.
    pub async fn start(store: Arc<S>) -> TimesheetResult<Self> {
        let mut uow = Self::new(store);
        uow.begin().await?;
        Ok(uow)
    }

    pub fn is_active(&self) -> bool {
        self.tx.is_some()
    }

    pub async fn begin(&mut self) -> TimesheetResult<()> {
        if self.tx.is_some() {
            return Err(TimesheetError::invalid_state(
                "unit of work already has an active transaction",
            ));
        }

        self.tx = Some(self.store.begin().await?);
        Ok(())
    }

    /// The open transaction.
    pub fn tx(&mut self) -> TimesheetResult<&mut S::Tx> {
        self.tx
            .as_mut()
            .ok_or_else(|| TimesheetError::invalid_state("unit of work has no active transaction"))
    }

    /// Flush pending writes without committing.
    pub async fn complete(&mut self) -> TimesheetResult<()> {
        self.tx()?.flush().await
    }

    /// Flush and commit. On failure the transaction is rolled back before the
    /// error is returned.
    pub async fn commit(&mut self) -> TimesheetResult<()> {
        let Some(mut tx) = self.tx.take() else {
            return Err(TimesheetError::invalid_state(
                "unit of work has no active transaction",
            ));
        };

        let result = match tx.flush().await {
            Ok(()) => tx.commit().await,
            Err(e) => Err(e),
        };

        if let Err(err) = result {
            tracing::warn!(error = %err, "commit failed, rolling back");
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!(error = %rollback_err, "rollback after failed commit failed");
            }
            return Err(err);
        }

        Ok(())
    }

    /// Discard pending writes. A no-op without an active transaction.
    ///
    /// The transaction is released even when the store reports an error.
    pub async fn rollback(&mut self) -> TimesheetResult<()> {
        match self.tx.take() {
            Some(mut tx) => tx.rollback().await,
            None => Ok(()),
        }
    }

    /// Commit when `result` is `Ok`, roll back otherwise.
    ///
    /// A rollback failure is logged; the caller sees the original error.
    pub async fn finish<T>(mut self, result: TimesheetResult<T>) -> TimesheetResult<T> {
        match result {
            Ok(value) => {
                self.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.rollback().await {
                    tracing::error!(error = %rollback_err, "rollback failed");
                }
                Err(err)
            }
        }
    }
}
