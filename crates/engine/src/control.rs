//! Control primitives shared by the propagation operations
//!
//! - `run_in_new_transaction`: begin, execute, commit or roll back
//! - `run_in_ongoing_transaction`: execute, mark rollback-only on failure
//! - `run_suspended`: suspend, execute, always resume
//!
//! A failure raised by the unit of work is authoritative. Manager failures
//! hit while unwinding from it are attached as suppressed; manager failures
//! hit with nothing in flight are escalated (`TxError::escalate`).
//!
//! Units may also panic. Each primitive arms an `UnwindGuard` around the
//! unit so rollback, rollback-only marking, or resume still happen while
//! the panic propagates.

use crate::engine::PropagationEngine;
use tracing::{debug, warn};
use txprop_core::{ManagerResult, TransactionManager, TxError, TxResult};

/// Runs a cleanup closure only if dropped during a panic
struct UnwindGuard<F: FnOnce()> {
    on_unwind: Option<F>,
}

impl<F: FnOnce()> UnwindGuard<F> {
    fn new(on_unwind: F) -> Self {
        Self {
            on_unwind: Some(on_unwind),
        }
    }

    fn disarm(mut self) {
        self.on_unwind = None;
    }
}

impl<F: FnOnce()> Drop for UnwindGuard<F> {
    fn drop(&mut self) {
        if let Some(on_unwind) = self.on_unwind.take() {
            if std::thread::panicking() {
                on_unwind();
            }
        }
    }
}

impl<M: TransactionManager> PropagationEngine<M> {
    /// Begin a transaction, run `unit` in it, then commit or roll back
    pub(crate) fn run_in_new_transaction<R, F>(&self, unit: F) -> TxResult<R>
    where
        F: FnOnce() -> TxResult<R>,
    {
        self.manager.begin().map_err(TxError::manager)?;
        self.metrics.record_begin();
        debug!(target: "txprop::engine", "Transaction begun");

        let guard = UnwindGuard::new(|| {
            if let Err(e) = self.manager.rollback() {
                warn!(target: "txprop::engine", error = %e, "Rollback after panic failed");
            }
        });
        let outcome = unit();
        guard.disarm();

        match outcome {
            Ok(value) => {
                self.commit()?;
                Ok(value)
            }
            Err(error) => Err(self.rollback_and_rethrow(error)),
        }
    }

    /// Run `unit` inside the active transaction
    ///
    /// Never commits or rolls back: the caller that began the transaction
    /// owns the outcome.
    pub(crate) fn run_in_ongoing_transaction<R, F>(&self, unit: F) -> TxResult<R>
    where
        F: FnOnce() -> TxResult<R>,
    {
        let transaction = self
            .manager
            .transaction()
            .map_err(TxError::transactional)?;

        let guard = UnwindGuard::new(|| {
            if let Err(e) = self.mark_rollback_only(transaction.as_ref()) {
                warn!(target: "txprop::engine", error = %e, "Rollback-only marking after panic failed");
            }
        });
        let outcome = unit();
        guard.disarm();

        outcome.map_err(|mut error| {
            if let Err(e) = self.mark_rollback_only(transaction.as_ref()) {
                warn!(target: "txprop::engine", error = %e, "Rollback-only marking failed; suppressed");
                error.add_suppressed(e);
            }
            error
        })
    }

    /// Suspend the ambient transaction, run `unit`, then resume it
    ///
    /// Resume runs on every exit path.
    pub(crate) fn run_suspended<R, F>(&self, unit: F) -> TxResult<R>
    where
        F: FnOnce() -> TxResult<R>,
    {
        let suspended = self.manager.suspend().map_err(TxError::transactional)?;
        if suspended.is_some() {
            self.metrics.record_suspend();
            debug!(target: "txprop::engine", "Transaction suspended");
        }

        let guard = UnwindGuard::new(|| {
            if let Some(transaction) = &suspended {
                if let Err(e) = self.manager.resume(transaction.clone()) {
                    warn!(target: "txprop::engine", error = %e, "Resume after panic failed");
                }
            }
        });
        let outcome = unit();
        guard.disarm();

        let transaction = match suspended {
            Some(transaction) => transaction,
            None => return outcome,
        };

        match (outcome, self.resume(transaction)) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(TxError::escalate(e)),
            (Err(error), Ok(())) => Err(error),
            (Err(mut error), Err(e)) => {
                warn!(target: "txprop::engine", error = %e, "Resume failed; suppressed");
                error.add_suppressed(e);
                Err(error)
            }
        }
    }

    fn commit(&self) -> TxResult<()> {
        match self.manager.commit() {
            Ok(()) => {
                self.metrics.record_commit();
                debug!(target: "txprop::engine", "Transaction committed");
                Ok(())
            }
            Err(e) => {
                self.metrics.record_commit_failure();
                warn!(
                    target: "txprop::engine",
                    error = %e,
                    heuristic = e.is_heuristic(),
                    "Commit failed"
                );
                Err(TxError::escalate(e))
            }
        }
    }

    fn rollback_and_rethrow(&self, mut error: TxError) -> TxError {
        match self.manager.rollback() {
            Ok(()) => {
                self.metrics.record_rollback();
                debug!(target: "txprop::engine", cause = %error, "Transaction rolled back");
            }
            Err(e) => {
                warn!(target: "txprop::engine", error = %e, "Rollback failed; suppressed");
                error.add_suppressed(e);
            }
        }
        error
    }

    fn mark_rollback_only(&self, transaction: Option<&M::Transaction>) -> ManagerResult<()> {
        let marked = match transaction {
            Some(transaction) => self.manager.set_rollback_only_for(transaction),
            None => self.manager.set_rollback_only(),
        };
        marked?;
        self.metrics.record_rollback_only();
        debug!(target: "txprop::engine", "Transaction marked rollback-only");
        Ok(())
    }

    fn resume(&self, transaction: M::Transaction) -> ManagerResult<()> {
        self.manager.resume(transaction)?;
        self.metrics.record_resume();
        debug!(target: "txprop::engine", "Transaction resumed");
        Ok(())
    }
}
