//! In-memory transaction manager
//!
//! Associates at most one transaction with each thread. State lives in two
//! maps:
//! - `associations`: thread → id of the transaction currently attached
//! - `transactions`: id → status and whether some thread holds it
//!
//! ## Lifecycle
//!
//! ```text
//! begin()    → Active, associated with the calling thread
//! suspend()  → detached; the handle is the only way back
//! resume(h)  → reattached to the calling thread
//! set_rollback_only() → MarkedRollback
//! commit()   → Committed, or RolledBack + Err(RolledBack) if marked
//! rollback() → RolledBack
//! ```
//!
//! Commit and rollback drop the transaction from `transactions`; a handle
//! to a completed transaction no longer resolves. Outcomes remain visible
//! in the journal. Injected faults are checked before any state change and
//! leave the manager untouched.

use crate::fault::{FaultPlan, ManagerOp};
use crate::journal::{Journal, ManagerEvent};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, ThreadId};
use tracing::debug;
use txprop_core::{ManagerError, ManagerResult, Status, TransactionManager};

/// Handle to a transaction owned by `LocalTransactionManager`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalTransaction {
    id: u64,
}

impl LocalTransaction {
    /// Unique transaction id
    pub fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug, Clone, Copy)]
struct TxnState {
    status: Status,
    associated: bool,
}

/// Thread-associated transaction manager
///
/// Safe to share between threads; each thread sees only its own ambient
/// transaction.
pub struct LocalTransactionManager {
    /// Next transaction ID
    next_txn_id: AtomicU64,
    associations: DashMap<ThreadId, u64>,
    transactions: DashMap<u64, TxnState>,
    journal: Journal,
    faults: FaultPlan,
}

impl LocalTransactionManager {
    /// Create a new manager
    pub fn new() -> Self {
        Self::with_txn_id(0)
    }

    /// Create a manager whose transaction ids start after `max_txn_id`
    pub fn with_txn_id(max_txn_id: u64) -> Self {
        LocalTransactionManager {
            next_txn_id: AtomicU64::new(max_txn_id + 1),
            associations: DashMap::new(),
            transactions: DashMap::new(),
            journal: Journal::new(),
            faults: FaultPlan::new(),
        }
    }

    /// Recorded lifecycle calls
    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Queued fault injections
    pub fn faults(&self) -> &FaultPlan {
        &self.faults
    }

    /// Fail the next call of `op` with `error`
    pub fn fail_next(&self, op: ManagerOp, error: ManagerError) {
        self.faults.fail_next(op, error);
    }

    /// Status of a transaction that has not completed yet
    pub fn transaction_status(&self, transaction: &LocalTransaction) -> Option<Status> {
        self.transactions.get(&transaction.id).map(|s| s.status)
    }

    /// Number of threads currently associated with a transaction
    pub fn associated_count(&self) -> usize {
        self.associations.len()
    }

    /// Number of begun transactions not yet committed or rolled back
    pub fn live_count(&self) -> usize {
        self.transactions.len()
    }

    fn allocate_txn_id(&self) -> u64 {
        self.next_txn_id.fetch_add(1, Ordering::SeqCst)
    }

    fn context() -> ThreadId {
        thread::current().id()
    }

    fn current_id(&self) -> Option<u64> {
        self.associations.get(&Self::context()).map(|r| *r)
    }

    fn detach_current(&self) -> ManagerResult<u64> {
        let id = self
            .associations
            .remove(&Self::context())
            .map(|(_, id)| id)
            .ok_or(ManagerError::NotActive)?;
        let mut state = self.transactions.get_mut(&id).ok_or_else(|| {
            ManagerError::system(format!("associated transaction {} is not registered", id))
        })?;
        state.associated = false;
        Ok(id)
    }

    fn mark_rollback_only(&self, id: u64) -> ManagerResult<()> {
        {
            let mut state = self
                .transactions
                .get_mut(&id)
                .ok_or(ManagerError::NotActive)?;
            state.status = Status::MarkedRollback;
        }
        self.journal.record(ManagerEvent::MarkedRollbackOnly(id));
        debug!(target: "txprop::manager", txn_id = id, "Transaction marked rollback-only");
        Ok(())
    }

    fn forget(&self, id: u64) -> Option<Status> {
        self.transactions.remove(&id).map(|(_, state)| state.status)
    }
}

impl Default for LocalTransactionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionManager for LocalTransactionManager {
    type Transaction = LocalTransaction;

    fn status(&self) -> ManagerResult<Status> {
        self.faults.check(ManagerOp::Status)?;
        Ok(self
            .current_id()
            .and_then(|id| self.transactions.get(&id).map(|s| s.status))
            .unwrap_or(Status::NoTransaction))
    }

    fn transaction(&self) -> ManagerResult<Option<LocalTransaction>> {
        self.faults.check(ManagerOp::Transaction)?;
        Ok(self.current_id().map(|id| LocalTransaction { id }))
    }

    fn begin(&self) -> ManagerResult<()> {
        self.faults.check(ManagerOp::Begin)?;
        let context = Self::context();
        if self.associations.contains_key(&context) {
            return Err(ManagerError::UnsupportedNesting);
        }

        let id = self.allocate_txn_id();
        self.transactions.insert(
            id,
            TxnState {
                status: Status::Active,
                associated: true,
            },
        );
        self.associations.insert(context, id);
        self.journal.record(ManagerEvent::Begun(id));
        debug!(target: "txprop::manager", txn_id = id, "Transaction begun");
        Ok(())
    }

    fn commit(&self) -> ManagerResult<()> {
        self.faults.check(ManagerOp::Commit)?;
        let id = self.detach_current()?;

        if self.forget(id) == Some(Status::MarkedRollback) {
            self.journal.record(ManagerEvent::RolledBack(id));
            debug!(target: "txprop::manager", txn_id = id, "Rollback-only transaction rolled back on commit");
            return Err(ManagerError::RolledBack);
        }

        self.journal.record(ManagerEvent::Committed(id));
        debug!(target: "txprop::manager", txn_id = id, "Transaction committed");
        Ok(())
    }

    fn rollback(&self) -> ManagerResult<()> {
        self.faults.check(ManagerOp::Rollback)?;
        let id = self.detach_current()?;
        self.forget(id);
        self.journal.record(ManagerEvent::RolledBack(id));
        debug!(target: "txprop::manager", txn_id = id, "Transaction rolled back");
        Ok(())
    }

    fn suspend(&self) -> ManagerResult<Option<LocalTransaction>> {
        self.faults.check(ManagerOp::Suspend)?;
        if self.current_id().is_none() {
            return Ok(None);
        }
        let id = self.detach_current()?;
        self.journal.record(ManagerEvent::Suspended(id));
        debug!(target: "txprop::manager", txn_id = id, "Transaction suspended");
        Ok(Some(LocalTransaction { id }))
    }

    fn resume(&self, transaction: LocalTransaction) -> ManagerResult<()> {
        self.faults.check(ManagerOp::Resume)?;
        let context = Self::context();
        if self.associations.contains_key(&context) {
            return Err(ManagerError::AlreadyAssociated);
        }

        {
            let mut state = self
                .transactions
                .get_mut(&transaction.id)
                .ok_or(ManagerError::InvalidHandle)?;
            if state.associated {
                return Err(ManagerError::InvalidHandle);
            }
            state.associated = true;
        }
        self.associations.insert(context, transaction.id);
        self.journal.record(ManagerEvent::Resumed(transaction.id));
        debug!(target: "txprop::manager", txn_id = transaction.id, "Transaction resumed");
        Ok(())
    }

    fn set_rollback_only(&self) -> ManagerResult<()> {
        self.faults.check(ManagerOp::SetRollbackOnly)?;
        let id = self.current_id().ok_or(ManagerError::NotActive)?;
        self.mark_rollback_only(id)
    }

    fn set_rollback_only_for(&self, transaction: &LocalTransaction) -> ManagerResult<()> {
        self.faults.check(ManagerOp::SetRollbackOnly)?;
        self.mark_rollback_only(transaction.id)
    }
}
