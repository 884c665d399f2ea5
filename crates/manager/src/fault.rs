//! One-shot fault injection
//!
//! Tests queue manager failures per operation; the next call of that
//! operation pops and returns the failure before touching any state.

use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use txprop_core::{ManagerError, ManagerResult};

/// Transaction manager operations that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManagerOp {
    /// `status()`
    Status,
    /// `transaction()`
    Transaction,
    /// `begin()`
    Begin,
    /// `commit()`
    Commit,
    /// `rollback()`
    Rollback,
    /// `suspend()`
    Suspend,
    /// `resume()`
    Resume,
    /// `set_rollback_only()` and `set_rollback_only_for()`
    SetRollbackOnly,
}

/// Queued failures, consumed in FIFO order per operation
#[derive(Debug, Default)]
pub struct FaultPlan {
    pending: Mutex<HashMap<ManagerOp, VecDeque<ManagerError>>>,
}

impl FaultPlan {
    /// Create an empty plan
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next call of `op` with `error`
    pub fn fail_next(&self, op: ManagerOp, error: ManagerError) {
        self.pending.lock().entry(op).or_default().push_back(error);
    }

    /// Pop the next queued failure for `op`
    pub fn check(&self, op: ManagerOp) -> ManagerResult<()> {
        let mut pending = self.pending.lock();
        match pending.get_mut(&op).and_then(VecDeque::pop_front) {
            Some(error) => {
                tracing::debug!(target: "txprop::manager", ?op, %error, "Injected fault");
                Err(error)
            }
            None => Ok(()),
        }
    }

    /// Number of queued failures across all operations
    pub fn pending(&self) -> usize {
        self.pending.lock().values().map(VecDeque::len).sum()
    }

    /// Drop every queued failure
    pub fn clear(&self) {
        self.pending.lock().clear();
    }
}
