//! Journal of transaction lifecycle calls
//!
//! Every successful state change made by `LocalTransactionManager` is
//! appended here in call order. Tests use it to assert exactly-once commit
//! and rollback, and suspend/resume pairing.

use parking_lot::Mutex;

/// One recorded lifecycle call, tagged with the transaction id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerEvent {
    /// Transaction began
    Begun(u64),
    /// Transaction committed
    Committed(u64),
    /// Transaction rolled back (explicitly, or on commit of a rollback-only transaction)
    RolledBack(u64),
    /// Transaction detached from its context
    Suspended(u64),
    /// Transaction reattached to a context
    Resumed(u64),
    /// Transaction marked rollback-only
    MarkedRollbackOnly(u64),
}

impl ManagerEvent {
    /// Transaction the event refers to
    pub fn txn_id(&self) -> u64 {
        match *self {
            ManagerEvent::Begun(id)
            | ManagerEvent::Committed(id)
            | ManagerEvent::RolledBack(id)
            | ManagerEvent::Suspended(id)
            | ManagerEvent::Resumed(id)
            | ManagerEvent::MarkedRollbackOnly(id) => id,
        }
    }
}

/// Append-only event log
#[derive(Debug, Default)]
pub struct Journal {
    events: Mutex<Vec<ManagerEvent>>,
}

impl Journal {
    /// Create an empty journal
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event
    pub fn record(&self, event: ManagerEvent) {
        self.events.lock().push(event);
    }

    /// Copy of all events in call order
    pub fn events(&self) -> Vec<ManagerEvent> {
        self.events.lock().clone()
    }

    /// Count events matching a predicate
    pub fn count(&self, predicate: impl Fn(&ManagerEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|e| predicate(e)).count()
    }

    /// Events recorded for one transaction, in call order
    pub fn for_txn(&self, txn_id: u64) -> Vec<ManagerEvent> {
        self.events
            .lock()
            .iter()
            .copied()
            .filter(|e| e.txn_id() == txn_id)
            .collect()
    }

    /// Remove all events
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}
