//! Propagation metrics
//!
//! Counters for the transaction lifecycle calls the engine issues.
//!
//! # Memory Ordering
//!
//! All counters use Relaxed ordering: they are observational only and do
//! not synchronize any other memory operations.

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters owned by a `PropagationEngine`
#[derive(Debug, Default)]
pub(crate) struct MetricsRecorder {
    enabled: bool,
    begun: AtomicU64,
    committed: AtomicU64,
    rolled_back: AtomicU64,
    commit_failures: AtomicU64,
    marked_rollback_only: AtomicU64,
    suspended: AtomicU64,
    resumed: AtomicU64,
    illegal_state: AtomicU64,
}

macro_rules! recorder {
    ($($name:ident => $field:ident),* $(,)?) => {
        $(
            pub(crate) fn $name(&self) {
                if self.enabled {
                    self.$field.fetch_add(1, Ordering::Relaxed);
                }
            }
        )*
    };
}

impl MetricsRecorder {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Self::default()
        }
    }

    recorder! {
        record_begin => begun,
        record_commit => committed,
        record_rollback => rolled_back,
        record_commit_failure => commit_failures,
        record_rollback_only => marked_rollback_only,
        record_suspend => suspended,
        record_resume => resumed,
        record_illegal_state => illegal_state,
    }

    pub(crate) fn snapshot(&self) -> PropagationMetrics {
        PropagationMetrics {
            begun: self.begun.load(Ordering::Relaxed),
            committed: self.committed.load(Ordering::Relaxed),
            rolled_back: self.rolled_back.load(Ordering::Relaxed),
            commit_failures: self.commit_failures.load(Ordering::Relaxed),
            marked_rollback_only: self.marked_rollback_only.load(Ordering::Relaxed),
            suspended: self.suspended.load(Ordering::Relaxed),
            resumed: self.resumed.load(Ordering::Relaxed),
            illegal_state: self.illegal_state.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of engine counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropagationMetrics {
    /// Transactions begun by the engine
    pub begun: u64,
    /// Commits that succeeded
    pub committed: u64,
    /// Rollbacks that succeeded
    pub rolled_back: u64,
    /// Commits that failed (including rollback-only transactions)
    pub commit_failures: u64,
    /// Ongoing transactions marked rollback-only after a unit failure
    pub marked_rollback_only: u64,
    /// Suspends issued
    pub suspended: u64,
    /// Resumes that succeeded
    pub resumed: u64,
    /// Operations refused because of the ambient status
    pub illegal_state: u64,
}

impl PropagationMetrics {
    /// Transactions the engine saw commit or roll back
    ///
    /// Failed commits are not counted: a manager may report a commit
    /// failure and still hold the transaction open.
    pub fn completed(&self) -> u64 {
        self.committed + self.rolled_back
    }

    /// Commit success rate (committed / begun)
    pub fn commit_rate(&self) -> f64 {
        if self.begun > 0 {
            self.committed as f64 / self.begun as f64
        } else {
            0.0
        }
    }
}
