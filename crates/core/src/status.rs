//! Transaction status
//!
//! The status of the transaction associated with a calling context, as
//! reported by a transaction manager. Codes and declaration order follow the
//! classic manager contract, so `Ord` on `Status` is code order:
//!
//! | Code | Status | Name |
//! |------|--------|------|
//! | 0 | Active | `active` |
//! | 1 | MarkedRollback | `marked_rollback` |
//! | 2 | Prepared | `prepared` |
//! | 3 | Committed | `committed` |
//! | 4 | RolledBack | `rolled_back` |
//! | 5 | Unknown | `unknown` |
//! | 6 | NoTransaction | `no_transaction` |
//! | 7 | Preparing | `preparing` |
//! | 8 | Committing | `committing` |
//! | 9 | RollingBack | `rolling_back` |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a transaction in its lifecycle
///
/// Owned by the transaction manager. The propagation engine only reads it,
/// apart from explicitly requesting `MarkedRollback`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// A transaction is associated and can do work
    Active = 0,
    /// The transaction can only end in rollback
    MarkedRollback = 1,
    /// Two-phase prepare finished
    Prepared = 2,
    /// The transaction committed
    Committed = 3,
    /// The transaction rolled back
    RolledBack = 4,
    /// The manager cannot determine the status
    Unknown = 5,
    /// No transaction is associated with the calling context
    NoTransaction = 6,
    /// Two-phase prepare in progress
    Preparing = 7,
    /// Commit in progress
    Committing = 8,
    /// Rollback in progress
    RollingBack = 9,
}

impl Status {
    /// All statuses in declaration order
    pub const ALL: [Status; 10] = [
        Status::Active,
        Status::MarkedRollback,
        Status::Prepared,
        Status::Committed,
        Status::RolledBack,
        Status::Unknown,
        Status::NoTransaction,
        Status::Preparing,
        Status::Committing,
        Status::RollingBack,
    ];

    /// Manager-declared integer code
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Look up a status by its manager-declared code
    pub fn from_code(code: i32) -> Option<Status> {
        Status::ALL.iter().copied().find(|s| s.code() == code)
    }

    /// Canonical lower_snake_case name
    pub fn name(self) -> &'static str {
        match self {
            Status::Active => "active",
            Status::MarkedRollback => "marked_rollback",
            Status::Prepared => "prepared",
            Status::Committed => "committed",
            Status::RolledBack => "rolled_back",
            Status::Unknown => "unknown",
            Status::NoTransaction => "no_transaction",
            Status::Preparing => "preparing",
            Status::Committing => "committing",
            Status::RollingBack => "rolling_back",
        }
    }

    /// Check if the transaction reached a final outcome
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Committed | Status::RolledBack)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
