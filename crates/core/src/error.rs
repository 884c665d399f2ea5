//! Error types for transaction propagation
//!
//! Two layers:
//! - `ManagerError`: failures reported by a transaction manager
//! - `TxError`: failures surfaced by the propagation engine
//!
//! A `TxError` carries a primary failure (`TxErrorKind`) plus a list of
//! suppressed manager failures. Failures hit while already unwinding from a
//! unit-of-work failure are appended there; they never replace the primary.

use crate::status::Status;
use smallvec::SmallVec;
use std::error::Error as StdError;
use thiserror::Error;

/// Result type alias for transaction manager calls
pub type ManagerResult<T> = std::result::Result<T, ManagerError>;

/// Result type alias for propagation operations and units of work
pub type TxResult<T> = std::result::Result<T, TxError>;

/// Boxed caller failure raised by a unit of work
pub type UnitError = Box<dyn StdError + Send + Sync + 'static>;

/// Failures reported by a transaction manager
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManagerError {
    /// The manager hit an unexpected internal error
    #[error("the transaction manager encountered an unexpected error: {0}")]
    System(String),

    /// A transaction is already associated and nesting is not supported
    #[error(
        "the context is already associated with a transaction and the transaction manager \
         does not support nested transactions"
    )]
    UnsupportedNesting,

    /// No transaction is associated with the calling context
    #[error("the current context is not associated with a transaction")]
    NotActive,

    /// The caller is not allowed to complete the transaction
    #[error("not allowed to complete the transaction")]
    NotAllowed,

    /// Some updates committed while others rolled back
    #[error(
        "a heuristic decision was made and some relevant updates have been committed \
         while others have been rolled back"
    )]
    HeuristicMixed,

    /// All updates were rolled back by a heuristic decision
    #[error("a heuristic decision was made and all relevant updates have been rolled back")]
    HeuristicRollback,

    /// The transaction was rolled back instead of committed
    #[error("the transaction has been rolled back rather than committed")]
    RolledBack,

    /// The handle does not refer to a resumable transaction
    #[error("the transaction handle is invalid")]
    InvalidHandle,

    /// The context already has a different transaction associated
    #[error("the context is already associated with a transaction")]
    AlreadyAssociated,
}

impl ManagerError {
    /// Create a system failure
    pub fn system(message: impl Into<String>) -> Self {
        ManagerError::System(message.into())
    }

    /// Runtime-style failures pass through the engine without wrapping
    ///
    /// `NotActive` and `NotAllowed` are unchecked; every other variant is a
    /// checked failure and is wrapped as `TxErrorKind::Transactional` when
    /// nothing else is in flight.
    pub fn is_unchecked(&self) -> bool {
        matches!(self, ManagerError::NotActive | ManagerError::NotAllowed)
    }

    /// Check if the failure reports a non-atomic outcome
    pub fn is_heuristic(&self) -> bool {
        matches!(
            self,
            ManagerError::HeuristicMixed | ManagerError::HeuristicRollback
        )
    }
}

/// Primary failure of a propagation operation
#[derive(Debug, Error)]
pub enum TxErrorKind {
    /// The ambient status does not allow the requested propagation
    #[error("{}", describe_status_violation(.allowed, .current))]
    IllegalState {
        /// Allowed statuses, in declaration order
        allowed: SmallVec<[Status; 2]>,
        /// Status observed when the operation started
        current: Status,
    },

    /// Checked manager failure with no unit failure in flight
    #[error("transactional failure: {0}")]
    Transactional(#[source] ManagerError),

    /// Manager failure passed through unchanged
    #[error(transparent)]
    Manager(ManagerError),

    /// Failure raised by the unit of work
    #[error("{0}")]
    Unit(UnitError),
}

/// Error surfaced by the propagation engine
///
/// Raised values flow through nested propagation calls unchanged, so an
/// outer layer that fails to clean up appends to the same `suppressed`
/// list the inner layer used.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct TxError {
    kind: TxErrorKind,
    suppressed: Vec<ManagerError>,
}

impl TxError {
    fn new(kind: TxErrorKind) -> Self {
        Self {
            kind,
            suppressed: Vec::new(),
        }
    }

    /// Wrap a caller failure raised by a unit of work
    pub fn unit(error: impl Into<UnitError>) -> Self {
        Self::new(TxErrorKind::Unit(error.into()))
    }

    /// Create a status violation; `allowed` is reported in declaration order
    pub fn illegal_state(allowed: &[Status], current: Status) -> Self {
        let mut allowed: SmallVec<[Status; 2]> = allowed.iter().copied().collect();
        allowed.sort();
        allowed.dedup();
        Self::new(TxErrorKind::IllegalState { allowed, current })
    }

    /// Wrap a manager failure as a transactional failure
    pub fn transactional(error: ManagerError) -> Self {
        Self::new(TxErrorKind::Transactional(error))
    }

    /// Pass a manager failure through unchanged
    pub fn manager(error: ManagerError) -> Self {
        Self::new(TxErrorKind::Manager(error))
    }

    /// Surface a manager failure hit with nothing else in flight
    ///
    /// Unchecked failures pass through; checked failures are wrapped.
    pub fn escalate(error: ManagerError) -> Self {
        if error.is_unchecked() {
            Self::manager(error)
        } else {
            Self::transactional(error)
        }
    }

    /// Primary failure
    pub fn kind(&self) -> &TxErrorKind {
        &self.kind
    }

    /// Consume the error, returning the primary failure
    pub fn into_kind(self) -> TxErrorKind {
        self.kind
    }

    /// Secondary failures recorded while unwinding, oldest first
    pub fn suppressed(&self) -> &[ManagerError] {
        &self.suppressed
    }

    /// Record a secondary failure without replacing the primary one
    pub fn add_suppressed(&mut self, error: ManagerError) {
        self.suppressed.push(error);
    }

    /// Builder form of [`TxError::add_suppressed`]
    pub fn with_suppressed(mut self, error: ManagerError) -> Self {
        self.add_suppressed(error);
        self
    }

    /// Check if the primary failure is a status violation
    pub fn is_illegal_state(&self) -> bool {
        matches!(self.kind, TxErrorKind::IllegalState { .. })
    }

    /// Check if the primary failure came from the unit of work
    pub fn is_unit(&self) -> bool {
        matches!(self.kind, TxErrorKind::Unit(_))
    }

    /// Manager failure behind a `Transactional` or `Manager` primary
    pub fn manager_error(&self) -> Option<&ManagerError> {
        match &self.kind {
            TxErrorKind::Transactional(e) | TxErrorKind::Manager(e) => Some(e),
            _ => None,
        }
    }

    /// Downcast the unit-of-work failure to a concrete type
    pub fn downcast_unit<T: StdError + 'static>(&self) -> Option<&T> {
        match &self.kind {
            TxErrorKind::Unit(e) => e.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl From<ManagerError> for TxError {
    fn from(error: ManagerError) -> Self {
        TxError::escalate(error)
    }
}

/// Format a status violation
///
/// One allowed status: `Allowed status: active; Current status: no_transaction`.
/// Several: `Allowed statuses: [active, no_transaction]; Current status: marked_rollback`.
fn describe_status_violation(allowed: &[Status], current: &Status) -> String {
    let allowed_part = match allowed {
        [single] => format!("Allowed status: {}", single),
        many => {
            let names: Vec<&str> = many.iter().map(|s| s.name()).collect();
            format!("Allowed statuses: [{}]", names.join(", "))
        }
    };
    format!("{}; Current status: {}", allowed_part, current)
}
