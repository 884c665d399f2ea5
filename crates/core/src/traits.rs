//! Transaction manager abstraction
//!
//! This module defines the `TransactionManager` trait consumed by the
//! propagation engine. Implementations associate at most one transaction
//! with each calling context (typically a thread) and own its status.

use crate::error::ManagerResult;
use crate::status::Status;
use std::fmt::Debug;
use std::sync::Arc;

/// Transaction manager consumed by the propagation engine
///
/// All calls act on the transaction associated with the calling context,
/// except `resume` and `set_rollback_only_for` which take an explicit handle.
pub trait TransactionManager {
    /// Opaque handle to a transaction instance
    ///
    /// Used to pair suspend with resume and to mark a specific transaction
    /// rollback-only. Invalid after commit, rollback, or once resumed.
    type Transaction: Clone + Debug;

    /// Status of the transaction associated with the calling context
    ///
    /// `Status::NoTransaction` when nothing is associated.
    fn status(&self) -> ManagerResult<Status>;

    /// Handle of the transaction associated with the calling context
    fn transaction(&self) -> ManagerResult<Option<Self::Transaction>>;

    /// Begin a transaction and associate it with the calling context
    ///
    /// # Errors
    ///
    /// `UnsupportedNesting` if a transaction is already associated,
    /// `System` on internal failure.
    fn begin(&self) -> ManagerResult<()>;

    /// Complete the associated transaction
    ///
    /// The context is no longer associated with a transaction afterwards.
    ///
    /// # Errors
    ///
    /// `NotActive`, `NotAllowed`, `HeuristicMixed`, `HeuristicRollback`,
    /// `RolledBack` (the transaction was rolled back instead), or `System`.
    fn commit(&self) -> ManagerResult<()>;

    /// Roll back the associated transaction
    ///
    /// # Errors
    ///
    /// `NotActive`, `NotAllowed`, or `System`.
    fn rollback(&self) -> ManagerResult<()>;

    /// Detach the associated transaction from the calling context
    ///
    /// Returns `None` when nothing was associated.
    fn suspend(&self) -> ManagerResult<Option<Self::Transaction>>;

    /// Reattach a previously suspended transaction
    ///
    /// # Errors
    ///
    /// `InvalidHandle`, `AlreadyAssociated`, or `System`.
    fn resume(&self, transaction: Self::Transaction) -> ManagerResult<()>;

    /// Mark the associated transaction so it can only roll back
    fn set_rollback_only(&self) -> ManagerResult<()>;

    /// Mark a specific transaction so it can only roll back
    fn set_rollback_only_for(&self, transaction: &Self::Transaction) -> ManagerResult<()>;
}

impl<M: TransactionManager + ?Sized> TransactionManager for &M {
    type Transaction = M::Transaction;

    fn status(&self) -> ManagerResult<Status> {
        (**self).status()
    }

    fn transaction(&self) -> ManagerResult<Option<Self::Transaction>> {
        (**self).transaction()
    }

    fn begin(&self) -> ManagerResult<()> {
        (**self).begin()
    }

    fn commit(&self) -> ManagerResult<()> {
        (**self).commit()
    }

    fn rollback(&self) -> ManagerResult<()> {
        (**self).rollback()
    }

    fn suspend(&self) -> ManagerResult<Option<Self::Transaction>> {
        (**self).suspend()
    }

    fn resume(&self, transaction: Self::Transaction) -> ManagerResult<()> {
        (**self).resume(transaction)
    }

    fn set_rollback_only(&self) -> ManagerResult<()> {
        (**self).set_rollback_only()
    }

    fn set_rollback_only_for(&self, transaction: &Self::Transaction) -> ManagerResult<()> {
        (**self).set_rollback_only_for(transaction)
    }
}

impl<M: TransactionManager + ?Sized> TransactionManager for Arc<M> {
    type Transaction = M::Transaction;

    fn status(&self) -> ManagerResult<Status> {
        (**self).status()
    }

    fn transaction(&self) -> ManagerResult<Option<Self::Transaction>> {
        (**self).transaction()
    }

    fn begin(&self) -> ManagerResult<()> {
        (**self).begin()
    }

    fn commit(&self) -> ManagerResult<()> {
        (**self).commit()
    }

    fn rollback(&self) -> ManagerResult<()> {
        (**self).rollback()
    }

    fn suspend(&self) -> ManagerResult<Option<Self::Transaction>> {
        (**self).suspend()
    }

    fn resume(&self, transaction: Self::Transaction) -> ManagerResult<()> {
        (**self).resume(transaction)
    }

    fn set_rollback_only(&self) -> ManagerResult<()> {
        (**self).set_rollback_only()
    }

    fn set_rollback_only_for(&self, transaction: &Self::Transaction) -> ManagerResult<()> {
        (**self).set_rollback_only_for(transaction)
    }
}
