//! Reference transaction manager for txprop
//!
//! This crate provides `LocalTransactionManager`, an in-memory
//! implementation of the `TransactionManager` contract:
//! - Transactions associated with the calling thread
//! - Suspend/resume with handle validation
//! - Rollback-only marking (commit of a marked transaction rolls back)
//! - A journal of lifecycle calls for assertions in tests
//! - One-shot fault injection per manager operation
//!
//! It does not enlist resources or persist anything.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod fault;
pub mod journal;
pub mod manager;

pub use fault::{FaultPlan, ManagerOp};
pub use journal::{Journal, ManagerEvent};
pub use manager::{LocalTransaction, LocalTransactionManager};
