//! Core types and traits for txprop
//!
//! This crate defines the foundational types shared by the manager and the
//! propagation engine:
//! - Status: transaction status with manager-declared codes
//! - Propagation: the six propagation modes
//! - Error: `ManagerError`, `TxError` with suppressed secondary failures
//! - Traits: the `TransactionManager` contract

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod propagation;
pub mod status;
pub mod traits;

pub use error::{ManagerError, ManagerResult, TxError, TxErrorKind, TxResult, UnitError};
pub use propagation::{ParsePropagationError, Propagation};
pub use status::Status;
pub use traits::TransactionManager;
