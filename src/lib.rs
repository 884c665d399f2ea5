//! txprop - Declarative transaction propagation
//!
//! Runs a unit of work under one of six propagation modes on top of a
//! pluggable [`TransactionManager`]:
//!
//! | Mode | Behavior |
//! |------|----------|
//! | `Required` | join the active transaction or begin one |
//! | `RequiresNew` | suspend any ambient transaction, begin a fresh one |
//! | `Mandatory` | join the active transaction, refuse without one |
//! | `Never` | run without a transaction, refuse with one |
//! | `NotSupported` | suspend any active transaction, run without one |
//! | `Supports` | join the active transaction if there is one |
//!
//! # Quick Start
//!
//! ```ignore
//! use txprop::{LocalTransactionManager, PropagationEngine};
//!
//! let engine = PropagationEngine::new(LocalTransactionManager::new());
//!
//! let total = engine.required(|| {
//!     let a = engine.mandatory(|| Ok(1))?;
//!     let b = engine.requires_new(|| Ok(2))?;
//!     Ok(a + b)
//! })?;
//! ```
//!
//! # Architecture
//!
//! - `txprop-core`: status, propagation modes, errors, the manager trait
//! - `txprop-manager`: in-memory thread-associated reference manager
//! - `txprop-engine`: the propagation engine, configuration, metrics

mod logging;

pub use logging::init_tracing;

pub use txprop_core::{
    ManagerError, ManagerResult, ParsePropagationError, Propagation, Status, TransactionManager,
    TxError, TxErrorKind, TxResult, UnitError,
};
pub use txprop_engine::{
    ConfigError, PropagationConfig, PropagationEngine, PropagationMetrics, CONFIG_FILE_NAME,
};
pub use txprop_manager::{
    FaultPlan, Journal, LocalTransaction, LocalTransactionManager, ManagerEvent, ManagerOp,
};
