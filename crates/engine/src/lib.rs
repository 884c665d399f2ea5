//! Propagation engine for txprop
//!
//! This crate decides, per invocation, how a unit of work relates to the
//! ambient transaction:
//! - PropagationEngine: the six propagation operations and `invoke`
//! - Control primitives: new transaction, ongoing transaction, suspended
//! - PropagationMetrics: lifecycle counters
//! - PropagationConfig: `txprop.toml` loading
//!
//! The engine only orchestrates calls to a `TransactionManager`; it keeps no
//! transaction state of its own.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
mod control;
pub mod engine;
pub mod metrics;

pub use config::{ConfigError, PropagationConfig, CONFIG_FILE_NAME};
pub use engine::PropagationEngine;
pub use metrics::PropagationMetrics;
