//! Propagation Scenario Test Suite
//!
//! End-to-end scenarios through the `txprop` facade.
//!
//! ## Test Groups
//!
//! - **Service composition**: application-shaped call graphs mixing modes
//! - **Concurrency**: one shared engine, independent per-thread transactions
//! - **Configuration**: `txprop.toml` driving `execute`
//! - **Custom managers**: engine over user-supplied `TransactionManager`s
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test propagation_scenarios
//!
//! # Only the concurrency group
//! cargo test --test propagation_scenarios concurrency
//! ```


mod concurrency_tests;
mod config_tests;
mod custom_manager_tests;
