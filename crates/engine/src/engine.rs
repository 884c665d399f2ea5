//! Propagation engine
//!
//! Dispatches a unit of work according to a propagation mode and the
//! ambient transaction status:
//!
//! | Mode | NO_TRANSACTION | ACTIVE | other |
//! |------|----------------|--------|-------|
//! | Required | new | ongoing | refused |
//! | RequiresNew | new | suspended(new) | suspended(new) |
//! | Mandatory | refused | ongoing | refused |
//! | Never | direct | refused | refused |
//! | NotSupported | direct | suspended(direct) | refused |
//! | Supports | direct | ongoing | refused |
//!
//! "refused" is `TxErrorKind::IllegalState` naming the allowed statuses.

use crate::config::{ConfigError, PropagationConfig};
use crate::metrics::{MetricsRecorder, PropagationMetrics};
use tracing::debug;
use txprop_core::{Propagation, Status, TransactionManager, TxError, TxResult};

const ACTIVE_OR_NONE: [Status; 2] = [Status::Active, Status::NoTransaction];

/// Applies propagation modes over a transaction manager
///
/// # Usage
///
/// ```ignore
/// let engine = PropagationEngine::new(LocalTransactionManager::new());
///
/// let total = engine.required(|| {
///     let a = engine.mandatory(|| Ok(1))?;
///     let b = engine.requires_new(|| Ok(2))?;
///     Ok(a + b)
/// })?;
/// ```
///
/// # Thread Safety
///
/// All operations take `&self`. The engine holds no per-call state; the
/// ambient transaction lives in the manager, keyed by calling context.
pub struct PropagationEngine<M> {
    pub(crate) manager: M,
    pub(crate) metrics: MetricsRecorder,
    default_propagation: Propagation,
}

impl<M: TransactionManager> PropagationEngine<M> {
    /// Create an engine with the default configuration
    pub fn new(manager: M) -> Self {
        Self {
            manager,
            metrics: MetricsRecorder::new(true),
            default_propagation: Propagation::default(),
        }
    }

    /// Create an engine from a loaded configuration
    ///
    /// # Errors
    ///
    /// Returns an error if `default_propagation` names no known mode.
    pub fn with_config(manager: M, config: &PropagationConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            manager,
            metrics: MetricsRecorder::new(config.metrics),
            default_propagation: config.propagation()?,
        })
    }

    /// The underlying transaction manager
    pub fn manager(&self) -> &M {
        &self.manager
    }

    /// Propagation used by [`PropagationEngine::execute`]
    pub fn default_propagation(&self) -> Propagation {
        self.default_propagation
    }

    /// Snapshot of the engine counters
    pub fn metrics(&self) -> PropagationMetrics {
        self.metrics.snapshot()
    }

    /// Status of the ambient transaction
    pub fn status(&self) -> TxResult<Status> {
        self.manager.status().map_err(TxError::transactional)
    }

    /// Run `unit` with the given propagation
    pub fn invoke<R, F>(&self, propagation: Propagation, unit: F) -> TxResult<R>
    where
        F: FnOnce() -> TxResult<R>,
    {
        match propagation {
            Propagation::Required => self.required(unit),
            Propagation::RequiresNew => self.requires_new(unit),
            Propagation::Mandatory => self.mandatory(unit),
            Propagation::Never => self.never(unit),
            Propagation::NotSupported => self.not_supported(unit),
            Propagation::Supports => self.supports(unit),
        }
    }

    /// Run `unit` with the configured default propagation
    pub fn execute<R, F>(&self, unit: F) -> TxResult<R>
    where
        F: FnOnce() -> TxResult<R>,
    {
        self.invoke(self.default_propagation, unit)
    }

    /// Join the active transaction, or begin one if none exists
    ///
    /// A failing unit rolls back a transaction begun here, or marks a
    /// joined transaction rollback-only.
    pub fn required<R, F>(&self, unit: F) -> TxResult<R>
    where
        F: FnOnce() -> TxResult<R>,
    {
        match self.status()? {
            Status::Active => self.run_in_ongoing_transaction(unit),
            Status::NoTransaction => self.run_in_new_transaction(unit),
            other => Err(self.refuse(&ACTIVE_OR_NONE, other)),
        }
    }

    /// Begin a fresh transaction, suspending the ambient one if any
    ///
    /// The suspended transaction is resumed whatever the outcome.
    pub fn requires_new<R, F>(&self, unit: F) -> TxResult<R>
    where
        F: FnOnce() -> TxResult<R>,
    {
        if self.status()? == Status::NoTransaction {
            return self.run_in_new_transaction(unit);
        }
        self.run_suspended(|| self.run_in_new_transaction(unit))
    }

    /// Join the active transaction; refuse if there is none
    pub fn mandatory<R, F>(&self, unit: F) -> TxResult<R>
    where
        F: FnOnce() -> TxResult<R>,
    {
        self.force_status(Status::Active)?;
        self.run_in_ongoing_transaction(unit)
    }

    /// Run without a transaction; refuse if one is associated
    pub fn never<R, F>(&self, unit: F) -> TxResult<R>
    where
        F: FnOnce() -> TxResult<R>,
    {
        self.force_status(Status::NoTransaction)?;
        unit()
    }

    /// Run without a transaction, suspending the active one if any
    pub fn not_supported<R, F>(&self, unit: F) -> TxResult<R>
    where
        F: FnOnce() -> TxResult<R>,
    {
        match self.status()? {
            Status::NoTransaction => unit(),
            Status::Active => self.run_suspended(unit),
            other => Err(self.refuse(&ACTIVE_OR_NONE, other)),
        }
    }

    /// Join the active transaction if there is one, otherwise run without
    pub fn supports<R, F>(&self, unit: F) -> TxResult<R>
    where
        F: FnOnce() -> TxResult<R>,
    {
        match self.status()? {
            Status::NoTransaction => unit(),
            Status::Active => self.run_in_ongoing_transaction(unit),
            other => Err(self.refuse(&ACTIVE_OR_NONE, other)),
        }
    }

    fn force_status(&self, allowed: Status) -> TxResult<()> {
        let current = self.status()?;
        if current != allowed {
            return Err(self.refuse(&[allowed], current));
        }
        Ok(())
    }

    fn refuse(&self, allowed: &[Status], current: Status) -> TxError {
        self.metrics.record_illegal_state();
        let error = TxError::illegal_state(allowed, current);
        debug!(target: "txprop::engine", %error, "Propagation refused");
        error
    }
}
