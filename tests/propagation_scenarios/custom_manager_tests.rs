//! Custom manager scenarios
//!
//! The engine works against any `TransactionManager`. `ScriptedManager`
//! records each call so tests can pin the exact call order, and lets a test
//! force statuses the reference manager never reports.

use crate::test_utils::*;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use txprop::{ManagerError, ManagerResult, TransactionManager};

#[derive(Default)]
struct ScriptedManager {
    calls: RefCell<Vec<String>>,
    current: RefCell<Option<String>>,
    statuses: RefCell<HashMap<String, Status>>,
    forced: Cell<Option<Status>>,
    next: Cell<u32>,
}

impl ScriptedManager {
    fn forced(status: Status) -> Self {
        let manager = Self::default();
        manager.forced.set(Some(status));
        manager
    }

    fn call(&self, name: impl Into<String>) {
        self.calls.borrow_mut().push(name.into());
    }

    fn take_calls(&self) -> Vec<String> {
        self.calls.take()
    }

    fn finish(&self, commit: bool) -> ManagerResult<()> {
        let name = self.current.take().ok_or(ManagerError::NotActive)?;
        let status = self.statuses.borrow()[&name];
        if commit && status != Status::MarkedRollback {
            self.statuses.borrow_mut().insert(name, Status::Committed);
            Ok(())
        } else {
            self.statuses.borrow_mut().insert(name, Status::RolledBack);
            if commit {
                Err(ManagerError::RolledBack)
            } else {
                Ok(())
            }
        }
    }

    fn mark(&self, name: &str) -> ManagerResult<()> {
        let mut statuses = self.statuses.borrow_mut();
        let status = statuses.get_mut(name).ok_or(ManagerError::NotActive)?;
        *status = Status::MarkedRollback;
        Ok(())
    }
}

impl TransactionManager for ScriptedManager {
    type Transaction = String;

    fn status(&self) -> ManagerResult<Status> {
        self.call("status");
        if let Some(status) = self.forced.get() {
            return Ok(status);
        }
        Ok(match &*self.current.borrow() {
            Some(name) => self.statuses.borrow()[name],
            None => Status::NoTransaction,
        })
    }

    fn transaction(&self) -> ManagerResult<Option<String>> {
        self.call("transaction");
        Ok(self.current.borrow().clone())
    }

    fn begin(&self) -> ManagerResult<()> {
        self.call("begin");
        if self.current.borrow().is_some() {
            return Err(ManagerError::UnsupportedNesting);
        }
        let name = format!("tx{}", self.next.get() + 1);
        self.next.set(self.next.get() + 1);
        self.statuses.borrow_mut().insert(name.clone(), Status::Active);
        *self.current.borrow_mut() = Some(name);
        Ok(())
    }

    fn commit(&self) -> ManagerResult<()> {
        self.call("commit");
        self.finish(true)
    }

    fn rollback(&self) -> ManagerResult<()> {
        self.call("rollback");
        self.finish(false)
    }

    fn suspend(&self) -> ManagerResult<Option<String>> {
        self.call("suspend");
        Ok(self.current.take())
    }

    fn resume(&self, transaction: String) -> ManagerResult<()> {
        self.call(format!("resume {}", transaction));
        if self.current.borrow().is_some() {
            return Err(ManagerError::AlreadyAssociated);
        }
        *self.current.borrow_mut() = Some(transaction);
        Ok(())
    }

    fn set_rollback_only(&self) -> ManagerResult<()> {
        self.call("set_rollback_only");
        let name = self.current.borrow().clone().ok_or(ManagerError::NotActive)?;
        self.mark(&name)
    }

    fn set_rollback_only_for(&self, transaction: &String) -> ManagerResult<()> {
        self.call(format!("set_rollback_only_for {}", transaction));
        self.mark(transaction)
    }
}

#[test]
fn test_required_call_order() {
    let manager = ScriptedManager::default();
    let engine = PropagationEngine::new(&manager);

    engine.required(|| Ok(())).unwrap();
    assert_eq!(manager.take_calls(), ["status", "begin", "commit"]);

    let _ = engine.required(|| reject::<()>("no"));
    assert_eq!(manager.take_calls(), ["status", "begin", "rollback"]);
}

#[test]
fn test_joined_failure_marks_the_captured_handle() {
    let manager = ScriptedManager::default();
    let engine = PropagationEngine::new(&manager);

    let _ = engine.required(|| engine.required(|| reject::<()>("inner")));

    assert_eq!(
        manager.take_calls(),
        [
            "status",
            "begin",
            "status",
            "transaction",
            "set_rollback_only_for tx1",
            "rollback",
        ]
    );
}

#[test]
fn test_requires_new_call_order() {
    let manager = ScriptedManager::default();
    let engine = PropagationEngine::new(&manager);

    engine
        .required(|| {
            manager.take_calls();
            engine.requires_new(|| Ok(()))?;
            assert_eq!(
                manager.take_calls(),
                ["status", "suspend", "begin", "commit", "resume tx1"]
            );
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_never_and_not_supported_without_transaction_only_query_status() {
    let manager = ScriptedManager::default();
    let engine = PropagationEngine::new(&manager);

    engine.never(|| Ok(())).unwrap();
    engine.not_supported(|| Ok(())).unwrap();
    engine.supports(|| Ok(())).unwrap();

    assert_eq!(manager.take_calls(), ["status", "status", "status"]);
}

#[test]
fn test_non_active_statuses_are_refused() {
    for status in [
        Status::Prepared,
        Status::Committing,
        Status::RollingBack,
        Status::Unknown,
    ] {
        let manager = ScriptedManager::forced(status);
        let engine = PropagationEngine::new(&manager);

        for mode in [
            Propagation::Required,
            Propagation::Supports,
            Propagation::NotSupported,
        ] {
            let err = engine.invoke(mode, || Ok(())).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!(
                    "Allowed statuses: [active, no_transaction]; Current status: {}",
                    status
                )
            );
        }
        let err = engine.never(|| Ok(())).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Allowed status: no_transaction; Current status: {}", status)
        );
        let err = engine.mandatory(|| Ok(())).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Allowed status: active; Current status: {}", status)
        );
        assert_eq!(engine.metrics().illegal_state, 5);
    }
}

#[test]
fn test_requires_new_suspends_whatever_status() {
    let manager = ScriptedManager::forced(Status::Unknown);
    let engine = PropagationEngine::new(&manager);

    engine.requires_new(|| Ok(())).unwrap();

    // Nothing was associated, so there is nothing to resume
    assert_eq!(manager.take_calls(), ["status", "suspend", "begin", "commit"]);
    assert_eq!(engine.metrics().suspended, 0);
}
