//! Configuration scenarios
//!
//! `txprop.toml` selects the propagation used by `execute` and whether
//! metrics are kept.

use crate::test_utils::*;
use tempfile::TempDir;
use txprop::{ConfigError, PropagationConfig, TransactionManager, CONFIG_FILE_NAME};

fn engine_from_toml(content: &str) -> Result<Engine, ConfigError> {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, content).unwrap();
    let config = PropagationConfig::from_file(&path)?;
    PropagationEngine::with_config(LocalTransactionManager::new(), &config)
}

#[test]
fn test_default_file_gives_required() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    PropagationConfig::write_default_if_missing(&path).unwrap();

    let config = PropagationConfig::from_file(&path).unwrap();
    let engine = PropagationEngine::with_config(LocalTransactionManager::new(), &config).unwrap();

    assert_eq!(engine.default_propagation(), Propagation::Required);
    engine
        .execute(|| {
            assert_eq!(engine.status()?, Status::Active);
            Ok(())
        })
        .unwrap();
    assert_eq!(engine.metrics().committed, 1);
}

#[test]
fn test_requires_new_default_isolates_execute() {
    let engine = engine_from_toml("default_propagation = \"requires_new\"\n").unwrap();

    engine
        .required(|| {
            let outer = engine.manager().transaction()?;
            let inner = engine.execute(|| Ok(engine.manager().transaction()?))?;
            assert_ne!(inner, outer);
            Ok(())
        })
        .unwrap();

    assert_eq!(engine.metrics().committed, 2);
    assert_balanced(engine.manager());
}

#[test]
fn test_mandatory_default_refuses_bare_execute() {
    let engine = engine_from_toml("default_propagation = \"mandatory\"\n").unwrap();

    let err = engine.execute(|| Ok(())).unwrap_err();

    assert_eq!(
        err.to_string(),
        "Allowed status: active; Current status: no_transaction"
    );
}

#[test]
fn test_metrics_off_keeps_counters_at_zero() {
    let engine = engine_from_toml("metrics = false\n").unwrap();

    engine.execute(|| Ok(())).unwrap();
    let _ = engine.execute(|| reject::<()>("ignored"));

    assert_eq!(engine.metrics(), txprop::PropagationMetrics::default());
    // The manager still saw every call
    assert_eq!(engine.manager().journal().events().len(), 4);
}

#[test]
fn test_unknown_propagation_is_rejected_at_load() {
    let err = engine_from_toml("default_propagation = \"sometimes\"\n")
        .err()
        .unwrap();
    assert!(matches!(err, ConfigError::InvalidPropagation(ref name) if name == "sometimes"));
}
