//! Concurrency scenarios
//!
//! One engine shared by many threads. The reference manager keys the
//! ambient transaction by thread, so propagation decisions on one thread
//! never observe another thread's transaction.

use crate::test_utils::*;
use std::collections::HashSet;
use std::sync::{Barrier, Mutex};
use std::thread;
use txprop::TransactionManager;

const THREADS: usize = 8;

#[test]
fn test_concurrency_threads_see_only_their_own_transaction() {
    let (manager, engine) = create_shared_engine();
    let barrier = Barrier::new(THREADS);
    let ids = Mutex::new(Vec::new());

    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                engine
                    .required(|| {
                        let own = manager.transaction()?.map(|t| t.id());
                        // Every thread holds a transaction at the same time
                        barrier.wait();
                        assert_eq!(engine.status()?, Status::Active);
                        assert_eq!(manager.transaction()?.map(|t| t.id()), own);
                        ids.lock().unwrap().extend(own);
                        Ok(())
                    })
                    .unwrap();
            });
        }
    });

    let ids = ids.into_inner().unwrap();
    assert_eq!(ids.len(), THREADS);
    assert_eq!(ids.iter().collect::<HashSet<_>>().len(), THREADS);
    assert_eq!(manager.associated_count(), 0);
    assert_eq!(engine.metrics().committed, THREADS as u64);
    assert_balanced(&manager);
}

#[test]
fn test_concurrency_failure_on_one_thread_does_not_leak() {
    let (manager, engine) = create_shared_engine();
    let barrier = Barrier::new(THREADS);

    let results: Vec<bool> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|i| {
                let engine = &engine;
                let barrier = &barrier;
                s.spawn(move || {
                    engine
                        .required(|| {
                            let value = engine.requires_new(|| Ok(i))?;
                            barrier.wait();
                            if value % 2 == 0 {
                                return reject("even");
                            }
                            engine.mandatory(|| Ok(()))
                        })
                        .is_ok()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results.iter().filter(|ok| **ok).count(), THREADS / 2);
    let metrics = engine.metrics();
    assert_eq!(metrics.begun, 2 * THREADS as u64);
    assert_eq!(metrics.committed, THREADS as u64 + THREADS as u64 / 2);
    assert_eq!(metrics.rolled_back, THREADS as u64 / 2);
    assert_eq!(manager.associated_count(), 0);
    assert_balanced(&manager);
}

#[test]
fn test_concurrency_other_threads_see_no_transaction() {
    let (manager, engine) = create_shared_engine();

    engine
        .required(|| {
            let elsewhere = thread::scope(|s| s.spawn(|| engine.status()).join().unwrap())?;
            assert_eq!(elsewhere, Status::NoTransaction);
            assert_eq!(engine.status()?, Status::Active);

            // A thread without a transaction runs Never directly
            let ran = thread::scope(|s| s.spawn(|| engine.never(|| Ok(true))).join().unwrap())?;
            assert!(ran);
            Ok(())
        })
        .unwrap();

    assert_eq!(engine.metrics().illegal_state, 0);
    assert_balanced(&manager);
}
