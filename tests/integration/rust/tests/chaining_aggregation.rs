//! Chaining and Aggregation Integration Tests
//!
//! Tests promises flowing through `then`, `catch` and the `all*` combinators
//! together, with `Outcome`/`Status` from promise_core as the observed result.

use promise_core::{Error, ErrorKind, Outcome, Status};
use promise_runtime::{
    all, all_settled, all_task_with, catch, then, then_task, AggregateConfig, Context, Promise,
    Task,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn delayed(ctx: &Context, delay_ms: u64, value: u32) -> Promise<u32> {
    Promise::new(ctx, move |_| {
        thread::sleep(Duration::from_millis(delay_ms));
        Ok::<_, Error>(value)
    })
}

/// Test: chained promises feed an aggregation in input order
#[test]
fn test_then_results_feed_all() {
    let ctx = Context::background();
    let doubled: Vec<Promise<u32>> = [(40, 1), (20, 2), (0, 3)]
        .into_iter()
        .map(|(delay, n)| then(&delayed(&ctx, delay, n), |v| Promise::resolve(v * 2)))
        .collect();

    let values = all(&ctx, doubled).await_value().unwrap();
    assert_eq!(values, vec![2, 4, 6]);
}

/// Test: a rejection early in a chain reaches the aggregate unchanged
#[test]
fn test_chain_rejection_reaches_all() {
    let ctx = Context::background();
    let calls = Arc::new(AtomicUsize::new(0));

    let failing = Promise::<u32>::reject(Error::msg("lookup failed"));
    let counted = Arc::clone(&calls);
    let chained = then_task(&ctx, &failing, move |_, v| {
        counted.fetch_add(1, Ordering::SeqCst);
        Ok::<_, Error>(v + 1)
    });

    let err = all(&ctx, vec![delayed(&ctx, 0, 1), chained])
        .await_value()
        .unwrap_err();
    assert_eq!(err.to_string(), "lookup failed");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

/// Test: settled aggregation over a mix of chains, errors and panics
#[test]
fn test_all_settled_over_chains() {
    let ctx = Context::background();
    let ok = then(&delayed(&ctx, 10, 5), |v| Promise::resolve(v + 1));
    let err = then(&delayed(&ctx, 0, 5), |_| Promise::<u32>::reject("E"));
    let panicked = Promise::new(&ctx, |_| -> Result<u32, Error> { panic!("deep failure") });

    let outcomes = all_settled(&ctx, vec![ok, err, panicked])
        .await_value()
        .unwrap();

    assert_eq!(outcomes[0], Outcome::Fulfilled(6));
    assert_eq!(outcomes[1].status(), Status::Rejected);
    assert_eq!(outcomes[1].error().unwrap().to_string(), "E");
    assert_eq!(outcomes[2].error().unwrap().kind(), ErrorKind::Panic);
}

/// Test: catch observes an aggregate failure without changing it
#[test]
fn test_catch_on_aggregate() {
    let ctx = Context::background();
    let aggregate = all(&ctx, vec![delayed(&ctx, 0, 1), Promise::reject("bad unit")]);

    let seen = Arc::new(AtomicUsize::new(0));
    let seen_by_handler = Arc::clone(&seen);
    let err = catch(&aggregate, move |_| {
        seen_by_handler.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(err.map(|e| e.to_string()), Some("bad unit".to_string()));
    assert_eq!(seen.load(Ordering::SeqCst), 1);
    assert_eq!(aggregate.status(), Status::Rejected);
}

/// Test: many units under a small cap all complete
#[test]
fn test_capped_all_task_completes() {
    let running = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let tasks: Vec<Task<usize>> = (0..24)
        .map(|i| {
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            Task::new(move |_: &Context| {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(5));
                running.fetch_sub(1, Ordering::SeqCst);
                Ok::<_, Error>(i)
            })
        })
        .collect();

    let config = AggregateConfig::default().with_max_concurrency(4);
    let started = Instant::now();
    let values = all_task_with(&Context::background(), &config, tasks)
        .await_value()
        .unwrap();

    assert_eq!(values, (0..24).collect::<Vec<_>>());
    assert!(peak.load(Ordering::SeqCst) <= 4);
    assert!(started.elapsed() < Duration::from_secs(5));
}
