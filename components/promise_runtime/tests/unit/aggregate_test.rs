//! Unit tests for the aggregation combinators

use promise_runtime::{
    all, all_settled, all_task, all_task_settled, all_task_with, AggregateConfig, Context, Error,
    ErrorKind, Outcome, Promise, Task,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn after(delay_ms: u64, value: u32) -> Task<u32> {
    Task::new(move |_: &Context| {
        thread::sleep(Duration::from_millis(delay_ms));
        Ok::<_, Error>(value)
    })
}

/// Sleeps unless the context fires first.
fn abortable(delay_ms: u64, value: u32) -> Task<u32> {
    Task::new(move |ctx: &Context| {
        crossbeam::select! {
            recv(crossbeam::channel::after(Duration::from_millis(delay_ms))) -> _ => Ok(value),
            recv(ctx.done()) -> _ => Err(Error::msg("aborted")),
        }
    })
}

#[test]
fn all_task_orders_by_input_not_completion() {
    let tasks = vec![after(90, 1), after(45, 2), after(0, 3)];
    let values = all_task(&Context::background(), tasks).await_value().unwrap();
    assert_eq!(values, vec![1, 2, 3]);
}

#[test]
fn all_orders_promises_by_input() {
    let ctx = Context::background();
    let promises: Vec<Promise<u32>> = [(60, 1), (30, 2), (0, 3)]
        .into_iter()
        .map(|(delay, value)| Promise::from_task(&ctx, after(delay, value)))
        .collect();
    assert_eq!(all(&ctx, promises).await_value().unwrap(), vec![1, 2, 3]);
}

#[test]
fn all_task_fails_fast() {
    let failure = Error::msg("second failed");
    let expected = failure.clone();
    let tasks = vec![
        after(1_000, 1),
        Task::new(move |_: &Context| Err::<u32, _>(failure)),
        after(1_000, 3),
    ];

    let started = Instant::now();
    let err = all_task(&Context::background(), tasks).await_value().unwrap_err();
    assert_eq!(err, expected);
    assert!(started.elapsed() < Duration::from_millis(500));
}

#[test]
fn all_fails_fast_on_rejected_promise() {
    let ctx = Context::background();
    let promises = vec![
        Promise::from_task(&ctx, after(1_000, 1)),
        Promise::reject("broken"),
        Promise::from_task(&ctx, after(1_000, 3)),
    ];

    let started = Instant::now();
    let err = all(&ctx, promises).await_value().unwrap_err();
    assert_eq!(err.to_string(), "broken");
    assert!(started.elapsed() < Duration::from_millis(500));
}

#[test]
fn all_task_cancels_siblings_on_failure() {
    let aborted = Arc::new(AtomicUsize::new(0));
    let observed = Arc::clone(&aborted);
    let watcher = Task::new(move |ctx: &Context| {
        let fired = ctx.done().recv_timeout(Duration::from_secs(2)).is_err()
            && ctx.is_cancelled();
        if fired {
            observed.fetch_add(1, Ordering::SeqCst);
        }
        Ok::<_, Error>(0)
    });
    let tasks = vec![watcher, Task::new(|_: &Context| Err::<u32, _>("fail"))];

    assert!(all_task(&Context::background(), tasks).await_value().is_err());

    let deadline = Instant::now() + Duration::from_secs(2);
    while aborted.load(Ordering::SeqCst) == 0 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(aborted.load(Ordering::SeqCst), 1);
}

#[test]
fn all_task_panic_is_unit_error() {
    let tasks = vec![
        after(500, 1),
        Task::new(|_: &Context| -> Result<u32, Error> { panic!("intended panic: 4") }),
    ];
    let err = all_task(&Context::background(), tasks).await_value().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Panic);
    assert!(err.to_string().contains("intended panic: 4"));
}

#[test]
fn all_task_aborts_on_parent_deadline() {
    let (ctx, _cancel) = Context::with_timeout(&Context::background(), Duration::from_millis(30));
    let tasks = vec![abortable(1_000, 1), abortable(1_000, 2)];

    let started = Instant::now();
    let err = all_task(&ctx, tasks).await_value().unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::DeadlineExceeded | ErrorKind::Rejected
    ));
    assert!(started.elapsed() < Duration::from_millis(500));
}

#[test]
fn all_task_respects_concurrency_cap() {
    let running = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let tasks: Vec<Task<usize>> = (0..12)
        .map(|i| {
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            Task::new(move |_: &Context| {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(10));
                running.fetch_sub(1, Ordering::SeqCst);
                Ok::<_, Error>(i)
            })
        })
        .collect();

    let config = AggregateConfig::default().with_max_concurrency(3);
    let values = all_task_with(&Context::background(), &config, tasks)
        .await_value()
        .unwrap();

    assert_eq!(values, (0..12).collect::<Vec<_>>());
    assert!(peak.load(Ordering::SeqCst) <= 3);
}

#[test]
fn all_settled_collects_success_and_failure() {
    let ctx = Context::background();
    let failure = Error::msg("E");
    let promises = vec![
        Promise::new(&ctx, |_| Ok::<_, Error>(5)),
        Promise::reject(failure.clone()),
    ];

    let outcomes = all_settled(&ctx, promises).await_value().unwrap();
    assert_eq!(outcomes, vec![Outcome::Fulfilled(5), Outcome::Rejected(failure)]);
    assert!(outcomes[0].ok());
    assert!(!outcomes[1].ok());
}

#[test]
fn all_task_settled_waits_for_every_unit() {
    let tasks = vec![
        after(60, 1),
        Task::new(|_: &Context| Err::<u32, _>("fast failure")),
        after(30, 3),
    ];
    let started = Instant::now();
    let outcomes = all_task_settled(&Context::background(), tasks)
        .await_value()
        .unwrap();

    assert!(started.elapsed() >= Duration::from_millis(60));
    assert_eq!(outcomes[0].value(), Some(&1));
    assert_eq!(outcomes[1].error().unwrap().to_string(), "fast failure");
    assert_eq!(outcomes[2].value(), Some(&3));
}

#[test]
fn all_task_settled_captures_panics() {
    let tasks: Vec<Task<u32>> = (0..2)
        .map(|n| Task::new(move |_: &Context| -> Result<u32, Error> { panic!("panic worker: {n}") }))
        .collect();
    let outcomes = all_task_settled(&Context::background(), tasks)
        .await_value()
        .unwrap();

    for (n, outcome) in outcomes.iter().enumerate() {
        let err = outcome.error().unwrap();
        assert!(err.is_panic());
        assert!(err.to_string().contains(&format!("panic worker: {n}")));
    }
}

#[test]
fn all_task_settled_does_not_cancel_siblings() {
    let tasks = vec![
        Task::new(|_: &Context| Err::<u32, _>("first fails")),
        abortable(40, 2),
    ];
    let outcomes = all_task_settled(&Context::background(), tasks)
        .await_value()
        .unwrap();
    assert_eq!(outcomes[1], Outcome::Fulfilled(2));
}

#[test]
fn all_settled_with_timeout_records_aborted_units() {
    let (ctx, _cancel) = Context::with_timeout(&Context::background(), Duration::from_millis(30));
    let promises = vec![
        Promise::from_task(&ctx, after(1_000, 1)),
        Promise::from_task(&ctx, after(1_000, 2)),
    ];
    // The aggregate itself is governed by a live context.
    let outcomes = all_settled(&Context::background(), promises)
        .await_value()
        .unwrap();

    for outcome in outcomes {
        assert_eq!(
            outcome.error().map(|e| e.kind()),
            Some(ErrorKind::DeadlineExceeded)
        );
    }
}
