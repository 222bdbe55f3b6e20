//! Contract tests for promise_runtime component
//!
//! These tests pin the public operations and their observable guarantees.

use promise_runtime::{
    all, all_settled, all_task, all_task_settled, all_task_with, catch, spawn, then,
    AggregateConfig, Context, Error, ErrorKind, Outcome, Promise, Status, Task,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

mod promise_contract {
    use super::*;

    #[test]
    fn spawn_returns_promise() {
        let promise: Promise<u8> = spawn(&Context::background(), |_| Ok::<_, Error>(1));
        assert_eq!(promise.await_value().unwrap(), 1);
    }

    #[test]
    fn status_is_monotonic() {
        let promise = spawn(&Context::background(), |_| {
            thread::sleep(Duration::from_millis(30));
            Ok::<_, Error>(())
        });
        let mut seen = vec![promise.status()];
        while !promise.is_settled() {
            thread::sleep(Duration::from_millis(2));
            seen.push(promise.status());
        }
        seen.push(promise.wait());

        for pair in seen.windows(2) {
            assert!(pair[0] == pair[1] || pair[0].can_transition_to(pair[1]));
        }
        assert_eq!(seen.last(), Some(&Status::Fulfilled));
    }

    #[test]
    fn promise_is_thread_safe() {
        fn assert_bounds<T: Send + Sync + Clone>() {}
        assert_bounds::<Promise<String>>();
        assert_bounds::<Context>();
    }
}

mod then_contract {
    use super::*;

    #[test]
    fn rejected_upstream_never_invokes_resolver() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let chained = then(&Promise::<i32>::reject("up"), move |v| {
            counter.fetch_add(1, Ordering::SeqCst);
            Promise::resolve(v)
        });
        assert_eq!(chained.await_value().unwrap_err().to_string(), "up");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn catch_returns_error_it_observed() {
        let err = Error::msg("observed");
        let promise: Promise<()> = Promise::reject(err.clone());
        assert_eq!(catch(&promise, |_| {}), Some(err));
    }
}

mod aggregate_contract {
    use super::*;

    #[test]
    fn all_resolves_ordered_list() {
        let ctx = Context::background();
        let promises = (1..=3).map(Promise::resolve).collect();
        assert_eq!(all(&ctx, promises).await_value().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn all_settled_never_rejects_for_items() {
        let ctx = Context::background();
        let promises: Vec<Promise<i32>> = vec![Promise::reject("a"), Promise::reject("b")];
        let aggregate = all_settled(&ctx, promises);
        let outcomes = aggregate.await_value().unwrap();
        assert_eq!(aggregate.status(), Status::Fulfilled);
        assert!(outcomes.iter().all(|o| !o.ok()));
    }

    #[test]
    fn settled_items_are_outcomes() {
        let tasks = vec![Task::new(|_: &Context| Ok::<_, Error>(1_u8))];
        let outcomes: Vec<Outcome<u8>> = all_task_settled(&Context::background(), tasks)
            .await_value()
            .unwrap();
        assert_eq!(outcomes, vec![Outcome::Fulfilled(1)]);
    }

    #[test]
    fn more_units_than_cap_completes() {
        let tasks: Vec<Task<usize>> = (0..64)
            .map(|i| Task::new(move |_: &Context| Ok::<_, Error>(i)))
            .collect();
        let config = AggregateConfig::default().with_max_concurrency(4);
        let values = all_task_with(&Context::background(), &config, tasks)
            .await_value()
            .unwrap();
        assert_eq!(values.len(), 64);
        assert_eq!(values[63], 63);
    }

    #[test]
    fn all_task_error_kind_is_preserved() {
        let tasks = vec![Task::new(|_: &Context| -> Result<u8, Error> { panic!("x") })];
        let err = all_task(&Context::background(), tasks).await_value().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Panic);
    }
}
