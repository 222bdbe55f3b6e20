//! Fan-out aggregation.
//!
//! Two families of combinators run N units concurrently under the admission
//! cap of an [`AggregateConfig`] and return a single promise:
//!
//! - [`all`] / [`all_task`] fail fast. The first unit error rejects the
//!   aggregate and cancels a context shared by the siblings.
//! - [`all_settled`] / [`all_task_settled`] never fail because of a unit.
//!   Every unit's [`Outcome`] is collected.
//!
//! In both families result `i` belongs to input `i`, whatever order the
//! units finish in.

use crate::config::AggregateConfig;
use crate::context::Context;
use crate::limiter::Limiter;
use crate::promise::Promise;
use crate::task::{spawn_worker, Task};
use crossbeam::channel;
use promise_core::{ContextError, Error, Outcome, Result};
use tracing::{debug, trace};

/// Waits for every promise and resolves with their values in input order.
///
/// Rejects with the first error any of them settles with. The promises are
/// already running, so they are not cancelled; only the waiting stops.
///
/// # Examples
///
/// ```
/// use promise_runtime::{all, Context, Promise};
///
/// let ctx = Context::background();
/// let values = all(&ctx, vec![Promise::resolve(1), Promise::resolve(2)]);
/// assert_eq!(values.await_value().unwrap(), vec![1, 2]);
/// ```
pub fn all<T>(ctx: &Context, promises: Vec<Promise<T>>) -> Promise<Vec<T>>
where
    T: Clone + Send + Sync + 'static,
{
    all_with(ctx, &AggregateConfig::default(), promises)
}

/// [`all`] with an explicit concurrency ceiling.
pub fn all_with<T>(
    ctx: &Context,
    config: &AggregateConfig,
    promises: Vec<Promise<T>>,
) -> Promise<Vec<T>>
where
    T: Clone + Send + Sync + 'static,
{
    all_task_with(ctx, config, awaiting(promises))
}

/// Runs every task with a shared context and resolves with their values in
/// input order.
///
/// The first task error (or panic) rejects the aggregate and cancels the
/// context the tasks share, so siblings that watch it can stop early.
pub fn all_task<T>(ctx: &Context, tasks: Vec<Task<T>>) -> Promise<Vec<T>>
where
    T: Send + Sync + 'static,
{
    all_task_with(ctx, &AggregateConfig::default(), tasks)
}

/// [`all_task`] with an explicit concurrency ceiling.
pub fn all_task_with<T>(
    ctx: &Context,
    config: &AggregateConfig,
    tasks: Vec<Task<T>>,
) -> Promise<Vec<T>>
where
    T: Send + Sync + 'static,
{
    let limiter = Limiter::new(config.max_concurrency);
    Promise::new(ctx, move |ctx| fail_fast(ctx, &limiter, tasks))
}

/// Waits for every promise and resolves with each one's [`Outcome`] in
/// input order. Never rejects because one of them failed.
pub fn all_settled<T>(ctx: &Context, promises: Vec<Promise<T>>) -> Promise<Vec<Outcome<T>>>
where
    T: Clone + Send + Sync + 'static,
{
    all_settled_with(ctx, &AggregateConfig::default(), promises)
}

/// [`all_settled`] with an explicit concurrency ceiling.
pub fn all_settled_with<T>(
    ctx: &Context,
    config: &AggregateConfig,
    promises: Vec<Promise<T>>,
) -> Promise<Vec<Outcome<T>>>
where
    T: Clone + Send + Sync + 'static,
{
    all_task_settled_with(ctx, config, awaiting(promises))
}

/// Runs every task with `ctx` and resolves with each one's [`Outcome`] in
/// input order. A failing task never cancels its siblings.
pub fn all_task_settled<T>(ctx: &Context, tasks: Vec<Task<T>>) -> Promise<Vec<Outcome<T>>>
where
    T: Send + Sync + 'static,
{
    all_task_settled_with(ctx, &AggregateConfig::default(), tasks)
}

/// [`all_task_settled`] with an explicit concurrency ceiling.
pub fn all_task_settled_with<T>(
    ctx: &Context,
    config: &AggregateConfig,
    tasks: Vec<Task<T>>,
) -> Promise<Vec<Outcome<T>>>
where
    T: Send + Sync + 'static,
{
    let limiter = Limiter::new(config.max_concurrency);
    Promise::new(ctx, move |ctx| Ok::<_, Error>(settle_each(ctx, &limiter, tasks)))
}

fn awaiting<T>(promises: Vec<Promise<T>>) -> Vec<Task<T>>
where
    T: Clone + Send + Sync + 'static,
{
    promises
        .into_iter()
        .map(|promise| Task::new(move |_: &Context| promise.await_value()))
        .collect()
}

fn fail_fast<T>(ctx: &Context, limiter: &Limiter, tasks: Vec<Task<T>>) -> Result<Vec<T>>
where
    T: Send + 'static,
{
    let total = tasks.len();
    let (group, cancel_group) = Context::with_cancel(ctx);
    let (results_tx, results) = channel::unbounded::<(usize, Result<T>)>();
    let mut values: Vec<Option<T>> = (0..total).map(|_| None).collect();
    let mut launched = 0;

    debug!(units = total, capacity = limiter.capacity(), "fail-fast aggregation started");

    for (index, task) in tasks.into_iter().enumerate() {
        let Some(permit) = limiter.acquire(&group) else {
            break;
        };

        let unit_ctx = group.clone();
        let cancel_siblings = cancel_group.clone();
        let results_tx = results_tx.clone();
        let spawned = spawn_worker("promise-all", move || {
            let _permit = permit;
            let result = task.run(&unit_ctx);
            if result.is_err() {
                cancel_siblings.cancel();
            }
            // The collector may already have returned; the result is moot.
            let _ = results_tx.send((index, result));
        });

        if let Err(err) = spawned {
            cancel_group.cancel();
            return Err(err.into());
        }
        launched += 1;
    }
    drop(results_tx);

    for _ in 0..launched {
        match results.recv() {
            Ok((index, Ok(value))) => {
                trace!(index, "unit fulfilled");
                values[index] = Some(value);
            }
            Ok((index, Err(err))) => {
                debug!(index, error = %err, "unit failed; cancelling siblings");
                cancel_group.cancel();
                return Err(err);
            }
            Err(_) => break,
        }
    }

    // Stopped admitting because the caller's context fired.
    if launched < total {
        cancel_group.cancel();
        return Err(ctx.err().unwrap_or(ContextError::Cancelled).into());
    }
    cancel_group.cancel();

    values
        .into_iter()
        .map(|value| value.ok_or(Error::NoResult))
        .collect()
}

fn settle_each<T>(ctx: &Context, limiter: &Limiter, tasks: Vec<Task<T>>) -> Vec<Outcome<T>>
where
    T: Send + 'static,
{
    let total = tasks.len();
    let (results_tx, results) = channel::unbounded::<(usize, Result<T>)>();
    let mut outcomes: Vec<Outcome<T>> = (0..total).map(|_| Outcome::Unsettled).collect();
    let mut launched = 0;

    debug!(units = total, capacity = limiter.capacity(), "settled aggregation started");

    for (index, task) in tasks.into_iter().enumerate() {
        let Some(permit) = limiter.acquire(ctx) else {
            let err = ctx.err().unwrap_or(ContextError::Cancelled);
            outcomes[index] = Outcome::rejected(err);
            continue;
        };

        let unit_ctx = ctx.clone();
        let results_tx = results_tx.clone();
        let spawned = spawn_worker("promise-all-settled", move || {
            let _permit = permit;
            let _ = results_tx.send((index, task.run(&unit_ctx)));
        });

        match spawned {
            Ok(()) => launched += 1,
            Err(err) => outcomes[index] = Outcome::rejected(err),
        }
    }
    drop(results_tx);

    for (index, result) in results.iter().take(launched) {
        trace!(index, ok = result.is_ok(), "unit settled");
        outcomes[index] = Outcome::from(result);
    }

    outcomes
}
