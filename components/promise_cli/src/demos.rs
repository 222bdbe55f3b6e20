//! Demo programs.
//!
//! Every demo builds some promises over simulated work, waits for the
//! result and describes it as a [`Report`].

use crate::cli::{Cli, Demo, Fault};
use crate::report::Report;
use crate::users::UserAggregate;
use promise_core::{Error, Result};
use promise_runtime::{
    all_settled_with, all_task_settled_with, all_task_with, all_with, then_task, AggregateConfig,
    Context, Promise, Task,
};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Knobs shared by all demos.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Number of units the fan-out demos create
    pub tasks: usize,
    /// How long each unit works
    pub delay: Duration,
    /// Deadline of the timeout and abort demos
    pub timeout: Duration,
    /// Aggregation settings
    pub config: AggregateConfig,
    /// How odd-numbered units misbehave
    pub fault: Fault,
}

impl Settings {
    /// Builds settings from parsed arguments.
    ///
    /// `--max-concurrency` takes precedence over `PROMISE_MAX_CONCURRENCY`.
    pub fn from_cli(cli: &Cli) -> Self {
        let config = match cli.max_concurrency {
            Some(n) => AggregateConfig::new().with_max_concurrency(n),
            None => AggregateConfig::from_env(),
        };

        Settings {
            tasks: cli.tasks,
            delay: Duration::from_millis(cli.delay_ms),
            timeout: Duration::from_millis(cli.timeout_ms),
            config,
            fault: cli.fault,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            tasks: 2,
            delay: Duration::from_secs(1),
            timeout: Duration::from_millis(300),
            config: AggregateConfig::default(),
            fault: Fault::None,
        }
    }
}

/// Runs one demo to completion.
pub fn run(demo: &Demo, settings: &Settings) -> Report {
    let name = demo.name();
    let started = Instant::now();
    let ctx = Context::background();
    info!(demo = name, "starting demo");

    match demo {
        Demo::Promise => {
            let result = Promise::new(&ctx, unit(0, settings))
                .inspect_err(|err| warn!(error = %err, "task failed"))
                .await_value();
            Report::single(name, result, started.elapsed())
        }
        Demo::Result => {
            let outcome = Promise::new(&ctx, unit(0, settings)).await_result();
            Report::single(name, outcome.into_result(), started.elapsed())
        }
        Demo::Then => {
            let first = Promise::new(&ctx, unit(0, settings));
            let delay = settings.delay;
            let second = then_task(&ctx, &first, move |ctx, n| {
                info!(n, "running then");
                match ctx.wait_timeout(delay) {
                    Some(err) => Err(Error::from(err)),
                    None => Ok(format!("got number: {n}")),
                }
            });
            Report::single(name, second.await_value(), started.elapsed())
        }
        Demo::Catch => {
            let promise = Promise::new(&ctx, |_: &Context| -> Result<u32> {
                panic!("running task: {}", number(0))
            });
            let caught = promise.catch(|err| warn!(error = %err, "got error"));
            let result = match caught {
                Some(err) => Err(err),
                None => promise.await_value(),
            };
            Report::single(name, result, started.elapsed())
        }
        Demo::Panic => {
            let result = Promise::new(&ctx, |_: &Context| -> Result<u32> {
                panic!("something happened")
            })
            .await_value();
            Report::single(name, result, started.elapsed())
        }
        Demo::Timeout => {
            let (ctx, cancel) = Context::with_timeout(&ctx, settings.timeout);
            let promise = Promise::new(&ctx, unit(0, settings));
            // Awaiting again returns the stored outcome without rerunning.
            let outcomes = vec![promise.await_result(), promise.await_result()];
            cancel.cancel();
            Report::from_outcomes(name, Ok(outcomes), started.elapsed())
        }
        Demo::All => {
            let promises = spawn_units(&ctx, settings);
            let result = all_with(&ctx, &settings.config, promises).await_value();
            Report::values(name, result, started.elapsed())
        }
        Demo::AllTask => {
            let result = all_task_with(&ctx, &settings.config, tasks(settings)).await_value();
            Report::values(name, result, started.elapsed())
        }
        Demo::AllAbort => {
            let (ctx, cancel) = Context::with_timeout(&ctx, settings.timeout);
            let promises = spawn_units(&ctx, settings);
            let result = all_with(&ctx, &settings.config, promises).await_value();
            cancel.cancel();
            Report::values(name, result, started.elapsed())
        }
        Demo::AllSettled => {
            let promises = spawn_units(&ctx, settings);
            let result = all_settled_with(&ctx, &settings.config, promises).await_value();
            Report::from_outcomes(name, result, started.elapsed())
        }
        Demo::AllTaskSettled => {
            let result =
                all_task_settled_with(&ctx, &settings.config, tasks(settings)).await_value();
            Report::from_outcomes(name, result, started.elapsed())
        }
        Demo::Aggregate { users } => {
            let aggregate = UserAggregate::new(&ctx, settings.delay);
            let promises = (0..*users).map(|id| aggregate.load_all(id)).collect();
            let result = all_settled_with(&ctx, &settings.config, promises).await_value();
            Report::from_outcomes(name, result, started.elapsed())
        }
    }
}

// Stand-in for the random number a unit of work produces.
fn number(index: usize) -> u32 {
    (index as u32).wrapping_mul(7).wrapping_add(3) % 10
}

/// Simulated work: waits for `delay` unless the context fires first, then
/// misbehaves if the unit is odd-numbered and a fault is configured.
fn unit(index: usize, settings: &Settings) -> impl FnOnce(&Context) -> Result<u32> + Send + 'static {
    let delay = settings.delay;
    let fault = settings.fault;

    move |ctx: &Context| {
        let n = number(index);
        info!(task = index, n, "running task");

        if let Some(err) = ctx.wait_timeout(delay) {
            debug!(task = index, error = %err, "task aborted");
            return Err(err.into());
        }

        match fault {
            _ if index % 2 == 0 => Ok(n),
            Fault::None => Ok(n),
            Fault::Error => Err(Error::msg(format!("task {index} failed"))),
            Fault::Panic => panic!("running task: {n}"),
        }
    }
}

fn spawn_units(ctx: &Context, settings: &Settings) -> Vec<Promise<u32>> {
    (0..settings.tasks)
        .map(|index| Promise::new(ctx, unit(index, settings)))
        .collect()
}

fn tasks(settings: &Settings) -> Vec<Task<u32>> {
    (0..settings.tasks)
        .map(|index| Task::new(unit(index, settings)))
        .collect()
}
