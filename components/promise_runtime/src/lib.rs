//! Thread-backed promise runtime.
//!
//! This crate provides promises whose work runs on OS threads:
//! - Cancellation contexts with deadlines that propagate down a tree
//! - Promises that settle exactly once, racing their work against a context
//! - Sequencing (`then`, `catch`) and fan-out aggregation (`all*`)
//!
//! # Overview
//!
//! - [`Context`] - Cancellation/deadline signal threaded through the work
//! - [`Promise`] - Handle to the single eventual outcome of a [`Task`]
//! - [`then`] / [`catch`] - Chain dependent work, observe failures
//! - [`all`] / [`all_task`] - Fail-fast fan-out with ordered values
//! - [`all_settled`] / [`all_task_settled`] - Fan-out collecting every outcome
//! - [`AggregateConfig`] - Concurrency ceiling for the fan-out combinators
//!
//! # Examples
//!
//! ## Spawning and waiting
//!
//! ```
//! use promise_runtime::{Context, Promise};
//!
//! let ctx = Context::background();
//! let promise = Promise::new(&ctx, |_ctx| Ok::<_, &str>(6 * 7));
//! assert_eq!(promise.await_value().unwrap(), 42);
//! ```
//!
//! ## Timeouts
//!
//! ```
//! use std::time::Duration;
//! use promise_runtime::{Context, ErrorKind, Promise};
//!
//! let (ctx, cancel) = Context::with_timeout(&Context::background(), Duration::from_millis(20));
//! let slow = Promise::new(&ctx, |_ctx| {
//!     std::thread::sleep(Duration::from_millis(500));
//!     Ok::<_, &str>(1)
//! });
//! assert_eq!(slow.await_value().unwrap_err().kind(), ErrorKind::DeadlineExceeded);
//! cancel.cancel();
//! ```
//!
//! ## Settled aggregation
//!
//! ```
//! use promise_runtime::{all_task_settled, Context, Task};
//!
//! let tasks = vec![
//!     Task::new(|_: &Context| Ok::<_, &str>(5)),
//!     Task::new(|_: &Context| Err::<i32, _>("E")),
//! ];
//! let outcomes = all_task_settled(&Context::background(), tasks).await_value().unwrap();
//! assert!(outcomes[0].ok());
//! assert!(!outcomes[1].ok());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod aggregate;
pub mod config;
pub mod context;
pub mod limiter;
pub mod promise;
pub mod task;
pub mod then;

// Re-export main types at crate root
pub use aggregate::{
    all, all_settled, all_settled_with, all_task, all_task_settled, all_task_settled_with,
    all_task_with, all_with,
};
pub use config::{AggregateConfig, DEFAULT_MAX_CONCURRENCY, MAX_CONCURRENCY_ENV};
pub use context::{CancelHandle, Context};
pub use limiter::{Limiter, Permit};
pub use promise::Promise;
pub use task::Task;
pub use then::{catch, then, then_task};

pub use promise_core::{ContextError, Error, ErrorKind, Outcome, Result, Status};

/// Runs `f` on a new thread; shorthand for [`Promise::new`].
pub fn spawn<T, F, E>(ctx: &Context, f: F) -> Promise<T>
where
    T: Send + Sync + 'static,
    F: FnOnce(&Context) -> std::result::Result<T, E> + Send + 'static,
    E: Into<Error>,
{
    Promise::new(ctx, f)
}
