//! Sequencing combinators.

use crate::context::Context;
use crate::promise::Promise;
use promise_core::Error;

/// Chains dependent work onto `promise`.
///
/// If `promise` rejects, the returned promise rejects with the same error
/// and `resolver` is never called. Otherwise `resolver` receives the value
/// and the returned promise settles with the outcome of the promise it
/// returns.
///
/// # Examples
///
/// ```
/// use promise_runtime::{then, Context, Promise};
///
/// let first = Promise::new(&Context::background(), |_| Ok::<_, &str>(2));
/// let second = then(&first, |n| Promise::resolve(format!("got number: {n}")));
/// assert_eq!(second.await_value().unwrap(), "got number: 2");
/// ```
pub fn then<T, R, F>(promise: &Promise<T>, resolver: F) -> Promise<R>
where
    T: Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
    F: FnOnce(T) -> Promise<R> + Send + 'static,
{
    let upstream = promise.clone();
    Promise::new(&Context::background(), move |_| {
        let value = upstream.await_value()?;
        resolver(value).await_value()
    })
}

/// Chains a context-aware step onto `promise`.
///
/// Unlike [`then`], the step is a plain function of the context and the
/// upstream value, and the returned promise is governed by `ctx`: if `ctx`
/// fires first the chain rejects with the context error.
pub fn then_task<T, R, E, F>(ctx: &Context, promise: &Promise<T>, step: F) -> Promise<R>
where
    T: Clone + Send + Sync + 'static,
    R: Send + Sync + 'static,
    E: Into<Error>,
    F: FnOnce(&Context, T) -> Result<R, E> + Send + 'static,
{
    let upstream = promise.clone();
    Promise::new(ctx, move |ctx| {
        let value = upstream.await_value()?;
        step(ctx, value).map_err(Into::into)
    })
}

/// Waits for `promise` and hands its error, if any, to `handler`.
///
/// The error is returned either way so the caller still sees it; `handler`
/// is only for side effects such as logging. Returns `None` without
/// calling `handler` when the promise fulfilled.
pub fn catch<T, F>(promise: &Promise<T>, handler: F) -> Option<Error>
where
    F: FnOnce(&Error),
{
    let err = promise.error()?;
    handler(&err);
    Some(err)
}
