//! Units of work.
//!
//! A [`Task`] is a caller-supplied function of a [`Context`] producing a
//! value or an error. Running a task contains any panic it raises.

use crate::context::Context;
use promise_core::{Error, Result};
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use tracing::warn;

/// A unit of work to run on a promise worker thread.
///
/// Well-behaved tasks watch [`Context::done`] and return early once it
/// fires; the runtime cannot stop a task that ignores it.
///
/// # Examples
///
/// ```
/// use promise_runtime::{Context, Task};
///
/// let task = Task::new(|_ctx: &Context| Ok::<_, &str>(21 * 2));
/// assert_eq!(task.run(&Context::background()).unwrap(), 42);
/// ```
pub struct Task<T> {
    callback: Box<dyn FnOnce(&Context) -> Result<T> + Send>,
}

impl<T> Task<T> {
    /// Creates a new Task from a closure.
    ///
    /// # Arguments
    ///
    /// * `f` - The function to execute; its error type converts into [`Error`]
    pub fn new<F, E>(f: F) -> Self
    where
        F: FnOnce(&Context) -> std::result::Result<T, E> + Send + 'static,
        E: Into<Error>,
    {
        Self {
            callback: Box::new(move |ctx| f(ctx).map_err(Into::into)),
        }
    }

    /// Executes the task, converting a panic into [`Error::Panic`].
    ///
    /// # Returns
    ///
    /// The task's value, its returned error, or the contained panic.
    pub fn run(self, ctx: &Context) -> Result<T> {
        let callback = self.callback;
        match panic::catch_unwind(AssertUnwindSafe(move || callback(ctx))) {
            Ok(result) => result,
            Err(payload) => {
                let err = Error::from_panic(payload);
                warn!(error = %err, "task panicked; converted to error");
                Err(err)
            }
        }
    }
}

impl<T> std::fmt::Debug for Task<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Task {{ ... }}")
    }
}

/// Starts a detached worker thread.
pub(crate) fn spawn_worker<F>(name: &str, f: F) -> io::Result<()>
where
    F: FnOnce() + Send + 'static,
{
    thread::Builder::new()
        .name(name.to_string())
        .spawn(f)
        .map(|_| ())
}
