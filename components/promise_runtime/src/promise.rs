//! Thread-backed promises.
//!
//! A [`Promise`] is a handle to the single eventual outcome of a [`Task`]
//! running on its own thread. The task races the promise's governing
//! [`Context`]: whichever finishes first settles the promise, and the other
//! result is discarded.

use crate::context::Context;
use crate::task::{spawn_worker, Task};
use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use parking_lot::{Mutex, RwLock};
use promise_core::{ContextError, Error, Outcome, Result, Status};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

struct Shared<T> {
    id: u64,
    // One-shot guard: the first settle() to flip it owns the outcome.
    claimed: AtomicBool,
    outcome: RwLock<Outcome<T>>,
    // Dropped after the outcome is written; waiters see a disconnect.
    settled_tx: Mutex<Option<Sender<()>>>,
    settled: Receiver<()>,
}

/// A handle to the eventual outcome of asynchronous work.
///
/// Cloning a promise is cheap and every clone observes the same outcome.
/// The work runs exactly once no matter how many times it is awaited.
///
/// # Examples
///
/// ```
/// use promise_runtime::{Context, Promise, Status};
///
/// let promise = Promise::new(&Context::background(), |_ctx| Ok::<_, &str>(42));
/// assert_eq!(promise.await_value().unwrap(), 42);
/// assert_eq!(promise.status(), Status::Fulfilled);
/// ```
pub struct Promise<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Promise<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Promise<T>
where
    T: Send + Sync + 'static,
{
    /// Runs `f` on a new thread and returns a promise of its outcome.
    ///
    /// # Arguments
    ///
    /// * `ctx` - Governs the promise; if it fires first the promise rejects
    ///   with the context error
    /// * `f` - The work to run; a panic inside it becomes [`Error::Panic`]
    pub fn new<F, E>(ctx: &Context, f: F) -> Self
    where
        F: FnOnce(&Context) -> std::result::Result<T, E> + Send + 'static,
        E: Into<Error>,
    {
        Promise::from_task(ctx, Task::new(f))
    }

    /// Runs an already boxed [`Task`] and returns a promise of its outcome.
    pub fn from_task(ctx: &Context, task: Task<T>) -> Self {
        let promise = Promise::pending();
        let id = promise.id();
        let (finished_tx, finished) = channel::bounded::<()>(0);

        // A context that already fired wins before the task can start; the
        // task still runs and sees the fired context.
        if let Some(err) = ctx.err() {
            debug!(promise = id, error = %err, "context fired before spawn");
            promise.settle(Err(err.into()));
        }

        let worker = promise.clone();
        let task_ctx = ctx.clone();
        let spawned = spawn_worker("promise-worker", move || {
            let result = task.run(&task_ctx);
            if !worker.settle(result) {
                trace!(promise = id, "task finished after settlement; result discarded");
            }
            drop(finished_tx);
        });
        if let Err(err) = spawned {
            promise.settle(Err(Error::from(err)));
            return promise;
        }

        if ctx.can_cancel() {
            let observer = promise.clone();
            let observed = ctx.clone();
            let done = ctx.done();
            let spawned = spawn_worker("promise-cancel", move || {
                crossbeam::select! {
                    recv(done) -> _ => {
                        let err = observed.err().unwrap_or(ContextError::Cancelled);
                        if observer.settle(Err(err.into())) {
                            debug!(promise = id, error = %err, "context fired before task finished");
                        }
                    }
                    recv(finished) -> _ => {}
                }
            });
            if let Err(err) = spawned {
                debug!(promise = id, error = %err, "cancellation observer unavailable");
            }
        }

        trace!(promise = id, "promise spawned");
        promise
    }

    /// Creates a promise that is already fulfilled with `value`.
    pub fn resolve(value: T) -> Self {
        let promise = Promise::pending();
        promise.settle(Ok(value));
        promise
    }

    /// Creates a promise that is already rejected with `error`.
    pub fn reject(error: impl Into<Error>) -> Self {
        let promise = Promise::pending();
        promise.settle(Err(error.into()));
        promise
    }

    fn pending() -> Self {
        let (settled_tx, settled) = channel::bounded(0);
        Self {
            shared: Arc::new(Shared {
                id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
                claimed: AtomicBool::new(false),
                outcome: RwLock::new(Outcome::Unsettled),
                settled_tx: Mutex::new(Some(settled_tx)),
                settled,
            }),
        }
    }
}

impl<T> Promise<T> {
    /// Settles the promise unless it already settled.
    ///
    /// Returns true if this call won the race.
    fn settle(&self, result: Result<T>) -> bool {
        if self
            .shared
            .claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        let outcome = Outcome::from(result);
        let status = outcome.status();
        *self.shared.outcome.write() = outcome;
        self.shared.settled_tx.lock().take();
        trace!(promise = self.shared.id, %status, "promise settled");
        true
    }

    /// Returns a process-unique identifier, used in log events.
    pub fn id(&self) -> u64 {
        self.shared.id
    }

    /// Returns the current status without blocking.
    pub fn status(&self) -> Status {
        self.shared.outcome.read().status()
    }

    /// Returns true once the promise has settled.
    pub fn is_settled(&self) -> bool {
        self.status().is_settled()
    }

    /// Blocks until the promise settles and returns its status.
    pub fn wait(&self) -> Status {
        // Only ever disconnects, never carries a message.
        let _ = self.shared.settled.recv();
        self.status()
    }

    /// Blocks for at most `timeout`; returns true if the promise settled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        !matches!(
            self.shared.settled.recv_timeout(timeout),
            Err(RecvTimeoutError::Timeout)
        )
    }

    /// Blocks until settled, then returns the error, if any.
    pub fn error(&self) -> Option<Error> {
        self.wait();
        self.shared.outcome.read().error()
    }
}

impl<T> Promise<T>
where
    T: Clone,
{
    /// Blocks until the promise settles and returns its value or error.
    ///
    /// Safe to call from any number of threads, any number of times.
    pub fn await_value(&self) -> Result<T> {
        self.wait();
        self.shared.outcome.read().as_result().cloned()
    }

    /// Like [`Promise::await_value`], wrapped as an [`Outcome`].
    pub fn await_result(&self) -> Outcome<T> {
        self.wait();
        self.shared.outcome.read().clone()
    }

    /// Waits at most `timeout`; `None` if the promise is still pending.
    pub fn await_timeout(&self, timeout: Duration) -> Option<Result<T>> {
        if self.wait_timeout(timeout) {
            Some(self.shared.outcome.read().as_result().cloned())
        } else {
            None
        }
    }

    /// Returns a snapshot of the outcome without blocking.
    pub fn try_outcome(&self) -> Outcome<T> {
        self.shared.outcome.read().clone()
    }
}

impl<T> Promise<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Chains `resolver` onto this promise. See [`crate::then`].
    pub fn then<R, F>(&self, resolver: F) -> Promise<R>
    where
        R: Clone + Send + Sync + 'static,
        F: FnOnce(T) -> Promise<R> + Send + 'static,
    {
        crate::then::then(self, resolver)
    }

    /// Waits and runs `handler` if the promise rejected. See [`crate::catch`].
    pub fn catch<F>(&self, handler: F) -> Option<Error>
    where
        F: FnOnce(&Error),
    {
        crate::then::catch(self, handler)
    }

    /// Returns a promise with the same outcome that runs `handler` on the
    /// error first, if there is one.
    ///
    /// The error is observed, not suppressed.
    pub fn inspect_err<F>(&self, handler: F) -> Promise<T>
    where
        F: FnOnce(&Error) + Send + 'static,
    {
        let upstream = self.clone();
        Promise::new(&Context::background(), move |_| {
            upstream.await_value().inspect_err(handler)
        })
    }
}

impl<T> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise")
            .field("id", &self.shared.id)
            .field("status", &self.status())
            .finish()
    }
}
