//! Cancellation contexts.
//!
//! A [`Context`] carries a cancellation/deadline signal down a tree of work.
//! Cancelling a context cancels all of its descendants with the same error;
//! cancelling a child never reaches its parent.
//!
//! The signal is a channel: [`Context::done`] hands out a receiver that
//! becomes ready (disconnected) once the context fires, so it can take part
//! in a `crossbeam::channel::select!` alongside other events.

use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;
use promise_core::ContextError;
use std::fmt;
use std::sync::{Arc, Weak};
use std::thread;
use std::time::{Duration, Instant};
use tracing::trace;

struct Inner {
    state: Mutex<State>,
    done: Receiver<()>,
    deadline: Option<Instant>,
    cancellable: bool,
}

#[derive(Default)]
struct State {
    err: Option<ContextError>,
    // Dropped on cancellation; receivers of `done` then see a disconnect.
    done_tx: Option<Sender<()>>,
    children: Vec<Weak<Inner>>,
}

impl Inner {
    fn cancel(&self, err: ContextError) {
        let children = {
            let mut state = self.state.lock();
            if state.err.is_some() {
                return;
            }
            state.err = Some(err);
            state.done_tx = None;
            std::mem::take(&mut state.children)
        };

        for child in children.iter().filter_map(Weak::upgrade) {
            child.cancel(err);
        }
    }
}

/// A cancellation signal shared by a tree of work.
///
/// # Examples
///
/// ```
/// use promise_runtime::{Context, ContextError};
///
/// let (ctx, cancel) = Context::with_cancel(&Context::background());
/// assert!(ctx.err().is_none());
///
/// cancel.cancel();
/// assert_eq!(ctx.err(), Some(ContextError::Cancelled));
/// assert!(ctx.done().recv().is_err());
/// ```
#[derive(Clone)]
pub struct Context {
    inner: Arc<Inner>,
}

impl Context {
    /// Returns a context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State::default()),
                done: channel::never(),
                deadline: None,
                cancellable: false,
            }),
        }
    }

    /// Derives a cancellable child of `parent`.
    ///
    /// The child fires when the returned handle is cancelled or when the
    /// parent fires, whichever happens first.
    pub fn with_cancel(parent: &Context) -> (Context, CancelHandle) {
        let ctx = Context::child_of(parent, parent.inner.deadline);
        let handle = CancelHandle {
            inner: Arc::clone(&ctx.inner),
        };
        (ctx, handle)
    }

    /// Derives a child of `parent` that fires with
    /// [`ContextError::DeadlineExceeded`] at `deadline`.
    ///
    /// A parent deadline that is earlier wins.
    pub fn with_deadline(parent: &Context, deadline: Instant) -> (Context, CancelHandle) {
        let effective = match parent.inner.deadline {
            Some(inherited) if inherited < deadline => inherited,
            _ => deadline,
        };
        let ctx = Context::child_of(parent, Some(effective));
        let handle = CancelHandle {
            inner: Arc::clone(&ctx.inner),
        };

        if effective <= Instant::now() {
            ctx.inner.cancel(ContextError::DeadlineExceeded);
        } else {
            ctx.start_timer(effective);
        }

        (ctx, handle)
    }

    /// Derives a child of `parent` that fires after `timeout`.
    pub fn with_timeout(parent: &Context, timeout: Duration) -> (Context, CancelHandle) {
        Context::with_deadline(parent, Instant::now() + timeout)
    }

    fn child_of(parent: &Context, deadline: Option<Instant>) -> Context {
        let (done_tx, done) = channel::bounded(0);
        let inner = Arc::new(Inner {
            state: Mutex::new(State {
                err: None,
                done_tx: Some(done_tx),
                children: Vec::new(),
            }),
            done,
            deadline,
            cancellable: true,
        });

        if parent.inner.cancellable {
            let inherited = {
                let mut state = parent.inner.state.lock();
                match state.err {
                    Some(err) => Some(err),
                    None => {
                        state.children.retain(|child| child.strong_count() > 0);
                        state.children.push(Arc::downgrade(&inner));
                        None
                    }
                }
            };
            if let Some(err) = inherited {
                inner.cancel(err);
            }
        }

        Context { inner }
    }

    fn start_timer(&self, deadline: Instant) {
        let weak = Arc::downgrade(&self.inner);
        let done = self.inner.done.clone();
        // The timer holds no strong reference: dropping the context drops
        // the done sender, which wakes the timer and ends it.
        let spawned = thread::Builder::new()
            .name("context-deadline".to_string())
            .spawn(move || {
                crossbeam::select! {
                    recv(channel::at(deadline)) -> _ => {
                        if let Some(inner) = weak.upgrade() {
                            trace!("context deadline reached");
                            inner.cancel(ContextError::DeadlineExceeded);
                        }
                    }
                    recv(done) -> _ => {}
                }
            });

        if let Err(err) = spawned {
            // Without a timer the deadline could never fire; fail closed.
            tracing::warn!(error = %err, "failed to start deadline timer");
            self.inner.cancel(ContextError::DeadlineExceeded);
        }
    }

    /// Returns a receiver that becomes ready once the context fires.
    ///
    /// Readiness is signalled by disconnection, so every clone of the
    /// receiver observes it. For [`Context::background`] the receiver never
    /// becomes ready.
    pub fn done(&self) -> Receiver<()> {
        self.inner.done.clone()
    }

    /// Returns why the context fired, or `None` while it is still live.
    pub fn err(&self) -> Option<ContextError> {
        self.inner.state.lock().err
    }

    /// Returns true once the context has fired.
    pub fn is_cancelled(&self) -> bool {
        self.err().is_some()
    }

    /// Returns the effective deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Returns false for contexts that can never fire.
    pub fn can_cancel(&self) -> bool {
        self.inner.cancellable
    }

    /// Blocks until the context fires or `timeout` elapses.
    ///
    /// Returns the context error if it fired in time.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<ContextError> {
        let _ = self.inner.done.recv_timeout(timeout);
        self.err()
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::background()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("cancellable", &self.inner.cancellable)
            .field("deadline", &self.inner.deadline)
            .field("err", &self.err())
            .finish()
    }
}

/// Cancels the context it was created with.
///
/// Dropping the handle does not cancel; call [`CancelHandle::cancel`] once
/// the work governed by the context is finished to release its resources.
#[derive(Clone)]
pub struct CancelHandle {
    inner: Arc<Inner>,
}

impl CancelHandle {
    /// Cancels the context and all of its descendants.
    ///
    /// Has no effect if the context already fired.
    pub fn cancel(&self) {
        self.inner.cancel(ContextError::Cancelled);
    }
}

impl fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CancelHandle {{ ... }}")
    }
}
