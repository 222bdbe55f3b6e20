//! Promise error types.
//!
//! Every failure a promise can settle with is an [`Error`]. Callers tell the
//! failure modes apart with [`Error::kind`], never by matching on messages.

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// Result alias used across the promise crates.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The kind of a promise error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The task reported a failure itself
    Rejected,
    /// The task panicked and the panic was contained
    Panic,
    /// The governing context was cancelled
    Cancelled,
    /// The governing context's deadline passed
    DeadlineExceeded,
    /// An outcome was read before it was ever settled
    NoResult,
}

/// Why a cancellation context fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ContextError {
    /// Explicitly cancelled, directly or through a parent
    #[error("context canceled")]
    Cancelled,
    /// The deadline of the context (or one of its parents) passed
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// An error a promise settles with.
///
/// `Error` is cheap to clone: every waiter on a promise receives a clone of
/// the same error, and a returned error keeps its identity when it is
/// forwarded through combinators.
///
/// # Examples
///
/// ```
/// use promise_core::{ContextError, Error, ErrorKind};
///
/// let err = Error::msg("user not found");
/// assert_eq!(err.kind(), ErrorKind::Rejected);
/// assert_eq!(err.to_string(), "user not found");
///
/// let cancelled: Error = ContextError::DeadlineExceeded.into();
/// assert_eq!(cancelled.kind(), ErrorKind::DeadlineExceeded);
/// ```
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// An error returned by a task, kept verbatim.
    #[error("{0}")]
    Rejected(Arc<dyn StdError + Send + Sync + 'static>),

    /// A panic raised while running a task.
    #[error("panic: {message}")]
    Panic {
        /// The panic payload rendered as text
        message: String,
    },

    /// The governing context fired before the task settled.
    #[error(transparent)]
    Context(#[from] ContextError),

    /// Reading an outcome that was never settled.
    #[error("no result")]
    NoResult,
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct Message(String);

impl Error {
    /// Wraps an arbitrary error returned by a task.
    pub fn new<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Error::Rejected(Arc::new(error))
    }

    /// Creates a returned error from a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        Error::new(Message(message.into()))
    }

    /// Creates an internal fault error with the given description.
    pub fn panic(message: impl Into<String>) -> Self {
        Error::Panic {
            message: message.into(),
        }
    }

    /// Converts a caught panic payload into an internal fault error.
    ///
    /// String payloads (the common `panic!("...")` case) are embedded as
    /// is; payloads that are themselves promise errors contribute their
    /// display text.
    pub fn from_panic(payload: Box<dyn Any + Send + 'static>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else if let Some(err) = payload.downcast_ref::<Error>() {
            err.to_string()
        } else {
            "unknown panic payload".to_string()
        };
        Error::Panic { message }
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Rejected(_) => ErrorKind::Rejected,
            Error::Panic { .. } => ErrorKind::Panic,
            Error::Context(ContextError::Cancelled) => ErrorKind::Cancelled,
            Error::Context(ContextError::DeadlineExceeded) => ErrorKind::DeadlineExceeded,
            Error::NoResult => ErrorKind::NoResult,
        }
    }

    /// Returns true if the error came from a contained panic.
    pub fn is_panic(&self) -> bool {
        self.kind() == ErrorKind::Panic
    }

    /// Returns true if the error came from the governing context.
    pub fn is_context(&self) -> bool {
        matches!(self, Error::Context(_))
    }

    /// Returns the context error, if this is one.
    pub fn context_error(&self) -> Option<ContextError> {
        match self {
            Error::Context(err) => Some(*err),
            _ => None,
        }
    }

    /// Downcasts a returned error to its concrete type.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: StdError + 'static,
    {
        match self {
            Error::Rejected(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }
}

impl From<String> for Error {
    fn from(message: String) -> Self {
        Error::msg(message)
    }
}

impl From<&str> for Error {
    fn from(message: &str) -> Self {
        Error::msg(message)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::new(err)
    }
}

// Returned errors compare by identity so a forwarded error equals its source.
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Error::Rejected(a), Error::Rejected(b)) => Arc::ptr_eq(a, b),
            (Error::Panic { message: a }, Error::Panic { message: b }) => a == b,
            (Error::Context(a), Error::Context(b)) => a == b,
            (Error::NoResult, Error::NoResult) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Rejected => "rejected",
            ErrorKind::Panic => "panic",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::DeadlineExceeded => "deadline exceeded",
            ErrorKind::NoResult => "no result",
        };
        f.write_str(name)
    }
}
