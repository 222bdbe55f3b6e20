//! Settled outcomes.
//!
//! An [`Outcome`] is the value-or-error a promise settles with. It is
//! immutable once built and can be shared and cloned freely.

use crate::error::{Error, Result};
use crate::status::Status;

/// The outcome of a unit of work.
///
/// `Unsettled` stands for "never settled" and is what [`Default`] builds.
/// Reading the error of an unsettled outcome yields [`Error::NoResult`]
/// rather than pretending the work succeeded.
///
/// # Examples
///
/// ```
/// use promise_core::{Error, Outcome};
///
/// let outcome = Outcome::resolved("ready");
/// assert_eq!(outcome.value(), Some(&"ready"));
/// assert!(outcome.error().is_none());
///
/// let unsettled: Outcome<u8> = Outcome::default();
/// assert_eq!(unsettled.error(), Some(Error::NoResult));
/// assert_eq!(unsettled.value(), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// Never settled
    Unsettled,
    /// Settled with a value
    Fulfilled(T),
    /// Settled with an error
    Rejected(Error),
}

impl<T> Outcome<T> {
    /// Builds a fulfilled outcome.
    pub fn resolved(value: T) -> Self {
        Outcome::Fulfilled(value)
    }

    /// Builds a rejected outcome.
    pub fn rejected(error: impl Into<Error>) -> Self {
        Outcome::Rejected(error.into())
    }

    /// Returns the value if fulfilled.
    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Fulfilled(value) => Some(value),
            _ => None,
        }
    }

    /// Consumes the outcome, returning the value if fulfilled.
    pub fn into_value(self) -> Option<T> {
        match self {
            Outcome::Fulfilled(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the error.
    ///
    /// `None` when fulfilled, the stored error when rejected and
    /// [`Error::NoResult`] when never settled.
    pub fn error(&self) -> Option<Error> {
        match self {
            Outcome::Unsettled => Some(Error::NoResult),
            Outcome::Fulfilled(_) => None,
            Outcome::Rejected(err) => Some(err.clone()),
        }
    }

    /// Returns true if there is no error to report.
    pub fn ok(&self) -> bool {
        matches!(self, Outcome::Fulfilled(_))
    }

    /// Returns true unless the outcome is `Unsettled`.
    pub fn is_settled(&self) -> bool {
        !matches!(self, Outcome::Unsettled)
    }

    /// Maps the outcome to the status a promise holding it would report.
    pub fn status(&self) -> Status {
        match self {
            Outcome::Unsettled => Status::Pending,
            Outcome::Fulfilled(_) => Status::Fulfilled,
            Outcome::Rejected(_) => Status::Rejected,
        }
    }

    /// Borrows the outcome as a std result.
    pub fn as_result(&self) -> Result<&T> {
        match self {
            Outcome::Unsettled => Err(Error::NoResult),
            Outcome::Fulfilled(value) => Ok(value),
            Outcome::Rejected(err) => Err(err.clone()),
        }
    }

    /// Converts the outcome into a std result, the value/error pair.
    pub fn into_result(self) -> Result<T> {
        match self {
            Outcome::Unsettled => Err(Error::NoResult),
            Outcome::Fulfilled(value) => Ok(value),
            Outcome::Rejected(err) => Err(err),
        }
    }

    /// Maps a fulfilled value, leaving errors untouched.
    pub fn map<U, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Outcome::Unsettled => Outcome::Unsettled,
            Outcome::Fulfilled(value) => Outcome::Fulfilled(f(value)),
            Outcome::Rejected(err) => Outcome::Rejected(err),
        }
    }
}

impl<T> Default for Outcome<T> {
    fn default() -> Self {
        Outcome::Unsettled
    }
}

impl<T, E> From<std::result::Result<T, E>> for Outcome<T>
where
    E: Into<Error>,
{
    fn from(result: std::result::Result<T, E>) -> Self {
        match result {
            Ok(value) => Outcome::Fulfilled(value),
            Err(err) => Outcome::Rejected(err.into()),
        }
    }
}
