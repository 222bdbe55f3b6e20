//! Promise settlement status.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The settlement status of a promise.
///
/// A promise starts `Pending` and moves exactly once to either `Fulfilled`
/// or `Rejected`. Both of those are terminal.
///
/// # Examples
///
/// ```
/// use promise_core::Status;
///
/// assert!(Status::Pending.can_transition_to(Status::Fulfilled));
/// assert!(!Status::Rejected.can_transition_to(Status::Fulfilled));
/// assert_eq!("rejected".parse::<Status>().unwrap(), Status::Rejected);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Not settled yet.
    #[default]
    Pending,
    /// Settled with a value.
    Fulfilled,
    /// Settled with an error.
    Rejected,
}

impl Status {
    /// Returns true if the status is `Pending`.
    pub fn is_pending(self) -> bool {
        matches!(self, Status::Pending)
    }

    /// Returns true if the status is terminal.
    pub fn is_settled(self) -> bool {
        !self.is_pending()
    }

    /// Checks whether moving from `self` to `next` is a legal transition.
    ///
    /// Only `Pending -> Fulfilled` and `Pending -> Rejected` are legal.
    pub fn can_transition_to(self, next: Status) -> bool {
        matches!(
            (self, next),
            (Status::Pending, Status::Fulfilled) | (Status::Pending, Status::Rejected)
        )
    }

    /// Returns the lowercase name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Fulfilled => "fulfilled",
            Status::Rejected => "rejected",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a valid [`Status`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid promise status: {0:?}")]
pub struct StatusParseError(pub String);

impl FromStr for Status {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Status::Pending),
            "fulfilled" => Ok(Status::Fulfilled),
            "rejected" => Ok(Status::Rejected),
            other => Err(StatusParseError(other.to_string())),
        }
    }
}
