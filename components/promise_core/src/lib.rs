//! Core promise types and error handling.
//!
//! This crate provides the leaf types shared by the promise runtime:
//! settlement status, settled outcomes, and the error taxonomy.
//!
//! # Overview
//!
//! - [`Status`] - Pending / Fulfilled / Rejected with transition checks
//! - [`Outcome`] - An immutable settled (or never settled) result
//! - [`Error`] - Returned errors, contained panics, cancellation, no-result
//! - [`ErrorKind`] - Kind check used instead of string matching
//! - [`ContextError`] - Why a cancellation context fired
//!
//! # Examples
//!
//! ```
//! use promise_core::{Error, ErrorKind, Outcome, Status};
//!
//! let ok: Outcome<i32> = Outcome::resolved(5);
//! assert!(ok.ok());
//! assert_eq!(ok.status(), Status::Fulfilled);
//!
//! let failed: Outcome<i32> = Outcome::rejected(Error::msg("boom"));
//! assert_eq!(failed.error().map(|e| e.kind()), Some(ErrorKind::Rejected));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod outcome;
mod status;

pub use error::{ContextError, Error, ErrorKind, Result};
pub use outcome::Outcome;
pub use status::{Status, StatusParseError};
