//! Promise runtime demonstrations
//!
//! Provides the argument parser, the demo programs and their reports for the
//! `promise-demo` binary.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod demos;
pub mod error;
pub mod logging;
pub mod report;
pub mod users;

pub use cli::{Cli, Demo, Fault};
pub use demos::{run, Settings};
pub use error::{DemoError, DemoResult};
pub use report::{Item, Report};
