//! Log subscriber setup for the demo binary.

use crate::error::{DemoError, DemoResult};
use tracing_subscriber::EnvFilter;

/// Installs a compact stderr subscriber.
///
/// `RUST_LOG` wins when set; otherwise the level is `info`, or `debug` with
/// `verbose`.
pub fn init(verbose: bool) -> DemoResult<()> {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .map_err(|e| DemoError::Logging(e.to_string()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .compact()
        .with_target(false)
        .with_thread_names(verbose)
        .try_init()
        .map_err(|e| DemoError::Logging(e.to_string()))
}
