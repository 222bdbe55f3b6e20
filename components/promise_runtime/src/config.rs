//! Aggregation settings.

use std::env;
use tracing::warn;

/// Environment variable read by [`AggregateConfig::from_env`].
pub const MAX_CONCURRENCY_ENV: &str = "PROMISE_MAX_CONCURRENCY";

/// Default ceiling on in-flight units per aggregation.
pub const DEFAULT_MAX_CONCURRENCY: usize = 1_000;

/// Settings for the aggregation combinators.
///
/// # Examples
///
/// ```
/// use promise_runtime::AggregateConfig;
///
/// let config = AggregateConfig::default().with_max_concurrency(4);
/// assert_eq!(config.max_concurrency, 4);
///
/// // A zero cap would admit nothing; it is clamped to one.
/// assert_eq!(AggregateConfig::default().with_max_concurrency(0).max_concurrency, 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateConfig {
    /// Maximum number of units running at once; excess units queue
    pub max_concurrency: usize,
}

impl AggregateConfig {
    /// Creates a config with the default ceiling.
    pub fn new() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    /// Sets the concurrency ceiling, clamped to at least one.
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Builds a config from `PROMISE_MAX_CONCURRENCY`, falling back to the
    /// default when the variable is unset or not a positive integer.
    pub fn from_env() -> Self {
        match env::var(MAX_CONCURRENCY_ENV) {
            Ok(raw) => Self::parse_ceiling(&raw),
            Err(_) => Self::new(),
        }
    }

    fn parse_ceiling(raw: &str) -> Self {
        match raw.trim().parse::<usize>() {
            Ok(n) if n > 0 => Self::new().with_max_concurrency(n),
            _ => {
                warn!(value = raw, "ignoring invalid {}", MAX_CONCURRENCY_ENV);
                Self::new()
            }
        }
    }
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self::new()
    }
}
