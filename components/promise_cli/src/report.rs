//! Demo reports.

use crate::error::DemoResult;
use promise_core::{Outcome, Result, Status};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// What one demo produced.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Demo name as given on the command line
    pub demo: String,
    /// How the demo's top-level promise settled
    pub status: Status,
    /// Per-item outcomes, in input order
    pub items: Vec<Item>,
    /// Error of the top-level promise, if it rejected
    pub error: Option<String>,
    /// Wall-clock time of the demo
    pub elapsed_ms: u128,
}

/// One value or outcome inside a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    /// Position in the input
    pub index: usize,
    /// Status of this item
    pub status: Status,
    /// Debug rendering of the value, if fulfilled
    pub value: Option<String>,
    /// Error message, if rejected
    pub error: Option<String>,
}

impl Item {
    fn from_outcome<T: fmt::Debug>(index: usize, outcome: &Outcome<T>) -> Self {
        Item {
            index,
            status: outcome.status(),
            value: outcome.value().map(|v| format!("{v:?}")),
            error: match outcome {
                Outcome::Rejected(err) => Some(err.to_string()),
                _ => None,
            },
        }
    }
}

impl Report {
    /// Reports a single awaited value.
    pub fn single<T: fmt::Debug>(demo: &str, result: Result<T>, elapsed: Duration) -> Self {
        Report::from_outcomes(demo, Ok(vec![Outcome::from(result)]), elapsed)
            .lift_single()
    }

    /// Reports a list of values from a fail-fast aggregation.
    pub fn values<T: fmt::Debug>(demo: &str, result: Result<Vec<T>>, elapsed: Duration) -> Self {
        let outcomes = result.map(|values| values.into_iter().map(Outcome::resolved).collect());
        Report::from_outcomes(demo, outcomes, elapsed)
    }

    /// Reports the outcomes of a settled aggregation.
    pub fn from_outcomes<T: fmt::Debug>(
        demo: &str,
        result: Result<Vec<Outcome<T>>>,
        elapsed: Duration,
    ) -> Self {
        let (status, items, error) = match result {
            Ok(outcomes) => (
                Status::Fulfilled,
                outcomes
                    .iter()
                    .enumerate()
                    .map(|(index, outcome)| Item::from_outcome(index, outcome))
                    .collect(),
                None,
            ),
            Err(err) => (Status::Rejected, Vec::new(), Some(err.to_string())),
        };

        Report {
            demo: demo.to_string(),
            status,
            items,
            error,
            elapsed_ms: elapsed.as_millis(),
        }
    }

    // A single awaited value rejects the demo itself when it fails.
    fn lift_single(mut self) -> Self {
        if let Some(err) = self.items.first().and_then(|item| item.error.clone()) {
            self.status = Status::Rejected;
            self.error = Some(err);
        }
        self
    }

    /// Returns true if the demo's top-level promise rejected.
    pub fn is_rejected(&self) -> bool {
        self.status == Status::Rejected
    }

    /// Renders the report as pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Renders the report for the terminal, as JSON when `json` is set.
    pub fn render(&self, json: bool) -> DemoResult<String> {
        if json {
            Ok(format!("{}\n", self.to_json()?))
        } else {
            Ok(self.to_string())
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: {} in {}ms", self.demo, self.status, self.elapsed_ms)?;
        if let Some(err) = &self.error {
            writeln!(f, "  error: {err}")?;
        }
        for item in &self.items {
            match (&item.value, &item.error) {
                (Some(value), _) => writeln!(f, "  [{}] {}: {}", item.index, item.status, value)?,
                (None, Some(err)) => writeln!(f, "  [{}] {}: {}", item.index, item.status, err)?,
                (None, None) => writeln!(f, "  [{}] {}", item.index, item.status)?,
            }
        }
        Ok(())
    }
}
