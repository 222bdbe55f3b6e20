//! Command-line arguments.

use clap::{Parser, Subcommand, ValueEnum};

/// Demonstrations of the thread-backed promise runtime
#[derive(Parser, Debug)]
#[command(name = "promise-demo", version)]
pub struct Cli {
    /// Demo to run
    #[command(subcommand)]
    pub demo: Demo,

    /// Number of tasks to fan out
    #[arg(short = 'n', long, global = true, default_value_t = 2)]
    pub tasks: usize,

    /// How long each task works, in milliseconds
    #[arg(long, global = true, default_value_t = 1_000)]
    pub delay_ms: u64,

    /// Deadline for the timeout/abort demos, in milliseconds
    #[arg(long, global = true, default_value_t = 300)]
    pub timeout_ms: u64,

    /// Ceiling on concurrently running units (defaults to PROMISE_MAX_CONCURRENCY or 1000)
    #[arg(long, global = true)]
    pub max_concurrency: Option<usize>,

    /// Make every odd-numbered task fail this way
    #[arg(long, global = true, value_enum, default_value_t = Fault::None)]
    pub fault: Fault,

    /// Print the report as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Log runtime events at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// The available demos.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Demo {
    /// Spawn one task and await it
    Promise,
    /// Await one task as an outcome
    Result,
    /// Chain a second step onto a task
    Then,
    /// Observe a failing task with catch
    Catch,
    /// Show that a panicking task becomes an error
    Panic,
    /// Race a task against a deadline, awaiting twice
    Timeout,
    /// Fail-fast aggregation over spawned promises
    All,
    /// Fail-fast aggregation over tasks sharing a context
    AllTask,
    /// Fail-fast aggregation cut short by a deadline
    AllAbort,
    /// Settled aggregation over spawned promises
    AllSettled,
    /// Settled aggregation over tasks
    AllTaskSettled,
    /// Load users with their identity and country
    Aggregate {
        /// Number of users to load
        #[arg(long, default_value_t = 10)]
        users: u32,
    },
}

impl Demo {
    /// Returns the subcommand name of the demo.
    pub fn name(&self) -> &'static str {
        match self {
            Demo::Promise => "promise",
            Demo::Result => "result",
            Demo::Then => "then",
            Demo::Catch => "catch",
            Demo::Panic => "panic",
            Demo::Timeout => "timeout",
            Demo::All => "all",
            Demo::AllTask => "all-task",
            Demo::AllAbort => "all-abort",
            Demo::AllSettled => "all-settled",
            Demo::AllTaskSettled => "all-task-settled",
            Demo::Aggregate { .. } => "aggregate",
        }
    }
}

/// How the odd-numbered tasks misbehave.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Every task succeeds
    None,
    /// Odd-numbered tasks return an error
    Error,
    /// Odd-numbered tasks panic
    Panic,
}
