//! Integration test suite for the promise runtime
//!
//! This crate provides integration tests that verify the components work
//! together across crate boundaries.

/// Re-export components for test convenience
pub mod components {
    pub use promise_cli;
    pub use promise_core;
    pub use promise_runtime;
}
