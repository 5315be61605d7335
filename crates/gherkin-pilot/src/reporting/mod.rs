//! Reporter contract and progress events.
//!
//! Reporters are external collaborators: the engine pushes typed progress
//! events while the run is in flight and the complete [`RunResult`] once it
//! finishes. Reporters must never influence execution; rendering failures
//! are theirs to swallow.

pub mod console;
pub mod json;

use std::time::Duration;

use crate::result::RunResult;

pub use console::ConsoleReporter;
pub use json::JsonReporter;

/// A live diagnostic event emitted during the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress<'a> {
    /// A feature is about to run (or be skipped).
    Feature {
        /// The feature name.
        name: &'a str,
    },
    /// A scenario attempt is starting.
    Scenario {
        /// The scenario name.
        name: &'a str,
    },
    /// A step is about to execute.
    Step {
        /// The raw step text.
        text: &'a str,
    },
    /// A step failed; the remaining steps of the attempt will be skipped.
    StepFailure {
        /// The failure message.
        message: &'a str,
    },
    /// A failed scenario will be retried after a backoff delay.
    Retry {
        /// The scenario name.
        scenario: &'a str,
        /// The upcoming 1-based attempt number.
        attempt: u32,
        /// The delay before that attempt.
        delay: Duration,
    },
    /// A cleanup callback finished.
    Cleaner {
        /// The cleaner's rendered outcome, if it produced one.
        info: Option<&'a str>,
    },
}

/// Consumes engine progress and the final run result.
pub trait Reporter: Send {
    /// Called exactly once, after the last feature has finished.
    fn report(&mut self, result: &RunResult);

    /// Called throughout the run for live diagnostics.
    fn progress(&mut self, event: &Progress<'_>);
}
