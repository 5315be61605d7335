//! The immutable result hierarchy produced by a run.
//!
//! Results nest the same way execution does: a [`RunResult`] holds
//! [`FeatureResult`]s, which hold [`ScenarioResult`]s, which hold
//! [`StepResult`]s. Each object is created once, pushed into its parent, and
//! never mutated afterwards. The whole hierarchy serialises so reporters can
//! emit it verbatim.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::model::{Scenario, SkippableFeature};
use crate::retry::RetryConfiguration;
use crate::step::InterpolatedStep;
use crate::store::Store;

/// Outcome of one step within a scenario attempt.
#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    /// Whether the step passed. Skipped steps are not successes.
    pub success: bool,
    /// Whether the step was skipped because an earlier step failed.
    pub skipped: bool,
    /// Handler execution time; `None` for skipped and no-op steps.
    pub run_time: Option<Duration>,
    /// The step as executed, placeholders resolved.
    pub step: InterpolatedStep,
    /// Diagnostic payload returned by the handler, if any.
    pub result: Option<Value>,
    /// The failure message, when the step failed.
    pub error: Option<String>,
}

/// Outcome of a scenario, after retries.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    /// Whether the final attempt passed.
    pub success: bool,
    /// Whether the scenario was skipped without any handler running.
    pub skipped: bool,
    /// 1-based attempt number that produced this result; 0 when skipped.
    pub tries: u32,
    /// Wall time of the final attempt.
    pub run_time: Option<Duration>,
    /// The concrete scenario that ran (outlines are pre-expanded).
    pub scenario: Scenario,
    /// The backoff parameters that governed the retries.
    pub retry_configuration: RetryConfiguration,
    /// Step outcomes from the final attempt, in document order.
    pub step_results: Vec<StepResult>,
}

impl ScenarioResult {
    /// The step results that failed (skipped steps excluded).
    pub fn failures(&self) -> impl Iterator<Item = &StepResult> {
        self.step_results
            .iter()
            .filter(|step| !step.success && !step.skipped)
    }
}

/// Outcome of one feature.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureResult {
    /// Conjunction of the scenario results (vacuously true when skipped by
    /// `@Skip`/`@Only`; false when skipped because a dependency failed).
    pub success: bool,
    /// Whether the feature's scenarios never ran.
    pub skipped: bool,
    /// Wall time across the feature's scenarios.
    pub run_time: Option<Duration>,
    /// The feature as loaded, including its skip flag and dependencies.
    pub feature: SkippableFeature,
    /// Scenario outcomes in execution order.
    pub scenario_results: Vec<ScenarioResult>,
}

/// Outcome of the whole run.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    /// Conjunction of the feature results.
    pub success: bool,
    /// Wall time of the run, excluding reporting and cleanup.
    pub run_time: Duration,
    /// Feature outcomes in execution order.
    pub feature_results: Vec<FeatureResult>,
    /// Snapshot of the store as the run finished.
    pub store: Store,
}
