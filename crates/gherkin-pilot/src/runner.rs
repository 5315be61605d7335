//! The run orchestrator: drives features, scenarios, retries, and cleanup.
//!
//! Execution is strictly sequential: one feature, one scenario, one step at a
//! time, with asynchronous suspension at step handlers, backoff sleeps, and
//! cleaner invocations. The orchestrator owns the store and the per-feature
//! flight recorder, lending them to handlers one call at a time. Step-level
//! failures never escape `run`; only load-time errors do.

use std::path::PathBuf;
use std::time::Instant;

use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::interpolate::interpolate;
use crate::load::{self, LoadError};
use crate::model::{Scenario, SkippableFeature, Step, StepArgument};
use crate::reporting::{Progress, Reporter};
use crate::result::{FeatureResult, RunResult, ScenarioResult, StepResult};
use crate::retry::RetryConfiguration;
use crate::step::{
    InterpolatedStep, StepContext, StepError, StepFuture, StepInvocation, StepRunner,
};
use crate::store::{FlightRecorder, Store, World};

/// View of run state lent to a cleaner for one invocation.
pub struct CleanupContext<'a> {
    /// Read-only run configuration.
    pub world: &'a World,
    /// The mutable run-scoped store.
    pub store: &'a mut Store,
}

type CleanerFn = dyn for<'a> Fn(CleanupContext<'a>) -> StepFuture<'a> + Send + Sync;

/// Drives an ordered set of features against a live system.
///
/// Construct with a [`World`] and a feature directory, register step runners
/// and reporters, then call [`run`](Self::run).
pub struct FeatureRunner {
    features_dir: PathBuf,
    world: World,
    store: Store,
    step_runners: Vec<StepRunner>,
    reporters: Vec<Box<dyn Reporter>>,
    cleaners: Vec<Box<CleanerFn>>,
}

impl FeatureRunner {
    /// A runner for the given world and feature directory.
    #[must_use]
    pub fn new(world: World, features_dir: impl Into<PathBuf>) -> Self {
        Self {
            features_dir: features_dir.into(),
            world,
            store: Store::new(),
            step_runners: Vec::new(),
            reporters: Vec::new(),
            cleaners: Vec::new(),
        }
    }

    /// Seed the store before the run starts.
    #[must_use]
    pub fn with_store(mut self, store: Store) -> Self {
        self.store = store;
        self
    }

    /// Register a reporter; multiple reporters all receive every event.
    #[must_use]
    pub fn with_reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporters.push(Box::new(reporter));
        self
    }

    /// Append step runners to the dispatch table.
    ///
    /// Multiple calls are additive; precedence is registration order.
    #[must_use]
    pub fn add_step_runners(mut self, runners: Vec<StepRunner>) -> Self {
        self.step_runners.extend(runners);
        self
    }

    /// Register a cleanup callback, run after reporting in registration
    /// order.
    pub fn cleanup<F>(&mut self, cleaner: F)
    where
        F: for<'a> Fn(CleanupContext<'a>) -> StepFuture<'a> + Send + Sync + 'static,
    {
        self.cleaners.push(Box::new(cleaner));
    }

    /// The current store contents.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// The world configuration.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    fn progress(&mut self, event: &Progress<'_>) {
        for reporter in &mut self.reporters {
            reporter.progress(event);
        }
    }

    /// Load and execute every feature, report, then clean up.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] when the feature directory cannot be loaded or
    /// its dependency declarations are inconsistent. Step failures do not
    /// error here; they are recorded in the returned [`RunResult`].
    pub async fn run(&mut self) -> Result<RunResult, LoadError> {
        let features = load::from_directory(&self.features_dir)?;
        info!(count = features.len(), "features loaded");
        let started = Instant::now();
        let mut feature_results: Vec<FeatureResult> = Vec::with_capacity(features.len());
        for feature in &features {
            let result = self.run_feature(feature, &feature_results).await;
            feature_results.push(result);
        }
        let result = RunResult {
            success: feature_results.iter().all(|feature| feature.success),
            run_time: started.elapsed(),
            feature_results,
            store: self.store.clone(),
        };
        for reporter in &mut self.reporters {
            reporter.report(&result);
        }
        self.run_cleaners().await;
        Ok(result)
    }

    async fn run_cleaners(&mut self) {
        let cleaners = std::mem::take(&mut self.cleaners);
        for cleaner in &cleaners {
            let outcome = {
                let context = CleanupContext {
                    world: &self.world,
                    store: &mut self.store,
                };
                cleaner(context).await
            };
            let info = match outcome {
                Ok(value) => value.map(render_value),
                Err(error) => {
                    warn!(error = %error, "cleaner failed");
                    Some(error.to_string())
                }
            };
            self.progress(&Progress::Cleaner {
                info: info.as_deref(),
            });
        }
        self.cleaners = cleaners;
    }

    async fn run_feature(
        &mut self,
        feature: &SkippableFeature,
        prior: &[FeatureResult],
    ) -> FeatureResult {
        self.progress(&Progress::Feature {
            name: feature.name(),
        });
        info!(feature = %feature.name(), "running feature");

        if feature.skip {
            // Skipping is not a failure.
            return FeatureResult {
                success: true,
                skipped: true,
                run_time: None,
                feature: feature.clone(),
                scenario_results: Vec::new(),
            };
        }

        if let Some(dependency) = self.failed_dependency(feature, prior) {
            warn!(
                feature = %feature.name(),
                dependency = %dependency,
                "skipping feature because a dependency failed"
            );
            // Expand outlines so the result shape matches an executed run.
            let scenario_results = feature
                .feature
                .children
                .iter()
                .flat_map(Scenario::expand)
                .map(|scenario| skipped_scenario_result(&scenario))
                .collect();
            return FeatureResult {
                success: false,
                skipped: true,
                run_time: None,
                feature: feature.clone(),
                scenario_results,
            };
        }

        let started = Instant::now();
        let mut recorder = FlightRecorder::new();
        let mut scenario_results: Vec<ScenarioResult> = Vec::new();
        for child in &feature.feature.children {
            for scenario in child.expand() {
                if scenario_results.last().is_some_and(|last| !last.success) {
                    // Feature-level fail-fast, mirroring step-level fail-fast.
                    scenario_results.push(skipped_scenario_result(&scenario));
                    continue;
                }
                let result = self.retry_scenario(&scenario, &mut recorder).await;
                scenario_results.push(result);
            }
        }
        FeatureResult {
            success: scenario_results.iter().all(|scenario| scenario.success),
            skipped: false,
            run_time: Some(started.elapsed()),
            feature: feature.clone(),
            scenario_results,
        }
    }

    fn failed_dependency<'a>(
        &self,
        feature: &'a SkippableFeature,
        prior: &[FeatureResult],
    ) -> Option<&'a str> {
        feature
            .depends_on
            .iter()
            .map(String::as_str)
            .find(|dependency| {
                prior
                    .iter()
                    .any(|result| result.feature.name() == *dependency && !result.success)
            })
    }

    async fn retry_scenario(
        &mut self,
        scenario: &Scenario,
        recorder: &mut FlightRecorder,
    ) -> ScenarioResult {
        let config = RetryConfiguration::from_scenario(scenario);
        let mut attempt: u32 = 1;
        loop {
            let mut result = self.run_scenario(scenario, recorder, config).await;
            result.tries = attempt;
            if result.success || attempt >= config.fail_after {
                return result;
            }
            let delay = config.backoff_delay(attempt);
            debug!(
                scenario = %scenario.name,
                attempt = attempt + 1,
                delay_ms = delay.as_millis() as u64,
                "retrying scenario"
            );
            self.progress(&Progress::Retry {
                scenario: &scenario.name,
                attempt: attempt + 1,
                delay,
            });
            sleep(delay).await;
            attempt += 1;
        }
    }

    async fn run_scenario(
        &mut self,
        scenario: &Scenario,
        recorder: &mut FlightRecorder,
        config: RetryConfiguration,
    ) -> ScenarioResult {
        self.progress(&Progress::Scenario {
            name: &scenario.name,
        });
        debug!(scenario = %scenario.name, "running scenario");
        let started = Instant::now();
        let mut step_results = Vec::with_capacity(scenario.steps.len());
        let mut abort = false;
        for step in &scenario.steps {
            if abort {
                step_results.push(StepResult {
                    success: false,
                    skipped: true,
                    run_time: None,
                    step: uninterpolated(step),
                    result: None,
                    error: None,
                });
                continue;
            }
            self.progress(&Progress::Step { text: &step.text });
            match self.run_step(step, recorder).await {
                Ok(result) => step_results.push(result),
                Err(error) => {
                    let message = error.to_string();
                    warn!(step = %step.text, error = %message, "step failed");
                    self.progress(&Progress::StepFailure { message: &message });
                    step_results.push(StepResult {
                        success: false,
                        skipped: false,
                        run_time: None,
                        step: uninterpolated(step),
                        result: None,
                        error: Some(message),
                    });
                    abort = true;
                }
            }
        }
        ScenarioResult {
            success: step_results.iter().all(|step| step.success),
            skipped: false,
            tries: 1,
            run_time: Some(started.elapsed()),
            scenario: scenario.clone(),
            retry_configuration: config,
            step_results,
        }
    }

    async fn run_step(
        &mut self,
        step: &Step,
        recorder: &mut FlightRecorder,
    ) -> Result<StepResult, StepError> {
        let text = interpolate(&step.text, &self.world, &self.store)?;
        let docstring = match &step.argument {
            Some(StepArgument::DocString(doc)) => {
                Some(interpolate(doc, &self.world, &self.store)?)
            }
            Some(StepArgument::Table(_)) | None => None,
        };
        let interpolated = InterpolatedStep {
            step: step.clone(),
            text,
            docstring,
        };

        if load::run_after_regex().is_match(&interpolated.text) {
            // Dependency markers are consumed by the loader; at execution
            // time they trivially succeed.
            return Ok(StepResult {
                success: true,
                skipped: false,
                run_time: None,
                step: interpolated,
                result: None,
                error: None,
            });
        }

        let Self {
            step_runners,
            world,
            store,
            ..
        } = self;
        let Some((runner, args)) = step_runners.iter().find_map(|runner| {
            runner
                .will_run(&interpolated.text)
                .map(|args| (runner, args))
        }) else {
            return Err(StepError::RunnerNotDefined { step: interpolated });
        };

        let started = Instant::now();
        let invocation = StepInvocation {
            args,
            step: interpolated.clone(),
        };
        let context = StepContext {
            world,
            store,
            recorder,
        };
        let value = runner.invoke(invocation, context).await?;
        Ok(StepResult {
            success: true,
            skipped: false,
            run_time: Some(started.elapsed()),
            step: interpolated,
            result: value,
            error: None,
        })
    }
}

fn render_value(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

fn uninterpolated(step: &Step) -> InterpolatedStep {
    let docstring = match &step.argument {
        Some(StepArgument::DocString(doc)) => Some(doc.clone()),
        Some(StepArgument::Table(_)) | None => None,
    };
    InterpolatedStep {
        step: step.clone(),
        text: step.text.clone(),
        docstring,
    }
}

fn skipped_scenario_result(scenario: &Scenario) -> ScenarioResult {
    ScenarioResult {
        success: false,
        skipped: true,
        tries: 0,
        run_time: None,
        scenario: scenario.clone(),
        retry_configuration: RetryConfiguration::from_scenario(scenario),
        step_results: Vec::new(),
    }
}
