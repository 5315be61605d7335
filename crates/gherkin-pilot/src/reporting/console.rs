//! Human-readable console reporter.

use std::io::Write;

use crate::reporting::{Progress, Reporter};
use crate::result::{FeatureResult, RunResult, ScenarioResult};

/// Renders progress lines and a run summary to a writer.
///
/// Defaults to stdout with progress output disabled, matching the original
/// behaviour of printing progress only when asked. Write errors are ignored;
/// a broken pipe must not take the run down with it.
pub struct ConsoleReporter {
    out: Box<dyn Write + Send>,
    show_progress: bool,
}

impl ConsoleReporter {
    /// A reporter writing the summary to stdout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_writer(Box::new(std::io::stdout()))
    }

    /// A reporter writing to the given writer.
    #[must_use]
    pub fn with_writer(out: Box<dyn Write + Send>) -> Self {
        Self {
            out,
            show_progress: false,
        }
    }

    /// Enable or disable live progress lines.
    #[must_use]
    pub fn show_progress(mut self, enabled: bool) -> Self {
        self.show_progress = enabled;
        self
    }

    fn write_feature(&mut self, feature: &FeatureResult) {
        let marker = match (feature.success, feature.skipped) {
            (true, true) => "skipped",
            (true, false) => "ok",
            (false, true) => "skipped (dependency failed)",
            (false, false) => "FAILED",
        };
        let timing = feature
            .run_time
            .map(|duration| format!(" ({}ms)", duration.as_millis()))
            .unwrap_or_default();
        let _ = writeln!(
            self.out,
            "Feature: {} .. {marker}{timing}",
            feature.feature.name()
        );
        for scenario in &feature.scenario_results {
            self.write_scenario(scenario);
        }
    }

    fn write_scenario(&mut self, scenario: &ScenarioResult) {
        let marker = if scenario.skipped {
            "skipped".to_string()
        } else if scenario.success {
            if scenario.tries > 1 {
                format!("ok after {} tries", scenario.tries)
            } else {
                "ok".to_string()
            }
        } else {
            format!("FAILED after {} tries", scenario.tries)
        };
        let _ = writeln!(self.out, "  Scenario: {} .. {marker}", scenario.scenario.name);
        let failures: Vec<(String, String)> = scenario
            .failures()
            .map(|step| {
                (
                    step.step.text.clone(),
                    step.error.clone().unwrap_or_default(),
                )
            })
            .collect();
        for (text, error) in failures {
            let _ = writeln!(self.out, "    ! {text}: {error}");
        }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for ConsoleReporter {
    fn report(&mut self, result: &RunResult) {
        for feature in &result.feature_results {
            self.write_feature(feature);
        }
        let failed = result
            .feature_results
            .iter()
            .filter(|feature| !feature.success)
            .count();
        let verdict = if result.success { "PASSED" } else { "FAILED" };
        let _ = writeln!(
            self.out,
            "{verdict}: {} features, {failed} failed, in {}ms",
            result.feature_results.len(),
            result.run_time.as_millis()
        );
    }

    fn progress(&mut self, event: &Progress<'_>) {
        if !self.show_progress {
            return;
        }
        let _ = match event {
            Progress::Feature { name } => writeln!(self.out, "> Feature: {name}"),
            Progress::Scenario { name } => writeln!(self.out, ">   Scenario: {name}"),
            Progress::Step { text } => writeln!(self.out, ">     {text}"),
            Progress::StepFailure { message } => writeln!(self.out, ">     ! {message}"),
            Progress::Retry {
                scenario,
                attempt,
                delay,
            } => writeln!(
                self.out,
                ">   retrying `{scenario}` (attempt {attempt}) in {}ms",
                delay.as_millis()
            ),
            Progress::Cleaner { info } => {
                writeln!(self.out, "> cleaner: {}", info.unwrap_or("done"))
            }
        };
    }
}
