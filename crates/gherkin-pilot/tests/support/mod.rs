//! Shared helpers for the behavioural tests.

use std::io::Write as _;
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use gherkin_pilot::{Progress, Reporter, RunResult};

/// Write the given `(file name, contents)` pairs into a fresh directory.
pub fn feature_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap_or_else(|err| panic!("tempdir should create: {err}"));
    for (name, contents) in files {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path)
            .unwrap_or_else(|err| panic!("feature file should create: {err}"));
        file.write_all(contents.as_bytes())
            .unwrap_or_else(|err| panic!("feature file should write: {err}"));
    }
    dir
}

/// Reporter recording every event as a rendered line for assertions.
#[derive(Clone, Default)]
pub struct RecordingReporter {
    events: Arc<Mutex<Vec<String>>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded event lines, in arrival order.
    pub fn events(&self) -> Vec<String> {
        match self.events.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn push(&self, line: String) {
        match self.events.lock() {
            Ok(mut guard) => guard.push(line),
            Err(poisoned) => poisoned.into_inner().push(line),
        }
    }
}

impl Reporter for RecordingReporter {
    fn report(&mut self, result: &RunResult) {
        self.push(format!("report success={}", result.success));
    }

    fn progress(&mut self, event: &Progress<'_>) {
        let line = match event {
            Progress::Feature { name } => format!("feature {name}"),
            Progress::Scenario { name } => format!("scenario {name}"),
            Progress::Step { text } => format!("step {text}"),
            Progress::StepFailure { message } => format!("step-failure {message}"),
            Progress::Retry {
                scenario,
                attempt,
                delay,
            } => format!("retry {scenario} attempt={attempt} delay={}ms", delay.as_millis()),
            Progress::Cleaner { info } => format!("cleaner {}", info.unwrap_or("-")),
        };
        self.push(line);
    }
}
