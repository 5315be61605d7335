//! JSON reporter emitting the serialised run result.

use std::io::Write;

use crate::reporting::{Progress, Reporter};
use crate::result::RunResult;

/// Writes the full [`RunResult`] as pretty-printed JSON when the run ends.
///
/// Progress events are ignored; the JSON document is the whole report.
pub struct JsonReporter {
    out: Box<dyn Write + Send>,
}

impl JsonReporter {
    /// A reporter writing to stdout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_writer(Box::new(std::io::stdout()))
    }

    /// A reporter writing to the given writer.
    #[must_use]
    pub fn with_writer(out: Box<dyn Write + Send>) -> Self {
        Self { out }
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for JsonReporter {
    fn report(&mut self, result: &RunResult) {
        if serde_json::to_writer_pretty(&mut self.out, result).is_ok() {
            let _ = writeln!(self.out);
        }
    }

    fn progress(&mut self, _event: &Progress<'_>) {}
}
