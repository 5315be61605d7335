//! Structured logging with environment variable configuration.
//!
//! The engine emits `tracing` events at feature, scenario, step, and retry
//! boundaries. This module wires up a subscriber for binaries and tests that
//! want to see them; library consumers with their own subscriber should skip
//! it.

use tracing_subscriber::EnvFilter;

/// Environment variable controlling the log filter.
pub const LOG_ENV_VAR: &str = "GHERKIN_PILOT_LOG";

/// Initialise the logging subsystem.
///
/// The filter comes from `GHERKIN_PILOT_LOG` and defaults to `info`. Logs go
/// to stderr so reporter output on stdout stays machine-readable. If a global
/// subscriber is already set the call is silently ignored; the first
/// subscriber wins, which is the expected behaviour in tests.
pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
