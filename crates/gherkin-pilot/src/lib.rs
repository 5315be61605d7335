//! An end-to-end BDD feature runner that drives live systems from Gherkin
//! feature files.
//!
//! `gherkin-pilot` parses a directory of `.feature` files, orders the
//! features by their declared dependencies, and executes them sequentially
//! against a live external system: scenarios retry with deterministic
//! exponential backoff, step text is interpolated against a run-scoped
//! store, and steps dispatch to registered matcher/handler pairs. Reporters
//! and cleanup callbacks observe the run from the outside.
//!
//! # Examples
//!
//! ```no_run
//! use gherkin_pilot::{FeatureRunner, StepRunner, World};
//! use serde_json::json;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let world = World::from_iter([("restEndpoint", json!("https://api.example.com"))]);
//! let mut runner = FeatureRunner::new(world, "./features").add_step_runners(vec![
//!     StepRunner::regex(r"^I GET (\S+)$", |invocation, _context| {
//!         Box::pin(async move {
//!             let path = invocation.args.positional(0).unwrap_or_default();
//!             Ok(Some(json!({ "requested": path })))
//!         })
//!     })?,
//! ]);
//! let result = runner.run().await?;
//! assert!(result.success);
//! # Ok(())
//! # }
//! ```

pub mod interpolate;
pub mod load;
pub mod logging;
pub mod model;
pub mod reporting;
pub mod result;
pub mod retry;
pub mod runner;
pub mod step;
pub mod store;

pub use gherkin_pilot_matchers::{
    BoundArgs, MatcherError, NamedGroupMatcher, RegexMatcher, StepMatcher,
};

pub use crate::interpolate::interpolate;
pub use crate::load::{LoadError, from_directory, parse_features};
pub use crate::model::{
    Examples, Feature, Scenario, ScenarioKind, SkippableFeature, Step, StepArgument,
};
pub use crate::reporting::{ConsoleReporter, JsonReporter, Progress, Reporter};
pub use crate::result::{FeatureResult, RunResult, ScenarioResult, StepResult};
pub use crate::retry::RetryConfiguration;
pub use crate::runner::{CleanupContext, FeatureRunner};
pub use crate::step::{
    InterpolatedStep, StepContext, StepError, StepFuture, StepInvocation, StepOutcome, StepRunner,
};
pub use crate::store::{FlightRecorder, Store, World};
