//! Step runners: matcher and handler pairs, and the errors steps can raise.
//!
//! A [`StepRunner`] couples a [`StepMatcher`] with an asynchronous handler.
//! The engine evaluates runners in registration order against the
//! interpolated step text and dispatches to the first match. Handlers receive
//! the bound arguments, the interpolated step, and a [`StepContext`] lending
//! them the world, the store, and the feature's flight recorder for exactly
//! one invocation.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use gherkin_pilot_matchers::{
    BoundArgs, MatcherError, NamedGroupMatcher, RegexMatcher, StepMatcher,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::model::Step;
use crate::store::{FlightRecorder, Store, World};

/// A step with its placeholders resolved for one execution attempt.
///
/// Built fresh before every attempt, since the store may have changed between
/// retries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterpolatedStep {
    /// The raw step as loaded.
    pub step: Step,
    /// Step text with `{key}` placeholders substituted.
    pub text: String,
    /// Interpolated doc string argument, when the step carries one.
    pub docstring: Option<String>,
}

/// Errors a step execution can produce.
///
/// These never escape the orchestrator: they are recorded on the step result
/// and drive the fail-fast and retry machinery.
#[derive(Debug, Error)]
pub enum StepError {
    /// No registered matcher accepted the interpolated step.
    #[error("no step runner defined for step `{}`", step.text)]
    RunnerNotDefined {
        /// The step nothing matched.
        step: InterpolatedStep,
    },

    /// One or more placeholders could not be resolved.
    #[error("undefined store keys {keys:?}; available keys: [{}]", available_keys(data))]
    StoreKeyUndefined {
        /// Every unresolved key, in order of appearance.
        keys: Vec<String>,
        /// Snapshot of the merged world and store at interpolation time.
        data: BTreeMap<String, Value>,
    },

    /// An assertion or business failure raised by a step handler.
    #[error("{0}")]
    Failed(String),
}

impl StepError {
    /// Construct an assertion/business failure with the given message.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

fn available_keys(data: &BTreeMap<String, Value>) -> String {
    data.keys().cloned().collect::<Vec<_>>().join(", ")
}

/// Value a step handler resolves to: an optional diagnostic payload recorded
/// on the step result, or a [`StepError`].
pub type StepOutcome = Result<Option<Value>, StepError>;

/// Boxed future returned by step handlers and cleaners.
pub type StepFuture<'a> = Pin<Box<dyn Future<Output = StepOutcome> + 'a>>;

/// Mutable view of run state lent to a handler for one invocation.
///
/// Handlers must not retain these references beyond their own call; the
/// orchestrator rebuilds interpolated views on every attempt.
pub struct StepContext<'a> {
    /// Read-only run configuration.
    pub world: &'a World,
    /// The mutable run-scoped store.
    pub store: &'a mut Store,
    /// The current feature's flight recorder.
    pub recorder: &'a mut FlightRecorder,
}

/// Arguments handed to a handler for one step invocation.
#[derive(Debug, Clone)]
pub struct StepInvocation {
    /// Arguments bound by the winning matcher.
    pub args: BoundArgs,
    /// The interpolated step being executed.
    pub step: InterpolatedStep,
}

type HandlerFn = dyn for<'a> Fn(StepInvocation, StepContext<'a>) -> StepFuture<'a> + Send + Sync;

/// A registered matcher and handler pair.
pub struct StepRunner {
    matcher: Box<dyn StepMatcher>,
    handler: Box<HandlerFn>,
}

impl StepRunner {
    /// Couple an arbitrary matcher with a handler.
    pub fn new<M, H>(matcher: M, handler: H) -> Self
    where
        M: StepMatcher + 'static,
        H: for<'a> Fn(StepInvocation, StepContext<'a>) -> StepFuture<'a> + Send + Sync + 'static,
    {
        Self {
            matcher: Box::new(matcher),
            handler: Box::new(handler),
        }
    }

    /// Couple a positional-capture regex matcher with a handler.
    ///
    /// # Errors
    ///
    /// Returns [`MatcherError::InvalidPattern`] when the pattern does not
    /// compile.
    pub fn regex<H>(pattern: &str, handler: H) -> Result<Self, MatcherError>
    where
        H: for<'a> Fn(StepInvocation, StepContext<'a>) -> StepFuture<'a> + Send + Sync + 'static,
    {
        Ok(Self::new(RegexMatcher::new(pattern)?, handler))
    }

    /// Couple a named-group regex matcher with a handler.
    ///
    /// # Errors
    ///
    /// Returns [`MatcherError::InvalidPattern`] when the pattern does not
    /// compile, or [`MatcherError::NoNamedGroups`] when it has no named
    /// capture groups.
    pub fn named<H>(pattern: &str, handler: H) -> Result<Self, MatcherError>
    where
        H: for<'a> Fn(StepInvocation, StepContext<'a>) -> StepFuture<'a> + Send + Sync + 'static,
    {
        Ok(Self::new(NamedGroupMatcher::new(pattern)?, handler))
    }

    /// Whether this runner handles the interpolated step text.
    #[must_use]
    pub fn will_run(&self, text: &str) -> Option<BoundArgs> {
        self.matcher.try_match(text)
    }

    /// Invoke the handler with bound arguments and the lent run state.
    pub(crate) fn invoke<'a>(
        &'a self,
        invocation: StepInvocation,
        context: StepContext<'a>,
    ) -> StepFuture<'a> {
        (self.handler)(invocation, context)
    }
}

impl fmt::Debug for StepRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepRunner").finish_non_exhaustive()
    }
}
