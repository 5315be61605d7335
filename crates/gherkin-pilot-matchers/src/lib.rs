//! Step-matching primitives for the `gherkin-pilot` feature runner.
//!
//! A [`StepMatcher`] decides whether a piece of interpolated step text is
//! handled by a given step runner and, when it is, binds the captured
//! arguments. Matchers are evaluated by the engine in registration order and
//! the first match wins, so precedence is entirely in the hands of the code
//! registering step runners.

mod args;
mod errors;
mod matcher;

pub use args::BoundArgs;
pub use errors::MatcherError;
pub use matcher::{NamedGroupMatcher, RegexMatcher, StepMatcher};
