//! Error types raised while constructing step matchers.

use thiserror::Error;

/// Errors surfaced when a matcher cannot be built from its pattern.
///
/// # Examples
/// ```
/// use gherkin_pilot_matchers::{MatcherError, NamedGroupMatcher};
///
/// let err = NamedGroupMatcher::new("^no groups here$").unwrap_err();
/// assert!(matches!(err, MatcherError::NoNamedGroups { .. }));
/// ```
#[derive(Debug, Error)]
pub enum MatcherError {
    /// The pattern is not a valid regular expression.
    #[error("invalid step pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// A named-group matcher was built from a pattern without named groups.
    #[error("step pattern `{pattern}` contains no named capture groups")]
    NoNamedGroups {
        /// The offending pattern text.
        pattern: String,
    },
}
