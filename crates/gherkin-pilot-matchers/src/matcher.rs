//! The matcher trait and its regex-backed implementations.

use std::collections::BTreeMap;

use regex::Regex;

use crate::args::BoundArgs;
use crate::errors::MatcherError;

/// Decides whether a step runner handles a piece of interpolated step text.
///
/// Implementations must be pure: matching the same text twice yields the same
/// answer, and matching must not observe or mutate run state. The engine
/// evaluates matchers in registration order and dispatches to the first one
/// returning `Some`.
pub trait StepMatcher: Send + Sync {
    /// Attempt to match the interpolated step text.
    ///
    /// Returns the bound arguments on a match, or `None` when this matcher
    /// does not handle the step.
    fn try_match(&self, text: &str) -> Option<BoundArgs>;
}

/// Matches step text against a regular expression, binding unnamed capture
/// groups as positional arguments.
///
/// Groups that did not participate in the match bind as empty strings so that
/// positional indices stay aligned with the pattern.
///
/// # Examples
/// ```
/// use gherkin_pilot_matchers::{RegexMatcher, StepMatcher};
///
/// let matcher = RegexMatcher::new(r#"^I GET (\S+)$"#).unwrap();
/// let args = matcher.try_match("I GET /status").unwrap();
/// assert_eq!(args.positional(0), Some("/status"));
/// ```
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    regex: Regex,
}

impl RegexMatcher {
    /// Compile a positional matcher from a regex pattern.
    ///
    /// # Errors
    ///
    /// Returns [`MatcherError::InvalidPattern`] when the pattern does not
    /// compile.
    pub fn new(pattern: &str) -> Result<Self, MatcherError> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    /// The source pattern this matcher was built from.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }
}

impl StepMatcher for RegexMatcher {
    fn try_match(&self, text: &str) -> Option<BoundArgs> {
        let captures = self.regex.captures(text)?;
        let values = captures
            .iter()
            .skip(1)
            .map(|group| group.map(|m| m.as_str().to_owned()).unwrap_or_default())
            .collect();
        Some(BoundArgs::Positional(values))
    }
}

/// Matches step text against a regular expression with `(?P<name>…)` groups,
/// binding the named groups as keyword arguments.
///
/// # Examples
/// ```
/// use gherkin_pilot_matchers::{NamedGroupMatcher, StepMatcher};
///
/// let matcher =
///     NamedGroupMatcher::new(r#"^the response code is (?P<code>[0-9]+)$"#).unwrap();
/// let args = matcher.try_match("the response code is 201").unwrap();
/// assert_eq!(args.named("code"), Some("201"));
/// ```
#[derive(Debug, Clone)]
pub struct NamedGroupMatcher {
    regex: Regex,
}

impl NamedGroupMatcher {
    /// Compile a named-group matcher from a regex pattern.
    ///
    /// # Errors
    ///
    /// Returns [`MatcherError::InvalidPattern`] when the pattern does not
    /// compile, and [`MatcherError::NoNamedGroups`] when it compiles but
    /// declares no named capture groups, since such a matcher could never
    /// bind an argument.
    pub fn new(pattern: &str) -> Result<Self, MatcherError> {
        let regex = Regex::new(pattern)?;
        if regex.capture_names().flatten().next().is_none() {
            return Err(MatcherError::NoNamedGroups {
                pattern: pattern.to_owned(),
            });
        }
        Ok(Self { regex })
    }

    /// The source pattern this matcher was built from.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }
}

impl StepMatcher for NamedGroupMatcher {
    fn try_match(&self, text: &str) -> Option<BoundArgs> {
        let captures = self.regex.captures(text)?;
        let mut values = BTreeMap::new();
        for name in self.regex.capture_names().flatten() {
            if let Some(group) = captures.name(name) {
                values.insert(name.to_owned(), group.as_str().to_owned());
            }
        }
        Some(BoundArgs::Named(values))
    }
}

#[cfg(test)]
mod tests {
    #![expect(clippy::unwrap_used, reason = "test asserts matcher construction")]

    use super::*;

    #[test]
    fn positional_matcher_binds_groups_in_order() {
        let matcher = RegexMatcher::new(r"^I store (\S+) as (\S+)$").unwrap();
        let args = matcher.try_match("I store 42 as answer").unwrap();
        assert_eq!(args.positional(0), Some("42"));
        assert_eq!(args.positional(1), Some("answer"));
    }

    #[test]
    fn positional_matcher_rejects_non_matching_text() {
        let matcher = RegexMatcher::new(r"^I wait$").unwrap();
        assert!(matcher.try_match("I run").is_none());
    }

    #[test]
    fn optional_group_binds_empty_when_absent() {
        let matcher = RegexMatcher::new(r"^I wait( patiently)?$").unwrap();
        let args = matcher.try_match("I wait").unwrap();
        assert_eq!(args.positional(0), Some(""));
    }

    #[test]
    fn named_matcher_requires_named_groups() {
        let error = NamedGroupMatcher::new(r"^I GET (\S+)$").unwrap_err();
        assert!(matches!(error, MatcherError::NoNamedGroups { .. }));
    }

    #[test]
    fn named_matcher_binds_participating_groups() {
        let matcher =
            NamedGroupMatcher::new(r"^(?P<verb>GET|POST) (?P<path>\S+)(?P<suffix> again)?$")
                .unwrap();
        let args = matcher.try_match("POST /devices").unwrap();
        assert_eq!(args.named("verb"), Some("POST"));
        assert_eq!(args.named("path"), Some("/devices"));
        assert_eq!(args.named("suffix"), None);
    }
}
