//! Captured step arguments bound by a successful match.

use std::collections::BTreeMap;

/// Arguments extracted from step text by a [`StepMatcher`](crate::StepMatcher).
///
/// Positional arguments come from unnamed regex capture groups, in group
/// order; named arguments come from `(?P<name>…)` groups. A step handler
/// receives whichever shape its matcher produces.
///
/// # Examples
/// ```
/// use gherkin_pilot_matchers::BoundArgs;
///
/// let args = BoundArgs::Positional(vec!["42".into()]);
/// assert_eq!(args.positional(0), Some("42"));
/// assert_eq!(args.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundArgs {
    /// Unnamed capture groups, in the order they appear in the pattern.
    Positional(Vec<String>),
    /// Named capture groups keyed by group name.
    Named(BTreeMap<String, String>),
}

impl BoundArgs {
    /// Look up a positional argument by zero-based index.
    ///
    /// Returns `None` for named argument sets.
    #[must_use]
    pub fn positional(&self, index: usize) -> Option<&str> {
        match self {
            Self::Positional(values) => values.get(index).map(String::as_str),
            Self::Named(_) => None,
        }
    }

    /// Look up a named argument by group name.
    ///
    /// Returns `None` for positional argument sets.
    #[must_use]
    pub fn named(&self, name: &str) -> Option<&str> {
        match self {
            Self::Positional(_) => None,
            Self::Named(values) => values.get(name).map(String::as_str),
        }
    }

    /// Number of bound arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Positional(values) => values.len(),
            Self::Named(values) => values.len(),
        }
    }

    /// Whether the match bound no arguments at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
