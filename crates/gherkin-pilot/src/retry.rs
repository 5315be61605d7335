//! Retry policy derived from scenario tags.
//!
//! A scenario tagged `@Retry=failAfter:N,maxDelay:M,initialDelay:I` overrides
//! the default backoff schedule. Delays are in milliseconds, the schedule is
//! deterministic (no jitter), and each retry doubles the previous delay up to
//! the configured ceiling.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::model::Scenario;

/// Tag prefix selecting a retry override, after `@` normalisation.
const RETRY_TAG_PREFIX: &str = "Retry=";

/// Backoff parameters governing scenario retries.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use gherkin_pilot::RetryConfiguration;
///
/// let config = RetryConfiguration::default();
/// assert_eq!(config.initial_delay, Duration::from_millis(1000));
/// assert_eq!(config.max_delay, Duration::from_millis(16000));
/// assert_eq!(config.fail_after, 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RetryConfiguration {
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Ceiling applied to the doubling schedule.
    pub max_delay: Duration,
    /// Total number of attempts before the scenario is given up.
    pub fail_after: u32,
}

impl Default for RetryConfiguration {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(16000),
            fail_after: 5,
        }
    }
}

impl RetryConfiguration {
    /// Derive the configuration from a scenario's tags, falling back to the
    /// defaults when no `@Retry=` tag is present.
    #[must_use]
    pub fn from_scenario(scenario: &Scenario) -> Self {
        scenario
            .tag_with_prefix(RETRY_TAG_PREFIX)
            .map_or_else(Self::default, Self::from_tag)
    }

    /// Parse a `Retry=key:value,…` tag, starting from the defaults.
    ///
    /// Unknown keys are ignored; malformed integer values are ignored with a
    /// warning and the default for that key retained.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        let mut config = Self::default();
        let Some(settings) = tag.strip_prefix(RETRY_TAG_PREFIX) else {
            return config;
        };
        for setting in settings.split(',') {
            let Some((key, value)) = setting.split_once(':') else {
                warn!(tag, setting, "malformed retry setting, expected key:value");
                continue;
            };
            match key {
                "failAfter" => match value.parse::<u32>() {
                    Ok(parsed) => config.fail_after = parsed.max(1),
                    Err(_) => warn!(tag, value, "ignoring malformed failAfter value"),
                },
                "maxDelay" => match value.parse::<u64>() {
                    Ok(parsed) => config.max_delay = Duration::from_millis(parsed),
                    Err(_) => warn!(tag, value, "ignoring malformed maxDelay value"),
                },
                "initialDelay" => match value.parse::<u64>() {
                    Ok(parsed) => config.initial_delay = Duration::from_millis(parsed),
                    Err(_) => warn!(tag, value, "ignoring malformed initialDelay value"),
                },
                other => debug!(tag, key = other, "ignoring unknown retry setting"),
            }
        }
        config
    }

    /// The delay to wait before the given retry.
    ///
    /// `retry` is 1-based: the first retry (the second attempt overall) waits
    /// `initial_delay`, and each further retry doubles the delay until
    /// `max_delay` caps it. Arithmetic saturates rather than overflowing.
    #[must_use]
    pub fn backoff_delay(&self, retry: u32) -> Duration {
        let doublings = retry.saturating_sub(1).min(u32::BITS - 1);
        let factor = 2u32.saturating_pow(doublings);
        self.initial_delay.saturating_mul(factor).min(self.max_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn tag_overrides_every_field() {
        let config = RetryConfiguration::from_tag("Retry=failAfter:3,maxDelay:100,initialDelay:50");
        assert_eq!(
            config,
            RetryConfiguration {
                initial_delay: Duration::from_millis(50),
                max_delay: Duration::from_millis(100),
                fail_after: 3,
            }
        );
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let config = RetryConfiguration::from_tag("Retry=failAfter:2,jitter:9");
        assert_eq!(config.fail_after, 2);
        assert_eq!(config.max_delay, RetryConfiguration::default().max_delay);
    }

    #[test]
    fn malformed_values_keep_the_default() {
        let config = RetryConfiguration::from_tag("Retry=failAfter:lots,maxDelay:100");
        assert_eq!(config.fail_after, RetryConfiguration::default().fail_after);
        assert_eq!(config.max_delay, Duration::from_millis(100));
    }

    #[test]
    fn fail_after_is_at_least_one() {
        let config = RetryConfiguration::from_tag("Retry=failAfter:0");
        assert_eq!(config.fail_after, 1);
    }

    #[rstest]
    #[case(1, 50)]
    #[case(2, 100)]
    #[case(3, 100)]
    #[case(10, 100)]
    fn backoff_doubles_and_caps(#[case] retry: u32, #[case] expected_ms: u64) {
        let config = RetryConfiguration::from_tag("Retry=failAfter:3,maxDelay:100,initialDelay:50");
        assert_eq!(
            config.backoff_delay(retry),
            Duration::from_millis(expected_ms)
        );
    }

    #[test]
    fn backoff_saturates_instead_of_overflowing() {
        let config = RetryConfiguration {
            initial_delay: Duration::from_secs(1 << 40),
            max_delay: Duration::MAX,
            fail_after: 200,
        };
        // A large retry index must not panic.
        let delay = config.backoff_delay(150);
        assert!(delay <= Duration::MAX);
    }
}
