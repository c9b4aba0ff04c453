//! # Variable-delay strategy.
//!
//! The delay table both fixes the number of retries and the wait before each
//! one: after execution `n` fails, the task waits `delays[n - 1]` (scaled by
//! the jitter [`Multiplier`]) and is retried, until the table runs out.
//!
//! ```text
//! delays = [0, 3, 5, 10]
//! attempt:        1    2    3    4    5
//! should_retry:   yes  yes  yes  yes  no
//! retry_delay:    0s   3s   5s   10s  -
//! ```

use std::time::Duration;

use crate::classify::{Classifier, DynError};
use crate::config::{validate, RetryOptions, StrategyKind};
use crate::error::ConfigError;
use crate::policies::{secs, BackoffStrategy, Multiplier};

/// Per-attempt delay table with optional jitter.
#[derive(Clone, Debug)]
pub struct VariableBackoff {
    delays: Vec<Duration>,
    multiplier: Multiplier,
    classifier: Classifier,
}

impl VariableBackoff {
    /// Validates `options` and builds the strategy.
    pub fn new(options: RetryOptions) -> Result<Self, ConfigError> {
        validate(StrategyKind::Variable, &options)?;
        Ok(Self {
            delays: options
                .delays
                .unwrap_or_default()
                .into_iter()
                .map(secs)
                .collect(),
            multiplier: Multiplier::from_validated(options.min_multiplier, options.max_multiplier),
            classifier: Classifier::new(options.allow_list, options.deny_list),
        })
    }

    /// Returns the delay table.
    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }

    /// Returns the jitter multiplier range.
    pub fn multiplier(&self) -> Multiplier {
        self.multiplier
    }

    /// Base delay for `attempt`, before jitter. Past the table the last entry is reused.
    fn base_delay(&self, attempt: u32) -> Duration {
        let idx = (attempt.saturating_sub(1) as usize).min(self.delays.len().saturating_sub(1));
        self.delays.get(idx).copied().unwrap_or(Duration::ZERO)
    }
}

impl BackoffStrategy for VariableBackoff {
    fn should_retry(&self, attempt: u32, error: &DynError) -> bool {
        (attempt as usize) <= self.delays.len() && self.classifier.retryable(error)
    }

    fn retry_delay(&self, attempt: u32, _error: &DynError) -> Duration {
        self.multiplier.apply(self.base_delay(attempt))
    }

    fn name(&self) -> &'static str {
        "variable"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ErrorClass;
    use std::fmt;

    #[derive(Debug)]
    struct Runtime;

    impl fmt::Display for Runtime {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("runtime")
        }
    }

    impl std::error::Error for Runtime {}

    #[derive(Debug)]
    struct Other;

    impl fmt::Display for Other {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("other")
        }
    }

    impl std::error::Error for Other {}

    fn build(options: RetryOptions) -> VariableBackoff {
        VariableBackoff::new(options).expect("valid options")
    }

    #[test]
    fn empty_table_never_retries() {
        let s = build(RetryOptions::new().with_delays(Vec::<f64>::new()));
        assert!(!s.should_retry(1, &Runtime));
        assert!(!s.should_retry(99_999, &Runtime));
        assert_eq!(s.retry_delay(1, &Runtime), Duration::ZERO);
    }

    #[test]
    fn table_length_is_the_limit() {
        let s = build(RetryOptions::new().with_delays([0.0, 3.0, 5.0, 10.0]));
        assert!(s.should_retry(1, &Runtime));
        assert!(s.should_retry(4, &Runtime));
        assert!(!s.should_retry(5, &Runtime));
    }

    #[test]
    fn delays_follow_the_table() {
        let s = build(RetryOptions::new().with_delays([0.0, 3.0, 5.0, 10.0]));
        assert_eq!(s.retry_delay(1, &Runtime), Duration::ZERO);
        assert_eq!(s.retry_delay(2, &Runtime), Duration::from_secs(3));
        assert_eq!(s.retry_delay(3, &Runtime), Duration::from_secs(5));
        assert_eq!(s.retry_delay(4, &Runtime), Duration::from_secs(10));
        assert_eq!(s.retry_delay(9, &Runtime), Duration::from_secs(10));
    }

    #[test]
    fn degenerate_multiplier_uses_max() {
        let s = build(
            RetryOptions::new()
                .with_delays([10.0, 20.0])
                .with_multipliers(1.5, 1.5),
        );
        assert_eq!(s.retry_delay(1, &Runtime), Duration::from_secs(15));
        assert_eq!(s.retry_delay(2, &Runtime), Duration::from_secs(30));
    }

    #[test]
    fn random_multiplier_stays_in_range() {
        let s = build(
            RetryOptions::new()
                .with_delays([0.0, 10.0, 60.0])
                .with_multipliers(0.5, 1.2),
        );
        for _ in 0..200 {
            let d = s.retry_delay(3, &Runtime);
            assert!(d >= Duration::from_secs(30), "{d:?}");
            assert!(d <= Duration::from_secs(73), "{d:?}");
        }
    }

    #[test]
    fn classifier_applies() {
        let s = build(
            RetryOptions::new()
                .with_delays([10.0])
                .with_allow_list(vec![ErrorClass::of::<Runtime>()]),
        );
        assert!(s.should_retry(1, &Runtime));
        assert!(!s.should_retry(1, &Other));

        let s = build(
            RetryOptions::new()
                .with_delays([10.0])
                .with_deny_list(vec![ErrorClass::of::<Runtime>()]),
        );
        assert!(!s.should_retry(1, &Runtime));
        assert!(s.should_retry(1, &Other));
    }
}
