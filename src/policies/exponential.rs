//! # Exponential (polynomial) backoff strategy.
//!
//! The delay after execution `a` fails is
//!
//! ```text
//! (a^4 + 15 + r * (a + 1)) seconds × multiplier,   r uniform in 0..30
//! ```
//!
//! The polynomial term dominates quickly, so the expected delay grows with
//! every attempt, while the bounded random term spreads out tasks that failed
//! together. The multiplier defaults to exactly 1.0.

use rand::Rng;
use std::time::Duration;

use crate::classify::{Classifier, DynError};
use crate::config::{validate, RetryOptions, StrategyKind};
use crate::error::ConfigError;
use crate::policies::{AttemptLimit, BackoffStrategy, Multiplier};

/// Constant offset added to every delay, in seconds.
const BASE_OFFSET_SECS: u64 = 15;
/// Exclusive upper bound of the random factor.
const JITTER_SPAN: u64 = 30;

/// Polynomial backoff with bounded randomness.
#[derive(Clone, Debug)]
pub struct ExponentialBackoff {
    limit: AttemptLimit,
    multiplier: Multiplier,
    classifier: Classifier,
}

impl ExponentialBackoff {
    /// Validates `options` and builds the strategy.
    pub fn new(options: RetryOptions) -> Result<Self, ConfigError> {
        validate(StrategyKind::Exponential, &options)?;
        Ok(Self {
            limit: AttemptLimit::from_validated(options.limit),
            multiplier: Multiplier::from_validated(options.min_multiplier, options.max_multiplier),
            classifier: Classifier::new(options.allow_list, options.deny_list),
        })
    }

    /// Returns the attempt limit.
    pub fn limit(&self) -> AttemptLimit {
        self.limit
    }

    /// Delay for `attempt` given the random factor `r`, before the multiplier.
    fn polynomial(attempt: u32, r: u64) -> Duration {
        let a = u64::from(attempt);
        let secs = a
            .saturating_pow(4)
            .saturating_add(BASE_OFFSET_SECS)
            .saturating_add(r.saturating_mul(a.saturating_add(1)));
        Duration::from_secs(secs)
    }
}

impl BackoffStrategy for ExponentialBackoff {
    fn should_retry(&self, attempt: u32, error: &DynError) -> bool {
        self.limit.permits(attempt) && self.classifier.retryable(error)
    }

    fn retry_delay(&self, attempt: u32, _error: &DynError) -> Duration {
        let r = rand::rng().random_range(0..JITTER_SPAN);
        self.multiplier.apply(Self::polynomial(attempt, r))
    }

    fn name(&self) -> &'static str {
        "exponential"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ErrorClass;
    use std::io;

    fn build(options: RetryOptions) -> ExponentialBackoff {
        ExponentialBackoff::new(options).expect("valid options")
    }

    fn err() -> io::Error {
        io::Error::other("boom")
    }

    #[test]
    fn limit_boundaries() {
        let s = build(RetryOptions::new().with_limit(5));
        assert!(s.should_retry(1, &err()));
        assert!(s.should_retry(4, &err()));
        assert!(!s.should_retry(5, &err()));

        let s = build(RetryOptions::new().with_limit(0));
        assert!(!s.should_retry(1, &err()));

        let s = build(RetryOptions::new().unlimited());
        assert!(s.should_retry(99_999, &err()));
    }

    #[test]
    fn polynomial_bounds() {
        assert_eq!(ExponentialBackoff::polynomial(1, 0), Duration::from_secs(16));
        assert_eq!(ExponentialBackoff::polynomial(1, 29), Duration::from_secs(16 + 58));
        assert_eq!(ExponentialBackoff::polynomial(3, 0), Duration::from_secs(96));
        assert_eq!(ExponentialBackoff::polynomial(u32::MAX, 29), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn delay_within_formula_bounds() {
        let s = build(RetryOptions::new().with_limit(10));
        for attempt in 1..10u64 {
            let low = attempt.pow(4) + 15;
            let high = low + 29 * (attempt + 1);
            for _ in 0..50 {
                let d = s.retry_delay(attempt as u32, &err()).as_secs();
                assert!((low..=high).contains(&d), "attempt {attempt}: {d}s");
            }
        }
    }

    #[test]
    fn mean_delay_grows_with_attempts() {
        let s = build(RetryOptions::new().with_limit(20));
        let mean = |attempt: u32| {
            let total: f64 = (0..500)
                .map(|_| s.retry_delay(attempt, &err()).as_secs_f64())
                .sum();
            total / 500.0
        };
        for k in 1..15 {
            assert!(mean(k + 2) > mean(k), "attempt {k}");
        }
    }

    #[test]
    fn multiplier_scales_delay() {
        let s = build(RetryOptions::new().with_limit(3).with_multipliers(2.0, 2.0));
        let d = s.retry_delay(1, &err()).as_secs();
        assert!((32..=148).contains(&d), "{d}");
    }

    #[test]
    fn classifier_applies() {
        let s = build(
            RetryOptions::new()
                .with_limit(10)
                .with_deny_list(vec![ErrorClass::of::<io::Error>()]),
        );
        assert!(!s.should_retry(1, &err()));
    }
}
