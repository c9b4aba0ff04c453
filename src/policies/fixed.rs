//! # Fixed-delay strategy.
//!
//! Retries up to a limit, waiting the same delay before every attempt.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use taskretry::{BackoffStrategy, FixedBackoff, RetryOptions};
//!
//! let s = FixedBackoff::new(RetryOptions::new().with_limit(3).with_delay(5.0)).unwrap();
//! let err = std::io::Error::other("boom");
//!
//! assert!(s.should_retry(1, &err));
//! assert!(s.should_retry(2, &err));
//! assert!(!s.should_retry(3, &err));
//! assert_eq!(s.retry_delay(2, &err), Duration::from_secs(5));
//! ```

use std::time::Duration;

use crate::classify::{Classifier, DynError};
use crate::config::{validate, RetryOptions, StrategyKind};
use crate::error::ConfigError;
use crate::policies::{secs, AttemptLimit, BackoffStrategy};

/// Constant delay, bounded attempts.
#[derive(Clone, Debug)]
pub struct FixedBackoff {
    limit: AttemptLimit,
    delay: Duration,
    classifier: Classifier,
}

impl FixedBackoff {
    /// Validates `options` and builds the strategy.
    pub fn new(options: RetryOptions) -> Result<Self, ConfigError> {
        validate(StrategyKind::Fixed, &options)?;
        Ok(Self {
            limit: AttemptLimit::from_validated(options.limit),
            delay: options.delay.map(secs).unwrap_or(Duration::ZERO),
            classifier: Classifier::new(options.allow_list, options.deny_list),
        })
    }

    /// Returns the attempt limit.
    pub fn limit(&self) -> AttemptLimit {
        self.limit
    }

    /// Returns the constant delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Returns the error classifier.
    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }
}

impl BackoffStrategy for FixedBackoff {
    fn should_retry(&self, attempt: u32, error: &DynError) -> bool {
        self.limit.permits(attempt) && self.classifier.retryable(error)
    }

    fn retry_delay(&self, _attempt: u32, _error: &DynError) -> Duration {
        self.delay
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}
