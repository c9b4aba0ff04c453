//! Backoff strategies.
//!
//! This module groups the knobs that control **whether** a failed task is
//! re-attempted and **how long** to wait before the next attempt.
//!
//! ## Contents
//! - [`BackoffStrategy`] the two-method contract every strategy implements
//! - [`FixedBackoff`]       constant delay, attempt limit
//! - [`VariableBackoff`]    explicit delay table, optional jitter multiplier
//! - [`ExponentialBackoff`] polynomial growth with bounded randomness
//! - [`AttemptLimit`]       validated limit (count or unlimited)
//! - [`Multiplier`]         jitter multiplier range
//! - [`choose`]             builds a built-in strategy from [`StrategyKind`](crate::StrategyKind)
//!
//! ## Attempt numbering
//! `attempt` is 1-based and is the number of the execution that just failed.
//! The first failure is evaluated with `attempt = 1`; a strategy whose limit is
//! `N` allows `N` executions in total (`N - 1` retries).
//!
//! ## Defaults
//! - limit absent → 1 (no retries)
//! - delay absent → 0s
//! - multipliers absent → exactly 1.0

mod exponential;
mod fixed;
mod jitter;
mod limit;
mod strategy;
mod variable;

pub use exponential::ExponentialBackoff;
pub use fixed::FixedBackoff;
pub use jitter::Multiplier;
pub use limit::AttemptLimit;
pub use strategy::{choose, BackoffStrategy};
pub use variable::VariableBackoff;

use std::time::Duration;

/// Seconds to `Duration`, saturating on overflow. Inputs are validated non-negative.
pub(crate) fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::MAX)
}

/// Whole milliseconds of `delay`, saturating at `u64::MAX`.
pub(crate) fn millis(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions_saturate() {
        assert_eq!(secs(2.5), Duration::from_millis(2500));
        assert_eq!(secs(f64::MAX), Duration::MAX);
        assert_eq!(millis(Duration::from_secs(5)), 5000);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }
}
