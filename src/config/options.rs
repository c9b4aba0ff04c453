//! # Typed retry options.
//!
//! [`RetryOptions`] is the raw configuration handed to a strategy
//! constructor. Every field is optional; what is accepted, required or
//! rejected depends on the strategy and is decided by
//! [`validate`](crate::config::validate).
//!
//! Durations are expressed in seconds as `f64` so that invalid input (negative,
//! NaN) can reach the validator and be rejected with a precise message instead
//! of being unrepresentable at the call site and silently clamped elsewhere.

use serde::{Deserialize, Serialize};

use crate::classify::ErrorClass;

/// Built-in strategy selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Constant delay between attempts.
    #[default]
    Fixed,
    /// Explicit per-attempt delay table.
    Variable,
    /// Polynomial growth with bounded jitter.
    Exponential,
}

impl StrategyKind {
    /// Returns the lowercase name used in configuration and messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Fixed => "fixed",
            StrategyKind::Variable => "variable",
            StrategyKind::Exponential => "exponential",
        }
    }
}

/// Retry limit: a number of attempts, or the unlimited sentinel.
///
/// In TOML, `limit = 5` or `limit = "unlimited"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawLimit", into = "RawLimit")]
pub enum RetryLimit {
    /// Total attempts allowed (the first execution included).
    Count(i64),
    /// Never stop retrying. Requires `unlimited_retries = true`.
    Unlimited,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum RawLimit {
    Count(i64),
    Keyword(LimitKeyword),
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum LimitKeyword {
    Unlimited,
}

impl From<RawLimit> for RetryLimit {
    fn from(raw: RawLimit) -> Self {
        match raw {
            RawLimit::Count(n) => RetryLimit::Count(n),
            RawLimit::Keyword(LimitKeyword::Unlimited) => RetryLimit::Unlimited,
        }
    }
}

impl From<RetryLimit> for RawLimit {
    fn from(limit: RetryLimit) -> Self {
        match limit {
            RetryLimit::Count(n) => RawLimit::Count(n),
            RetryLimit::Unlimited => RawLimit::Keyword(LimitKeyword::Unlimited),
        }
    }
}

/// Configuration surface for the built-in strategies.
///
/// ## Example
/// ```rust
/// use taskretry::{ErrorClass, RetryOptions};
///
/// let opts = RetryOptions::new()
///     .with_limit(8)
///     .with_delay(60.0)
///     .with_allow_list(vec![ErrorClass::of::<std::io::Error>()]);
/// assert!(opts.allow_list.is_some());
/// ```
#[derive(Clone, Debug, Default)]
pub struct RetryOptions {
    /// Attempt limit (fixed, exponential). Absent means 1 (no retries).
    pub limit: Option<RetryLimit>,
    /// Explicit opt-in for [`RetryLimit::Unlimited`].
    pub unlimited_retries: bool,
    /// Constant delay in seconds (fixed only).
    pub delay: Option<f64>,
    /// Per-attempt delays in seconds (variable only, mandatory there).
    pub delays: Option<Vec<f64>>,
    /// Only these error classes are retried.
    pub allow_list: Option<Vec<ErrorClass>>,
    /// These error classes are never retried.
    pub deny_list: Option<Vec<ErrorClass>>,
    /// Lower jitter multiplier (paired with `max_multiplier`).
    pub min_multiplier: Option<f64>,
    /// Upper jitter multiplier (paired with `min_multiplier`).
    pub max_multiplier: Option<f64>,
}

impl RetryOptions {
    /// Creates an empty options set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a finite attempt limit.
    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(RetryLimit::Count(limit));
        self
    }

    /// Sets the limit to [`RetryLimit::Unlimited`] without the opt-in flag.
    pub fn with_unlimited_limit(mut self) -> Self {
        self.limit = Some(RetryLimit::Unlimited);
        self
    }

    /// Sets the unlimited opt-in flag.
    pub fn with_unlimited_retries(mut self, confirmed: bool) -> Self {
        self.unlimited_retries = confirmed;
        self
    }

    /// Unlimited retries, with both keys set.
    pub fn unlimited(self) -> Self {
        self.with_unlimited_limit().with_unlimited_retries(true)
    }

    /// Sets the constant delay in seconds.
    pub fn with_delay(mut self, secs: f64) -> Self {
        self.delay = Some(secs);
        self
    }

    /// Sets the per-attempt delay table in seconds.
    pub fn with_delays(mut self, delays: impl IntoIterator<Item = f64>) -> Self {
        self.delays = Some(delays.into_iter().collect());
        self
    }

    /// Sets the allow-list.
    pub fn with_allow_list(mut self, classes: Vec<ErrorClass>) -> Self {
        self.allow_list = Some(classes);
        self
    }

    /// Sets the deny-list.
    pub fn with_deny_list(mut self, classes: Vec<ErrorClass>) -> Self {
        self.deny_list = Some(classes);
        self
    }

    /// Sets both jitter multipliers.
    pub fn with_multipliers(mut self, min: f64, max: f64) -> Self {
        self.min_multiplier = Some(min);
        self.max_multiplier = Some(max);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Holder {
        limit: RetryLimit,
    }

    #[test]
    fn limit_parses_count_and_keyword() {
        let h: Holder = toml::from_str("limit = 5").unwrap();
        assert_eq!(h.limit, RetryLimit::Count(5));

        let h: Holder = toml::from_str("limit = \"unlimited\"").unwrap();
        assert_eq!(h.limit, RetryLimit::Unlimited);

        let h: Holder = toml::from_str("limit = -1").unwrap();
        assert_eq!(h.limit, RetryLimit::Count(-1));

        assert!(toml::from_str::<Holder>("limit = \"forever\"").is_err());
    }

    #[test]
    fn unlimited_sets_both_keys() {
        let o = RetryOptions::new().unlimited();
        assert_eq!(o.limit, Some(RetryLimit::Unlimited));
        assert!(o.unlimited_retries);
    }

    #[test]
    fn strategy_kind_names() {
        assert_eq!(StrategyKind::Variable.as_str(), "variable");
        assert_eq!(StrategyKind::default(), StrategyKind::Fixed);
    }
}
