//! # Attempt limit.

use crate::config::RetryLimit;

/// Validated attempt limit of a strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttemptLimit {
    /// At most this many executions in total.
    Attempts(u32),
    /// Retry forever (explicitly opted into).
    Unlimited,
}

impl Default for AttemptLimit {
    /// One execution, no retries.
    fn default() -> Self {
        AttemptLimit::Attempts(1)
    }
}

impl AttemptLimit {
    /// Returns `true` if another attempt is allowed after execution `attempt` failed.
    pub fn permits(&self, attempt: u32) -> bool {
        match self {
            AttemptLimit::Unlimited => true,
            AttemptLimit::Attempts(limit) => attempt < *limit,
        }
    }

    /// Converts a validated [`RetryLimit`]; absent means the default.
    pub(crate) fn from_validated(limit: Option<RetryLimit>) -> Self {
        match limit {
            None => AttemptLimit::default(),
            Some(RetryLimit::Unlimited) => AttemptLimit::Unlimited,
            Some(RetryLimit::Count(n)) => {
                AttemptLimit::Attempts(u32::try_from(n.max(0)).unwrap_or(u32::MAX))
            }
        }
    }
}
