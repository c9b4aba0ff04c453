//! # Allow/deny classification.
//!
//! [`Classifier`] decides whether an error is eligible for retry at all,
//! before any limit or delay is considered. It is pure and stateless.
//!
//! The "both lists set" configuration is rejected by the validator, so a
//! constructed classifier is always exactly one of the three rules.

use super::class::{DynError, ErrorClass};

/// Retry eligibility rule over error classes.
#[derive(Clone, Debug, Default)]
pub enum Classifier {
    /// No list configured: every error is retryable.
    #[default]
    Any,
    /// Only errors matching one of these classes are retryable.
    Allow(Vec<ErrorClass>),
    /// Errors matching one of these classes are never retried.
    Deny(Vec<ErrorClass>),
}

impl Classifier {
    /// Builds the rule from optional lists, applying list precedence.
    ///
    /// Empty lists are treated as absent.
    pub fn new(allow: Option<Vec<ErrorClass>>, deny: Option<Vec<ErrorClass>>) -> Self {
        match (allow, deny) {
            (Some(allow), _) if !allow.is_empty() => Classifier::Allow(allow),
            (_, Some(deny)) if !deny.is_empty() => Classifier::Deny(deny),
            _ => Classifier::Any,
        }
    }

    /// Returns `true` when `error` may be retried under this rule.
    pub fn retryable(&self, error: &DynError) -> bool {
        match self {
            Classifier::Any => true,
            Classifier::Allow(allow) => retryable(error, allow, &[]),
            Classifier::Deny(deny) => retryable(error, &[], deny),
        }
    }
}

/// Classifies `error` against raw allow/deny lists.
///
/// - `allow` non-empty: `true` iff `error` matches some entry;
/// - else `deny` non-empty: `true` iff `error` matches no entry;
/// - else `true`.
pub fn retryable(error: &DynError, allow: &[ErrorClass], deny: &[ErrorClass]) -> bool {
    if !allow.is_empty() {
        return allow.iter().any(|class| class.matches(error));
    }
    if !deny.is_empty() {
        return !deny.iter().any(|class| class.matches(error));
    }
    true
}
