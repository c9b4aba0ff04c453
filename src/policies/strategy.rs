//! # The strategy contract.
//!
//! [`BackoffStrategy`] is the seam between the engine and retry policies. The
//! built-in variants implement it, and so can any user type: the compiler
//! checks the shape `(attempt, error)` for both methods at the point where the
//! strategy is handed to a [`RetryPolicy`](crate::RetryPolicy).

use std::sync::Arc;
use std::time::Duration;

use crate::classify::DynError;
use crate::config::{RetryOptions, StrategyKind};
use crate::error::ConfigError;
use crate::policies::{ExponentialBackoff, FixedBackoff, VariableBackoff};

/// Decides retry eligibility and delay for a failed attempt.
///
/// Implementations must be pure with respect to the engine: no I/O, no
/// blocking. Randomness is allowed in [`retry_delay`](Self::retry_delay).
///
/// # Example
/// ```
/// use std::time::Duration;
/// use taskretry::{BackoffStrategy, DynError};
///
/// struct Always5s;
///
/// impl BackoffStrategy for Always5s {
///     fn should_retry(&self, _attempt: u32, _error: &DynError) -> bool {
///         true
///     }
///
///     fn retry_delay(&self, _attempt: u32, _error: &DynError) -> Duration {
///         Duration::from_secs(5)
///     }
/// }
/// ```
pub trait BackoffStrategy: Send + Sync + 'static {
    /// Returns `true` when the execution numbered `attempt` that failed with
    /// `error` should be re-attempted.
    fn should_retry(&self, attempt: u32, error: &DynError) -> bool;

    /// Returns the wait before re-attempting after execution `attempt` failed.
    fn retry_delay(&self, attempt: u32, error: &DynError) -> Duration;

    /// Returns the strategy name used in logs.
    ///
    /// The default uses `type_name::<Self>()`; override it for custom strategies.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<S: BackoffStrategy + ?Sized> BackoffStrategy for Arc<S> {
    fn should_retry(&self, attempt: u32, error: &DynError) -> bool {
        (**self).should_retry(attempt, error)
    }

    fn retry_delay(&self, attempt: u32, error: &DynError) -> Duration {
        (**self).retry_delay(attempt, error)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Builds the built-in strategy for `kind`, validating `options` first.
///
/// ## Example
/// ```rust
/// use taskretry::{choose, RetryOptions, StrategyKind};
///
/// let s = choose(StrategyKind::Fixed, RetryOptions::new().with_limit(3)).unwrap();
/// assert_eq!(s.name(), "fixed");
/// ```
pub fn choose(
    kind: StrategyKind,
    options: RetryOptions,
) -> Result<Arc<dyn BackoffStrategy>, ConfigError> {
    Ok(match kind {
        StrategyKind::Fixed => Arc::new(FixedBackoff::new(options)?),
        StrategyKind::Variable => Arc::new(VariableBackoff::new(options)?),
        StrategyKind::Exponential => Arc::new(ExponentialBackoff::new(options)?),
    })
}
