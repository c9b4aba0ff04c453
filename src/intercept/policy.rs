//! # Retry policy.
//!
//! A [`RetryPolicy`] is built once when a task type is registered and is then
//! shared read-only (`Arc`) by every execution of that type, including
//! subtypes that do not define their own. It is never mutated after
//! construction: there are no lazily filled defaults.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::classify::DynError;
use crate::config::{RetryOptions, StrategyKind};
use crate::error::{ConfigError, UnsupportedHostError};
use crate::intercept::host::{check_host, Compatibility, HostCapabilities, HostWarning};
use crate::policies::{choose, BackoffStrategy};

/// Value returned by a retry callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CallbackSignal {
    /// Let the retry go ahead.
    #[default]
    Continue,
    /// Veto the retry; the failure propagates.
    Halt,
}

/// User hook invoked with `(error, delay)` before a retry is scheduled.
pub type RetryCallback = Arc<dyn Fn(&DynError, Duration) -> CallbackSignal + Send + Sync>;

/// Strategy plus optional callback, attached to a task type.
///
/// ## Example
/// ```rust
/// use taskretry::{CallbackSignal, RetryOptions, RetryPolicy, StrategyKind};
///
/// let policy = RetryPolicy::new(StrategyKind::Fixed, RetryOptions::new().with_limit(3))
///     .unwrap()
///     .with_callback(|err, delay| {
///         eprintln!("retrying in {delay:?} after {err}");
///         CallbackSignal::Continue
///     });
/// assert!(policy.has_callback());
/// ```
#[derive(Clone)]
pub struct RetryPolicy {
    strategy: Arc<dyn BackoffStrategy>,
    callback: Option<RetryCallback>,
}

impl RetryPolicy {
    /// Builds a policy around a built-in strategy, validating `options`.
    pub fn new(kind: StrategyKind, options: RetryOptions) -> Result<Self, ConfigError> {
        Ok(Self::from_strategy(choose(kind, options)?))
    }

    /// Fixed-delay policy.
    pub fn fixed(options: RetryOptions) -> Result<Self, ConfigError> {
        Self::new(StrategyKind::Fixed, options)
    }

    /// Variable-delay policy.
    pub fn variable(options: RetryOptions) -> Result<Self, ConfigError> {
        Self::new(StrategyKind::Variable, options)
    }

    /// Exponential-backoff policy.
    pub fn exponential(options: RetryOptions) -> Result<Self, ConfigError> {
        Self::new(StrategyKind::Exponential, options)
    }

    /// Policy around any user strategy.
    pub fn custom<S: BackoffStrategy>(strategy: S) -> Self {
        Self::from_strategy(Arc::new(strategy))
    }

    /// Policy around a shared strategy.
    pub fn from_strategy(strategy: Arc<dyn BackoffStrategy>) -> Self {
        Self {
            strategy,
            callback: None,
        }
    }

    /// Returns a new policy with the retry callback set.
    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&DynError, Duration) -> CallbackSignal + Send + Sync + 'static,
    {
        self.callback = Some(Arc::new(callback));
        self
    }

    /// Returns the strategy.
    pub fn strategy(&self) -> &dyn BackoffStrategy {
        &*self.strategy
    }

    /// Returns `true` when a callback is configured.
    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    /// Runs the callback, if any. No callback means [`CallbackSignal::Continue`].
    pub(crate) fn notify(&self, error: &DynError, delay: Duration) -> CallbackSignal {
        match &self.callback {
            Some(callback) => callback(error, delay),
            None => CallbackSignal::Continue,
        }
    }

    /// Checks the policy can be honored by `host`.
    ///
    /// Call once when the policy is attached to a host. A lenient warning is
    /// also emitted through `tracing` and returned for the caller to surface.
    pub fn attach(
        &self,
        host: &HostCapabilities,
        mode: Compatibility,
    ) -> Result<Option<HostWarning>, UnsupportedHostError> {
        let warning = check_host(host, mode)?;
        if let Some(w) = &warning {
            warn!(host = %w.host, strategy = self.strategy.name(), "{w}");
        }
        Ok(warning)
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("strategy", &self.strategy.name())
            .field("callback", &self.callback.is_some())
            .finish()
    }
}
