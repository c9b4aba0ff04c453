//! # RetryInterceptor: the last line of defense.
//!
//! The host calls [`RetryInterceptor::handle`] when a task execution failed
//! and none of the task's own rescue handlers dealt with the error. The
//! interceptor either schedules a retry and reports the failure as handled,
//! or reports it as not handled so the host's normal failure path runs.
//!
//! ## State machine
//! ```text
//! Running ──► Failed ──┬──► Retrying     (handled: host re-schedules the task)
//!                      └──► Propagating  (not handled: original error goes on)
//! ```
//!
//! ## Rules
//! - Strategy evaluation, callback invocation and attempt increment run in a
//!   fixed sequence, never interleaved, never partially applied.
//! - The delay is computed **before** the increment, from the attempt that failed.
//! - The callback can only veto a retry the strategy approved, never force one.
//! - The error is only borrowed: a propagated error is the task's own error.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::classify::DynError;
use crate::intercept::host::Reschedule;
use crate::intercept::policy::{CallbackSignal, RetryPolicy};
use crate::policies::millis;
use crate::tracker::Tracked;

/// Phase of a task with respect to one failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureState {
    /// The attempt is executing.
    Running,
    /// The attempt returned an error that has not been dispositioned yet.
    Failed,
    /// Terminal: handed back to the host with a delay.
    Retrying,
    /// Terminal: the original error continues on the host's failure path.
    Propagating,
}

impl FailureState {
    /// Returns `true` for `Retrying` and `Propagating`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, FailureState::Retrying | FailureState::Propagating)
    }
}

/// Why a failure was not handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropagateReason {
    /// The strategy rejected the retry (limit reached or error not retryable).
    Rejected,
    /// The strategy approved, the callback returned [`CallbackSignal::Halt`].
    Halted,
}

/// Outcome of [`RetryInterceptor::handle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// Retry scheduled.
    Retrying {
        /// Delay handed to the host.
        delay: Duration,
        /// Attempt number of the scheduled execution.
        next_attempt: u32,
    },
    /// Failure not handled.
    Propagating {
        /// Why.
        reason: PropagateReason,
    },
}

impl Disposition {
    /// The boolean the host honors: `true` short-circuits its failure path.
    pub fn is_handled(&self) -> bool {
        matches!(self, Disposition::Retrying { .. })
    }

    /// Terminal state reached.
    pub fn state(&self) -> FailureState {
        match self {
            Disposition::Retrying { .. } => FailureState::Retrying,
            Disposition::Propagating { .. } => FailureState::Propagating,
        }
    }
}

/// Failure handler applying one [`RetryPolicy`].
#[derive(Clone, Debug)]
pub struct RetryInterceptor {
    policy: Arc<RetryPolicy>,
}

impl RetryInterceptor {
    /// Creates an interceptor for a (shared) policy.
    pub fn new(policy: Arc<RetryPolicy>) -> Self {
        Self { policy }
    }

    /// Returns the policy.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Dispositions one failure of `task`.
    ///
    /// On [`Disposition::Retrying`] the task's tracker has been advanced and
    /// `host.reschedule` has been called exactly once; otherwise neither happened.
    pub fn handle<T>(
        &self,
        task: &mut T,
        error: &DynError,
        host: &dyn Reschedule<T>,
    ) -> Disposition
    where
        T: Tracked + ?Sized,
    {
        let strategy = self.policy.strategy();
        let attempt = task.tracker().attempt();

        if !strategy.should_retry(attempt, error) {
            debug!(
                attempt,
                strategy = strategy.name(),
                error = %error,
                "retry rejected by strategy"
            );
            return Disposition::Propagating {
                reason: PropagateReason::Rejected,
            };
        }

        let delay = strategy.retry_delay(attempt, error);

        if self.policy.notify(error, delay) == CallbackSignal::Halt {
            info!(attempt, error = %error, "retry halted by callback");
            return Disposition::Propagating {
                reason: PropagateReason::Halted,
            };
        }

        let next_attempt = task.tracker_mut().advance();
        host.reschedule(task, delay);

        info!(
            attempt = next_attempt,
            delay_ms = millis(delay),
            strategy = strategy.name(),
            error = %error,
            "retrying task"
        );
        Disposition::Retrying {
            delay,
            next_attempt,
        }
    }
}
