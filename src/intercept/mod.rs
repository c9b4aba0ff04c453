//! Failure interception: where the retry decision meets the host.
//!
//! ## Contents
//! - [`RetryPolicy`]       immutable strategy + optional callback, one per task type
//! - [`CallbackSignal`]    callback result; [`CallbackSignal::Halt`] vetoes a retry
//! - [`RetryInterceptor`]  the failure handler a host calls after its own rescue handlers
//! - [`Disposition`], [`FailureState`] the outcome of one failure
//! - [`Reschedule`]        the host's delayed re-scheduling primitive
//! - [`HostCapabilities`], [`check_host`] attachment-time compatibility check
//!
//! ## Flow
//! ```text
//! task fails ─► host rescue handlers ─(not rescued)─► RetryInterceptor::handle
//!                                                       │
//!     strategy.should_retry(attempt, err)? ──no──────► Propagating (not handled)
//!                    │ yes
//!     delay = strategy.retry_delay(attempt, err)
//!     callback(err, delay) == Halt? ─────yes─────────► Propagating (not handled)
//!                    │ no
//!     tracker.advance(); host.reschedule(task, delay) ► Retrying (handled)
//! ```

mod host;
mod interceptor;
mod policy;

pub use host::{check_host, Compatibility, HostCapabilities, HostWarning, Reschedule};
pub use interceptor::{Disposition, FailureState, PropagateReason, RetryInterceptor};
pub use policy::{CallbackSignal, RetryCallback, RetryPolicy};
