//! # Task abstraction.
//!
//! A [`Task`] is a task *type*: it is registered once with a worker and
//! performs any number of jobs, each described by its JSON arguments.
//!
//! A task receives a [`CancellationToken`] and should check it to stop
//! cooperatively when the worker shuts down or the attempt times out.

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::classify::DynError;
use crate::error::TaskError;

/// # Asynchronous, cancelable task type.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use serde_json::Value;
/// use tokio_util::sync::CancellationToken;
/// use taskretry::{DynError, Task, TaskError};
///
/// struct SendMail;
///
/// #[async_trait]
/// impl Task for SendMail {
///     fn name(&self) -> &str { "SendMail" }
///
///     async fn perform(&self, args: Vec<Value>, ctx: CancellationToken) -> Result<(), TaskError> {
///         if ctx.is_cancelled() || args.is_empty() {
///             return Ok(());
///         }
///         Ok(())
///     }
///
///     fn rescue(&self, error: &DynError) -> bool {
///         error.to_string().contains("unsubscribed")
///     }
/// }
/// ```
#[async_trait]
pub trait Task: Send + Sync + 'static {
    /// Returns the task type name used in envelopes and the policy registry.
    fn name(&self) -> &str;

    /// Performs one job.
    async fn perform(&self, args: Vec<Value>, ctx: CancellationToken) -> Result<(), TaskError>;

    /// The task's own rescue handler, consulted before any retry policy.
    ///
    /// Returns `true` when the error has been dealt with; the worker then
    /// treats the job as done and the retry policy is not consulted.
    fn rescue(&self, _error: &DynError) -> bool {
        false
    }
}
