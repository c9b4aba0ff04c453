//! # Run a single attempt of a job.
//!
//! - **Execute ONE attempt** with a child cancellation token
//! - **Apply timeout** if configured (wraps execution in `tokio::time::timeout`)
//!
//! ## Rules
//! - Derives a **child token** per attempt; cancelling it never affects the parent.
//! - A timeout cancels the child and fails the attempt with [`AttemptTimeout`].
//! - Events are published by the caller, which knows the full failure pipeline.

use std::time::Duration;

use serde_json::Value;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::error::{AttemptTimeout, TaskError};
use crate::tasks::Task;

/// Executes one attempt of `task` with `args`.
pub(crate) async fn run_once<T: Task + ?Sized>(
    task: &T,
    args: Vec<Value>,
    parent: &CancellationToken,
    timeout: Option<Duration>,
) -> Result<(), TaskError> {
    let child = parent.child_token();

    match timeout.filter(|d| *d > Duration::ZERO) {
        Some(dur) => match time::timeout(dur, task.perform(args, child.clone())).await {
            Ok(res) => res,
            Err(_elapsed) => {
                child.cancel();
                Err(Box::new(AttemptTimeout { timeout: dur }))
            }
        },
        None => task.perform(args, child).await,
    }
}
