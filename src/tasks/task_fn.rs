//! # Function-backed task (`TaskFn`)
//!
//! [`TaskFn`] wraps a closure `F: Fn(Vec<Value>, CancellationToken) -> Fut`,
//! producing a fresh future per job. Shared state, if needed, goes into an
//! explicit `Arc<...>` captured by the closure.
//!
//! ## Example
//! ```rust
//! use serde_json::Value;
//! use tokio_util::sync::CancellationToken;
//! use taskretry::{ErrorClass, TaskError, TaskFn, TaskRef};
//!
//! let t: TaskRef = TaskFn::new("Resize", |args: Vec<Value>, _ctx: CancellationToken| async move {
//!     if args.is_empty() {
//!         return Err::<(), TaskError>("nothing to resize".into());
//!     }
//!     Ok(())
//! })
//! .rescuing(ErrorClass::of::<std::io::Error>())
//! .into_ref();
//!
//! assert_eq!(t.name(), "Resize");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::classify::{DynError, ErrorClass};
use crate::error::TaskError;
use crate::tasks::task::Task;

/// Shared handle to a task type.
pub type TaskRef = Arc<dyn Task>;

/// Function-backed task implementation.
#[derive(Debug)]
pub struct TaskFn<F> {
    name: Cow<'static, str>,
    rescues: Option<ErrorClass>,
    f: F,
}

impl<F> TaskFn<F> {
    /// Creates a new function-backed task.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            rescues: None,
            f,
        }
    }

    /// Rescues (swallows) errors of `class` instead of handing them to the retry policy.
    pub fn rescuing(mut self, class: ErrorClass) -> Self {
        self.rescues = Some(class);
        self
    }
}

impl<F, Fut> TaskFn<F>
where
    F: Fn(Vec<Value>, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    /// Returns the task as a shared handle.
    pub fn into_ref(self) -> TaskRef {
        Arc::new(self)
    }
}

#[async_trait]
impl<F, Fut> Task for TaskFn<F>
where
    F: Fn(Vec<Value>, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn perform(&self, args: Vec<Value>, ctx: CancellationToken) -> Result<(), TaskError> {
        (self.f)(args, ctx).await
    }

    fn rescue(&self, error: &DynError) -> bool {
        self.rescues.as_ref().is_some_and(|class| class.matches(error))
    }
}
