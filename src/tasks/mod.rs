//! # Task abstractions and the wire envelope.
//!
//! - [`Task`]: trait for implementing async, cancelable task types
//! - [`TaskFn`]: closure-backed task implementation
//! - [`TaskRef`]: shared reference to a task (`Arc<dyn Task>`)
//! - [`Envelope`]: the host's serialized form of one job

mod envelope;
mod task;
mod task_fn;

pub use envelope::{Envelope, HOST_RESERVED_FIELDS};
pub use task::Task;
pub use task_fn::{TaskFn, TaskRef};
