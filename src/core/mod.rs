//! Reference host: an in-process worker and queue.
//!
//! This is not a production job system. It exists so the engine's host
//! contract (payload hooks, failure interception, delayed re-scheduling) runs
//! end to end in tests and demos.
//!
//! - [`Worker`]: decodes payloads, runs tasks, routes failures
//! - [`MemoryQueue`]: payload channel with delayed delivery
//! - [`TaskInstance`]: envelope plus attempt tracker
//! - [`WorkerConfig`]: bus capacity and per-attempt timeout

mod config;
mod instance;
mod queue;
mod runner;
mod worker;

pub use config::WorkerConfig;
pub use instance::TaskInstance;
pub use queue::MemoryQueue;
pub use worker::{Outcome, Worker};
