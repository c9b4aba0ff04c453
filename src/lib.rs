//! # taskretry
//!
//! **taskretry** is a retry-policy engine for serializable, asynchronously
//! executed tasks.
//!
//! When a task execution fails, the engine decides whether to re-attempt it,
//! after what delay and under which error-classification rules, and keeps an
//! attempt counter that survives the serialize → transport → deserialize trip
//! between executions.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   RetryOptions / RetryConfig (toml)
//!            │ validate
//!            ▼
//!   ┌──────────────────┐   shared (Arc) by every instance of a task type
//!   │   RetryPolicy    │◄──────────────── PolicyRegistry (inheritance)
//!   │ - BackoffStrategy│   Fixed │ Variable │ Exponential │ custom
//!   │ - callback?      │
//!   └────────┬─────────┘
//!            ▼
//!   ┌──────────────────┐   should_retry(attempt, err) ─► retry_delay(attempt, err)
//!   │ RetryInterceptor │   ─► callback veto ─► tracker.advance() ─► host.reschedule()
//!   └────────┬─────────┘
//!            ▼
//!   host (Reschedule<T>)   payload hooks carry "retry_attempt"
//! ```
//!
//! ### Failure pipeline
//! ```text
//! execute ─► Err ─► task.rescue(err)? ─► yes: done
//!                          └─ no ─► RetryInterceptor::handle
//!                                      ├─ Retrying    (handled; rescheduled with delay)
//!                                      └─ Propagating (host's failure path; original error)
//! ```
//!
//! ## Features
//! | Area               | Description                                               | Key types / traits                                 |
//! |--------------------|-----------------------------------------------------------|----------------------------------------------------|
//! | **Strategies**     | Whether and when to retry.                                | [`BackoffStrategy`], [`FixedBackoff`], [`VariableBackoff`], [`ExponentialBackoff`] |
//! | **Classification** | Allow / deny rules over error families.                   | [`ErrorClass`], [`Classifier`]                     |
//! | **Configuration**  | Typed options, validation, TOML files.                    | [`RetryOptions`], [`RetryConfig`], [`PoliciesFile`]|
//! | **Tracking**       | Attempt counter in the task payload.                      | [`AttemptTracker`], [`PayloadHook`]                |
//! | **Interception**   | Failure hook and host contract.                           | [`RetryInterceptor`], [`Reschedule`], [`check_host`]|
//! | **Reference host** | In-process worker and queue.                              | [`Worker`], [`MemoryQueue`], [`Task`], [`TaskFn`]  |
//! | **Errors**         | Typed setup and payload errors.                           | [`ConfigError`], [`UnsupportedHostError`], [`PayloadError`] |
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use taskretry::{
//!     AttemptTracker, Disposition, ErrorClass, Reschedule, RetryInterceptor, RetryOptions,
//!     RetryPolicy,
//! };
//!
//! struct Host;
//!
//! impl Reschedule<AttemptTracker> for Host {
//!     fn reschedule(&self, task: &AttemptTracker, delay: Duration) {
//!         println!("run attempt {} in {delay:?}", task.attempt());
//!     }
//! }
//!
//! let policy = RetryPolicy::fixed(
//!     RetryOptions::new()
//!         .with_limit(3)
//!         .with_delay(2.0)
//!         .with_allow_list(vec![ErrorClass::of::<std::io::Error>()]),
//! )
//! .unwrap();
//! let interceptor = RetryInterceptor::new(policy.into());
//!
//! let mut tracker = AttemptTracker::new();
//! let err = std::io::Error::other("connection reset");
//! let d = interceptor.handle(&mut tracker, &err, &Host);
//! assert_eq!(d, Disposition::Retrying { delay: Duration::from_secs(2), next_attempt: 2 });
//! ```
mod classify;
mod config;
mod core;
mod error;
mod events;
mod intercept;
mod policies;
mod registry;
mod tasks;
mod tracker;

pub mod logging;

// ---- Public re-exports ----

pub use classify::{retryable, Classifier, DynError, ErrorClass};
pub use config::{
    validate, ErrorRegistry, PoliciesFile, RetryConfig, RetryLimit, RetryOptions, StrategyKind,
    TaskTypeConfig,
};
pub use crate::core::{MemoryQueue, Outcome, TaskInstance, Worker, WorkerConfig};
pub use error::{AttemptTimeout, ConfigError, PayloadError, TaskError, UnsupportedHostError};
pub use events::{Bus, Event, EventKind};
pub use intercept::{
    check_host, CallbackSignal, Compatibility, Disposition, FailureState, HostCapabilities,
    HostWarning, PropagateReason, Reschedule, RetryCallback, RetryInterceptor, RetryPolicy,
};
pub use policies::{
    choose, AttemptLimit, BackoffStrategy, ExponentialBackoff, FixedBackoff, Multiplier,
    VariableBackoff,
};
pub use registry::{PolicyRegistry, PolicyRegistryBuilder};
pub use tasks::{Envelope, Task, TaskFn, TaskRef, HOST_RESERVED_FIELDS};
pub use tracker::{AttemptTracker, Payload, PayloadHook, Tracked, ATTEMPT_FIELD};
