//! # Events published by the reference worker.
//!
//! One event per decision point of the failure pipeline:
//!
//! ```text
//! TaskStarting ─► TaskSucceeded
//!              └► TaskFailed ─► TaskRescued      (task's own handler dealt with it)
//!                            ├► RetryScheduled   (interceptor: handled)
//!                            ├► RetryHalted      (callback veto)
//!                            └► TaskExhausted    (strategy rejected; error propagates)
//! ```
//!
//! ## Ordering guarantees
//! Each event has a process-wide sequence number (`seq`) that increases
//! monotonically; use it to restore order across receivers.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use taskretry::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::RetryScheduled)
//!     .with_task("Import")
//!     .with_attempt(2)
//!     .with_delay(Duration::from_secs(5));
//!
//! assert_eq!(ev.delay_ms, Some(5_000));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of worker events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// An execution is starting.
    ///
    /// Sets: `task`, `job_id`, `attempt`.
    TaskStarting,

    /// The execution returned `Ok`.
    ///
    /// Sets: `task`, `job_id`, `attempt`.
    TaskSucceeded,

    /// The execution returned an error.
    ///
    /// Sets: `task`, `job_id`, `attempt`, `reason`.
    TaskFailed,

    /// The task's own rescue handler dealt with the error.
    ///
    /// Sets: `task`, `job_id`, `attempt`, `reason`.
    TaskRescued,

    /// The interceptor scheduled a retry.
    ///
    /// Sets: `task`, `job_id`, `attempt` (of the next execution), `delay_ms`, `reason`.
    RetryScheduled,

    /// The retry callback vetoed an approved retry.
    ///
    /// Sets: `task`, `job_id`, `attempt`, `reason`.
    RetryHalted,

    /// No retry: limit reached, error not retryable, or no policy.
    ///
    /// Sets: `task`, `job_id`, `attempt`, `reason`.
    TaskExhausted,
}

impl EventKind {
    /// Returns a short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            EventKind::TaskStarting => "starting",
            EventKind::TaskSucceeded => "succeeded",
            EventKind::TaskFailed => "failed",
            EventKind::TaskRescued => "rescued",
            EventKind::RetryScheduled => "retry",
            EventKind::RetryHalted => "halted",
            EventKind::TaskExhausted => "exhausted",
        }
    }

    /// Returns `true` for events that end an execution's failure pipeline
    /// without a retry.
    pub fn is_terminal_failure(&self) -> bool {
        matches!(self, EventKind::RetryHalted | EventKind::TaskExhausted)
    }
}

/// Worker event with optional metadata.
#[derive(Clone, Debug)]
pub struct Event {
    /// Process-wide, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Task type name.
    pub task: Option<Arc<str>>,
    /// Job identifier from the envelope.
    pub job_id: Option<Arc<str>>,
    /// Attempt number (1-based).
    pub attempt: Option<u32>,
    /// Retry delay in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Error message.
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates an event with the current timestamp and the next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            job_id: None,
            attempt: None,
            delay_ms: None,
            reason: None,
        }
    }

    /// Attaches a task type name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a job identifier.
    #[inline]
    pub fn with_job(mut self, job_id: impl Into<Arc<str>>) -> Self {
        self.job_id = Some(job_id.into());
        self
    }

    /// Attaches an attempt number.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a retry delay (stored as milliseconds, saturating).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}
