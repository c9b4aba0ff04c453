//! # Attempt tracking across serialization boundaries.
//!
//! A retried task is re-serialized, re-queued and later deserialized by a
//! (possibly different) worker. [`AttemptTracker`] is the only engine state
//! that has to survive that trip; it lives in the task payload under the
//! reserved field [`ATTEMPT_FIELD`].
//!
//! Hosts do not know about the tracker directly: they call every registered
//! [`PayloadHook`] while marshalling a task, and the tracker is one of them.
//!
//! ```text
//! serialize:    host fields ──► hook.on_serialize(payload)   ──► {"retry_attempt": n, ...}
//! deserialize:  payload     ──► hook.on_deserialize(payload) ──► tracker = n (or 1 if absent)
//! ```
//!
//! ## Rules
//! - A fresh tracker starts at attempt 1.
//! - Only the interceptor advances it, once per scheduled retry.
//! - The counter is owned by one task instance and never shared.

use serde_json::{Map, Value};

use crate::error::PayloadError;

/// Serialized task payload: a JSON object.
pub type Payload = Map<String, Value>;

/// Reserved payload field holding the attempt counter.
pub const ATTEMPT_FIELD: &str = "retry_attempt";

/// Extension point a host calls around its own payload (de)serialization.
pub trait PayloadHook {
    /// Adds or overwrites this hook's fields in `payload`.
    fn on_serialize(&self, payload: &mut Payload);

    /// Restores this hook's state from `payload`.
    fn on_deserialize(&mut self, payload: &Payload) -> Result<(), PayloadError>;
}

/// Per-instance attempt counter.
///
/// ## Example
/// ```rust
/// use taskretry::{AttemptTracker, Payload, PayloadHook};
///
/// let tracker = AttemptTracker::at(2);
///
/// let mut payload = Payload::new();
/// tracker.on_serialize(&mut payload);
///
/// let mut restored = AttemptTracker::new();
/// restored.on_deserialize(&payload).unwrap();
/// assert_eq!(restored.attempt(), 2);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttemptTracker {
    attempt: u32,
}

impl Default for AttemptTracker {
    fn default() -> Self {
        Self { attempt: 1 }
    }
}

impl AttemptTracker {
    /// Creates a tracker for a first-ever execution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tracker at a given attempt (clamped to at least 1).
    pub fn at(attempt: u32) -> Self {
        Self {
            attempt: attempt.max(1),
        }
    }

    /// Returns the number of the current execution (1-based).
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Moves to the next attempt. Returns the new value.
    pub(crate) fn advance(&mut self) -> u32 {
        self.attempt = self.attempt.saturating_add(1);
        self.attempt
    }
}

impl PayloadHook for AttemptTracker {
    fn on_serialize(&self, payload: &mut Payload) {
        payload.insert(ATTEMPT_FIELD.to_string(), Value::from(self.attempt));
    }

    fn on_deserialize(&mut self, payload: &Payload) -> Result<(), PayloadError> {
        self.attempt = match payload.get(ATTEMPT_FIELD) {
            None | Some(Value::Null) => 1,
            Some(value) => value
                .as_u64()
                .filter(|n| *n >= 1)
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| PayloadError::InvalidAttempt {
                    field: ATTEMPT_FIELD,
                    value: value.to_string(),
                })?,
        };
        Ok(())
    }
}

/// A task instance that owns an [`AttemptTracker`].
///
/// Implemented by whatever the host hands to the
/// [`RetryInterceptor`](crate::RetryInterceptor) as "the task".
pub trait Tracked {
    /// Returns the tracker of this instance.
    fn tracker(&self) -> &AttemptTracker;

    /// Returns the tracker of this instance, mutably.
    fn tracker_mut(&mut self) -> &mut AttemptTracker;
}

impl Tracked for AttemptTracker {
    fn tracker(&self) -> &AttemptTracker {
        self
    }

    fn tracker_mut(&mut self) -> &mut AttemptTracker {
        self
    }
}
