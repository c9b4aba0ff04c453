//! # Worker configuration.
//!
//! ## Sentinel values
//! - `timeout = 0s` → no per-attempt timeout

use std::time::Duration;

/// Settings of the reference [`Worker`](crate::Worker).
///
/// ## Field semantics
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
/// - `timeout`: per-attempt timeout (`0s` = none)
#[derive(Clone, Debug)]
pub struct WorkerConfig {
    /// Capacity of the event bus broadcast channel ring buffer.
    pub bus_capacity: usize,

    /// Per-attempt timeout. An attempt that runs longer fails with
    /// [`AttemptTimeout`](crate::AttemptTimeout) and goes through the retry policy.
    pub timeout: Duration,
}

impl WorkerConfig {
    /// Returns the per-attempt timeout as an `Option`.
    #[inline]
    pub fn attempt_timeout(&self) -> Option<Duration> {
        if self.timeout == Duration::ZERO {
            None
        } else {
            Some(self.timeout)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for WorkerConfig {
    /// - `bus_capacity = 1024`
    /// - `timeout = 0s` (no timeout)
    fn default() -> Self {
        Self {
            bus_capacity: 1024,
            timeout: Duration::ZERO,
        }
    }
}
