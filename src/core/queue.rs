//! # In-process job queue with delayed delivery.
//!
//! [`MemoryQueue`] is the reference host transport. Jobs travel as
//! serialized [`Payload`]s, so every retry goes through the same
//! encode → transport → decode trip a real broker would impose.
//!
//! ```text
//! push(payload) ───────────────────────────────► channel ──► recv()
//! reschedule(instance, delay) ─► encode ─► sleep(delay) ─┘
//! ```
//!
//! [`MemoryQueue::inline`] builds a transport without delay support: retries
//! are re-enqueued immediately, which is what a strict host check refuses.
//!
//! ## Rules
//! - `reschedule` is fire-and-forget and must be called inside a Tokio runtime.
//! - Delayed jobs are not persisted; dropping the runtime loses them.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{mpsc, Mutex};
use tracing::trace;

use crate::core::instance::TaskInstance;
use crate::intercept::{HostCapabilities, Reschedule};
use crate::policies::millis;
use crate::tasks::Envelope;
use crate::tracker::Payload;

/// Unbounded in-memory queue of job payloads.
#[derive(Debug)]
pub struct MemoryQueue {
    tx: mpsc::UnboundedSender<Payload>,
    rx: Mutex<mpsc::UnboundedReceiver<Payload>>,
    delayed: Arc<AtomicUsize>,
    supports_delay: bool,
}

impl Default for MemoryQueue {
    fn default() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Mutex::new(rx),
            delayed: Arc::new(AtomicUsize::new(0)),
            supports_delay: true,
        }
    }
}

impl MemoryQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a queue that ignores delays.
    pub fn inline() -> Self {
        Self {
            supports_delay: false,
            ..Self::default()
        }
    }

    /// Describes the transport for host compatibility checks.
    pub fn capabilities(&self) -> HostCapabilities {
        if self.supports_delay {
            HostCapabilities::new("memory", true)
        } else {
            HostCapabilities::new("inline", false)
        }
    }

    /// Enqueues a new job for `task` and returns its envelope.
    pub fn enqueue(&self, task: impl Into<String>, arguments: Vec<Value>) -> Envelope {
        let envelope = Envelope::new(task, arguments);
        self.push(TaskInstance::new(envelope.clone()).encode());
        envelope
    }

    /// Enqueues a raw payload for immediate delivery.
    pub fn push(&self, payload: Payload) {
        let _ = self.tx.send(payload);
    }

    /// Waits for the next payload.
    pub async fn recv(&self) -> Option<Payload> {
        self.rx.lock().await.recv().await
    }

    /// Returns the next payload if one is ready.
    pub async fn try_recv(&self) -> Option<Payload> {
        self.rx.lock().await.try_recv().ok()
    }

    /// Number of retries waiting for their delay to elapse.
    pub fn delayed(&self) -> usize {
        self.delayed.load(Ordering::Acquire)
    }
}

impl Reschedule<TaskInstance> for MemoryQueue {
    fn reschedule(&self, task: &TaskInstance, delay: Duration) {
        let payload = task.encode();
        if !self.supports_delay {
            self.push(payload);
            return;
        }

        let tx = self.tx.clone();
        let delayed = Arc::clone(&self.delayed);

        delayed.fetch_add(1, Ordering::AcqRel);
        trace!(
            job_id = %task.envelope().job_id,
            delay_ms = millis(delay),
            "job delayed"
        );
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(payload);
            delayed.fetch_sub(1, Ordering::AcqRel);
        });
    }
}
