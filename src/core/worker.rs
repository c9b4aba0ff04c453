//! # Worker: the reference host's failure pipeline.
//!
//! The [`Worker`] pulls job payloads from a [`MemoryQueue`], runs them and
//! routes every failure through the same pipeline a production host would:
//!
//! ```text
//! payload ─► TaskInstance::decode ─► run_once ─► Ok ───────────────────────► Succeeded
//!                                         └─► Err ─► task.rescue(err)? ──────► Rescued
//!                                                  └─► policy_for(task)?
//!                                                        ├─ none ───────────► Failed (no policy)
//!                                                        └─ RetryInterceptor::handle
//!                                                              ├─ Retrying ──► queue.reschedule
//!                                                              └─ Propagating ► Failed (error unchanged)
//! ```
//!
//! ## Rules
//! - The task's own rescue handler runs **before** the retry interceptor.
//! - A propagated error is the task's original error, never wrapped.
//! - One event is published per decision point (see [`EventKind`]).
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use serde_json::Value;
//! use tokio_util::sync::CancellationToken;
//! use taskretry::{
//!     MemoryQueue, Outcome, PolicyRegistry, RetryOptions, RetryPolicy, TaskError, TaskFn,
//!     Worker, WorkerConfig,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let policies = PolicyRegistry::builder()
//!         .define("Flaky", None, Some(RetryPolicy::fixed(RetryOptions::new().with_limit(3))?))
//!         .build()?;
//!
//!     let queue = Arc::new(MemoryQueue::new());
//!     let worker = Worker::new(WorkerConfig::default(), policies, queue.clone())?
//!         .with_task(TaskFn::new("Flaky", |_args: Vec<Value>, _ctx: CancellationToken| async {
//!             Err::<(), TaskError>("boom".into())
//!         }).into_ref());
//!
//!     queue.enqueue("Flaky", vec![]);
//!     let payload = queue.recv().await.expect("queued");
//!     let outcome = worker.process(payload, &CancellationToken::new()).await?;
//!     assert!(matches!(outcome, Outcome::Retrying { next_attempt: 2, .. }));
//!     Ok(())
//! }
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::core::config::WorkerConfig;
use crate::core::instance::TaskInstance;
use crate::core::queue::MemoryQueue;
use crate::core::runner::run_once;
use crate::error::{PayloadError, TaskError, UnsupportedHostError};
use crate::events::{Bus, Event, EventKind};
use crate::intercept::{Disposition, PropagateReason, RetryInterceptor};
use crate::registry::PolicyRegistry;
use crate::tasks::TaskRef;
use crate::tracker::Payload;

/// Result of processing one payload.
#[derive(Debug)]
pub enum Outcome {
    /// The task returned `Ok`.
    Succeeded,
    /// The task failed and its own rescue handler dealt with the error.
    Rescued,
    /// The failure was handled by scheduling a retry.
    Retrying {
        /// Delay before the next attempt.
        delay: Duration,
        /// Number of the next attempt.
        next_attempt: u32,
    },
    /// The failure propagates; `error` is exactly what the task returned.
    Failed {
        /// The task's error.
        error: TaskError,
        /// Why no retry happened; `None` when the task type has no policy.
        reason: Option<PropagateReason>,
    },
}

impl Outcome {
    /// Returns `true` for [`Outcome::Failed`].
    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }

    /// Returns the propagated error, if any.
    pub fn error(&self) -> Option<&TaskError> {
        match self {
            Outcome::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Reference host: task types, their policies, a queue and an event bus.
pub struct Worker {
    cfg: WorkerConfig,
    tasks: HashMap<String, TaskRef>,
    policies: PolicyRegistry,
    queue: Arc<MemoryQueue>,
    bus: Bus,
}

impl Worker {
    /// Creates a worker and attaches `policies` to the queue's transport.
    ///
    /// Fails when the registry is strict and the transport cannot delay jobs.
    pub fn new(
        cfg: WorkerConfig,
        policies: PolicyRegistry,
        queue: Arc<MemoryQueue>,
    ) -> Result<Self, UnsupportedHostError> {
        if let Some(warning) = policies.attach(&queue.capabilities())? {
            warn!(host = %warning.host, "{warning}");
        }
        let bus = Bus::new(cfg.bus_capacity_clamped());
        Ok(Self {
            cfg,
            tasks: HashMap::new(),
            policies,
            queue,
            bus,
        })
    }

    /// Registers a task type under its name.
    pub fn with_task(mut self, task: TaskRef) -> Self {
        self.tasks.insert(task.name().to_string(), task);
        self
    }

    /// Returns the event bus.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Returns the queue.
    pub fn queue(&self) -> &Arc<MemoryQueue> {
        &self.queue
    }

    /// Runs one payload through the full pipeline.
    pub async fn process(
        &self,
        payload: Payload,
        ctx: &CancellationToken,
    ) -> Result<Outcome, PayloadError> {
        let mut instance = TaskInstance::decode(&payload)?;
        let name = instance.envelope().task.clone();
        let task = self
            .tasks
            .get(&name)
            .cloned()
            .ok_or_else(|| PayloadError::UnknownTask { name: name.clone() })?;
        let attempt = instance.attempt();

        self.publish(EventKind::TaskStarting, &instance, |ev| ev);
        debug!(task = %name, job_id = %instance.envelope().job_id, attempt, "task starting");

        let args = instance.envelope().arguments.clone();
        let error = match run_once(&*task, args, ctx, self.cfg.attempt_timeout()).await {
            Ok(()) => {
                self.publish(EventKind::TaskSucceeded, &instance, |ev| ev);
                return Ok(Outcome::Succeeded);
            }
            Err(error) => error,
        };
        let reason = error.to_string();
        self.publish(EventKind::TaskFailed, &instance, |ev| ev.with_reason(reason.as_str()));

        if task.rescue(&*error) {
            debug!(task = %name, attempt, error = %reason, "task rescued its own error");
            self.publish(EventKind::TaskRescued, &instance, |ev| ev.with_reason(reason.as_str()));
            return Ok(Outcome::Rescued);
        }

        let Some(policy) = self.policies.policy_for(&name) else {
            warn!(task = %name, attempt, error = %reason, "task failed without retry policy");
            self.publish(EventKind::TaskExhausted, &instance, |ev| ev.with_reason(reason.as_str()));
            return Ok(Outcome::Failed {
                error,
                reason: None,
            });
        };

        let interceptor = RetryInterceptor::new(policy);
        match interceptor.handle(&mut instance, &*error, &*self.queue) {
            Disposition::Retrying {
                delay,
                next_attempt,
            } => {
                self.publish(EventKind::RetryScheduled, &instance, |ev| {
                    ev.with_delay(delay).with_reason(reason.as_str())
                });
                Ok(Outcome::Retrying {
                    delay,
                    next_attempt,
                })
            }
            Disposition::Propagating { reason: why } => {
                let kind = match why {
                    PropagateReason::Halted => EventKind::RetryHalted,
                    PropagateReason::Rejected => {
                        warn!(task = %name, attempt, error = %reason, "retries exhausted");
                        EventKind::TaskExhausted
                    }
                };
                self.publish(kind, &instance, |ev| ev.with_reason(reason.as_str()));
                Ok(Outcome::Failed {
                    error,
                    reason: Some(why),
                })
            }
        }
    }

    /// Processes payloads until `token` is cancelled.
    ///
    /// Undecodable payloads are logged and dropped.
    pub async fn run(&self, token: CancellationToken) {
        info!(tasks = self.tasks.len(), policies = self.policies.len(), "worker started");
        loop {
            let payload = tokio::select! {
                _ = token.cancelled() => break,
                next = self.queue.recv() => match next {
                    Some(payload) => payload,
                    None => break,
                },
            };
            if let Err(e) = self.process(payload, &token).await {
                warn!(label = e.as_label(), error = %e, "dropping payload");
            }
        }
        info!("worker stopped");
    }

    fn publish(
        &self,
        kind: EventKind,
        instance: &TaskInstance,
        extra: impl FnOnce(Event) -> Event,
    ) {
        let env = instance.envelope();
        let ev = Event::new(kind)
            .with_task(env.task.as_str())
            .with_job(env.job_id.as_str())
            .with_attempt(instance.attempt());
        self.bus.publish(extra(ev));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ErrorClass;
    use crate::config::RetryOptions;
    use crate::error::AttemptTimeout;
    use crate::intercept::{CallbackSignal, Compatibility, RetryPolicy};
    use crate::tasks::{Envelope, TaskFn};
    use crate::tracker::ATTEMPT_FIELD;
    use serde_json::{json, Value};
    use std::io;

    fn failing(name: &'static str) -> TaskRef {
        TaskFn::new(name, |_args: Vec<Value>, _ctx: CancellationToken| async {
            Err::<(), TaskError>(Box::new(io::Error::other("down")))
        })
        .into_ref()
    }

    fn registry(policy: RetryPolicy) -> PolicyRegistry {
        PolicyRegistry::builder()
            .define("Job", None, Some(policy))
            .build()
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn retry_then_exhaust() {
        let queue = Arc::new(MemoryQueue::new());
        let policy = RetryPolicy::fixed(RetryOptions::new().with_limit(2).with_delay(5.0)).unwrap();
        let worker = Worker::new(WorkerConfig::default(), registry(policy), queue.clone())
            .unwrap()
            .with_task(failing("Job"));
        let mut events = worker.bus().subscribe();
        let ctx = CancellationToken::new();

        queue.enqueue("Job", vec![]);
        let first = worker.process(queue.recv().await.unwrap(), &ctx).await.unwrap();
        assert!(matches!(
            first,
            Outcome::Retrying { delay, next_attempt: 2 } if delay == Duration::from_secs(5)
        ));

        let second = worker.process(queue.recv().await.unwrap(), &ctx).await.unwrap();
        assert_eq!(
            second.error().unwrap().to_string(),
            "down",
            "original error propagates"
        );
        assert!(matches!(
            second,
            Outcome::Failed { reason: Some(PropagateReason::Rejected), .. }
        ));

        let mut kinds = Vec::new();
        while let Ok(ev) = events.try_recv() {
            kinds.push(ev.kind);
        }
        assert_eq!(
            kinds,
            vec![
                EventKind::TaskStarting,
                EventKind::TaskFailed,
                EventKind::RetryScheduled,
                EventKind::TaskStarting,
                EventKind::TaskFailed,
                EventKind::TaskExhausted,
            ]
        );
    }

    #[tokio::test]
    async fn rescue_runs_before_policy() {
        let queue = Arc::new(MemoryQueue::new());
        let policy = RetryPolicy::fixed(RetryOptions::new().with_limit(5)).unwrap();
        let task = TaskFn::new("Job", |_args: Vec<Value>, _ctx: CancellationToken| async {
            Err::<(), TaskError>(Box::new(io::Error::other("gone")))
        })
        .rescuing(ErrorClass::of::<io::Error>())
        .into_ref();
        let worker = Worker::new(WorkerConfig::default(), registry(policy), queue.clone())
            .unwrap()
            .with_task(task);

        queue.enqueue("Job", vec![]);
        let outcome = worker
            .process(queue.recv().await.unwrap(), &CancellationToken::new())
            .await
            .unwrap();
        assert!(matches!(outcome, Outcome::Rescued));
        assert_eq!(queue.delayed(), 0);
    }

    #[tokio::test]
    async fn halted_retry_propagates() {
        let queue = Arc::new(MemoryQueue::new());
        let policy = RetryPolicy::fixed(RetryOptions::new().with_limit(10))
            .unwrap()
            .with_callback(|_, _| CallbackSignal::Halt);
        let worker = Worker::new(WorkerConfig::default(), registry(policy), queue.clone())
            .unwrap()
            .with_task(failing("Job"));

        queue.enqueue("Job", vec![]);
        let outcome = worker
            .process(queue.recv().await.unwrap(), &CancellationToken::new())
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            Outcome::Failed { reason: Some(PropagateReason::Halted), .. }
        ));
        assert!(queue.try_recv().await.is_none());
    }

    #[tokio::test]
    async fn unknown_task_and_missing_policy() {
        let queue = Arc::new(MemoryQueue::new());
        let worker = Worker::new(WorkerConfig::default(), PolicyRegistry::default(), queue.clone())
            .unwrap()
            .with_task(failing("Other"));
        let ctx = CancellationToken::new();

        queue.enqueue("Ghost", vec![]);
        let err = worker.process(queue.recv().await.unwrap(), &ctx).await.unwrap_err();
        assert_eq!(err, PayloadError::UnknownTask { name: "Ghost".into() });

        queue.enqueue("Other", vec![]);
        let outcome = worker.process(queue.recv().await.unwrap(), &ctx).await.unwrap();
        assert!(matches!(outcome, Outcome::Failed { reason: None, .. }));
    }

    #[test]
    fn strict_registry_refuses_inline_queue() {
        let policy = RetryPolicy::fixed(RetryOptions::new()).unwrap();
        let queue = Arc::new(MemoryQueue::inline());
        assert!(Worker::new(WorkerConfig::default(), registry(policy), queue.clone()).is_err());

        let lenient = PolicyRegistry::builder()
            .define("Job", None, Some(RetryPolicy::fixed(RetryOptions::new()).unwrap()))
            .with_compatibility(Compatibility::Lenient)
            .build()
            .unwrap();
        assert!(Worker::new(WorkerConfig::default(), lenient, queue).is_ok());
    }

    fn stalled(name: &'static str) -> TaskRef {
        TaskFn::new(name, |_args: Vec<Value>, _ctx: CancellationToken| async {
            std::future::pending::<()>().await;
            Ok::<(), TaskError>(())
        })
        .into_ref()
    }

    fn with_timeout(secs: u64) -> WorkerConfig {
        WorkerConfig {
            timeout: Duration::from_secs(secs),
            ..WorkerConfig::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_attempt_is_retried_when_allowed() {
        let queue = Arc::new(MemoryQueue::new());
        let policy = RetryPolicy::fixed(
            RetryOptions::new()
                .with_limit(3)
                .with_delay(2.0)
                .with_allow_list(vec![ErrorClass::of::<AttemptTimeout>()]),
        )
        .unwrap();
        let worker = Worker::new(with_timeout(1), registry(policy), queue.clone())
            .unwrap()
            .with_task(stalled("Job"));

        queue.enqueue("Job", vec![]);
        let outcome = worker
            .process(queue.recv().await.unwrap(), &CancellationToken::new())
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            Outcome::Retrying { delay, next_attempt: 2 } if delay == Duration::from_secs(2)
        ));
        assert_eq!(queue.delayed(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_attempt_fails_when_denied() {
        let queue = Arc::new(MemoryQueue::new());
        let policy = RetryPolicy::fixed(
            RetryOptions::new()
                .with_limit(3)
                .with_deny_list(vec![ErrorClass::of::<AttemptTimeout>()]),
        )
        .unwrap();
        let worker = Worker::new(with_timeout(1), registry(policy), queue.clone())
            .unwrap()
            .with_task(stalled("Job"));

        queue.enqueue("Job", vec![]);
        let outcome = worker
            .process(queue.recv().await.unwrap(), &CancellationToken::new())
            .await
            .unwrap();
        let timeout = outcome
            .error()
            .and_then(|e| e.downcast_ref::<AttemptTimeout>())
            .copied()
            .unwrap();
        assert_eq!(timeout.timeout, Duration::from_secs(1));
        assert!(matches!(
            outcome,
            Outcome::Failed { reason: Some(PropagateReason::Rejected), .. }
        ));
        assert_eq!(queue.delayed(), 0);
    }

    fn succeeding(name: &'static str) -> TaskRef {
        TaskFn::new(name, |_args: Vec<Value>, _ctx: CancellationToken| async {
            Ok::<(), TaskError>(())
        })
        .into_ref()
    }

    /// Collects event kinds until `last` is seen, then cancels `token`.
    async fn events_until(
        events: &mut tokio::sync::broadcast::Receiver<Event>,
        last: EventKind,
        token: &CancellationToken,
    ) -> Vec<EventKind> {
        let mut kinds = Vec::new();
        while let Ok(ev) = events.recv().await {
            kinds.push(ev.kind);
            if ev.kind == last {
                break;
            }
        }
        token.cancel();
        kinds
    }

    #[tokio::test]
    async fn run_processes_queued_payloads() {
        let queue = Arc::new(MemoryQueue::new());
        let worker = Worker::new(WorkerConfig::default(), PolicyRegistry::default(), queue.clone())
            .unwrap()
            .with_task(succeeding("Job"));
        let mut events = worker.bus().subscribe();
        let token = CancellationToken::new();

        queue.enqueue("Job", vec![]);
        let ((), kinds) = tokio::join!(
            worker.run(token.clone()),
            events_until(&mut events, EventKind::TaskSucceeded, &token),
        );
        assert_eq!(kinds, vec![EventKind::TaskStarting, EventKind::TaskSucceeded]);
        assert!(queue.try_recv().await.is_none());
    }

    #[tokio::test]
    async fn run_drops_undecodable_payloads_and_continues() {
        let queue = Arc::new(MemoryQueue::new());
        let worker = Worker::new(WorkerConfig::default(), PolicyRegistry::default(), queue.clone())
            .unwrap()
            .with_task(succeeding("Job"));
        let mut events = worker.bus().subscribe();
        let token = CancellationToken::new();

        let mut bad = TaskInstance::new(Envelope::new("Job", vec![])).encode();
        bad.insert(ATTEMPT_FIELD.to_string(), json!(0));
        queue.push(bad);
        queue.enqueue("Job", vec![]);

        let ((), kinds) = tokio::join!(
            worker.run(token.clone()),
            events_until(&mut events, EventKind::TaskSucceeded, &token),
        );
        assert_eq!(kinds, vec![EventKind::TaskStarting, EventKind::TaskSucceeded]);
        assert!(queue.try_recv().await.is_none());
    }

    #[tokio::test]
    async fn run_stops_on_cancel() {
        let queue = Arc::new(MemoryQueue::new());
        let worker =
            Worker::new(WorkerConfig::default(), PolicyRegistry::default(), queue).unwrap();
        let token = CancellationToken::new();
        token.cancel();
        worker.run(token).await;
    }
}
