//! # Logging setup.
//!
//! The engine itself only emits `tracing` events. This module offers the
//! subscriber setup used by binaries and demos, and a forwarder that turns
//! worker [`Event`]s into log lines.
//!
//! ## Example output
//! ```text
//! [starting] task=Some("Import") job=Some("job-1") attempt=Some(1)
//! [failed] task=Some("Import") job=Some("job-1") attempt=Some(1) err=Some("connection refused")
//! [retry] task=Some("Import") job=Some("job-1") attempt=Some(2) delay_ms=Some(5000)
//! ```

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::error::TaskError;
use crate::events::{Bus, Event, EventKind};

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info,taskretry=debug";

/// Installs a global fmt subscriber writing to stderr.
///
/// `RUST_LOG` overrides [`DEFAULT_FILTER`]. Fails if a global subscriber is
/// already installed.
pub fn try_init() -> Result<(), TaskError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init()?;

    tracing::debug!("taskretry logging initialized");
    Ok(())
}

/// Like [`try_init`], ignoring an already installed subscriber.
pub fn init() {
    let _ = try_init();
}

/// Logs every event published on `bus` until `token` is cancelled.
pub fn spawn_event_log(bus: &Bus, token: CancellationToken) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                msg = rx.recv() => match msg {
                    Ok(ev) => log_event(&ev),
                    Err(RecvError::Lagged(n)) => tracing::warn!(skipped = n, "event log lagged"),
                    Err(RecvError::Closed) => break,
                },
            }
        }
    })
}

fn log_event(e: &Event) {
    let label = e.kind.as_label();
    match e.kind {
        EventKind::TaskStarting | EventKind::TaskSucceeded => {
            tracing::debug!(
                "[{label}] task={:?} job={:?} attempt={:?}",
                e.task,
                e.job_id,
                e.attempt
            );
        }
        EventKind::RetryScheduled => {
            tracing::info!(
                "[{label}] task={:?} job={:?} attempt={:?} delay_ms={:?} err={:?}",
                e.task,
                e.job_id,
                e.attempt,
                e.delay_ms,
                e.reason
            );
        }
        EventKind::TaskFailed | EventKind::TaskRescued => {
            tracing::info!(
                "[{label}] task={:?} job={:?} attempt={:?} err={:?}",
                e.task,
                e.job_id,
                e.attempt,
                e.reason
            );
        }
        EventKind::RetryHalted | EventKind::TaskExhausted => {
            tracing::warn!(
                "[{label}] task={:?} job={:?} attempt={:?} err={:?}",
                e.task,
                e.job_id,
                e.attempt,
                e.reason
            );
        }
    }
}
