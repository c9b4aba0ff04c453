//! # Job envelope: the host's payload layout.
//!
//! ```text
//! { "task": "Import", "job_id": "job-7", "arguments": [...], "retry_attempt": 2 }
//!   └──────────── host fields ───────────────────────┘  └─ PayloadHook fields ─┘
//! ```
//!
//! The envelope writes and reads its own fields, then hands the payload to
//! every registered [`PayloadHook`]. Hook fields must not collide with
//! [`HOST_RESERVED_FIELDS`].

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PayloadError;
use crate::tracker::{Payload, PayloadHook};

/// Payload fields owned by the envelope.
pub const HOST_RESERVED_FIELDS: [&str; 3] = ["task", "job_id", "arguments"];

static JOB_SEQ: AtomicU64 = AtomicU64::new(1);

/// One job: a task type, an id and the task's arguments.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Task type name.
    pub task: String,
    /// Job identifier; stable across retries.
    pub job_id: String,
    /// Positional arguments handed to [`Task::perform`](crate::Task::perform).
    pub arguments: Vec<Value>,
}

impl Envelope {
    /// Creates an envelope with a fresh process-unique job id.
    pub fn new(task: impl Into<String>, arguments: Vec<Value>) -> Self {
        let n = JOB_SEQ.fetch_add(1, Ordering::Relaxed);
        Self {
            task: task.into(),
            job_id: format!("job-{n}"),
            arguments,
        }
    }

    /// Replaces the job id.
    pub fn with_job_id(mut self, job_id: impl Into<String>) -> Self {
        self.job_id = job_id.into();
        self
    }

    /// Writes host fields, then lets every hook add its own.
    pub fn encode(&self, hooks: &[&dyn PayloadHook]) -> Payload {
        let mut payload = Payload::new();
        payload.insert("task".into(), Value::from(self.task.as_str()));
        payload.insert("job_id".into(), Value::from(self.job_id.as_str()));
        payload.insert("arguments".into(), Value::Array(self.arguments.clone()));
        for hook in hooks {
            hook.on_serialize(&mut payload);
        }
        payload
    }

    /// Reads host fields, then lets every hook restore its state.
    pub fn decode(
        payload: &Payload,
        hooks: &mut [&mut dyn PayloadHook],
    ) -> Result<Self, PayloadError> {
        let task = string_field(payload, "task")?;
        let job_id = string_field(payload, "job_id")?;
        let arguments = match payload.get("arguments") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.clone(),
            Some(_) => return Err(PayloadError::MissingField { field: "arguments" }),
        };
        for hook in hooks.iter_mut() {
            hook.on_deserialize(payload)?;
        }
        Ok(Self {
            task,
            job_id,
            arguments,
        })
    }
}

fn string_field(payload: &Payload, field: &'static str) -> Result<String, PayloadError> {
    payload
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(PayloadError::MissingField { field })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::{AttemptTracker, ATTEMPT_FIELD};
    use serde_json::json;

    #[test]
    fn attempt_field_does_not_collide_with_host_fields() {
        assert!(!HOST_RESERVED_FIELDS.contains(&ATTEMPT_FIELD));
    }

    #[test]
    fn hooks_run_on_both_sides() {
        let env = Envelope::new("Import", vec![json!("a.csv")]).with_job_id("job-x");
        let tracker = AttemptTracker::at(3);
        let payload = env.encode(&[&tracker]);
        assert_eq!(payload.get(ATTEMPT_FIELD), Some(&json!(3)));
        assert_eq!(payload.get("job_id"), Some(&json!("job-x")));

        let mut restored = AttemptTracker::new();
        let decoded = Envelope::decode(&payload, &mut [&mut restored]).unwrap();
        assert_eq!(decoded, env);
        assert_eq!(restored.attempt(), 3);
    }

    #[test]
    fn decode_rejects_missing_host_fields() {
        let payload = env_payload(json!({ "job_id": "j", "arguments": [] }));
        assert_eq!(
            Envelope::decode(&payload, &mut []),
            Err(PayloadError::MissingField { field: "task" })
        );

        let payload = env_payload(json!({ "task": "T", "job_id": "j", "arguments": 3 }));
        assert_eq!(
            Envelope::decode(&payload, &mut []),
            Err(PayloadError::MissingField { field: "arguments" })
        );
    }

    #[test]
    fn job_ids_are_unique() {
        let a = Envelope::new("T", vec![]);
        let b = Envelope::new("T", vec![]);
        assert_ne!(a.job_id, b.job_id);
    }

    fn env_payload(value: Value) -> Payload {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test payloads are objects"),
        }
    }
}
