//! # One job in flight: envelope plus attempt tracker.

use crate::error::PayloadError;
use crate::tasks::Envelope;
use crate::tracker::{AttemptTracker, Payload, Tracked};

/// A decoded job, owned by the execution that runs it.
#[derive(Clone, Debug, PartialEq)]
pub struct TaskInstance {
    envelope: Envelope,
    tracker: AttemptTracker,
}

impl TaskInstance {
    /// A first-ever execution of `envelope`.
    pub fn new(envelope: Envelope) -> Self {
        Self {
            envelope,
            tracker: AttemptTracker::new(),
        }
    }

    /// Returns the envelope.
    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Returns the current attempt number.
    pub fn attempt(&self) -> u32 {
        self.tracker.attempt()
    }

    /// Serializes the job, attempt counter included.
    pub fn encode(&self) -> Payload {
        self.envelope.encode(&[&self.tracker])
    }

    /// Restores a job from its payload.
    pub fn decode(payload: &Payload) -> Result<Self, PayloadError> {
        let mut tracker = AttemptTracker::new();
        let envelope = Envelope::decode(payload, &mut [&mut tracker])?;
        Ok(Self { envelope, tracker })
    }
}

impl Tracked for TaskInstance {
    fn tracker(&self) -> &AttemptTracker {
        &self.tracker
    }

    fn tracker_mut(&mut self) -> &mut AttemptTracker {
        &mut self.tracker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn round_trip_keeps_attempt() {
        let mut inst = TaskInstance::new(Envelope::new("Import", vec![json!(1)]));
        inst.tracker_mut().advance();
        inst.tracker_mut().advance();

        let restored = TaskInstance::decode(&inst.encode()).unwrap();
        assert_eq!(restored.attempt(), 3);
        assert_eq!(restored, inst);
    }

    #[test]
    fn payload_without_counter_is_a_first_attempt() {
        let env = Envelope::new("Import", vec![]);
        let payload = env.encode(&[]);
        assert_eq!(TaskInstance::decode(&payload).unwrap().attempt(), 1);
    }
}
