use crate::{
    core::identifiers::ShardId,
    execution::failure::{ErrorDescriptor, ErrorKind},
};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    time::{Duration, Instant},
};

/// Terminal outcome of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Completed,
    Failed,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Completed => write!(f, "COMPLETED"),
            Outcome::Failed => write!(f, "FAILED"),
        }
    }
}

/// Execution-internal bookkeeping that rides along with a status but
/// never reaches the wire.
#[derive(Debug)]
pub struct ExecutionTrace {
    pub started_at: Instant,
    pub elapsed: Duration,
    pub chunk_ids: Vec<String>,
}

impl ExecutionTrace {
    pub fn starting_now() -> Self {
        Self {
            started_at: Instant::now(),
            elapsed: Duration::ZERO,
            chunk_ids: Vec::new(),
        }
    }

    pub fn chunks_written(&self) -> usize {
        self.chunk_ids.len()
    }
}

/// Finalized result of running one shard.
///
/// Built once by the step engine and then moved to the envelope encoder.
/// It is deliberately neither `Clone` nor `Serialize`: the wire form is
/// an explicit projection of the public fields only.
#[derive(Debug)]
pub struct StepStatus {
    shard_id: ShardId,
    processed_count: u64,
    failure_count: u64,
    outcome: Outcome,
    errors: Vec<ErrorDescriptor>,
    trace: ExecutionTrace,
}

impl StepStatus {
    pub fn new(
        shard_id: ShardId,
        processed_count: u64,
        failure_count: u64,
        outcome: Outcome,
        errors: Vec<ErrorDescriptor>,
        trace: ExecutionTrace,
    ) -> Self {
        Self {
            shard_id,
            processed_count,
            failure_count,
            outcome,
            errors,
            trace,
        }
    }

    /// Status for a message whose envelope could not be decoded but whose
    /// shard id could still be recovered.
    pub fn decode_failure(shard_id: ShardId, reason: impl Into<String>) -> Self {
        Self::new(
            shard_id,
            0,
            0,
            Outcome::Failed,
            vec![ErrorDescriptor::new(ErrorKind::DecodeFailure, reason)],
            ExecutionTrace::starting_now(),
        )
    }

    pub fn shard_id(&self) -> &ShardId {
        &self.shard_id
    }

    pub fn processed_count(&self) -> u64 {
        self.processed_count
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn errors(&self) -> &[ErrorDescriptor] {
        &self.errors
    }

    pub fn trace(&self) -> &ExecutionTrace {
        &self.trace
    }

    pub fn is_completed(&self) -> bool {
        self.outcome == Outcome::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_wire_names() {
        assert_eq!(
            serde_json::to_string(&Outcome::Completed).unwrap(),
            "\"COMPLETED\""
        );
        assert_eq!(serde_json::to_string(&Outcome::Failed).unwrap(), "\"FAILED\"");
        assert_eq!(Outcome::Failed.to_string(), "FAILED");
    }

    #[test]
    fn test_decode_failure_status() {
        let status = StepStatus::decode_failure(ShardId::from("s-1"), "bad body");
        assert_eq!(status.shard_id().as_str(), "s-1");
        assert_eq!(status.processed_count(), 0);
        assert_eq!(status.outcome(), Outcome::Failed);
        assert_eq!(status.errors().len(), 1);
        assert_eq!(status.errors()[0].kind, ErrorKind::DecodeFailure);
        assert_eq!(status.trace().chunks_written(), 0);
        assert!(!status.is_completed());
    }
}
