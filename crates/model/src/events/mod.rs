use crate::core::identifiers::ShardId;
use std::fmt::Debug;

/// A trait for events that can be published on the EventBus.
pub trait Event: Send + Sync + Debug + 'static {
    /// Returns a unique identifier for this event type.
    fn event_type(&self) -> &'static str;
}

/// Emitted when an engine begins work on a shard.
#[derive(Debug, Clone)]
pub struct StepStarted {
    pub shard_id: ShardId,
    pub record_count: usize,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl Event for StepStarted {
    fn event_type(&self) -> &'static str {
        "step.started"
    }
}

/// Emitted after the store accepts a chunk.
#[derive(Debug, Clone)]
pub struct ChunkWritten {
    pub shard_id: ShardId,
    pub chunk_id: String,
    pub chunk_index: usize,
    pub entities: usize,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl Event for ChunkWritten {
    fn event_type(&self) -> &'static str {
        "step.chunk_written"
    }
}

/// Emitted when a shard finishes successfully.
#[derive(Debug, Clone)]
pub struct StepCompleted {
    pub shard_id: ShardId,
    pub processed_count: u64,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl Event for StepCompleted {
    fn event_type(&self) -> &'static str {
        "step.completed"
    }
}

/// Emitted when a shard is abandoned after a write failure.
#[derive(Debug, Clone)]
pub struct StepFailed {
    pub shard_id: ShardId,
    pub processed_count: u64,
    pub error: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl Event for StepFailed {
    fn event_type(&self) -> &'static str {
        "step.failed"
    }
}
