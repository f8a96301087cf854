use crate::{
    error::StepError,
    step::{
        components::{reader::ShardReader, transformer::ItemTransformer, writer::ChunkWriter},
        config::StepConfig,
        execution::StepExecution,
    },
};
use chrono::Utc;
use engine_core::event_bus::bus::EventBus;
use model::{
    core::identifiers::ShardId,
    events::{ChunkWritten, StepCompleted, StepFailed, StepStarted},
    execution::{
        failure::{ErrorDescriptor, ErrorKind},
        shard::Shard,
        status::{Outcome, StepStatus},
    },
    records::entity::Entity,
};
use std::fmt;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Idle,
    Reading,
    Transforming,
    Writing,
    Completed,
    Failed,
}

impl fmt::Display for StepState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StepState::Idle => "IDLE",
            StepState::Reading => "READING",
            StepState::Transforming => "TRANSFORMING",
            StepState::Writing => "WRITING",
            StepState::Completed => "COMPLETED",
            StepState::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// Runs one shard through read, transform and write in bounded chunks.
///
/// Chunks are processed strictly one after another; chunk N+1 is not read
/// until chunk N has been accepted by the store. The first rejected chunk
/// fails the whole step and nothing after it is attempted. An engine runs
/// exactly once: [`ChunkedStep::run`] consumes it.
pub struct ChunkedStep {
    reader: ShardReader,
    transformer: ItemTransformer,
    writer: ChunkWriter,
    chunk_size: usize,
    events: Option<EventBus>,
    state: StepState,
    execution: StepExecution,
    record_count: usize,
}

impl ChunkedStep {
    pub fn new(shard: Shard, writer: ChunkWriter, config: StepConfig) -> Self {
        let (shard_id, records, _metadata) = shard.into_parts();
        let record_count = records.len();

        Self {
            reader: ShardReader::new(records),
            transformer: ItemTransformer::new(config.field_keys),
            writer,
            chunk_size: config.chunk_size.max(1),
            events: None,
            state: StepState::Idle,
            execution: StepExecution::start(shard_id),
            record_count,
        }
    }

    /// Publish lifecycle events on `bus` while running.
    pub fn with_events(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    pub fn shard_id(&self) -> &ShardId {
        self.execution.shard_id()
    }

    pub async fn run(mut self) -> StepStatus {
        info!(
            shard_id = %self.shard_id(),
            records = self.record_count,
            chunk_size = self.chunk_size,
            "Starting step"
        );
        self.publish(StepStarted {
            shard_id: self.shard_id().clone(),
            record_count: self.record_count,
            timestamp: Utc::now(),
        })
        .await;

        let mut chunk = 0;
        let outcome = loop {
            self.transition(StepState::Reading);
            let records = self.reader.read_chunk(self.chunk_size);
            if records.is_empty() {
                break Outcome::Completed;
            }

            self.transition(StepState::Transforming);
            let entities: Vec<Entity> = records
                .into_iter()
                .map(|record| self.transformer.transform(record))
                .collect();

            self.transition(StepState::Writing);
            let chunk_id = make_chunk_id(self.shard_id(), chunk);
            match self.writer.write_chunk(chunk, &chunk_id, &entities).await {
                Ok(result) => {
                    self.execution
                        .record_chunk(chunk_id.clone(), result.entities_written);
                    self.publish(ChunkWritten {
                        shard_id: self.shard_id().clone(),
                        chunk_id,
                        chunk_index: chunk,
                        entities: result.entities_written,
                        timestamp: Utc::now(),
                    })
                    .await;
                }
                Err(e) => {
                    self.fail_chunk(e, entities.len());
                    break Outcome::Failed;
                }
            }

            if self.reader.is_exhausted() {
                break Outcome::Completed;
            }
            chunk += 1;
        };

        self.finish(outcome).await
    }

    fn fail_chunk(&mut self, err: StepError, entities: usize) {
        error!(
            shard_id = %self.shard_id(),
            chunk = err.chunk(),
            entities,
            processed = self.execution.processed_count(),
            error = %err,
            "Chunk write failed, abandoning step"
        );

        let descriptor = ErrorDescriptor::new(ErrorKind::WriteFailure, err.to_string())
            .with_chunk(err.chunk())
            .with_identities(err.identities().to_vec());
        self.execution.record_failure(descriptor, entities);
    }

    async fn finish(mut self, outcome: Outcome) -> StepStatus {
        self.transition(match outcome {
            Outcome::Completed => StepState::Completed,
            Outcome::Failed => StepState::Failed,
        });

        let shard_id = self.shard_id().clone();
        let processed_count = self.execution.processed_count();
        let status = self.execution.finish(outcome);

        info!(
            shard_id = %shard_id,
            outcome = %outcome,
            processed = processed_count,
            chunks = status.trace().chunks_written(),
            duration_ms = status.trace().elapsed.as_millis(),
            "Step finished"
        );

        if let Some(bus) = &self.events {
            match outcome {
                Outcome::Completed => {
                    bus.publish(StepCompleted {
                        shard_id,
                        processed_count,
                        timestamp: Utc::now(),
                    })
                    .await;
                }
                Outcome::Failed => {
                    let error = status
                        .errors()
                        .first()
                        .map(|e| e.message.clone())
                        .unwrap_or_default();
                    bus.publish(StepFailed {
                        shard_id,
                        processed_count,
                        error,
                        timestamp: Utc::now(),
                    })
                    .await;
                }
            }
        }

        status
    }

    fn transition(&mut self, next: StepState) {
        debug!(
            shard_id = %self.shard_id(),
            from = %self.state,
            to = %next,
            "Step state transition"
        );
        self.state = next;
    }

    async fn publish<E>(&self, event: E)
    where
        E: model::events::Event + Clone,
    {
        if let Some(bus) = &self.events {
            bus.publish(event).await;
        }
    }
}

/// Stable id for a chunk, derived from its shard and position.
pub fn make_chunk_id(shard_id: &ShardId, chunk: usize) -> String {
    let mut h = blake3::Hasher::new();
    h.update(shard_id.as_str().as_bytes());
    h.update(&(chunk as u64).to_le_bytes());
    h.finalize().to_hex().to_string()
}
