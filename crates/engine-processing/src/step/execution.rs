use model::{
    core::identifiers::ShardId,
    execution::{
        failure::ErrorDescriptor,
        status::{ExecutionTrace, Outcome, StepStatus},
    },
};

/// Mutable tally kept while a step runs. Finalizing consumes it, so a
/// status can only be produced once.
#[derive(Debug)]
pub struct StepExecution {
    shard_id: ShardId,
    processed_count: u64,
    failure_count: u64,
    errors: Vec<ErrorDescriptor>,
    trace: ExecutionTrace,
}

impl StepExecution {
    pub fn start(shard_id: ShardId) -> Self {
        Self {
            shard_id,
            processed_count: 0,
            failure_count: 0,
            errors: Vec::new(),
            trace: ExecutionTrace::starting_now(),
        }
    }

    pub fn shard_id(&self) -> &ShardId {
        &self.shard_id
    }

    pub fn processed_count(&self) -> u64 {
        self.processed_count
    }

    pub fn record_chunk(&mut self, chunk_id: String, written: usize) {
        self.processed_count += written as u64;
        self.trace.chunk_ids.push(chunk_id);
    }

    pub fn record_failure(&mut self, descriptor: ErrorDescriptor, failed: usize) {
        self.failure_count += failed as u64;
        self.errors.push(descriptor);
    }

    pub fn finish(mut self, outcome: Outcome) -> StepStatus {
        self.trace.elapsed = self.trace.started_at.elapsed();
        StepStatus::new(
            self.shard_id,
            self.processed_count,
            self.failure_count,
            outcome,
            self.errors,
            self.trace,
        )
    }
}
