use crate::error::StepError;
use engine_core::connectors::sink::ItemSink;
use model::records::entity::Entity;
use std::{sync::Arc, time::Duration};
use tracing::info;

#[derive(Debug, Clone)]
pub struct WriteResult {
    pub entities_written: usize,
    pub duration: Duration,
}

/// Hands whole chunks to the store in a single call.
///
/// No retry happens here: a rejected chunk fails the step and the shard
/// is expected to be redelivered as a whole.
#[derive(Clone)]
pub struct ChunkWriter {
    sink: Arc<dyn ItemSink>,
}

impl ChunkWriter {
    pub fn new(sink: Arc<dyn ItemSink>) -> Self {
        Self { sink }
    }

    pub async fn write_chunk(
        &self,
        chunk: usize,
        chunk_id: &str,
        entities: &[Entity],
    ) -> Result<WriteResult, StepError> {
        let start = std::time::Instant::now();

        self.sink
            .write(entities)
            .await
            .map_err(|source| StepError::Write {
                chunk,
                chunk_id: chunk_id.to_string(),
                source,
            })?;

        let duration = start.elapsed();
        let entities_written = entities.len();
        let per_sec = entities_written as f64 / duration.as_secs_f64().max(f64::EPSILON);

        info!(
            chunk,
            chunk_id = %chunk_id,
            entities = entities_written,
            duration_ms = duration.as_millis(),
            entities_per_sec = %format!("{:.2}", per_sec),
            "Chunk written"
        );

        Ok(WriteResult {
            entities_written,
            duration,
        })
    }
}
