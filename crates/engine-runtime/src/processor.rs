use engine_core::{connectors::sink::ItemSink, context::process::ProcessContext};
use engine_processing::{
    envelope::{self, InboundMessage, OutboundMessage},
    error::EnvelopeError,
    step::{ChunkWriter, ChunkedStep, StepConfig},
};
use model::{
    core::identifiers::ShardId,
    execution::{
        failure::{ErrorDescriptor, ErrorKind},
        status::StepStatus,
    },
};
use std::sync::Arc;
use tracing::{error, warn};

/// What became of one inbound message.
#[derive(Debug)]
pub enum Processed {
    /// A status report ready to publish.
    Report(OutboundMessage),
    /// The envelope was unreadable and carried no shard id to report against.
    Dropped { reason: String },
    /// The step ran but its status could not be serialized.
    ReportLost {
        shard_id: ShardId,
        error: ErrorDescriptor,
    },
}

type StatusEncoder = fn(StepStatus) -> Result<OutboundMessage, EnvelopeError>;

/// Decode, run, encode. One per worker, shared by every shard task; each
/// message gets a fresh engine.
pub struct ShardProcessor {
    writer: ChunkWriter,
    config: StepConfig,
    ctx: Arc<ProcessContext>,
    encode: StatusEncoder,
}

impl ShardProcessor {
    pub fn new(sink: Arc<dyn ItemSink>, config: StepConfig, ctx: Arc<ProcessContext>) -> Self {
        Self {
            writer: ChunkWriter::new(sink),
            config,
            ctx,
            encode: envelope::encode,
        }
    }

    #[cfg(test)]
    fn with_encoder(mut self, encode: StatusEncoder) -> Self {
        self.encode = encode;
        self
    }

    pub fn config(&self) -> &StepConfig {
        &self.config
    }

    pub async fn process(&self, message: InboundMessage) -> Processed {
        let status = match envelope::decode(&message) {
            Ok(shard) => {
                let step = ChunkedStep::new(shard, self.writer.clone(), self.config.clone())
                    .with_events(self.ctx.event_bus().clone());
                step.run().await
            }
            Err(err) => match self.on_decode_failure(err) {
                Some(status) => status,
                None => {
                    return Processed::Dropped {
                        reason: "undecodable envelope without shard id".to_string(),
                    };
                }
            },
        };

        self.record(&status);

        let shard_id = status.shard_id().clone();
        match (self.encode)(status) {
            Ok(outbound) => Processed::Report(outbound),
            Err(e) => {
                let error = ErrorDescriptor::new(ErrorKind::EncodeFailure, e.to_string());
                error!(
                    shard_id = %shard_id,
                    kind = %error.kind,
                    error = %e,
                    "Failed to encode step status, report will be lost"
                );
                self.ctx.metrics().increment_reports_lost();
                Processed::ReportLost { shard_id, error }
            }
        }
    }

    fn on_decode_failure(&self, err: EnvelopeError) -> Option<StepStatus> {
        match err.salvaged_shard_id() {
            Some(shard_id) => {
                warn!(shard_id = %shard_id, error = %err, "Inbound envelope rejected");
                Some(StepStatus::decode_failure(shard_id.clone(), err.to_string()))
            }
            None => {
                error!(error = %err, "Dropping inbound envelope with no recoverable shard id");
                self.ctx.metrics().increment_dropped();
                None
            }
        }
    }

    fn record(&self, status: &StepStatus) {
        let metrics = self.ctx.metrics();
        metrics.increment_records(status.processed_count());
        metrics.increment_chunks(status.trace().chunks_written() as u64);
        if status.is_completed() {
            metrics.increment_completed();
        } else {
            metrics.increment_failed();
        }
    }
}
