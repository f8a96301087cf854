use engine_core::error::SinkError;
use model::core::identifiers::ShardId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnvelopeError {
    /// The inbound message could not be turned into a shard. When the shard
    /// id could still be recovered it is carried along so a failure status
    /// can be reported against it.
    #[error("Failed to decode inbound envelope: {reason}")]
    Decode {
        salvaged_shard_id: Option<ShardId>,
        reason: String,
    },

    #[error("Failed to encode status for shard '{shard_id}': {source}")]
    Encode {
        shard_id: ShardId,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse status body: {0}")]
    Status(#[source] serde_json::Error),
}

impl EnvelopeError {
    pub(crate) fn decode(salvaged_shard_id: Option<ShardId>, reason: impl Into<String>) -> Self {
        EnvelopeError::Decode {
            salvaged_shard_id,
            reason: reason.into(),
        }
    }

    pub fn salvaged_shard_id(&self) -> Option<&ShardId> {
        match self {
            EnvelopeError::Decode {
                salvaged_shard_id, ..
            } => salvaged_shard_id.as_ref(),
            EnvelopeError::Encode { shard_id, .. } => Some(shard_id),
            EnvelopeError::Status(_) => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum StepError {
    #[error("Failed to write chunk {chunk} ('{chunk_id}'): {source}")]
    Write {
        chunk: usize,
        chunk_id: String,
        #[source]
        source: SinkError,
    },
}

impl StepError {
    /// Identities the store reported as offending.
    pub fn identities(&self) -> &[String] {
        match self {
            StepError::Write { source, .. } => source.identities(),
        }
    }

    pub fn chunk(&self) -> usize {
        match self {
            StepError::Write { chunk, .. } => *chunk,
        }
    }
}
