use crate::{
    envelope::{OUTCOME_HEADER, SHARD_ID_HEADER},
    error::EnvelopeError,
};
use model::execution::{
    failure::ErrorDescriptor,
    status::{Outcome, StepStatus},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// A status report ready for the outbound channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub body: String,
    pub headers: BTreeMap<String, String>,
}

/// Wire form of a step status. Only these fields are ever published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StatusEnvelope {
    pub shard_id: String,
    pub processed_count: u64,
    pub failure_count: u64,
    pub outcome: Outcome,
    pub errors: Vec<ErrorDescriptor>,
}

impl From<&StepStatus> for StatusEnvelope {
    fn from(status: &StepStatus) -> Self {
        Self {
            shard_id: status.shard_id().to_string(),
            processed_count: status.processed_count(),
            failure_count: status.failure_count(),
            outcome: status.outcome(),
            errors: status.errors().to_vec(),
        }
    }
}

/// Serializes a finished status. Takes ownership: a status is reported once.
pub fn encode(status: StepStatus) -> Result<OutboundMessage, EnvelopeError> {
    let envelope = StatusEnvelope::from(&status);
    let body = serde_json::to_string(&envelope).map_err(|source| EnvelopeError::Encode {
        shard_id: status.shard_id().clone(),
        source,
    })?;

    debug!(
        shard_id = %status.shard_id(),
        outcome = %status.outcome(),
        chunks = status.trace().chunks_written(),
        elapsed_ms = status.trace().elapsed.as_millis(),
        bytes = body.len(),
        "Encoded step status"
    );

    let headers = BTreeMap::from([
        (SHARD_ID_HEADER.to_string(), envelope.shard_id),
        (OUTCOME_HEADER.to_string(), envelope.outcome.to_string()),
    ]);

    Ok(OutboundMessage { body, headers })
}

/// Parses a status body, rejecting anything outside the wire schema.
pub fn decode_status(body: &str) -> Result<StatusEnvelope, EnvelopeError> {
    serde_json::from_str(body).map_err(EnvelopeError::Status)
}
