pub mod inbound;
pub mod outbound;

pub use inbound::{InboundMessage, decode};
pub use outbound::{OutboundMessage, StatusEnvelope, decode_status, encode};

/// Header carrying the shard id on both directions.
pub const SHARD_ID_HEADER: &str = "shardId";
/// Header carrying the step outcome on status reports.
pub const OUTCOME_HEADER: &str = "outcome";
