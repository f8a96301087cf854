use crate::{core::identifiers::ShardId, records::raw::RawRecord};
use serde_json::{Map, Value};

/// One partition of work: an ordered, fully materialized list of raw
/// records plus the metadata that travelled with it.
///
/// A shard is never modified after it is decoded; the only way to get
/// at the records by value is to consume it.
#[derive(Debug, Clone, PartialEq)]
pub struct Shard {
    shard_id: ShardId,
    records: Vec<RawRecord>,
    metadata: Map<String, Value>,
}

impl Shard {
    pub fn new(
        shard_id: impl Into<ShardId>,
        records: Vec<RawRecord>,
        metadata: Map<String, Value>,
    ) -> Self {
        Self {
            shard_id: shard_id.into(),
            records,
            metadata,
        }
    }

    pub fn shard_id(&self) -> &ShardId {
        &self.shard_id
    }

    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_parts(self) -> (ShardId, Vec<RawRecord>, Map<String, Value>) {
        (self.shard_id, self.records, self.metadata)
    }
}
