#![allow(dead_code)]

use async_trait::async_trait;
use engine_core::{connectors::sink::ItemSink, error::SinkError};
use engine_processing::{
    envelope::{InboundMessage, StatusEnvelope, decode_status, encode},
    step::{ChunkWriter, ChunkedStep, StepConfig},
};
use model::{
    execution::shard::Shard,
    records::{entity::Entity, raw::RawRecord},
};
use serde_json::{Map, Value, json};
use std::sync::{Arc, Mutex};

/// Records `{id: "f1".."fN", mimeType: "text/plain", userId: "u1"}`.
pub fn file_records(count: usize) -> Vec<RawRecord> {
    (1..=count)
        .map(|i| {
            as_record(json!({
                "id": format!("f{i}"),
                "mimeType": "text/plain",
                "userId": "u1"
            }))
        })
        .collect()
}

pub fn as_record(value: Value) -> RawRecord {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

pub fn shard(shard_id: &str, records: Vec<RawRecord>) -> Shard {
    Shard::new(shard_id, records, Map::new())
}

/// A wrapped-shard inbound message.
pub fn inbound(shard_id: &str, records: &[RawRecord]) -> InboundMessage {
    InboundMessage::new(json!({ "shardId": shard_id, "records": records }).to_string())
}

/// Runs one shard against `sink` and returns the wire form of its status.
pub async fn run_step(shard: Shard, sink: Arc<dyn ItemSink>, chunk_size: usize) -> StatusEnvelope {
    let step = ChunkedStep::new(
        shard,
        ChunkWriter::new(sink),
        StepConfig::default().with_chunk_size(chunk_size),
    );
    let message = encode(step.run().await).expect("encode status");
    decode_status(&message.body).expect("decode status")
}

/// Sink mock recording every chunk, optionally rejecting given calls.
#[derive(Default)]
pub struct CountingSink {
    calls: Mutex<Vec<Vec<Entity>>>,
    reject_calls: Vec<usize>,
}

impl CountingSink {
    /// Rejects the listed 1-based calls.
    pub fn rejecting(calls: &[usize]) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            reject_calls: calls.to_vec(),
        }
    }

    pub fn call_sizes(&self) -> Vec<usize> {
        self.calls.lock().unwrap().iter().map(Vec::len).collect()
    }

    pub fn entities(&self) -> Vec<Entity> {
        self.calls.lock().unwrap().iter().flatten().cloned().collect()
    }
}

#[async_trait]
impl ItemSink for CountingSink {
    async fn write(&self, chunk: &[Entity]) -> Result<(), SinkError> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(chunk.to_vec());
        if self.reject_calls.contains(&calls.len()) {
            return Err(SinkError::Rejected {
                identities: chunk.iter().filter_map(|e| e.identity.clone()).collect(),
                reason: "duplicate key in batch".into(),
            });
        }
        Ok(())
    }
}
