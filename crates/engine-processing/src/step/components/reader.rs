use model::records::raw::RawRecord;
use std::{collections::VecDeque, iter::FusedIterator};

/// Hands out a shard's records head first.
///
/// The records are fully materialized before reading starts, so reads
/// never wait. Once drained the reader stays drained.
#[derive(Debug, Default)]
pub struct ShardReader {
    records: VecDeque<RawRecord>,
}

impl ShardReader {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self {
            records: records.into(),
        }
    }

    /// Removes and returns the head record, `None` at end of stream.
    pub fn read(&mut self) -> Option<RawRecord> {
        self.records.pop_front()
    }

    /// Reads up to `max` records. An empty result means end of stream.
    pub fn read_chunk(&mut self, max: usize) -> Vec<RawRecord> {
        let take = max.min(self.records.len());
        self.records.drain(..take).collect()
    }

    pub fn remaining(&self) -> usize {
        self.records.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.records.is_empty()
    }
}

impl Iterator for ShardReader {
    type Item = RawRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.read()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.records.len(), Some(self.records.len()))
    }
}

impl ExactSizeIterator for ShardReader {}

impl FusedIterator for ShardReader {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(n: usize) -> Vec<RawRecord> {
        (1..=n)
            .map(|i| serde_json::from_value(json!({ "id": format!("f{i}") })).unwrap())
            .collect()
    }

    #[test]
    fn test_reads_in_shard_order() {
        let mut reader = ShardReader::new(records(3));
        let ids: Vec<_> = reader.by_ref().map(|r| r["id"].clone()).collect();
        assert_eq!(ids, vec![json!("f1"), json!("f2"), json!("f3")]);
    }

    #[test]
    fn test_stays_exhausted() {
        let mut reader = ShardReader::new(records(1));
        assert!(reader.read().is_some());
        assert!(reader.read().is_none());
        assert!(reader.read().is_none());
        assert!(reader.read_chunk(10).is_empty());
        assert!(reader.is_exhausted());
    }

    #[test]
    fn test_read_chunk_bounds() {
        let mut reader = ShardReader::new(records(5));
        assert_eq!(reader.read_chunk(2).len(), 2);
        assert_eq!(reader.remaining(), 3);
        let tail = reader.read_chunk(10);
        assert_eq!(tail.len(), 3);
        assert_eq!(tail[0]["id"], json!("f3"));
        assert!(reader.is_exhausted());
    }
}
