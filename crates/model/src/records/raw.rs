use crate::core::value::non_null;
use serde_json::{Map, Value};

/// A raw input record as produced by the coordinator: string keys to
/// arbitrary JSON values, with no fixed schema.
pub type RawRecord = Map<String, Value>;

/// Looks up `key`, treating an explicit JSON `null` the same as a missing key.
pub fn field<'a>(record: &'a RawRecord, key: &str) -> Option<&'a Value> {
    non_null(record.get(key))
}
