use crate::{envelope::SHARD_ID_HEADER, error::EnvelopeError};
use model::{
    core::identifiers::ShardId, execution::shard::Shard, records::raw::RawRecord,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// A shard request as it arrives from the inbound channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub body: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl InboundMessage {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            headers: BTreeMap::new(),
        }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(String::as_str)
    }
}

/// Turns an inbound message into a shard.
///
/// The body is either a JSON array of records or an object wrapping them
/// under `records` (older coordinators send `data`), optionally with
/// `shardId` and `metadata`. The shard id comes from the body, then the
/// `shardId` header, and is generated when neither has one.
pub fn decode(message: &InboundMessage) -> Result<Shard, EnvelopeError> {
    let header_id = message
        .header(SHARD_ID_HEADER)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(ShardId::from);

    let body: Value = serde_json::from_str(&message.body).map_err(|e| {
        EnvelopeError::decode(header_id.clone(), format!("body is not valid JSON: {e}"))
    })?;

    let (items, body_id, body_metadata) = match body {
        Value::Array(items) => (items, None, Map::new()),
        Value::Object(object) => unwrap_shard(object, header_id.clone())?,
        other => {
            return Err(EnvelopeError::decode(
                header_id,
                format!("expected an array or object body, found {}", kind(&other)),
            ));
        }
    };

    let salvaged = body_id.clone().or_else(|| header_id.clone());
    let records = items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(record) => Ok(record),
            other => Err(EnvelopeError::decode(
                salvaged.clone(),
                format!("record {i} is {}, expected an object", kind(&other)),
            )),
        })
        .collect::<Result<Vec<RawRecord>, _>>()?;

    let mut metadata: Map<String, Value> = message
        .headers
        .iter()
        .filter(|(key, _)| key.as_str() != SHARD_ID_HEADER)
        .map(|(key, value)| (key.clone(), Value::String(value.clone())))
        .collect();
    metadata.extend(body_metadata);

    let shard_id = match body_id.or(header_id) {
        Some(id) => id,
        None => {
            let id = ShardId::generate();
            debug!(shard_id = %id, "Inbound message had no shard id, generated one");
            id
        }
    };

    Ok(Shard::new(shard_id, records, metadata))
}

type Unwrapped = (Vec<Value>, Option<ShardId>, Map<String, Value>);

fn unwrap_shard(
    mut object: Map<String, Value>,
    header_id: Option<ShardId>,
) -> Result<Unwrapped, EnvelopeError> {
    let body_id = match object.remove(SHARD_ID_HEADER) {
        None | Some(Value::Null) => None,
        Some(Value::String(id)) if id.trim().is_empty() => None,
        Some(Value::String(id)) => Some(ShardId::from(id.trim())),
        Some(other) => {
            return Err(EnvelopeError::decode(
                header_id,
                format!("shardId is {}, expected a string", kind(&other)),
            ));
        }
    };
    let salvaged = body_id.clone().or(header_id);

    let items = match object.remove("records").or_else(|| object.remove("data")) {
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(EnvelopeError::decode(
                salvaged,
                format!("records is {}, expected an array", kind(&other)),
            ));
        }
        None => {
            return Err(EnvelopeError::decode(
                salvaged,
                "object body has no records array",
            ));
        }
    };

    let metadata = match object.remove("metadata") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(metadata)) => metadata,
        Some(other) => {
            return Err(EnvelopeError::decode(
                salvaged,
                format!("metadata is {}, expected an object", kind(&other)),
            ));
        }
    };

    Ok((items, body_id, metadata))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_array_body() {
        let message = InboundMessage::new(r#"[{"id": "f1"}, {"id": "f2"}]"#)
            .with_header("shardId", "s-7")
            .with_header("partition", "3");

        let shard = decode(&message).unwrap();
        assert_eq!(shard.shard_id().as_str(), "s-7");
        assert_eq!(shard.len(), 2);
        assert_eq!(shard.records()[1]["id"], json!("f2"));
        assert_eq!(shard.metadata().get("partition"), Some(&json!("3")));
        assert!(shard.metadata().get("shardId").is_none());
    }

    #[test]
    fn test_wrapped_body_wins_over_headers() {
        let body = json!({
            "shardId": "from-body",
            "records": [{"id": "f1"}],
            "metadata": {"partition": 9, "total": 4}
        });
        let message = InboundMessage::new(body.to_string())
            .with_header("shardId", "from-header")
            .with_header("partition", "3")
            .with_header("origin", "coordinator");

        let shard = decode(&message).unwrap();
        assert_eq!(shard.shard_id().as_str(), "from-body");
        assert_eq!(shard.metadata().get("partition"), Some(&json!(9)));
        assert_eq!(shard.metadata().get("total"), Some(&json!(4)));
        assert_eq!(shard.metadata().get("origin"), Some(&json!("coordinator")));
    }

    #[test]
    fn test_legacy_data_key() {
        let message = InboundMessage::new(r#"{"data": [{"id": "f1"}]}"#);
        let shard = decode(&message).unwrap();
        assert_eq!(shard.len(), 1);
    }

    #[test]
    fn test_generates_missing_shard_id() {
        let a = decode(&InboundMessage::new("[]")).unwrap();
        let b = decode(&InboundMessage::new("[]")).unwrap();
        assert!(a.is_empty());
        assert!(!a.shard_id().as_str().is_empty());
        assert_ne!(a.shard_id(), b.shard_id());
    }

    #[test]
    fn test_blank_header_is_ignored() {
        let message = InboundMessage::new("[]").with_header("shardId", "  ");
        let shard = decode(&message).unwrap();
        assert!(!shard.shard_id().as_str().trim().is_empty());
    }

    #[test]
    fn test_invalid_json_salvages_header_id() {
        let message = InboundMessage::new("{not json").with_header("shardId", "s-1");
        let err = decode(&message).unwrap_err();
        assert_eq!(err.salvaged_shard_id().map(ShardId::as_str), Some("s-1"));
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[test]
    fn test_bad_record_salvages_body_id() {
        let message = InboundMessage::new(r#"{"shardId": "s-2", "records": [{"id": 1}, 5]}"#);
        let err = decode(&message).unwrap_err();
        assert_eq!(err.salvaged_shard_id().map(ShardId::as_str), Some("s-2"));
        assert!(err.to_string().contains("record 1 is a number"));
    }

    #[test]
    fn test_unsalvageable_failures() {
        for body in ["42", r#""text""#, r#"{"records": {}}"#, r#"{"rows": []}"#] {
            let err = decode(&InboundMessage::new(body)).unwrap_err();
            assert!(err.salvaged_shard_id().is_none(), "body {body}");
        }
    }
}
