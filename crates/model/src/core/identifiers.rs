use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};

/// Identifier of one partition of work handed to a worker.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShardId(Arc<str>);

impl ShardId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(Arc::from(id.into()))
    }

    /// Fresh random id for shards that arrive without one.
    pub fn generate() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ShardId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for ShardId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for ShardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = ShardId::generate();
        let b = ShardId::generate();
        assert_ne!(a, b);
        assert!(!a.as_str().is_empty());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = ShardId::from("shard-7");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"shard-7\"");
        assert_eq!(id.to_string(), "shard-7");
    }

    #[test]
    fn test_deserializes_from_plain_string() {
        let id: ShardId = serde_json::from_str("\"shard-8\"").unwrap();
        assert_eq!(id, ShardId::from("shard-8"));
    }
}
