use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The normalized unit persisted to the document store.
///
/// `identity` is the upsert key. It may be unset when the raw record had
/// no identity key; the store assigns one in that case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub owner_id: Option<String>,
    pub payload: Value,
}

impl Entity {
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    /// Encoded JSON size, used by stores that cap document size.
    pub fn size_bytes(&self) -> usize {
        serde_json::to_vec(self).map(|b| b.len()).unwrap_or(0)
    }
}
