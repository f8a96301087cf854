use serde::{Deserialize, Serialize};

/// Names of the conventional keys a raw record carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldKeys {
    pub identity: String,
    pub content_type: String,
    pub owner: String,
    pub payload: String,
}

impl Default for FieldKeys {
    fn default() -> Self {
        Self {
            identity: "id".to_string(),
            content_type: "mimeType".to_string(),
            owner: "userId".to_string(),
            payload: "content".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let keys: FieldKeys = serde_json::from_str(r#"{"identity": "fileId"}"#).unwrap();
        assert_eq!(keys.identity, "fileId");
        assert_eq!(keys.content_type, "mimeType");
        assert_eq!(keys.owner, "userId");
        assert_eq!(keys.payload, "content");
    }
}
