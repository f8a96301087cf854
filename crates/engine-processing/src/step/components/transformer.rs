use model::{
    core::value::stringify,
    records::{entity::Entity, keys::FieldKeys, raw::RawRecord, raw::field},
};
use serde_json::Value;

/// Maps raw records onto entities.
///
/// Total: every record yields an entity. Missing (or `null`) fields stay
/// unset, and a missing payload falls back to the whole record so nothing
/// is dropped. Extracted values are flattened to strings.
#[derive(Debug, Clone, Default)]
pub struct ItemTransformer {
    keys: FieldKeys,
}

impl ItemTransformer {
    pub fn new(keys: FieldKeys) -> Self {
        Self { keys }
    }

    pub fn keys(&self) -> &FieldKeys {
        &self.keys
    }

    pub fn transform(&self, record: RawRecord) -> Entity {
        let text = |key: &str| field(&record, key).map(stringify);

        let identity = text(&self.keys.identity);
        let content_type = text(&self.keys.content_type);
        let owner_id = text(&self.keys.owner);
        let payload = match text(&self.keys.payload) {
            Some(content) => Value::String(content),
            None => Value::Object(record),
        };

        Entity {
            identity,
            content_type,
            owner_id,
            payload,
        }
    }
}
