use crate::{connectors::sink::ItemSink, error::SinkError};
use async_trait::async_trait;
use model::records::entity::Entity;
use std::{
    collections::BTreeMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};
use tokio::sync::RwLock;
use tracing::debug;

/// In-process document store with upsert-by-identity semantics.
///
/// Clones share the same documents, so one store can back many
/// concurrently running steps.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: Arc<RwLock<BTreeMap<String, Entity>>>,
    write_calls: Arc<AtomicU64>,
    max_document_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject any chunk containing a document larger than `limit` bytes.
    pub fn with_max_document_bytes(mut self, limit: usize) -> Self {
        self.max_document_bytes = Some(limit);
        self
    }

    pub async fn get(&self, identity: &str) -> Option<Entity> {
        self.documents.read().await.get(identity).cloned()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    /// All stored documents ordered by identity.
    pub async fn snapshot(&self) -> Vec<Entity> {
        self.documents.read().await.values().cloned().collect()
    }

    /// Number of `write` calls that reached the store, accepted or not.
    pub fn write_calls(&self) -> u64 {
        self.write_calls.load(Ordering::Relaxed)
    }

    fn oversized(&self, chunk: &[Entity]) -> Option<(Vec<String>, usize)> {
        let limit = self.max_document_bytes?;
        let offenders: Vec<&Entity> = chunk.iter().filter(|e| e.size_bytes() > limit).collect();
        if offenders.is_empty() {
            return None;
        }
        let identities = offenders
            .iter()
            .filter_map(|e| e.identity().map(str::to_string))
            .collect();
        Some((identities, offenders.len()))
    }
}

#[async_trait]
impl ItemSink for MemoryStore {
    async fn write(&self, chunk: &[Entity]) -> Result<(), SinkError> {
        self.write_calls.fetch_add(1, Ordering::Relaxed);

        // Validate the whole chunk before touching any document.
        if let Some((identities, count)) = self.oversized(chunk) {
            return Err(SinkError::Rejected {
                identities,
                reason: format!(
                    "{count} document(s) exceed the {} byte limit",
                    self.max_document_bytes.unwrap_or_default()
                ),
            });
        }

        let mut documents = self.documents.write().await;
        for entity in chunk {
            let identity = entity
                .identity()
                .map(str::to_string)
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            documents.insert(identity.clone(), entity.clone().with_identity(identity));
        }

        debug!(entities = chunk.len(), total = documents.len(), "Chunk stored");
        Ok(())
    }
}
