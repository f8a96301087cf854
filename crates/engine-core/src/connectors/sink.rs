use crate::error::SinkError;
use async_trait::async_trait;
use model::records::entity::Entity;

/// The write side of the durable store.
///
/// `write` receives one whole chunk. Implementations upsert by identity
/// and must either accept every entity or fail the call; there is no
/// partial acceptance. Entities without an identity are stored as new
/// documents and the store picks their identity.
#[async_trait]
pub trait ItemSink: Send + Sync {
    async fn write(&self, chunk: &[Entity]) -> Result<(), SinkError>;
}
