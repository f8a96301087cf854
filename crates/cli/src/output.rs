use crate::error::CliError;
use engine_core::connectors::store::MemoryStore;
use engine_runtime::worker::WorkerReport;
use model::execution::shard::Shard;
use serde_json::json;
use std::path::Path;

pub fn print_report(report: &WorkerReport) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(report)?;
    // stdout may be carrying status reports
    eprintln!("{json}");
    Ok(())
}

pub async fn dump_store(store: &MemoryStore, path: &Path) -> Result<usize, CliError> {
    let entities = store.snapshot().await;
    let json = serde_json::to_string_pretty(&entities)?;
    tokio::fs::write(path, json).await?;
    Ok(entities.len())
}

pub fn shard_summary(shard: &Shard) -> serde_json::Value {
    json!({
        "shardId": shard.shard_id(),
        "recordCount": shard.len(),
        "metadata": shard.metadata(),
    })
}

pub fn print_shard_summary(shard: &Shard) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(&shard_summary(shard))?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::connectors::sink::ItemSink;
    use model::records::entity::Entity;
    use serde_json::Map;

    #[test]
    fn test_shard_summary() {
        let mut metadata = Map::new();
        metadata.insert("partition".into(), json!("2"));
        let shard = Shard::new("s-1", vec![Map::new(), Map::new()], metadata);

        assert_eq!(
            shard_summary(&shard),
            json!({"shardId": "s-1", "recordCount": 2, "metadata": {"partition": "2"}})
        );
    }

    #[tokio::test]
    async fn test_dump_store() {
        let store = MemoryStore::new();
        store
            .write(&[Entity {
                identity: Some("f1".into()),
                content_type: None,
                owner_id: None,
                payload: json!("x"),
            }])
            .await
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        assert_eq!(dump_store(&store, &path).await.unwrap(), 1);

        let dumped: Vec<Entity> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(dumped[0].identity(), Some("f1"));
    }
}
