#[cfg(test)]
mod tests {
    use crate::utils::{CountingSink, as_record, file_records, run_step, shard};
    use engine_core::connectors::store::MemoryStore;
    use engine_processing::step::ItemTransformer;
    use model::execution::{failure::ErrorKind, status::Outcome};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tracing_test::traced_test;

    // Scenario: 150 records with a chunk size of 100.
    // Expected Outcome: two store calls of 100 and 50, COMPLETED with 150 processed.
    #[traced_test]
    #[tokio::test]
    async fn tc01_two_chunks() {
        let sink = Arc::new(CountingSink::default());
        let status = run_step(shard("s-150", file_records(150)), sink.clone(), 100).await;

        assert_eq!(sink.call_sizes(), vec![100, 50]);
        assert_eq!(status.processed_count, 150);
        assert_eq!(status.failure_count, 0);
        assert_eq!(status.outcome, Outcome::Completed);
        assert!(status.errors.is_empty());
        assert!(logs_contain("Chunk written"));
    }

    // Scenario: 10 records, the store rejects the first call.
    // Expected Outcome: FAILED with nothing processed and one error descriptor.
    #[traced_test]
    #[tokio::test]
    async fn tc02_first_write_fails() {
        let sink = Arc::new(CountingSink::rejecting(&[1]));
        let status = run_step(shard("s-10", file_records(10)), sink.clone(), 100).await;

        assert_eq!(sink.call_sizes(), vec![10]);
        assert_eq!(status.processed_count, 0);
        assert_eq!(status.outcome, Outcome::Failed);
        assert_eq!(status.errors.len(), 1);
        assert_eq!(status.errors[0].kind, ErrorKind::WriteFailure);
        assert_eq!(status.errors[0].chunk, Some(0));
        assert_eq!(status.failure_count, 10);
        assert!(logs_contain("Chunk write failed"));
    }

    // Scenario: empty shard.
    // Expected Outcome: COMPLETED, nothing processed, the store is never called.
    #[tokio::test]
    async fn tc03_empty_shard() {
        let sink = Arc::new(CountingSink::default());
        let status = run_step(shard("s-empty", Vec::new()), sink.clone(), 100).await;

        assert!(sink.call_sizes().is_empty());
        assert_eq!(status.processed_count, 0);
        assert_eq!(status.outcome, Outcome::Completed);
    }

    // Scenario: a record without an identity key.
    // Expected Outcome: the entity has no identity and its payload is the whole record.
    #[tokio::test]
    async fn tc04_missing_identity() {
        let record = as_record(json!({"mimeType": "text/plain", "userId": "u1", "name": "a.txt"}));
        let sink = Arc::new(CountingSink::default());
        run_step(shard("s-anon", vec![record.clone()]), sink.clone(), 100).await;

        let entities = sink.entities();
        assert_eq!(entities.len(), 1);
        assert!(entities[0].identity().is_none());
        assert_eq!(entities[0].payload, Value::Object(record));
    }

    // Scenario: record counts at and around the chunk size.
    // Expected Outcome: k full chunks plus one remainder chunk, counts match.
    #[tokio::test]
    async fn tc05_chunk_counts() {
        for (count, expected) in [
            (1, vec![1]),
            (100, vec![100]),
            (101, vec![100, 1]),
            (250, vec![100, 100, 50]),
            (300, vec![100, 100, 100]),
        ] {
            let sink = Arc::new(CountingSink::default());
            let status = run_step(shard("s", file_records(count)), sink.clone(), 100).await;

            assert_eq!(sink.call_sizes(), expected, "count {count}");
            assert_eq!(status.processed_count, count as u64);
        }
    }

    // Scenario: the store rejects the third of five chunks.
    // Expected Outcome: progress from the first two chunks is kept, nothing after is attempted.
    #[tokio::test]
    async fn tc06_partial_progress_is_reported() {
        let sink = Arc::new(CountingSink::rejecting(&[3]));
        let status = run_step(shard("s", file_records(50)), sink.clone(), 10).await;

        assert_eq!(sink.call_sizes(), vec![10, 10, 10]);
        assert_eq!(status.processed_count, 20);
        assert_eq!(status.outcome, Outcome::Failed);
        assert_eq!(status.errors[0].identities.first().map(String::as_str), Some("f21"));
    }

    // Scenario: records with unusual shapes.
    // Expected Outcome: the transformer never fails and never drops payload data.
    #[test]
    fn tc07_transformer_is_total() {
        let transformer = ItemTransformer::default();
        for value in [
            json!({}),
            json!({"unrelated": [1, 2, 3]}),
            json!({"id": null, "content": null}),
            json!({"id": {"nested": true}, "content": 3.5}),
            json!({"id": "", "mimeType": "", "userId": "", "content": ""}),
        ] {
            let record = as_record(value);
            let entity = transformer.transform(record.clone());
            match record.get("content").filter(|v| !v.is_null()) {
                Some(_) => assert!(entity.payload.is_string()),
                None => assert_eq!(entity.payload, Value::Object(record)),
            }
        }
    }

    // Scenario: unset identities hit a real store twice.
    // Expected Outcome: each write stores new documents; known identities are upserted.
    #[tokio::test]
    async fn tc08_upsert_semantics() {
        let store = MemoryStore::new();
        let records = vec![
            as_record(json!({"id": "f1", "content": "v1"})),
            as_record(json!({"content": "anonymous"})),
        ];
        run_step(shard("s", records), Arc::new(store.clone()), 100).await;

        let again = vec![
            as_record(json!({"id": "f1", "content": "v2"})),
            as_record(json!({"content": "anonymous"})),
        ];
        run_step(shard("s", again), Arc::new(store.clone()), 100).await;

        assert_eq!(store.len().await, 3);
        assert_eq!(store.get("f1").await.map(|e| e.payload), Some(json!("v2")));
    }
}
