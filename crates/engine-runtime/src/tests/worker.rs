#[cfg(test)]
mod tests {
    use crate::{
        channel::{OutboundChannel, memory_channel},
        error::ChannelError,
        worker::Worker,
    };
    use async_trait::async_trait;
    use engine_config::settings::validated::WorkerSettings;
    use engine_core::{
        connectors::{sink::ItemSink, store::MemoryStore},
        context::process::ProcessContext,
        error::SinkError,
    };
    use engine_processing::envelope::{InboundMessage, OutboundMessage, decode_status};
    use model::{execution::status::Outcome, records::entity::Entity};
    use serde_json::json;
    use std::{
        sync::{
            Arc, Mutex,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };
    use tokio_util::sync::CancellationToken;

    // Mock outbound channel recording every report
    #[derive(Default)]
    struct RecordingOutbound {
        published: Mutex<Vec<OutboundMessage>>,
    }

    impl RecordingOutbound {
        fn count(&self) -> usize {
            self.published.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl OutboundChannel for RecordingOutbound {
        fn name(&self) -> &str {
            "recording"
        }

        async fn publish(&self, message: OutboundMessage) -> Result<(), ChannelError> {
            self.published.lock().unwrap().push(message);
            Ok(())
        }
    }

    // Mock sink that tracks how many writes run at once
    struct SlowSink {
        delay: Duration,
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    impl SlowSink {
        fn new(delay: Duration) -> Self {
            Self {
                delay,
                active: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ItemSink for SlowSink {
        async fn write(&self, _chunk: &[Entity]) -> Result<(), SinkError> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn shard_body(shard_id: &str, records: usize) -> String {
        let records: Vec<_> = (0..records)
            .map(|i| json!({ "id": format!("{shard_id}-{i}") }))
            .collect();
        json!({ "shardId": shard_id, "records": records }).to_string()
    }

    fn settings(max_concurrent_shards: usize) -> WorkerSettings {
        WorkerSettings::builder()
            .chunk_size(10)
            .max_concurrent_shards(max_concurrent_shards)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_worker_processes_until_inbound_closes() {
        let store = MemoryStore::new();
        let outbound = Arc::new(RecordingOutbound::default());
        let ctx = Arc::new(ProcessContext::new("w-1"));
        let worker = Worker::new(settings(2), Arc::new(store.clone()), outbound.clone(), ctx);

        let (tx, rx) = memory_channel::<InboundMessage>("shard-requests", 8);
        tx.send(InboundMessage::new(shard_body("a", 25))).await.unwrap();
        tx.send(InboundMessage::new(shard_body("b", 5))).await.unwrap();
        tx.send(InboundMessage::new("garbage")).await.unwrap();
        drop(tx);

        let report = worker.run(rx, CancellationToken::new()).await.unwrap();

        assert_eq!(report.messages_received, 3);
        assert_eq!(report.metrics.shards_completed, 2);
        assert_eq!(report.metrics.records_processed, 30);
        assert_eq!(report.metrics.chunks_written, 4);
        assert_eq!(report.metrics.messages_dropped, 1);
        assert_eq!(store.len().await, 30);

        let mut statuses: Vec<_> = outbound
            .published
            .lock()
            .unwrap()
            .iter()
            .map(|m| decode_status(&m.body).unwrap())
            .collect();
        statuses.sort_by(|a, b| a.shard_id.cmp(&b.shard_id));
        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0].shard_id, "a");
        assert_eq!(statuses[0].processed_count, 25);
        assert_eq!(statuses[1].processed_count, 5);
        assert!(statuses.iter().all(|s| s.outcome == Outcome::Completed));
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let sink = Arc::new(SlowSink::new(Duration::from_millis(20)));
        let outbound = Arc::new(RecordingOutbound::default());
        let ctx = Arc::new(ProcessContext::new("w-2"));
        let worker = Worker::new(settings(2), sink.clone(), outbound.clone(), ctx);

        let (tx, rx) = memory_channel::<InboundMessage>("shard-requests", 8);
        for i in 0..6 {
            tx.send(InboundMessage::new(shard_body(&format!("s{i}"), 3)))
                .await
                .unwrap();
        }
        drop(tx);

        let report = worker.run(rx, CancellationToken::new()).await.unwrap();

        assert_eq!(report.metrics.shards_completed, 6);
        assert_eq!(outbound.count(), 6);
        assert!(sink.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_cancellation_stops_intake() {
        let store = MemoryStore::new();
        let outbound = Arc::new(RecordingOutbound::default());
        let ctx = Arc::new(ProcessContext::new("w-3"));
        let worker = Worker::new(settings(1), Arc::new(store), outbound.clone(), ctx);

        // Sender stays open: only cancellation can end the run.
        let (tx, rx) = memory_channel::<InboundMessage>("shard-requests", 8);
        tx.send(InboundMessage::new(shard_body("first", 2))).await.unwrap();

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        let outbound_watch = outbound.clone();
        tokio::spawn(async move {
            while outbound_watch.count() == 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            trigger.cancel();
        });

        let report = tokio::time::timeout(Duration::from_secs(5), worker.run(rx, cancel))
            .await
            .expect("worker did not stop after cancellation")
            .unwrap();

        assert_eq!(report.messages_received, 1);
        assert_eq!(outbound.count(), 1);
        drop(tx);
    }
}
