use serde::Serialize;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

#[derive(Debug, Default)]
struct InnerMetrics {
    records_processed: AtomicU64,
    chunks_written: AtomicU64,
    shards_completed: AtomicU64,
    shards_failed: AtomicU64,
    messages_dropped: AtomicU64,
    reports_lost: AtomicU64,
    publish_retries: AtomicU64,
}

/// Worker-level counters. Cloning shares the same counters.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<InnerMetrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub records_processed: u64,
    pub chunks_written: u64,
    pub shards_completed: u64,
    pub shards_failed: u64,
    pub messages_dropped: u64,
    pub reports_lost: u64,
    pub publish_retries: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Metrics {
            inner: Arc::new(InnerMetrics::default()),
        }
    }

    pub fn increment_records(&self, count: u64) {
        self.inner
            .records_processed
            .fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_chunks(&self, count: u64) {
        self.inner.chunks_written.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_completed(&self) {
        self.inner.shards_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_failed(&self) {
        self.inner.shards_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_dropped(&self) {
        self.inner.messages_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_reports_lost(&self) {
        self.inner.reports_lost.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_publish_retries(&self, count: u64) {
        self.inner
            .publish_retries
            .fetch_add(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            records_processed: self.inner.records_processed.load(Ordering::Relaxed),
            chunks_written: self.inner.chunks_written.load(Ordering::Relaxed),
            shards_completed: self.inner.shards_completed.load(Ordering::Relaxed),
            shards_failed: self.inner.shards_failed.load(Ordering::Relaxed),
            messages_dropped: self.inner.messages_dropped.load(Ordering::Relaxed),
            reports_lost: self.inner.reports_lost.load(Ordering::Relaxed),
            publish_retries: self.inner.publish_retries.load(Ordering::Relaxed),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
