use crate::{context::identity::ProfileResolver, event_bus::bus::EventBus, metrics::Metrics};
use chrono::{DateTime, Utc};
use std::{fmt, sync::Arc};

/// Process-wide collaborators, built once at startup and shared by `Arc`.
///
/// Nothing in here is reachable through a global; components that need
/// the bus, the counters or the resolver are handed this context.
pub struct ProcessContext {
    worker_id: String,
    started_at: DateTime<Utc>,
    event_bus: EventBus,
    metrics: Metrics,
    resolver: Option<Arc<dyn ProfileResolver>>,
}

impl ProcessContext {
    pub fn new(worker_id: impl Into<String>) -> Self {
        Self {
            worker_id: worker_id.into(),
            started_at: Utc::now(),
            event_bus: EventBus::new(),
            metrics: Metrics::new(),
            resolver: None,
        }
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn ProfileResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn resolver(&self) -> Option<&Arc<dyn ProfileResolver>> {
        self.resolver.as_ref()
    }
}

impl fmt::Debug for ProcessContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessContext")
            .field("worker_id", &self.worker_id)
            .field("started_at", &self.started_at)
            .field("has_resolver", &self.resolver.is_some())
            .finish()
    }
}
