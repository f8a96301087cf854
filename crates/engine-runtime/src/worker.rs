use crate::{
    actor::{messages::WorkerMsg, spawn::spawn_actor, worker::WorkerActor},
    channel::{InboundChannel, OutboundChannel},
    error::WorkerError,
    processor::ShardProcessor,
};
use engine_config::settings::validated::WorkerSettings;
use engine_core::{
    connectors::sink::ItemSink, context::process::ProcessContext, metrics::MetricsSnapshot,
    retry::RetryPolicy,
};
use engine_processing::step::StepConfig;
use serde::Serialize;
use std::{sync::Arc, time::Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Summary returned when a worker stops.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerReport {
    pub worker_id: String,
    pub messages_received: u64,
    pub elapsed_ms: u64,
    #[serde(flatten)]
    pub metrics: MetricsSnapshot,
}

/// Pulls shard requests off the inbound channel and runs each one to a
/// published status report.
///
/// Everything the worker needs is handed in at construction; there is no
/// global state.
pub struct Worker {
    settings: WorkerSettings,
    processor: Arc<ShardProcessor>,
    outbound: Arc<dyn OutboundChannel>,
    ctx: Arc<ProcessContext>,
}

impl Worker {
    pub fn new(
        settings: WorkerSettings,
        sink: Arc<dyn ItemSink>,
        outbound: Arc<dyn OutboundChannel>,
        ctx: Arc<ProcessContext>,
    ) -> Self {
        let processor = Arc::new(ShardProcessor::new(
            sink,
            StepConfig::from(&settings),
            ctx.clone(),
        ));

        Self {
            settings,
            processor,
            outbound,
            ctx,
        }
    }

    pub fn settings(&self) -> &WorkerSettings {
        &self.settings
    }

    /// Runs until the inbound channel closes or `cancel` fires.
    ///
    /// Cancellation only stops intake; shards already handed to the
    /// worker run to completion and their reports are published before
    /// this returns.
    pub async fn run<I>(
        &self,
        mut inbound: I,
        cancel: CancellationToken,
    ) -> Result<WorkerReport, WorkerError>
    where
        I: InboundChannel,
    {
        let start = Instant::now();
        let retry = self.settings.publish_retry();
        let actor = WorkerActor::new(
            self.processor.clone(),
            self.outbound.clone(),
            self.settings.max_concurrent_shards(),
            RetryPolicy::new(retry.max_attempts, retry.base_delay(), retry.max_delay()),
            self.ctx.metrics().clone(),
        );
        let (actor_ref, handle) = spawn_actor(
            format!("worker-{}", self.ctx.worker_id()),
            self.settings.mailbox_capacity(),
            actor,
        );

        info!(
            worker_id = self.ctx.worker_id(),
            inbound = inbound.name(),
            outbound = self.outbound.name(),
            chunk_size = self.settings.chunk_size(),
            "Worker started"
        );

        let mut messages_received = 0u64;
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Cancellation requested, no longer accepting shards");
                    break;
                }
                message = inbound.receive() => match message {
                    Some(message) => {
                        messages_received += 1;
                        actor_ref.send(WorkerMsg::Deliver(message)).await?;
                        debug!(queued = actor_ref.queued(), "Shard handed to worker actor");
                    }
                    None => {
                        info!(inbound = inbound.name(), "Inbound channel closed");
                        break;
                    }
                }
            }
        }

        // Dropping the last ref lets the actor drain and stop.
        drop(actor_ref);
        handle.await?;

        let report = WorkerReport {
            worker_id: self.ctx.worker_id().to_string(),
            messages_received,
            elapsed_ms: start.elapsed().as_millis() as u64,
            metrics: self.ctx.metrics().snapshot(),
        };

        info!(
            worker_id = %report.worker_id,
            messages = report.messages_received,
            completed = report.metrics.shards_completed,
            failed = report.metrics.shards_failed,
            dropped = report.metrics.messages_dropped,
            reports_lost = report.metrics.reports_lost,
            "Worker stopped"
        );

        Ok(report)
    }
}
