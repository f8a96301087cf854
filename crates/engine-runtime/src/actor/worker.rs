use crate::{
    actor::{Actor, ActorContext, messages::WorkerMsg},
    channel::OutboundChannel,
    error::{ActorError, ChannelError},
    processor::{Processed, ShardProcessor},
};
use async_trait::async_trait;
use engine_core::{
    metrics::Metrics,
    retry::{RetryDisposition, RetryError, RetryPolicy},
};
use engine_processing::envelope::{OutboundMessage, SHARD_ID_HEADER};
use std::sync::Arc;
use tokio::{sync::Semaphore, task::JoinSet};
use tracing::{debug, error, info, warn};

/// Fans deliveries out to shard tasks, at most `max_concurrent_shards`
/// at a time, and publishes each task's status report.
///
/// When all permits are taken `handle` waits for one, which stops the
/// mailbox from draining and pushes back on intake.
pub struct WorkerActor {
    processor: Arc<ShardProcessor>,
    outbound: Arc<dyn OutboundChannel>,
    permits: Arc<Semaphore>,
    publish_retry: RetryPolicy,
    metrics: Metrics,
    tasks: JoinSet<()>,
}

impl WorkerActor {
    pub fn new(
        processor: Arc<ShardProcessor>,
        outbound: Arc<dyn OutboundChannel>,
        max_concurrent_shards: usize,
        publish_retry: RetryPolicy,
        metrics: Metrics,
    ) -> Self {
        Self {
            processor,
            outbound,
            permits: Arc::new(Semaphore::new(max_concurrent_shards.max(1))),
            publish_retry,
            metrics,
            tasks: JoinSet::new(),
        }
    }

    fn reap_finished(&mut self) {
        while let Some(result) = self.tasks.try_join_next() {
            log_task_result(result);
        }
    }
}

#[async_trait]
impl Actor<WorkerMsg> for WorkerActor {
    async fn on_start(&mut self, ctx: &ActorContext) -> Result<(), ActorError> {
        info!(
            actor = ctx.name(),
            outbound = self.outbound.name(),
            max_concurrent_shards = self.permits.available_permits(),
            mailbox_capacity = ctx.mailbox_capacity(),
            "Worker actor started"
        );
        Ok(())
    }

    async fn handle(&mut self, msg: WorkerMsg, _ctx: &ActorContext) -> Result<(), ActorError> {
        match msg {
            WorkerMsg::Deliver(message) => {
                self.reap_finished();

                let permit = self
                    .permits
                    .clone()
                    .acquire_owned()
                    .await
                    .map_err(|e| ActorError::Internal(e.to_string()))?;

                let processor = self.processor.clone();
                let outbound = self.outbound.clone();
                let retry = self.publish_retry.clone();
                let metrics = self.metrics.clone();

                self.tasks.spawn(async move {
                    let _permit = permit;
                    match processor.process(message).await {
                        Processed::Report(report) => {
                            publish_report(outbound, &retry, &metrics, report).await;
                        }
                        Processed::Dropped { reason } => {
                            debug!(reason = %reason, "No status to publish");
                        }
                        Processed::ReportLost { shard_id, error } => {
                            debug!(
                                shard_id = %shard_id,
                                kind = %error.kind,
                                "No status to publish"
                            );
                        }
                    }
                });
                Ok(())
            }
        }
    }

    async fn on_stop(&mut self, ctx: &ActorContext) -> Result<(), ActorError> {
        info!(
            actor = ctx.name(),
            in_flight = self.tasks.len(),
            "Waiting for in-flight shards"
        );
        while let Some(result) = self.tasks.join_next().await {
            log_task_result(result);
        }
        info!(actor = ctx.name(), "Worker actor stopped");
        Ok(())
    }
}

fn log_task_result(result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        error!(error = %e, "Shard task did not finish");
    }
}

fn classify_channel_error(err: &ChannelError) -> RetryDisposition {
    match err {
        ChannelError::Busy(_) => RetryDisposition::Retry,
        ChannelError::Closed(_) => RetryDisposition::Stop,
    }
}

/// Publishes with retry. A report that still cannot be delivered is
/// counted as lost; the coordinator sees a missing status.
pub(crate) async fn publish_report(
    outbound: Arc<dyn OutboundChannel>,
    retry: &RetryPolicy,
    metrics: &Metrics,
    report: OutboundMessage,
) {
    let shard_id = report
        .headers
        .get(SHARD_ID_HEADER)
        .cloned()
        .unwrap_or_default();

    let result = retry
        .run(
            || {
                let outbound = outbound.clone();
                let report = report.clone();
                async move { outbound.publish(report).await }
            },
            classify_channel_error,
        )
        .await;

    match result {
        Ok(((), retries)) => {
            if retries > 0 {
                metrics.increment_publish_retries(retries as u64);
                warn!(shard_id = %shard_id, retries, "Status published after retries");
            }
            debug!(shard_id = %shard_id, channel = outbound.name(), "Status published");
        }
        Err(e) => {
            metrics.increment_reports_lost();
            let exhausted = matches!(e, RetryError::AttemptsExceeded(_));
            error!(
                shard_id = %shard_id,
                channel = outbound.name(),
                exhausted,
                error = %e.into_inner(),
                "Failed to publish status report"
            );
        }
    }
}
