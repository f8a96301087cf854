use engine_runtime::worker::WorkerReport;
use std::sync::{Arc, OnceLock};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// The signal that stopped shard intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopSignal {
    Interrupt,
    Terminate,
}

/// Stops shard intake on SIGINT or SIGTERM and remembers which one arrived.
///
/// Only intake stops. Shards already handed to the worker keep running and
/// their reports are still published.
#[derive(Clone)]
pub struct ShutdownCoordinator {
    intake: CancellationToken,
    signal: Arc<OnceLock<StopSignal>>,
}

impl ShutdownCoordinator {
    pub fn new(intake: CancellationToken) -> Self {
        Self {
            intake,
            signal: Arc::new(OnceLock::new()),
        }
    }

    pub fn register_handlers(&self) {
        let coordinator = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                received = wait_for_signal() => coordinator.request(received),
                _ = coordinator.intake.cancelled() => {}
            }
        });
    }

    /// Record `signal` and stop intake. Later signals are ignored.
    pub fn request(&self, signal: StopSignal) {
        if self.signal.set(signal).is_err() {
            warn!(?signal, "Shutdown already in progress");
            return;
        }
        info!(?signal, "Stopping shard intake, in-flight shards will finish");
        self.intake.cancel();
    }

    pub fn stop_signal(&self) -> Option<StopSignal> {
        self.signal.get().copied()
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.intake.clone()
    }
}

async fn wait_for_signal() -> StopSignal {
    let interrupt = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install SIGINT handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => StopSignal::Interrupt,
        _ = terminate => StopSignal::Terminate,
    }
}

/// Process exit codes for `shard-worker run`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    /// Some inbound messages ended without a published status.
    Unreported = 2,
    Interrupted = 130,
    Terminated = 143,
}

impl ExitCode {
    pub fn for_run(signal: Option<StopSignal>, report: &WorkerReport) -> Self {
        match signal {
            Some(StopSignal::Interrupt) => ExitCode::Interrupted,
            Some(StopSignal::Terminate) => ExitCode::Terminated,
            None if report.metrics.messages_dropped > 0 || report.metrics.reports_lost > 0 => {
                ExitCode::Unreported
            }
            None => ExitCode::Success,
        }
    }

    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::metrics::Metrics;

    fn report(metrics: &Metrics) -> WorkerReport {
        WorkerReport {
            worker_id: "w".into(),
            messages_received: 3,
            elapsed_ms: 1,
            metrics: metrics.snapshot(),
        }
    }

    #[test]
    fn test_first_signal_wins_and_stops_intake() {
        let shutdown = ShutdownCoordinator::new(CancellationToken::new());
        assert_eq!(shutdown.stop_signal(), None);

        shutdown.request(StopSignal::Terminate);
        shutdown.request(StopSignal::Interrupt);

        assert!(shutdown.cancel_token().is_cancelled());
        assert_eq!(shutdown.stop_signal(), Some(StopSignal::Terminate));
    }

    #[test]
    fn test_exit_codes() {
        let metrics = Metrics::new();
        assert_eq!(ExitCode::for_run(None, &report(&metrics)), ExitCode::Success);
        assert_eq!(
            ExitCode::for_run(Some(StopSignal::Interrupt), &report(&metrics)).as_i32(),
            130
        );
        assert_eq!(
            ExitCode::for_run(Some(StopSignal::Terminate), &report(&metrics)).as_i32(),
            143
        );

        metrics.increment_reports_lost();
        assert_eq!(ExitCode::for_run(None, &report(&metrics)), ExitCode::Unreported);
    }
}
