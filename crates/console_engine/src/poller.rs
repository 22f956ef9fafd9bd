//! Periodic `/status` polling with a single in-flight query.

use std::sync::Arc;
use std::time::Duration;

use console_logging::{console_debug, console_trace};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::{ClientError, EngineEvent, FailureKind, PollSeq, RemoteJobClient, StatusReport};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct PollerSettings {
    pub interval: Duration,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollerStats {
    pub issued: u64,
    /// Ticks that fired while a query was still outstanding.
    pub skipped_ticks: u64,
}

struct InFlight {
    seq: PollSeq,
    handle: JoinHandle<Result<StatusReport, ClientError>>,
}

/// Owned polling task. Dropping the handle does not stop it; call
/// [`StatusPoller::shutdown`].
pub struct StatusPoller {
    cancel: CancellationToken,
    task: JoinHandle<PollerStats>,
}

impl StatusPoller {
    /// Starts polling on the current tokio runtime. The first query is issued
    /// immediately.
    pub fn spawn(
        client: Arc<dyn RemoteJobClient>,
        settings: PollerSettings,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run(client, settings, sink, cancel.clone()));
        Self { cancel, task }
    }

    /// Cancels the loop, aborts any outstanding query and waits for the task.
    pub async fn shutdown(self) -> PollerStats {
        self.cancel.cancel();
        self.task.await.unwrap_or_default()
    }
}

async fn run(
    client: Arc<dyn RemoteJobClient>,
    settings: PollerSettings,
    sink: Arc<dyn EventSink>,
    cancel: CancellationToken,
) -> PollerStats {
    let mut ticker = tokio::time::interval(settings.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut stats = PollerStats::default();
    let mut in_flight: Option<InFlight> = None;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                if let Some(query) = in_flight.take() {
                    console_debug!("Poller cancelled; aborting status query seq={}", query.seq);
                    query.handle.abort();
                }
                break;
            }
            (seq, result) = wait_for(&mut in_flight) => {
                in_flight = None;
                sink.emit(EngineEvent::PollCompleted { seq, result });
            }
            _ = ticker.tick() => {
                if let Some(query) = &in_flight {
                    stats.skipped_ticks += 1;
                    console_trace!("Skipping poll tick; seq={} still in flight", query.seq);
                    continue;
                }
                stats.issued += 1;
                let seq = stats.issued;
                sink.emit(EngineEvent::PollIssued { seq });
                let client = client.clone();
                in_flight = Some(InFlight {
                    seq,
                    handle: tokio::spawn(async move { client.get_status().await }),
                });
            }
        }
    }

    stats
}

/// Resolves with the outstanding query's result, or never if there is none.
async fn wait_for(slot: &mut Option<InFlight>) -> (PollSeq, Result<StatusReport, ClientError>) {
    let Some(query) = slot else {
        return std::future::pending().await;
    };
    let result = match (&mut query.handle).await {
        Ok(result) => result,
        Err(err) => Err(ClientError::new(
            FailureKind::Network,
            format!("status query did not complete: {err}"),
        )),
    };
    (query.seq, result)
}
