use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use console_engine::{
    ClientError, EngineEvent, EventSink, FailureKind, PollerSettings, RemoteJobClient,
    StatusPoller, StatusReport,
};

#[derive(Default)]
struct TestSink {
    events: Mutex<Vec<EngineEvent>>,
}

impl TestSink {
    fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl EventSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

enum Behaviour {
    Slow(Duration),
    Fail,
    Hang(Arc<AtomicBool>),
}

struct FakeClient {
    behaviour: Behaviour,
    calls: AtomicUsize,
    current: AtomicUsize,
    max_concurrent: AtomicUsize,
}

impl FakeClient {
    fn new(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            calls: AtomicUsize::new(0),
            current: AtomicUsize::new(0),
            max_concurrent: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl RemoteJobClient for FakeClient {
    async fn init(&self, _download_dir: &str) -> Result<(), ClientError> {
        Ok(())
    }

    async fn confirm_login(&self) -> Result<(), ClientError> {
        Ok(())
    }

    async fn process(&self, _companies: &[String]) -> Result<(), ClientError> {
        Ok(())
    }

    async fn stop(&self) -> Result<(), ClientError> {
        Ok(())
    }

    async fn get_status(&self) -> Result<StatusReport, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_concurrent.fetch_max(now, Ordering::SeqCst);

        let result = match &self.behaviour {
            Behaviour::Slow(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(StatusReport {
                    status: "processing".to_string(),
                    logs: Vec::new(),
                })
            }
            Behaviour::Fail => Err(ClientError {
                kind: FailureKind::Network,
                message: "connection refused".to_string(),
            }),
            Behaviour::Hang(flag) => {
                let _guard = DropFlag(flag.clone());
                std::future::pending::<()>().await;
                unreachable!()
            }
        };

        self.current.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

fn settings(interval_ms: u64) -> PollerSettings {
    PollerSettings {
        interval: Duration::from_millis(interval_ms),
    }
}

#[tokio::test(start_paused = true)]
async fn slow_queries_skip_ticks_instead_of_overlapping() {
    let client = Arc::new(FakeClient::new(Behaviour::Slow(Duration::from_secs(5))));
    let sink = Arc::new(TestSink::default());

    let poller = StatusPoller::spawn(client.clone(), settings(2_000), sink.clone());
    tokio::time::sleep(Duration::from_millis(11_500)).await;
    let stats = poller.shutdown().await;

    assert_eq!(client.max_concurrent.load(Ordering::SeqCst), 1);
    assert!(stats.skipped_ticks >= 2, "stats: {stats:?}");
    assert_eq!(stats.issued, client.calls.load(Ordering::SeqCst) as u64);

    // Every completion matches the query issued right before it.
    let mut outstanding = None;
    for event in sink.take() {
        match event {
            EngineEvent::PollIssued { seq } => {
                assert!(outstanding.is_none(), "overlapping query seq={seq}");
                outstanding = Some(seq);
            }
            EngineEvent::PollCompleted { seq, result } => {
                assert_eq!(outstanding.take(), Some(seq));
                assert!(result.is_ok());
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
}

#[tokio::test(start_paused = true)]
async fn failures_do_not_stop_polling() {
    let client = Arc::new(FakeClient::new(Behaviour::Fail));
    let sink = Arc::new(TestSink::default());

    let poller = StatusPoller::spawn(client.clone(), settings(100), sink.clone());
    tokio::time::sleep(Duration::from_millis(450)).await;
    let stats = poller.shutdown().await;

    assert!(stats.issued >= 4, "stats: {stats:?}");
    let failures: Vec<_> = sink
        .take()
        .into_iter()
        .filter_map(|event| match event {
            EngineEvent::PollCompleted {
                seq,
                result: Err(err),
            } => Some((seq, err.kind)),
            _ => None,
        })
        .collect();
    assert!(failures.len() >= 4);
    assert!(failures.iter().all(|(_, kind)| *kind == FailureKind::Network));
    let seqs: Vec<_> = failures.iter().map(|(seq, _)| *seq).collect();
    assert!(seqs.windows(2).all(|pair| pair[0] < pair[1]));
}

#[tokio::test(start_paused = true)]
async fn cancellation_aborts_in_flight_query_and_stops_ticks() {
    let aborted = Arc::new(AtomicBool::new(false));
    let client = Arc::new(FakeClient::new(Behaviour::Hang(aborted.clone())));
    let sink = Arc::new(TestSink::default());

    let poller = StatusPoller::spawn(client.clone(), settings(1_000), sink.clone());
    tokio::time::sleep(Duration::from_millis(2_500)).await;
    let stats = poller.shutdown().await;
    assert_eq!(stats.issued, 1);

    let before = sink.take();
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert!(aborted.load(Ordering::SeqCst));
    assert_eq!(before, vec![EngineEvent::PollIssued { seq: 1 }]);
    assert!(sink.take().is_empty());
    assert_eq!(client.calls.load(Ordering::SeqCst), 1);
}
