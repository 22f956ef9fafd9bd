use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use console_logging::{console_debug, console_info, console_warn};
use tokio::sync::mpsc as async_mpsc;
use tokio::sync::mpsc::error::SendError;

use crate::client::send_command;
use crate::poller::{ChannelEventSink, EventSink, PollerSettings, StatusPoller};
use crate::{CommandId, EngineEvent, EngineStopped, JobCommand, RemoteJobClient};

enum EngineCommand {
    Send(CommandId, JobCommand),
    Shutdown,
}

/// Runs the poller and command dispatch on a single-threaded tokio runtime
/// owned by a background thread. Results come back as [`EngineEvent`]s.
pub struct EngineHandle {
    cmd_tx: async_mpsc::UnboundedSender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    worker: Option<thread::JoinHandle<()>>,
}

impl EngineHandle {
    pub fn new(client: Arc<dyn RemoteJobClient>, poller: PollerSettings) -> io::Result<Self> {
        let (cmd_tx, cmd_rx) = async_mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel();
        let sink: Arc<dyn EventSink> = Arc::new(ChannelEventSink::new(event_tx));

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let worker = thread::Builder::new()
            .name("console-engine".to_string())
            .spawn(move || {
                runtime.block_on(run(client, poller, sink, cmd_rx));
                // Commands still waiting on a hung service are dropped here.
                runtime.shutdown_timeout(Duration::from_millis(500));
            })?;

        Ok(Self {
            cmd_tx,
            event_rx,
            worker: Some(worker),
        })
    }

    /// Fire-and-forget: the outcome arrives as `EngineEvent::CommandCompleted`
    /// carrying `id`. Fails only when the engine thread has stopped.
    pub fn send(&self, id: CommandId, command: JobCommand) -> Result<(), EngineStopped> {
        if let Err(SendError(EngineCommand::Send(_, command))) =
            self.cmd_tx.send(EngineCommand::Send(id, command))
        {
            console_warn!("Engine stopped; dropping /{} #{}", command.endpoint(), id);
            return Err(EngineStopped(command));
        }
        Ok(())
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    /// Stops polling and waits for the background thread. Idempotent.
    pub fn shutdown(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
        if worker.join().is_err() {
            console_warn!("Engine thread panicked during shutdown");
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn run(
    client: Arc<dyn RemoteJobClient>,
    poller_settings: PollerSettings,
    sink: Arc<dyn EventSink>,
    mut cmd_rx: async_mpsc::UnboundedReceiver<EngineCommand>,
) {
    console_info!(
        "Engine started; polling every {:?}",
        poller_settings.interval
    );
    let poller = StatusPoller::spawn(client.clone(), poller_settings, sink.clone());

    while let Some(command) = cmd_rx.recv().await {
        match command {
            EngineCommand::Send(id, command) => {
                let client = client.clone();
                let sink = sink.clone();
                tokio::spawn(async move {
                    handle_command(client.as_ref(), id, command, sink.as_ref()).await;
                });
            }
            EngineCommand::Shutdown => break,
        }
    }

    let stats = poller.shutdown().await;
    console_info!(
        "Engine stopped; {} status queries issued, {} ticks skipped",
        stats.issued,
        stats.skipped_ticks
    );
}

async fn handle_command(
    client: &dyn RemoteJobClient,
    id: CommandId,
    command: JobCommand,
    sink: &dyn EventSink,
) {
    console_debug!("Sending /{} #{}", command.endpoint(), id);
    let result = send_command(client, &command).await;
    if let Err(err) = &result {
        console_warn!("/{} #{} failed: {}", command.endpoint(), id, err);
    }
    sink.emit(EngineEvent::CommandCompleted {
        id,
        command,
        result,
    });
}
