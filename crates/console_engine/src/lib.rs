//! Console engine: remote job client, status polling and effect execution.
mod client;
mod engine;
mod persist;
mod poller;
mod types;

pub use client::{send_command, ClientSettings, RemoteJobClient, ReqwestJobClient, DEFAULT_BASE_URL};
pub use engine::EngineHandle;
pub use persist::{ensure_dir, write_atomically, PersistError};
pub use poller::{
    ChannelEventSink, EventSink, PollerSettings, PollerStats, StatusPoller, DEFAULT_POLL_INTERVAL,
};
pub use types::{
    ClientError, CommandId, EngineEvent, EngineStopped, FailureKind, JobCommand, PollSeq,
    StatusReport,
};
