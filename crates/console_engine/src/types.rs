use std::fmt;

use thiserror::Error;

/// Issue-order stamp of a status query, starting at 1.
pub type PollSeq = u64;

/// Caller-chosen tag echoed back with the command's completion.
pub type CommandId = u64;

/// Body of `GET /status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    /// Raw state name; interpreting it is the session's job.
    pub status: String,
    pub logs: Vec<String>,
}

/// Commands accepted by the remote job service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobCommand {
    Init { download_dir: String },
    ConfirmLogin,
    Process { companies: Vec<String> },
    Stop,
}

impl JobCommand {
    pub fn endpoint(&self) -> &'static str {
        match self {
            JobCommand::Init { .. } => "init",
            JobCommand::ConfirmLogin => "confirm-login",
            JobCommand::Process { .. } => "process",
            JobCommand::Stop => "stop",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    PollIssued {
        seq: PollSeq,
    },
    PollCompleted {
        seq: PollSeq,
        result: Result<StatusReport, ClientError>,
    },
    CommandCompleted {
        id: CommandId,
        command: JobCommand,
        result: Result<(), ClientError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ClientError {
    pub kind: FailureKind,
    pub message: String,
}

impl ClientError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// The engine thread is gone; nothing sent now will be executed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("engine is not running; {} was not sent", .0.endpoint())]
pub struct EngineStopped(pub JobCommand);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    MalformedResponse,
    Network,
}

impl FailureKind {
    /// Network-level failures, as opposed to a reply we could not understand.
    pub fn is_transport(&self) -> bool {
        !matches!(
            self,
            FailureKind::MalformedResponse | FailureKind::TooLarge { .. }
        )
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::MalformedResponse => write!(f, "malformed response"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
