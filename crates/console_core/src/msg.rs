use std::time::Instant;

use crate::{ActionKind, CommandId, PollSeq, RemoteFailure};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Operator edited the company list (raw, comma or newline separated).
    CompaniesEdited(String),
    /// Operator changed the download directory passed to `init`.
    DownloadDirEdited(String),
    /// Restore previously saved operator preferences.
    RestorePreferences {
        download_dir: Option<String>,
        companies: Option<String>,
    },
    /// Operator asked for an action.
    ActionRequested { action: ActionKind, at: Instant },
    /// The poller started status query `seq`.
    PollIssued { seq: PollSeq },
    /// Status query `seq` returned a body.
    PollSucceeded {
        seq: PollSeq,
        status: String,
        logs: Vec<String>,
    },
    /// Status query `seq` failed.
    PollFailed { seq: PollSeq, failure: RemoteFailure },
    /// A command sent via `Effect::SendCommand` resolved.
    CommandFinished {
        id: CommandId,
        action: ActionKind,
        result: Result<(), RemoteFailure>,
    },
    /// Wall-clock tick used to expire stale in-flight commands.
    Tick(Instant),
    /// Fallback for placeholder wiring.
    NoOp,
}
