use crate::{ActionKind, CommandId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send a command to the remote service. Its outcome comes back as
    /// `Msg::CommandFinished`.
    SendCommand { id: CommandId, command: RemoteCommand },
    /// Operator preferences changed and should be written to disk.
    SavePreferences {
        download_dir: String,
        companies: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCommand {
    Init { download_dir: String },
    ConfirmLogin,
    /// Companies are already trimmed and non-empty.
    Process { companies: Vec<String> },
    Stop,
}

impl RemoteCommand {
    pub fn action(&self) -> ActionKind {
        match self {
            RemoteCommand::Init { .. } => ActionKind::Init,
            RemoteCommand::ConfirmLogin => ActionKind::ConfirmLogin,
            RemoteCommand::Process { .. } => ActionKind::Process,
            RemoteCommand::Stop => ActionKind::Stop,
        }
    }
}
