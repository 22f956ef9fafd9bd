use crate::{ActionKind, CommandFailure, EnabledActions, JobState, RemoteFailure};

/// Everything the console renders. Rebuilt from [`crate::SessionState`] on demand.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionView {
    pub state: JobState,
    /// Oldest first, as stored.
    pub logs: Vec<String>,
    /// Most recent first.
    pub display_logs: Vec<String>,
    /// Lines not yet rendered, oldest first.
    pub new_logs: Vec<String>,
    pub enabled_actions: EnabledActions,
    /// Actions sent but not yet confirmed by a poll.
    pub pending_actions: Vec<ActionKind>,
    pub last_poll_error: Option<RemoteFailure>,
    pub last_command_error: Option<CommandFailure>,
    pub last_rejected_action: Option<ActionKind>,
    pub companies_input: String,
    pub download_dir: String,
    pub dirty: bool,
}
