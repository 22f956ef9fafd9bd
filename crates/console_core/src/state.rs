use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::gate::{enabled_actions, EnabledActions, GatePolicy};
use crate::log_buffer::{LogBuffer, DEFAULT_MAX_LOG_LINES};
use crate::view_model::SessionView;
use crate::{ActionKind, CommandFailure, JobState, RemoteFailure};

/// Issue-order stamp of a status query. Starts at 1.
pub type PollSeq = u64;

/// Identifies one sent command so its completion can be matched to it.
/// Starts at 1.
pub type CommandId = u64;

pub const DEFAULT_DOWNLOAD_DIR: &str = "downloads";
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub gate: GatePolicy,
    pub max_log_lines: usize,
    /// How long an action stays disabled while waiting for confirmation.
    pub command_timeout: Duration,
    pub download_dir: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            gate: GatePolicy::default(),
            max_log_lines: DEFAULT_MAX_LOG_LINES,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            download_dir: DEFAULT_DOWNLOAD_DIR.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PendingCommand {
    id: CommandId,
    issued_at: Instant,
    /// Set once the service accepted the command: the latest poll issued at
    /// that moment. Only a poll newer than this reflects the command.
    confirm_after: Option<PollSeq>,
}

/// Client-side view of the remote job. Mutated only through [`crate::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    job: JobState,
    logs: LogBuffer,
    gate: GatePolicy,
    command_timeout: Duration,
    last_applied_poll: Option<PollSeq>,
    latest_issued_poll: PollSeq,
    last_poll_error: Option<RemoteFailure>,
    last_command_error: Option<CommandFailure>,
    last_rejected_action: Option<ActionKind>,
    pending: BTreeMap<ActionKind, PendingCommand>,
    last_command_id: CommandId,
    companies_input: String,
    download_dir: String,
    dirty: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(SessionSettings::default())
    }
}

impl SessionState {
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            job: JobState::Idle,
            logs: LogBuffer::with_capacity(settings.max_log_lines),
            gate: settings.gate,
            command_timeout: settings.command_timeout,
            last_applied_poll: None,
            latest_issued_poll: 0,
            last_poll_error: None,
            last_command_error: None,
            last_rejected_action: None,
            pending: BTreeMap::new(),
            last_command_id: 0,
            companies_input: String::new(),
            download_dir: settings.download_dir,
            dirty: false,
        }
    }

    pub fn job_state(&self) -> JobState {
        self.job
    }

    /// Gate output minus actions still waiting for confirmation.
    pub fn enabled_actions(&self) -> EnabledActions {
        self.pending
            .keys()
            .fold(enabled_actions(self.job, self.gate), |set, action| {
                set.without(*action)
            })
    }

    pub fn companies_input(&self) -> &str {
        &self.companies_input
    }

    pub fn download_dir(&self) -> &str {
        &self.download_dir
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            state: self.job,
            logs: self.logs.lines().to_vec(),
            display_logs: self.logs.display_order().map(ToOwned::to_owned).collect(),
            new_logs: self.logs.unrendered().to_vec(),
            enabled_actions: self.enabled_actions(),
            pending_actions: self.pending.keys().copied().collect(),
            last_poll_error: self.last_poll_error.clone(),
            last_command_error: self.last_command_error.clone(),
            last_rejected_action: self.last_rejected_action,
            companies_input: self.companies_input.clone(),
            download_dir: self.download_dir.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call and marks the
    /// current log tail as rendered.
    pub fn consume_dirty(&mut self) -> bool {
        self.logs.mark_rendered();
        std::mem::take(&mut self.dirty)
    }

    /// Whether a completed poll is older than one already applied.
    pub(crate) fn is_stale(&self, seq: PollSeq) -> bool {
        self.last_applied_poll.is_some_and(|applied| seq <= applied)
    }

    pub(crate) fn record_poll_issued(&mut self, seq: PollSeq) {
        self.latest_issued_poll = self.latest_issued_poll.max(seq);
    }

    pub(crate) fn apply_snapshot(&mut self, seq: PollSeq, job: JobState, logs: Vec<String>) {
        self.last_applied_poll = Some(seq);
        if self.job != job {
            self.job = job;
            self.dirty = true;
        }
        if self.logs.replace(logs).is_some() {
            self.dirty = true;
        }
        if self.last_poll_error.take().is_some() {
            self.dirty = true;
        }

        let before = self.pending.len();
        self.pending.retain(|_, pending| match pending.confirm_after {
            Some(after) => seq <= after,
            None => true,
        });
        if self.pending.len() != before {
            self.dirty = true;
        }
    }

    pub(crate) fn apply_poll_failure(&mut self, seq: PollSeq, failure: RemoteFailure) {
        self.last_applied_poll = Some(seq);
        if self.last_poll_error.as_ref() != Some(&failure) {
            self.last_poll_error = Some(failure);
            self.dirty = true;
        }
    }

    pub(crate) fn reject(&mut self, action: ActionKind) {
        self.last_rejected_action = Some(action);
        self.dirty = true;
    }

    pub(crate) fn begin_command(&mut self, action: ActionKind, at: Instant) -> CommandId {
        self.last_command_id += 1;
        let id = self.last_command_id;
        self.pending.insert(
            action,
            PendingCommand {
                id,
                issued_at: at,
                confirm_after: None,
            },
        );
        self.last_rejected_action = None;
        if self
            .last_command_error
            .as_ref()
            .is_some_and(|failure| failure.action == action)
        {
            self.last_command_error = None;
        }
        self.dirty = true;
        id
    }

    /// Whether `id` is the in-flight command tagging `action`. A completion
    /// for an older command whose tag already expired does not match.
    pub(crate) fn is_current_command(&self, id: CommandId, action: ActionKind) -> bool {
        self.pending
            .get(&action)
            .is_some_and(|pending| pending.id == id)
    }

    pub(crate) fn command_accepted(&mut self, id: CommandId, action: ActionKind) {
        let latest = self.latest_issued_poll;
        if let Some(pending) = self
            .pending
            .get_mut(&action)
            .filter(|pending| pending.id == id)
        {
            pending.confirm_after = Some(latest);
        }
    }

    pub(crate) fn command_failed(
        &mut self,
        id: CommandId,
        action: ActionKind,
        failure: RemoteFailure,
    ) {
        if !self.is_current_command(id, action) {
            return;
        }
        self.pending.remove(&action);
        self.last_command_error = Some(CommandFailure { action, failure });
        self.dirty = true;
    }

    /// Drops in-flight tags older than the command timeout. Returns them.
    pub(crate) fn expire_pending(&mut self, now: Instant) -> Vec<ActionKind> {
        let timeout = self.command_timeout;
        let expired: Vec<ActionKind> = self
            .pending
            .iter()
            .filter(|(_, pending)| now.saturating_duration_since(pending.issued_at) >= timeout)
            .map(|(action, _)| *action)
            .collect();
        for action in &expired {
            self.pending.remove(action);
        }
        if !expired.is_empty() {
            self.dirty = true;
        }
        expired
    }

    pub(crate) fn set_companies_input(&mut self, raw: String) -> bool {
        if self.companies_input == raw {
            return false;
        }
        self.companies_input = raw;
        self.dirty = true;
        true
    }

    pub(crate) fn set_download_dir(&mut self, dir: String) -> bool {
        if self.download_dir == dir {
            return false;
        }
        self.download_dir = dir;
        self.dirty = true;
        true
    }
}
