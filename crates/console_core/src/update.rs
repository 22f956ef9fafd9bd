use console_logging::{console_debug, console_info, console_warn};

use crate::{ActionKind, Effect, ErrorKind, JobState, Msg, RemoteCommand, RemoteFailure, SessionState};

/// Pure update function: applies a message to state and returns any effects.
///
/// Job state and logs change only on poll results. Operator actions are
/// checked against the gate here, so a disabled action never produces an
/// effect and therefore never reaches the network.
pub fn update(mut state: SessionState, msg: Msg) -> (SessionState, Vec<Effect>) {
    let effects = match msg {
        Msg::CompaniesEdited(raw) => {
            if state.set_companies_input(raw) {
                vec![preferences_effect(&state)]
            } else {
                Vec::new()
            }
        }
        Msg::DownloadDirEdited(raw) => {
            let dir = raw.trim();
            if dir.is_empty() || !state.set_download_dir(dir.to_string()) {
                Vec::new()
            } else {
                vec![preferences_effect(&state)]
            }
        }
        Msg::RestorePreferences {
            download_dir,
            companies,
        } => {
            if let Some(dir) = download_dir.filter(|dir| !dir.trim().is_empty()) {
                state.set_download_dir(dir.trim().to_string());
            }
            if let Some(companies) = companies {
                state.set_companies_input(companies);
            }
            Vec::new()
        }
        Msg::ActionRequested { action, at } => {
            if !state.enabled_actions().contains(action) {
                console_debug!(
                    "Rejected {} while {} (enabled: {:?})",
                    action,
                    state.job_state(),
                    state.enabled_actions()
                );
                state.reject(action);
                return (state, Vec::new());
            }

            let command = match action {
                ActionKind::Init => RemoteCommand::Init {
                    download_dir: state.download_dir().to_string(),
                },
                ActionKind::ConfirmLogin => RemoteCommand::ConfirmLogin,
                ActionKind::Process => {
                    let companies = parse_companies(state.companies_input());
                    if companies.is_empty() {
                        console_debug!("Process requested with an empty company list");
                        return (state, Vec::new());
                    }
                    RemoteCommand::Process { companies }
                }
                ActionKind::Stop => RemoteCommand::Stop,
            };

            let id = state.begin_command(action, at);
            vec![Effect::SendCommand { id, command }]
        }
        Msg::PollIssued { seq } => {
            state.record_poll_issued(seq);
            Vec::new()
        }
        Msg::PollSucceeded { seq, status, logs } => {
            if state.is_stale(seq) {
                console_debug!("Discarding stale poll result seq={}", seq);
                return (state, Vec::new());
            }
            match status.parse::<JobState>() {
                Ok(job) => {
                    if job != state.job_state() {
                        console_info!("Job state {} -> {}", state.job_state(), job);
                    }
                    state.apply_snapshot(seq, job, logs);
                }
                Err(unknown) => {
                    console_warn!("Ignoring poll seq={}: {}", seq, unknown);
                    state.apply_poll_failure(
                        seq,
                        RemoteFailure::new(ErrorKind::UnknownState, unknown.0),
                    );
                }
            }
            Vec::new()
        }
        Msg::PollFailed { seq, failure } => {
            if state.is_stale(seq) {
                console_debug!("Discarding stale poll failure seq={}", seq);
                return (state, Vec::new());
            }
            console_debug!("Poll seq={} failed: {}", seq, failure);
            state.apply_poll_failure(seq, failure);
            Vec::new()
        }
        Msg::CommandFinished { id, action, result } => {
            if !state.is_current_command(id, action) {
                match &result {
                    Ok(()) => console_debug!("Ignoring late completion of {} #{}", action, id),
                    Err(failure) => console_warn!(
                        "Earlier {} #{} failed after its tag expired: {}",
                        action,
                        id,
                        failure
                    ),
                }
                return (state, Vec::new());
            }
            match result {
                Ok(()) => state.command_accepted(id, action),
                Err(failure) => {
                    console_warn!("Command {} #{} failed: {}", action, id, failure);
                    state.command_failed(id, action, failure);
                }
            }
            Vec::new()
        }
        Msg::Tick(now) => {
            for action in state.expire_pending(now) {
                console_warn!("No confirmation for {} before timeout; re-enabling", action);
            }
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

/// Normalizes operator input into a company request: split on commas and
/// newlines, trim, drop empties. Duplicates are kept.
pub fn parse_companies(raw: &str) -> Vec<String> {
    raw.split([',', '\n'])
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

fn preferences_effect(state: &SessionState) -> Effect {
    Effect::SavePreferences {
        download_dir: state.download_dir().to_string(),
        companies: state.companies_input().to_string(),
    }
}
