use console_core::{ActionKind, CommandFailure, EnabledActions, SessionView};

pub const HELP: &str = "\
Commands:
  init                 launch the browser session (alias: launch)
  login                confirm the manual login (alias: confirm)
  process [list]       submit companies, comma separated; no list reuses the saved one
  companies <list>     edit the company list without submitting it
  stop                 stop the job
  dir <path>           download directory sent with init
  logs                 show the full log, most recent first
  status               show the current status line
  help                 show this help
  quit                 leave the console (the remote job keeps running)";

/// Word the operator types to request `action`.
pub fn command_name(action: ActionKind) -> &'static str {
    match action {
        ActionKind::Init => "init",
        ActionKind::ConfirmLogin => "login",
        ActionKind::Process => "process",
        ActionKind::Stop => "stop",
    }
}

pub fn action_list(actions: &EnabledActions) -> String {
    if actions.is_empty() {
        return "none".to_string();
    }
    actions
        .iter()
        .map(command_name)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn status_line(view: &SessionView) -> String {
    let mut line = format!(
        "State: {} | Actions: {}",
        view.state.label(),
        action_list(&view.enabled_actions)
    );
    if !view.pending_actions.is_empty() {
        let pending: Vec<&str> = view.pending_actions.iter().copied().map(command_name).collect();
        line.push_str(&format!(" | Waiting: {}", pending.join(", ")));
    }
    if let Some(err) = &view.last_poll_error {
        line.push_str(&format!(" | Status unavailable ({err})"));
    }
    line
}

pub fn log_line(timestamp: &str, line: &str) -> String {
    format!("{timestamp}  {line}")
}

pub fn command_failure(failure: &CommandFailure) -> String {
    format!("! {failure}")
}

pub fn rejected(action: ActionKind, view: &SessionView) -> String {
    format!(
        "! {} is not available while {} (available: {})",
        command_name(action),
        view.state.label(),
        action_list(&view.enabled_actions)
    )
}
