//! Operator command line parsing.

use console_core::ActionKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    Action(ActionKind),
    /// `process <list>`: replace the company list, then request processing.
    ProcessWith(String),
    /// `companies <list>`: replace the company list only.
    SetCompanies(String),
    SetDownloadDir(String),
    ShowLogs,
    ShowStatus,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

pub fn parse_line(line: &str) -> ConsoleInput {
    let line = line.trim();
    if line.is_empty() {
        return ConsoleInput::Empty;
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match (word.to_ascii_lowercase().as_str(), rest.is_empty()) {
        ("init" | "launch", true) => ConsoleInput::Action(ActionKind::Init),
        ("login" | "confirm", true) => ConsoleInput::Action(ActionKind::ConfirmLogin),
        ("process", true) => ConsoleInput::Action(ActionKind::Process),
        ("process", false) => ConsoleInput::ProcessWith(rest.to_string()),
        ("companies", _) => ConsoleInput::SetCompanies(rest.to_string()),
        ("stop", true) => ConsoleInput::Action(ActionKind::Stop),
        ("dir", false) => ConsoleInput::SetDownloadDir(rest.to_string()),
        ("logs", true) => ConsoleInput::ShowLogs,
        ("status", true) => ConsoleInput::ShowStatus,
        ("help" | "?", true) => ConsoleInput::Help,
        ("quit" | "exit" | "q", true) => ConsoleInput::Quit,
        _ => ConsoleInput::Unknown(line.to_string()),
    }
}
