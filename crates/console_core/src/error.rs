use std::fmt;

use crate::ActionKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unreachable service, timeout or non-2xx status.
    Transport,
    /// Body did not have the expected shape.
    MalformedResponse,
    /// Action requested while the gate had it disabled.
    IllegalAction,
    /// `/status` reported a state this console does not know.
    UnknownState,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Transport => write!(f, "transport error"),
            ErrorKind::MalformedResponse => write!(f, "malformed response"),
            ErrorKind::IllegalAction => write!(f, "illegal action"),
            ErrorKind::UnknownState => write!(f, "unknown state"),
        }
    }
}

/// A failed exchange with the remote service, as the session sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFailure {
    pub kind: ErrorKind,
    pub detail: String,
}

impl RemoteFailure {
    pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn transport(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transport, detail)
    }
}

impl fmt::Display for RemoteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.detail)
    }
}

/// An operator command the remote service did not accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFailure {
    pub action: ActionKind,
    pub failure: RemoteFailure,
}

impl fmt::Display for CommandFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed ({})", self.action, self.failure)
    }
}
