use std::fmt;
use std::str::FromStr;

/// Lifecycle of the remote job, exactly as last reported by `/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum JobState {
    #[default]
    Idle,
    Launching,
    LoginPending,
    Ready,
    Processing,
    Error,
}

impl JobState {
    pub const ALL: [JobState; 6] = [
        JobState::Idle,
        JobState::Launching,
        JobState::LoginPending,
        JobState::Ready,
        JobState::Processing,
        JobState::Error,
    ];

    /// Wire name used by the remote service.
    pub fn as_str(self) -> &'static str {
        match self {
            JobState::Idle => "idle",
            JobState::Launching => "launching",
            JobState::LoginPending => "login_pending",
            JobState::Ready => "ready",
            JobState::Processing => "processing",
            JobState::Error => "error",
        }
    }

    /// Human-facing label, e.g. `login pending`.
    pub fn label(self) -> &'static str {
        match self {
            JobState::LoginPending => "login pending",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobState {
    type Err = UnknownState;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        JobState::ALL
            .into_iter()
            .find(|state| state.as_str() == raw)
            .ok_or_else(|| UnknownState(raw.to_string()))
    }
}

/// A status string the console does not recognise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownState(pub String);

impl fmt::Display for UnknownState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown job state {:?}", self.0)
    }
}

impl std::error::Error for UnknownState {}
