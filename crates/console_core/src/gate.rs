//! ActionGate: which operator actions are legal in which job state.

use std::fmt;

use crate::JobState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionKind {
    Init,
    ConfirmLogin,
    Process,
    Stop,
}

impl ActionKind {
    pub const ALL: [ActionKind; 4] = [
        ActionKind::Init,
        ActionKind::ConfirmLogin,
        ActionKind::Process,
        ActionKind::Stop,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Init => "init",
            ActionKind::ConfirmLogin => "confirm_login",
            ActionKind::Process => "process",
            ActionKind::Stop => "stop",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Knobs for behaviour the remote service's tolerance is unknown for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GatePolicy {
    /// Allow submitting more companies while a batch is already processing.
    pub allow_additive_process: bool,
}

/// Small copyable set of [`ActionKind`]s.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct EnabledActions {
    bits: u8,
}

impl EnabledActions {
    pub const fn none() -> Self {
        Self { bits: 0 }
    }

    #[must_use]
    pub fn with(self, action: ActionKind) -> Self {
        Self {
            bits: self.bits | action.bit(),
        }
    }

    #[must_use]
    pub fn without(self, action: ActionKind) -> Self {
        Self {
            bits: self.bits & !action.bit(),
        }
    }

    pub fn contains(&self, action: ActionKind) -> bool {
        self.bits & action.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Iterates in declaration order of [`ActionKind`].
    pub fn iter(&self) -> impl Iterator<Item = ActionKind> + '_ {
        ActionKind::ALL
            .into_iter()
            .filter(move |action| self.contains(*action))
    }
}

impl FromIterator<ActionKind> for EnabledActions {
    fn from_iter<I: IntoIterator<Item = ActionKind>>(iter: I) -> Self {
        iter.into_iter()
            .fold(EnabledActions::none(), EnabledActions::with)
    }
}

impl fmt::Debug for EnabledActions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Total, pure mapping from job state to the actions an operator may take.
///
/// `Stop` is available in every state that has a job behind it, i.e. all but
/// `Idle`.
pub fn enabled_actions(state: JobState, policy: GatePolicy) -> EnabledActions {
    let base = match state {
        JobState::Idle | JobState::Error => EnabledActions::none().with(ActionKind::Init),
        JobState::Launching => EnabledActions::none(),
        JobState::LoginPending => EnabledActions::none().with(ActionKind::ConfirmLogin),
        JobState::Ready => EnabledActions::none().with(ActionKind::Process),
        JobState::Processing if policy.allow_additive_process => {
            EnabledActions::none().with(ActionKind::Process)
        }
        JobState::Processing => EnabledActions::none(),
    };

    if state == JobState::Idle {
        base
    } else {
        base.with(ActionKind::Stop)
    }
}
