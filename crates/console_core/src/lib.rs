//! Console core: pure session state machine and view-model helpers.
mod effect;
mod error;
mod gate;
mod job;
mod log_buffer;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, RemoteCommand};
pub use error::{CommandFailure, ErrorKind, RemoteFailure};
pub use gate::{enabled_actions, ActionKind, EnabledActions, GatePolicy};
pub use job::{JobState, UnknownState};
pub use log_buffer::{appended_since, LogBuffer, DEFAULT_MAX_LOG_LINES};
pub use msg::Msg;
pub use state::{
    CommandId, PollSeq, SessionSettings, SessionState, DEFAULT_COMMAND_TIMEOUT,
    DEFAULT_DOWNLOAD_DIR,
};
pub use update::{parse_companies, update};
pub use view_model::SessionView;
