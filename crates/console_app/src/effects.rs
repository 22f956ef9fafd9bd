use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use console_core::{ActionKind, Effect, ErrorKind, Msg, RemoteCommand, RemoteFailure};
use console_engine::{
    ClientError, ClientSettings, EngineEvent, EngineHandle, JobCommand, PollerSettings,
    ReqwestJobClient,
};
use console_logging::{console_debug, console_info};

use crate::persistence::{save_preferences, Preferences};

/// Executes core effects against the engine and the preferences file, and
/// turns engine events back into core messages.
pub struct EffectRunner {
    engine: EngineHandle,
    preferences_path: PathBuf,
    /// Outcomes decided locally, delivered ahead of engine events.
    local: Vec<Msg>,
}

impl EffectRunner {
    pub fn new(
        client: ClientSettings,
        poller: PollerSettings,
        preferences_path: PathBuf,
    ) -> Result<Self> {
        let client = ReqwestJobClient::new(client).context("failed to build HTTP client")?;
        console_info!("Talking to job service at {}", client.base_url());
        let engine =
            EngineHandle::new(Arc::new(client), poller).context("failed to start engine")?;
        Ok(Self {
            engine,
            preferences_path,
            local: Vec::new(),
        })
    }

    pub fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SendCommand { id, command } => {
                    let command = to_job_command(command);
                    console_debug!("SendCommand /{} #{}", command.endpoint(), id);
                    if let Err(err) = self.engine.send(id, command) {
                        self.local.push(Msg::CommandFinished {
                            id,
                            action: command_action(&err.0),
                            result: Err(RemoteFailure::transport(err.to_string())),
                        });
                    }
                }
                Effect::SavePreferences {
                    download_dir,
                    companies,
                } => {
                    let prefs = Preferences {
                        download_dir: Some(download_dir),
                        companies: Some(companies),
                    };
                    save_preferences(&self.preferences_path, &prefs);
                }
            }
        }
    }

    /// Everything reported since the last call, in arrival order.
    pub fn drain_events(&mut self) -> Vec<Msg> {
        let mut msgs = std::mem::take(&mut self.local);
        msgs.extend(std::iter::from_fn(|| self.engine.try_recv()).map(event_to_msg));
        msgs
    }

    pub fn shutdown(&mut self) {
        self.engine.shutdown();
    }
}

fn to_job_command(command: RemoteCommand) -> JobCommand {
    match command {
        RemoteCommand::Init { download_dir } => JobCommand::Init { download_dir },
        RemoteCommand::ConfirmLogin => JobCommand::ConfirmLogin,
        RemoteCommand::Process { companies } => JobCommand::Process { companies },
        RemoteCommand::Stop => JobCommand::Stop,
    }
}

fn command_action(command: &JobCommand) -> ActionKind {
    match command {
        JobCommand::Init { .. } => ActionKind::Init,
        JobCommand::ConfirmLogin => ActionKind::ConfirmLogin,
        JobCommand::Process { .. } => ActionKind::Process,
        JobCommand::Stop => ActionKind::Stop,
    }
}

fn to_failure(err: ClientError) -> RemoteFailure {
    let kind = if err.kind.is_transport() {
        ErrorKind::Transport
    } else {
        ErrorKind::MalformedResponse
    };
    RemoteFailure::new(kind, err.to_string())
}

fn event_to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::PollIssued { seq } => Msg::PollIssued { seq },
        EngineEvent::PollCompleted { seq, result } => match result {
            Ok(report) => Msg::PollSucceeded {
                seq,
                status: report.status,
                logs: report.logs,
            },
            Err(err) => Msg::PollFailed {
                seq,
                failure: to_failure(err),
            },
        },
        EngineEvent::CommandCompleted {
            id,
            command,
            result,
        } => Msg::CommandFinished {
            id,
            action: command_action(&command),
            result: result.map_err(to_failure),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use console_engine::{FailureKind, StatusReport};
    use pretty_assertions::assert_eq;

    #[test]
    fn send_after_engine_stop_reports_a_failed_command() {
        let temp = tempfile::tempdir().unwrap();
        let mut runner = EffectRunner::new(
            ClientSettings {
                base_url: "http://127.0.0.1:9".to_string(),
                ..ClientSettings::default()
            },
            PollerSettings::default(),
            temp.path().join("prefs.ron"),
        )
        .unwrap();
        runner.shutdown();

        runner.run(vec![Effect::SendCommand {
            id: 5,
            command: RemoteCommand::Stop,
        }]);

        let finished: Vec<Msg> = runner
            .drain_events()
            .into_iter()
            .filter(|msg| matches!(msg, Msg::CommandFinished { .. }))
            .collect();
        match finished.as_slice() {
            [Msg::CommandFinished {
                id: 5,
                action: ActionKind::Stop,
                result: Err(failure),
            }] => assert_eq!(failure.kind, ErrorKind::Transport),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn commands_keep_their_payload() {
        assert_eq!(
            to_job_command(RemoteCommand::Process {
                companies: vec!["Apple".to_string(), "Nvidia".to_string()],
            }),
            JobCommand::Process {
                companies: vec!["Apple".to_string(), "Nvidia".to_string()],
            }
        );
        assert_eq!(
            to_job_command(RemoteCommand::Init {
                download_dir: "downloads".to_string(),
            }),
            JobCommand::Init {
                download_dir: "downloads".to_string(),
            }
        );
    }

    #[test]
    fn poll_results_become_session_messages() {
        let msg = event_to_msg(EngineEvent::PollCompleted {
            seq: 4,
            result: Ok(StatusReport {
                status: "ready".to_string(),
                logs: vec!["line".to_string()],
            }),
        });
        assert_eq!(
            msg,
            Msg::PollSucceeded {
                seq: 4,
                status: "ready".to_string(),
                logs: vec!["line".to_string()],
            }
        );
    }

    #[test]
    fn oversized_bodies_are_malformed_not_transport() {
        let failure = to_failure(ClientError {
            kind: FailureKind::TooLarge {
                max_bytes: 16,
                actual: Some(64),
            },
            message: "status body too large".to_string(),
        });
        assert_eq!(failure.kind, ErrorKind::MalformedResponse);

        let failure = to_failure(ClientError {
            kind: FailureKind::HttpStatus(503),
            message: "503 Service Unavailable".to_string(),
        });
        assert_eq!(failure.kind, ErrorKind::Transport);
    }

    #[test]
    fn unparseable_bodies_are_malformed_not_transport() {
        let msg = event_to_msg(EngineEvent::PollCompleted {
            seq: 2,
            result: Err(ClientError {
                kind: FailureKind::MalformedResponse,
                message: "missing field `status`".to_string(),
            }),
        });
        match msg {
            Msg::PollFailed { seq, failure } => {
                assert_eq!(seq, 2);
                assert_eq!(failure.kind, ErrorKind::MalformedResponse);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn command_failures_carry_the_action() {
        let msg = event_to_msg(EngineEvent::CommandCompleted {
            id: 3,
            command: JobCommand::Stop,
            result: Err(ClientError {
                kind: FailureKind::Timeout,
                message: "request timed out".to_string(),
            }),
        });
        match msg {
            Msg::CommandFinished {
                id,
                action,
                result: Err(failure),
            } => {
                assert_eq!(id, 3);
                assert_eq!(action, ActionKind::Stop);
                assert_eq!(failure.kind, ErrorKind::Transport);
                assert!(failure.detail.contains("timeout"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
