use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Local;
use console_core::{update, ActionKind, CommandFailure, Effect, Msg, SessionState, SessionView};
use console_logging::{console_info, console_warn};

use crate::config::ConsoleConfig;
use crate::effects::EffectRunner;
use crate::input::{parse_line, ConsoleInput};
use crate::persistence::load_preferences;
use crate::render;

/// How long the loop waits for operator input before handling engine
/// events and the command-timeout tick again.
const INPUT_WAIT: Duration = Duration::from_millis(50);

pub fn run_app(config: ConsoleConfig) -> Result<()> {
    if let Some(path) = &config.config_path {
        console_info!("Using config file {:?}", path);
    }
    let prefs = load_preferences(&config.preferences_path);
    let mut runner = EffectRunner::new(config.client, config.poller, config.preferences_path)?;
    let mut console = Console::new(SessionState::new(config.session), io::stdout());

    let restore = Msg::RestorePreferences {
        download_dir: if config.download_dir_pinned {
            None
        } else {
            prefs.download_dir
        },
        companies: prefs.companies,
    };
    runner.run(console.dispatch(restore)?);
    console.greet()?;

    let input = spawn_input_reader().context("failed to start input reader")?;
    loop {
        for msg in runner.drain_events() {
            runner.run(console.dispatch(msg)?);
        }

        match input.recv_timeout(INPUT_WAIT) {
            Ok(line) => match console.handle_input(parse_line(&line))? {
                Flow::Continue(effects) => runner.run(effects),
                Flow::Quit => break,
            },
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                console_info!("Input closed");
                break;
            }
        }

        runner.run(console.dispatch(Msg::Tick(Instant::now()))?);
    }

    runner.shutdown();
    console_info!("Console closed; the remote job keeps its current state");
    Ok(())
}

fn spawn_input_reader() -> io::Result<mpsc::Receiver<String>> {
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("console-input".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        console_warn!("Failed to read input: {}", err);
                        break;
                    }
                }
            }
        })?;
    Ok(rx)
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue(Vec<Effect>),
    Quit,
}

/// Owns the session state and writes everything the operator sees.
struct Console<W: Write> {
    state: SessionState,
    out: W,
    last_status: Option<String>,
    last_command_error: Option<CommandFailure>,
}

impl<W: Write> Console<W> {
    fn new(state: SessionState, out: W) -> Self {
        Self {
            state,
            out,
            last_status: None,
            last_command_error: None,
        }
    }

    fn greet(&mut self) -> io::Result<()> {
        writeln!(self.out, "Research console. Type `help` for commands.")?;
        let view = self.state.view();
        self.print_status(&view, true)
    }

    fn dispatch(&mut self, msg: Msg) -> io::Result<Vec<Effect>> {
        let requested = match &msg {
            Msg::ActionRequested { action, .. } => Some(*action),
            _ => None,
        };
        let enabled_before = self.state.enabled_actions();

        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        let view = self.state.view();
        let was_dirty = self.state.consume_dirty();

        if let Some(action) = requested.filter(|_| effects.is_empty()) {
            if !enabled_before.contains(action) {
                writeln!(self.out, "{}", render::rejected(action, &view))?;
            } else if action == ActionKind::Process {
                writeln!(
                    self.out,
                    "! no companies to process; use `process <list>`"
                )?;
            }
        }
        if was_dirty {
            self.render(&view)?;
        }
        Ok(effects)
    }

    fn render(&mut self, view: &SessionView) -> io::Result<()> {
        let timestamp = Local::now().format("%H:%M:%S").to_string();
        for line in &view.new_logs {
            writeln!(self.out, "{}", render::log_line(&timestamp, line))?;
        }
        if view.last_command_error != self.last_command_error {
            if let Some(failure) = &view.last_command_error {
                writeln!(self.out, "{}", render::command_failure(failure))?;
            }
            self.last_command_error = view.last_command_error.clone();
        }
        self.print_status(view, false)
    }

    fn print_status(&mut self, view: &SessionView, force: bool) -> io::Result<()> {
        let status = render::status_line(view);
        if force || self.last_status.as_deref() != Some(status.as_str()) {
            writeln!(self.out, "-- {status}")?;
            self.last_status = Some(status);
        }
        Ok(())
    }

    fn handle_input(&mut self, input: ConsoleInput) -> io::Result<Flow> {
        let effects = match input {
            ConsoleInput::Action(action) => self.request(action)?,
            ConsoleInput::ProcessWith(list) => {
                let mut effects = self.dispatch(Msg::CompaniesEdited(list))?;
                effects.extend(self.request(ActionKind::Process)?);
                effects
            }
            ConsoleInput::SetCompanies(list) => self.dispatch(Msg::CompaniesEdited(list))?,
            ConsoleInput::SetDownloadDir(dir) => {
                let effects = self.dispatch(Msg::DownloadDirEdited(dir))?;
                writeln!(
                    self.out,
                    "Download directory: {}",
                    self.state.download_dir()
                )?;
                effects
            }
            ConsoleInput::ShowLogs => {
                let view = self.state.view();
                if view.display_logs.is_empty() {
                    writeln!(self.out, "(no log lines yet)")?;
                }
                for line in &view.display_logs {
                    writeln!(self.out, "{line}")?;
                }
                Vec::new()
            }
            ConsoleInput::ShowStatus => {
                let view = self.state.view();
                self.print_status(&view, true)?;
                Vec::new()
            }
            ConsoleInput::Help => {
                writeln!(self.out, "{}", render::HELP)?;
                Vec::new()
            }
            ConsoleInput::Quit => return Ok(Flow::Quit),
            ConsoleInput::Empty => Vec::new(),
            ConsoleInput::Unknown(raw) => {
                writeln!(self.out, "Unknown command `{raw}`; type `help`")?;
                Vec::new()
            }
        };
        Ok(Flow::Continue(effects))
    }

    fn request(&mut self, action: ActionKind) -> io::Result<Vec<Effect>> {
        self.dispatch(Msg::ActionRequested {
            action,
            at: Instant::now(),
        })
    }
}
