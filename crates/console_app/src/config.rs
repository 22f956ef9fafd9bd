use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use console_core::{GatePolicy, SessionSettings};
use console_engine::{ClientSettings, PollerSettings};
use log::LevelFilter;
use serde::Deserialize;

use crate::cli::Cli;
use crate::logging::LogDestination;
use crate::persistence::PREFERENCES_FILENAME;

const CONFIG_FILE_NAME: &str = "research-console.ron";

/// Optional settings read from the RON config file. Every field may be
/// omitted; CLI flags take precedence.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    base_url: Option<String>,
    poll_interval_ms: Option<u64>,
    request_timeout_ms: Option<u64>,
    connect_timeout_ms: Option<u64>,
    command_timeout_ms: Option<u64>,
    max_log_lines: Option<usize>,
    max_body_bytes: Option<u64>,
    download_dir: Option<String>,
    allow_additive_process: Option<bool>,
    log_destination: Option<LogDestination>,
    log_level: Option<String>,
    preferences_path: Option<PathBuf>,
}

#[derive(Debug)]
pub struct ConsoleConfig {
    pub client: ClientSettings,
    pub poller: PollerSettings,
    pub session: SessionSettings,
    pub log_destination: LogDestination,
    pub log_level: LevelFilter,
    pub preferences_path: PathBuf,
    /// The download directory was given on the command line and wins over
    /// saved preferences.
    pub download_dir_pinned: bool,
    pub config_path: Option<PathBuf>,
}

pub fn load(cli: &Cli) -> Result<ConsoleConfig> {
    let required = cli.config.is_some();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
    let file_config = read_config_file(&config_path, required)?;
    let config_path = config_path.exists().then_some(config_path);
    resolve(cli, file_config, config_path)
}

fn resolve(cli: &Cli, file: FileConfig, config_path: Option<PathBuf>) -> Result<ConsoleConfig> {
    let client_defaults = ClientSettings::default();
    let session_defaults = SessionSettings::default();

    let poll_interval_ms = cli
        .poll_interval_ms
        .or(file.poll_interval_ms)
        .unwrap_or(PollerSettings::default().interval.as_millis() as u64);
    anyhow::ensure!(poll_interval_ms > 0, "poll interval must be greater than zero");

    let request_timeout = cli
        .request_timeout_ms
        .or(file.request_timeout_ms)
        .map(Duration::from_millis)
        .unwrap_or(client_defaults.request_timeout);
    anyhow::ensure!(
        !request_timeout.is_zero(),
        "request timeout must be greater than zero"
    );

    let client = ClientSettings {
        base_url: cli
            .base_url
            .clone()
            .or(file.base_url)
            .unwrap_or(client_defaults.base_url),
        connect_timeout: file
            .connect_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(client_defaults.connect_timeout),
        request_timeout,
        max_body_bytes: file.max_body_bytes.unwrap_or(client_defaults.max_body_bytes),
    };

    let session = SessionSettings {
        gate: GatePolicy {
            allow_additive_process: cli.allow_additive_process
                || file.allow_additive_process.unwrap_or(false),
        },
        max_log_lines: file.max_log_lines.unwrap_or(session_defaults.max_log_lines),
        command_timeout: file
            .command_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(session_defaults.command_timeout),
        download_dir: cli
            .download_dir
            .clone()
            .or(file.download_dir)
            .unwrap_or(session_defaults.download_dir),
    };
    anyhow::ensure!(
        session.command_timeout > request_timeout,
        "command timeout ({:?}) must exceed the request timeout ({:?})",
        session.command_timeout,
        request_timeout
    );

    let log_level = cli
        .log_level
        .as_deref()
        .or(file.log_level.as_deref())
        .map(console_logging::parse_level)
        .unwrap_or(LevelFilter::Info);

    Ok(ConsoleConfig {
        client,
        poller: PollerSettings {
            interval: Duration::from_millis(poll_interval_ms),
        },
        session,
        log_destination: cli
            .log_destination
            .or(file.log_destination)
            .unwrap_or_default(),
        log_level,
        preferences_path: file
            .preferences_path
            .unwrap_or_else(|| PathBuf::from(PREFERENCES_FILENAME)),
        download_dir_pinned: cli.download_dir.is_some(),
        config_path,
    })
}

fn read_config_file(path: &Path, required: bool) -> Result<FileConfig> {
    if !path.exists() {
        if required {
            anyhow::bail!("config file not found at {}", path.display());
        }
        return Ok(FileConfig::default());
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    parse(&contents).with_context(|| format!("failed to parse config file {}", path.display()))
}

fn parse(contents: &str) -> Result<FileConfig> {
    let options =
        ron::Options::default().with_default_extension(ron::extensions::Extensions::IMPLICIT_SOME);
    Ok(options.from_str(contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_without_file_or_flags() {
        let config = resolve(&Cli::default(), FileConfig::default(), None).unwrap();

        assert_eq!(config.client.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.poller.interval, Duration::from_secs(2));
        assert_eq!(config.client.request_timeout, Duration::from_secs(5));
        assert_eq!(config.session.download_dir, "downloads");
        assert!(!config.session.gate.allow_additive_process);
        assert_eq!(config.log_destination, LogDestination::File);
        assert_eq!(config.log_level, LevelFilter::Info);
        assert!(!config.download_dir_pinned);
    }

    #[test]
    fn file_values_apply_and_flags_win() {
        let file = parse(
            r#"(
                base_url: "http://file:8000",
                poll_interval_ms: 750,
                download_dir: "from-file",
                allow_additive_process: true,
                log_destination: both,
            )"#,
        )
        .unwrap();
        let cli = Cli {
            base_url: Some("http://cli:9000".to_string()),
            ..Cli::default()
        };

        let config = resolve(&cli, file, None).unwrap();

        assert_eq!(config.client.base_url, "http://cli:9000");
        assert_eq!(config.poller.interval, Duration::from_millis(750));
        assert_eq!(config.session.download_dir, "from-file");
        assert!(config.session.gate.allow_additive_process);
        assert_eq!(config.log_destination, LogDestination::Both);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let cli = Cli {
            poll_interval_ms: Some(0),
            ..Cli::default()
        };
        assert!(resolve(&cli, FileConfig::default(), None).is_err());
    }

    #[test]
    fn command_timeout_must_outlast_requests() {
        let cli = Cli {
            request_timeout_ms: Some(30_000),
            ..Cli::default()
        };
        assert!(resolve(&cli, FileConfig::default(), None).is_err());

        let file = parse("(command_timeout_ms: 45000)").unwrap();
        let config = resolve(&cli, file, None).unwrap();
        assert_eq!(config.session.command_timeout, Duration::from_secs(45));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(parse("(poll_every: 3)").is_err());
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.ron");
        assert!(read_config_file(&path, true).is_err());
        assert!(read_config_file(&path, false).is_ok());
    }
}
