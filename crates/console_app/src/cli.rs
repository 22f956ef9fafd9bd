use std::path::PathBuf;

use clap::Parser;

use crate::logging::LogDestination;

#[derive(Parser, Debug, Default)]
#[command(
    name = "research-console",
    version,
    about = "Operator console for a remote research automation job",
    long_about = None
)]
pub struct Cli {
    #[arg(
        short,
        long,
        value_name = "PATH",
        help = "Path to a RON config file. When omitted, ./research-console.ron is used if present."
    )]
    pub config: Option<PathBuf>,
    /// Base URL of the job service, e.g. http://127.0.0.1:8000
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,
    /// Status poll cadence in milliseconds.
    #[arg(long, value_name = "MS")]
    pub poll_interval_ms: Option<u64>,
    /// Upper bound for any single request in milliseconds.
    #[arg(long, value_name = "MS")]
    pub request_timeout_ms: Option<u64>,
    /// Download directory sent with `init`. Overrides saved preferences.
    #[arg(long, value_name = "DIR")]
    pub download_dir: Option<String>,
    /// Allow submitting more companies while a batch is processing.
    #[arg(long)]
    pub allow_additive_process: bool,
    #[arg(long, value_enum)]
    pub log_destination: Option<LogDestination>,
    /// One of off, error, warn, info, debug, trace.
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}
