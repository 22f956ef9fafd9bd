mod app;
mod cli;
mod config;
mod effects;
mod input;
mod logging;
mod persistence;
mod render;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let config = config::load(&cli)?;
    logging::initialize(config.log_destination, config.log_level);
    app::run_app(config)
}
