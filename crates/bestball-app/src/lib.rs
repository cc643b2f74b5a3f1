// Library root for the bestball command-line app: CSV loading, command
// dispatch and report rendering. The binary in main.rs is a thin wrapper.

pub mod cli;
pub mod commands;
pub mod data;

use anyhow::Context;
use tracing::debug;

use bestball_core::config;

use crate::cli::Cli;

/// Load config and contest data, run the parsed command and return its
/// rendered output.
pub fn run(cli: &Cli) -> anyhow::Result<String> {
    let config = config::load_config(cli.config_dir.as_deref()).context("failed to load configuration")?;
    debug!(
        "contest '{}' ({}), weeks {:?}",
        config.contest.name,
        config.contest.year,
        config.contest.weeks.as_slice()
    );

    let data = data::load_contest(&config).context("failed to load contest data")?;

    commands::execute(&cli.command, cli.json, &config, &data).context("command failed")
}
