// bestball entry point.
//
// 1. Initialize tracing (stderr, so stdout stays clean for --json)
// 2. Parse arguments
// 3. Load config and data, run the command, print the result

use anyhow::Context;
use clap::Parser;

use bestball_app::cli::Cli;

fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let cli = Cli::parse();
    let output = bestball_app::run(&cli)?;
    print!("{output}");

    Ok(())
}

fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("bestball=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
