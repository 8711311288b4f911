// eventsync CLI entry point.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;
mod exit_code;
mod output;

use exit_code::ExitCode;

#[derive(Parser)]
#[command(name = "eventsync", about = "Append agent events to a JSON Lines log and sync it with git")]
struct Cli {
    /// Repository holding the event log (defaults to `repo_dir` from
    /// ~/.eventsync/config.toml, then the current directory).
    #[arg(long, global = true, value_name = "PATH")]
    repo: Option<PathBuf>,

    #[command(subcommand)]
    command: commands::Command,
}

fn main() -> process::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match commands::run(cli.repo, cli.command) {
        Ok(code) => code.into(),
        Err(error) => ExitCode::from_error(&error).into(),
    }
}
