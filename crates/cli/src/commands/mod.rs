// CLI subcommand dispatch and repository resolution.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Subcommand;
use eventsync_core::{EventLog, GlobalConfig, RepoConfig, Synchronizer};
use tracing::debug;

use crate::exit_code::ExitCode;
use crate::output::{self, OutputFormat};

pub mod log;
pub mod record;
pub mod smoke;
pub mod sync;

#[derive(Subcommand)]
pub enum Command {
    /// Append one event to the log
    Record(record::RecordArgs),
    /// Stage, commit and push the log
    Sync(sync::SyncArgs),
    /// Print events from the log
    Log(log::LogArgs),
    /// Record a fixed test event
    Smoke(smoke::SmokeArgs),
}

pub fn run(repo: Option<PathBuf>, cmd: Command) -> anyhow::Result<ExitCode> {
    let global = GlobalConfig::load();
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    let repo_dir = resolve_repo_dir(repo, &global, &cwd);
    let ctx = match RepoContext::load(repo_dir, global) {
        Ok(ctx) => {
            debug!(
                repo_dir = %ctx.repo_dir.display(),
                log_file = %ctx.repo.log.file_name,
                "resolved repository"
            );
            ctx
        }
        Err(error) => {
            output::print_anyhow_error(OutputFormat::detect(false), &error);
            return Err(error);
        }
    };

    match cmd {
        Command::Record(args) => record::run(&ctx, args),
        Command::Sync(args) => sync::run(&ctx, args),
        Command::Log(args) => log::run(&ctx, args),
        Command::Smoke(args) => smoke::run(&ctx, args),
    }
}

/// `--repo` wins, then the global `repo_dir`, then the current directory.
/// Relative paths are resolved against `cwd`.
pub fn resolve_repo_dir(flag: Option<PathBuf>, global: &GlobalConfig, cwd: &Path) -> PathBuf {
    let chosen = flag.or_else(|| global.repo_dir.clone()).unwrap_or_else(|| cwd.to_path_buf());
    if chosen.is_absolute() {
        chosen
    } else {
        cwd.join(chosen)
    }
}

/// Everything a subcommand needs to reach the log and the repository.
pub struct RepoContext {
    pub repo_dir: PathBuf,
    pub global: GlobalConfig,
    pub repo: RepoConfig,
}

impl RepoContext {
    pub fn load(repo_dir: PathBuf, global: GlobalConfig) -> anyhow::Result<Self> {
        let repo = RepoConfig::load(&repo_dir).with_context(|| {
            format!("failed to load repository config under `{}`", repo_dir.display())
        })?;
        Ok(Self { repo_dir, global, repo })
    }

    pub fn event_log(&self) -> EventLog {
        EventLog::new(&self.repo_dir, &self.repo.log)
    }

    pub fn synchronizer(&self) -> Synchronizer {
        Synchronizer::new(&self.repo_dir, self.repo.sync.clone())
    }
}
