use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

/// Substring git prints (on stdout or stderr) when a commit has no staged changes.
pub const NOTHING_TO_COMMIT: &str = "nothing to commit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitCommandOutput {
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed(GitCommandOutput),
    NothingToCommit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitWorkerError {
    SpawnFailed { command: String, message: String },
    CommandFailed { command: String, code: Option<i32>, stderr: String },
}

impl Display for GitWorkerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            GitWorkerError::SpawnFailed { command, message } => {
                write!(f, "failed to run `{command}`: {message}")
            }
            GitWorkerError::CommandFailed { command, code, stderr } => {
                write!(f, "`{command}` failed with code {:?}: {}", code, stderr.trim())
            }
        }
    }
}

impl Error for GitWorkerError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandResult {
    fn mentions(&self, needle: &str) -> bool {
        self.stdout.contains(needle) || self.stderr.contains(needle)
    }
}

/// Runs an external program and captures its exit status and output.
pub trait CommandExecutor: Send + Sync {
    fn execute(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
    ) -> Result<CommandResult, std::io::Error>;
}

/// Spawns real processes. Output is forced to the C locale so that git's
/// messages can be matched verbatim.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessCommandExecutor;

impl CommandExecutor for ProcessCommandExecutor {
    fn execute(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
    ) -> Result<CommandResult, std::io::Error> {
        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .env("LC_ALL", "C")
            .output()?;
        Ok(CommandResult {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct GitWorker<E = ProcessCommandExecutor> {
    repo_path: PathBuf,
    executor: E,
}

impl GitWorker<ProcessCommandExecutor> {
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self { repo_path: repo_path.into(), executor: ProcessCommandExecutor }
    }
}

impl<E: CommandExecutor> GitWorker<E> {
    pub fn with_executor(repo_path: impl Into<PathBuf>, executor: E) -> Self {
        Self { repo_path: repo_path.into(), executor }
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    /// True when `repo_path` is inside a git work tree.
    pub fn is_repository(&self) -> bool {
        self.run(vec!["rev-parse".to_string(), "--is-inside-work-tree".to_string()])
            .map(|output| output.stdout.trim() == "true")
            .unwrap_or(false)
    }

    pub fn status(&self) -> Result<GitCommandOutput, GitWorkerError> {
        self.run(vec!["status".to_string(), "--short".to_string()])
    }

    /// `git add .`
    pub fn stage_all(&self) -> Result<GitCommandOutput, GitWorkerError> {
        self.run(vec!["add".to_string(), ".".to_string()])
    }

    /// `git commit -m <message>`. An empty index is reported as
    /// [`CommitOutcome::NothingToCommit`] rather than an error.
    pub fn commit(&self, message: &str) -> Result<CommitOutcome, GitWorkerError> {
        let args = vec!["commit".to_string(), "-m".to_string(), message.to_string()];
        let command = render_command(&args);
        let result = self.execute(&command, &args)?;

        if result.success {
            return Ok(CommitOutcome::Committed(GitCommandOutput {
                stdout: result.stdout,
                stderr: result.stderr,
            }));
        }
        if result.mentions(NOTHING_TO_COMMIT) {
            return Ok(CommitOutcome::NothingToCommit);
        }
        Err(command_failed(command, result))
    }

    /// `git push` to the branch's configured upstream.
    pub fn push(&self) -> Result<GitCommandOutput, GitWorkerError> {
        self.run(vec!["push".to_string()])
    }

    /// `git push <remote> <branch>`
    pub fn push_to(&self, remote: &str, branch: &str) -> Result<GitCommandOutput, GitWorkerError> {
        self.run(vec!["push".to_string(), remote.to_string(), branch.to_string()])
    }

    fn run(&self, args: Vec<String>) -> Result<GitCommandOutput, GitWorkerError> {
        let command = render_command(&args);
        let result = self.execute(&command, &args)?;

        if result.success {
            return Ok(GitCommandOutput { stdout: result.stdout, stderr: result.stderr });
        }

        Err(command_failed(command, result))
    }

    fn execute(&self, command: &str, args: &[String]) -> Result<CommandResult, GitWorkerError> {
        debug!(%command, repo = %self.repo_path.display(), "running git");
        self.executor.execute("git", args, &self.repo_path).map_err(|error| {
            GitWorkerError::SpawnFailed { command: command.to_string(), message: error.to_string() }
        })
    }
}

fn render_command(args: &[String]) -> String {
    format!("git {}", args.join(" "))
}

fn command_failed(command: String, result: CommandResult) -> GitWorkerError {
    let stderr = if result.stderr.trim().is_empty() { result.stdout } else { result.stderr };
    GitWorkerError::CommandFailed { command, code: result.code, stderr }
}
