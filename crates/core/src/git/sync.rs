// Stage, commit and push the event log to the configured remote.
//
// Each invocation walks: stage -> commit -> {nothing to commit | committed}
// -> (if committed) push -> {pushed | push failed}. Every path terminates and
// nothing is retried. Failures come back as a `SyncOutcome`, never as `Err`.

use serde::Serialize;
use tracing::{info, warn};

use super::worker::{CommandExecutor, CommitOutcome, GitWorker, ProcessCommandExecutor};
use crate::config::SyncConfig;

pub const DEFAULT_COMMIT_MESSAGE: &str = "Update events";

/// Where a sync invocation terminated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// A new commit was created and pushed.
    Pushed,
    /// No new changes since the last sync; no commit was created.
    NothingToCommit,
    StageFailed(String),
    CommitFailed(String),
    /// The commit exists locally but did not reach the remote.
    PushFailed(String),
}

impl SyncOutcome {
    /// Pushed or nothing to do.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Pushed | Self::NothingToCommit)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Pushed => "pushed",
            Self::NothingToCommit => "nothing_to_commit",
            Self::StageFailed(_) => "stage_failed",
            Self::CommitFailed(_) => "commit_failed",
            Self::PushFailed(_) => "push_failed",
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Pushed | Self::NothingToCommit => None,
            Self::StageFailed(detail) | Self::CommitFailed(detail) | Self::PushFailed(detail) => {
                Some(detail)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Synchronizer<E = ProcessCommandExecutor> {
    worker: GitWorker<E>,
    config: SyncConfig,
}

impl Synchronizer<ProcessCommandExecutor> {
    pub fn new(repo_path: impl Into<std::path::PathBuf>, config: SyncConfig) -> Self {
        Self { worker: GitWorker::new(repo_path), config }
    }
}

impl<E: CommandExecutor> Synchronizer<E> {
    pub fn with_worker(worker: GitWorker<E>, config: SyncConfig) -> Self {
        Self { worker, config }
    }

    /// Sync using the configured default commit message.
    pub fn sync_default(&self) -> SyncOutcome {
        let message = self.config.default_message.clone();
        self.sync(&message)
    }

    pub fn sync(&self, commit_message: &str) -> SyncOutcome {
        let repo = self.worker.repo_path().display().to_string();

        if let Err(error) = self.worker.stage_all() {
            warn!(%repo, error = %error, "event sync: staging failed");
            return SyncOutcome::StageFailed(error.to_string());
        }

        match self.worker.commit(commit_message) {
            Ok(CommitOutcome::NothingToCommit) => {
                info!(%repo, "event sync: nothing to commit");
                return SyncOutcome::NothingToCommit;
            }
            Ok(CommitOutcome::Committed(_)) => {}
            Err(error) => {
                warn!(%repo, error = %error, "event sync: commit skipped");
                return SyncOutcome::CommitFailed(error.to_string());
            }
        }

        let pushed = match (&self.config.remote, &self.config.branch) {
            (Some(remote), Some(branch)) => self.worker.push_to(remote, branch),
            _ => self.worker.push(),
        };
        match pushed {
            Ok(_) => {
                info!(%repo, message = commit_message, "event sync: pushed");
                SyncOutcome::Pushed
            }
            Err(error) => {
                warn!(%repo, error = %error, "event sync: push failed");
                SyncOutcome::PushFailed(error.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::worker::tests::{failed, ok, MockExecutor};

    fn synchronizer(mock: &MockExecutor, config: SyncConfig) -> Synchronizer<MockExecutor> {
        Synchronizer::with_worker(GitWorker::with_executor("/tmp/events", mock.clone()), config)
    }

    #[test]
    fn committed_changes_are_pushed() {
        let mock = MockExecutor::new(vec![ok(""), ok("[main 1a2b3c4] Update events\n"), ok("")]);
        let outcome = synchronizer(&mock, SyncConfig::default()).sync("Update events");

        assert_eq!(outcome, SyncOutcome::Pushed);
        assert!(outcome.is_success());
        assert_eq!(
            mock.arg_lists(),
            vec![
                vec!["add", "."],
                vec!["commit", "-m", "Update events"],
                vec!["push"],
            ]
        );
    }

    #[test]
    fn nothing_to_commit_skips_push() {
        let mock = MockExecutor::new(vec![
            ok(""),
            failed(1, "On branch main\nnothing to commit, working tree clean\n", ""),
        ]);
        let outcome = synchronizer(&mock, SyncConfig::default()).sync("Update events");

        assert_eq!(outcome, SyncOutcome::NothingToCommit);
        assert!(outcome.is_success());
        assert_eq!(mock.calls().len(), 2);
    }

    #[test]
    fn stage_failure_stops_before_commit() {
        let mock = MockExecutor::new(vec![failed(128, "", "fatal: not a git repository\n")]);
        let outcome = synchronizer(&mock, SyncConfig::default()).sync("Update events");

        match &outcome {
            SyncOutcome::StageFailed(detail) => assert!(detail.contains("not a git repository")),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(!outcome.is_success());
        assert_eq!(mock.calls().len(), 1);
    }

    #[test]
    fn missing_git_binary_is_a_stage_failure() {
        let mock = MockExecutor::new(vec![Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "No such file or directory",
        ))]);
        let outcome = synchronizer(&mock, SyncConfig::default()).sync("Update events");

        assert_eq!(outcome.kind(), "stage_failed");
        assert!(outcome.detail().unwrap().contains("failed to run `git add .`"));
    }

    #[test]
    fn other_commit_failure_skips_push() {
        let mock = MockExecutor::new(vec![
            ok(""),
            failed(128, "", "fatal: unable to auto-detect email address\n"),
        ]);
        let outcome = synchronizer(&mock, SyncConfig::default()).sync("Update events");

        assert_eq!(outcome.kind(), "commit_failed");
        assert!(outcome.detail().unwrap().contains("unable to auto-detect email address"));
        assert_eq!(mock.calls().len(), 2);
    }

    #[test]
    fn push_failure_is_reported_not_raised() {
        let mock = MockExecutor::new(vec![
            ok(""),
            ok("[main 1a2b3c4] Update events\n"),
            failed(1, "", "fatal: Could not read from remote repository.\n"),
        ]);
        let outcome = synchronizer(&mock, SyncConfig::default()).sync("Update events");

        assert_eq!(outcome.kind(), "push_failed");
        assert!(outcome.detail().unwrap().contains("Could not read from remote repository"));
    }

    #[test]
    fn configured_remote_and_branch_are_pushed_explicitly() {
        let mock = MockExecutor::new(vec![ok(""), ok(""), ok("")]);
        let config = SyncConfig {
            remote: Some("upstream".into()),
            branch: Some("events".into()),
            ..SyncConfig::default()
        };
        synchronizer(&mock, config).sync("Update events");

        assert_eq!(mock.arg_lists()[2], vec!["push", "upstream", "events"]);
    }

    #[test]
    fn remote_without_branch_uses_plain_push() {
        let mock = MockExecutor::new(vec![ok(""), ok(""), ok("")]);
        let config = SyncConfig { remote: Some("upstream".into()), ..SyncConfig::default() };
        synchronizer(&mock, config).sync("Update events");

        assert_eq!(mock.arg_lists()[2], vec!["push"]);
    }

    #[test]
    fn sync_default_uses_configured_message() {
        let mock = MockExecutor::new(vec![ok(""), failed(1, "nothing to commit", "")]);
        synchronizer(&mock, SyncConfig::default()).sync_default();
        assert_eq!(mock.arg_lists()[1], vec!["commit", "-m", DEFAULT_COMMIT_MESSAGE]);

        let mock = MockExecutor::new(vec![ok(""), failed(1, "nothing to commit", "")]);
        let config =
            SyncConfig { default_message: "chore: events".into(), ..SyncConfig::default() };
        synchronizer(&mock, config).sync_default();
        assert_eq!(mock.arg_lists()[1], vec!["commit", "-m", "chore: events"]);
    }

    #[test]
    fn outcome_serializes_with_tag_and_detail() {
        let pushed = serde_json::to_value(SyncOutcome::Pushed).unwrap();
        assert_eq!(pushed, serde_json::json!({ "outcome": "pushed" }));

        let push_failed =
            serde_json::to_value(SyncOutcome::PushFailed("rejected".into())).unwrap();
        assert_eq!(push_failed, serde_json::json!({ "outcome": "push_failed", "detail": "rejected" }));
    }
}
