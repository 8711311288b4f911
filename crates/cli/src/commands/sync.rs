// `eventsync sync`: stage, commit and push the event log.
//
// A failed sync is reported but exits 0 unless `--strict` is given.

use clap::Args;
use eventsync_core::SyncOutcome;

use super::RepoContext;
use crate::exit_code::{ExitCode, UsageError};
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Commit message (defaults to `sync.default_message`, "Update events").
    #[arg(long, short = 'm')]
    message: Option<String>,

    /// Exit with code 20 unless the sync pushed or had nothing to commit.
    #[arg(long)]
    strict: bool,

    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

pub fn run(ctx: &RepoContext, args: SyncArgs) -> anyhow::Result<ExitCode> {
    let format = OutputFormat::detect(args.json);
    let message = match resolve_commit_message(args.message, &ctx.repo.sync.default_message) {
        Ok(message) => message,
        Err(error) => {
            output::print_error(format, "USAGE", &error.to_string());
            return Err(error);
        }
    };

    let outcome = ctx.synchronizer().sync(&message);
    let exit = report_outcome(format, &outcome, args.strict);
    output::print_output(format, &outcome, describe_outcome)?;
    Ok(exit)
}

pub(crate) fn resolve_commit_message(
    message: Option<String>,
    default: &str,
) -> anyhow::Result<String> {
    match message {
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Err(UsageError("commit message must not be empty".into()).into());
            }
            Ok(trimmed.to_string())
        }
        None => Ok(default.to_string()),
    }
}

/// Warn on stderr for failed outcomes and pick the exit code.
pub(crate) fn report_outcome(format: OutputFormat, outcome: &SyncOutcome, strict: bool) -> ExitCode {
    if outcome.is_success() {
        return ExitCode::Success;
    }
    output::print_warning(format, "SYNC_FAILED", &describe_outcome(outcome));
    exit_for(outcome, strict)
}

fn exit_for(outcome: &SyncOutcome, strict: bool) -> ExitCode {
    if strict && !outcome.is_success() {
        ExitCode::SyncFailed
    } else {
        ExitCode::Success
    }
}

pub(crate) fn describe_outcome(outcome: &SyncOutcome) -> String {
    match outcome {
        SyncOutcome::Pushed => "pushed to remote".to_string(),
        SyncOutcome::NothingToCommit => "nothing to commit".to_string(),
        SyncOutcome::StageFailed(detail) => format!("staging failed: {detail}"),
        SyncOutcome::CommitFailed(detail) => format!("commit skipped: {detail}"),
        SyncOutcome::PushFailed(detail) => {
            format!("committed locally but push failed: {detail}")
        }
    }
}
