// `eventsync record`: append one event to the log, optionally syncing after.

use anyhow::Context as _;
use clap::Args;
use eventsync_common::schema::format_timestamp;
use eventsync_common::{EventMeta, EventRecord, NewEvent};
use eventsync_core::SyncOutcome;
use serde::Serialize;

use super::sync::{report_outcome, resolve_commit_message};
use super::RepoContext;
use crate::exit_code::{ExitCode, UsageError};
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct RecordArgs {
    /// Project identifier (defaults to `default_project` in the global config).
    #[arg(long)]
    project: Option<String>,

    /// Agent identifier (defaults to `default_agent` in the global config).
    #[arg(long)]
    agent: Option<String>,

    /// Status, e.g. started, done, error.
    #[arg(long)]
    status: String,

    /// Public-safe message. It is pushed to the remote on sync.
    #[arg(long)]
    message: String,

    /// Optional artifact reference, e.g. an output path.
    #[arg(long)]
    artifact: Option<String>,

    /// Optional metadata as a JSON object, e.g. '{"n": 1}'.
    #[arg(long, value_name = "JSON")]
    meta: Option<String>,

    /// Sync to the remote after recording.
    #[arg(long)]
    sync: bool,

    /// Commit message for `--sync`.
    #[arg(long, requires = "sync")]
    sync_message: Option<String>,

    /// With `--sync`, exit non-zero if the sync does not succeed.
    #[arg(long, requires = "sync")]
    strict: bool,

    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
pub struct RecordResult {
    pub log_path: String,
    pub record: EventRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync: Option<SyncOutcome>,
}

pub fn run(ctx: &RepoContext, args: RecordArgs) -> anyhow::Result<ExitCode> {
    let format = OutputFormat::detect(args.json);

    let default_message = &ctx.repo.sync.default_message;
    let prepared = build_event(ctx, &args).and_then(|event| {
        let commit_message = args
            .sync
            .then(|| resolve_commit_message(args.sync_message.clone(), default_message))
            .transpose()?;
        Ok((event, commit_message))
    });
    let (event, commit_message) = match prepared {
        Ok(prepared) => prepared,
        Err(error) => {
            output::print_error(format, "USAGE", &format!("{error:#}"));
            return Err(error);
        }
    };

    let log = ctx.event_log();
    let record = match log.record(event).context("failed to record event") {
        Ok(record) => record,
        Err(error) => {
            output::print_anyhow_error(format, &error);
            return Err(error);
        }
    };

    let sync = commit_message.map(|message| ctx.synchronizer().sync(&message));
    let exit = match &sync {
        Some(outcome) => report_outcome(format, outcome, args.strict),
        None => ExitCode::Success,
    };

    let result = RecordResult { log_path: log.path().display().to_string(), record, sync };
    output::print_output(format, &result, format_human)?;
    Ok(exit)
}

fn build_event(ctx: &RepoContext, args: &RecordArgs) -> anyhow::Result<NewEvent> {
    let project = args
        .project
        .clone()
        .or_else(|| ctx.global.default_project.clone())
        .ok_or_else(|| missing_identity("project"))?;
    let agent = args
        .agent
        .clone()
        .or_else(|| ctx.global.default_agent.clone())
        .ok_or_else(|| missing_identity("agent"))?;

    let mut event = NewEvent::new(project, agent, args.status.clone(), args.message.clone());
    event.artifact = args.artifact.clone();
    event.meta = args.meta.as_deref().map(parse_meta).transpose()?;
    Ok(event)
}

fn missing_identity(field: &str) -> UsageError {
    UsageError(format!("--{field} is required (or set default_{field} in ~/.eventsync/config.toml)"))
}

pub(crate) fn parse_meta(raw: &str) -> anyhow::Result<EventMeta> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|error| UsageError(format!("--meta is not valid JSON: {error}")))?;
    match value {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(UsageError(format!("--meta must be a JSON object, got `{other}`")).into()),
    }
}

pub(crate) fn format_human(result: &RecordResult) -> String {
    let record = &result.record;
    let mut line = format!(
        "Recorded {} [{}/{}] {}: {}",
        format_timestamp(&record.timestamp),
        record.project,
        record.agent,
        record.status,
        record.message
    );
    if let Some(artifact) = &record.artifact {
        line.push_str(&format!(" ({artifact})"));
    }
    line.push_str(&format!("\nLog: {}", result.log_path));
    if let Some(outcome) = &result.sync {
        line.push_str(&format!("\nSync: {}", super::sync::describe_outcome(outcome)));
    }
    line
}
