// `eventsync smoke`: record a fixed test event to check the log is writable.

use anyhow::Context as _;
use clap::Args;
use eventsync_common::{EventMeta, NewEvent};
use serde_json::json;

use super::record::{format_human, RecordResult};
use super::RepoContext;
use crate::exit_code::ExitCode;
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct SmokeArgs {
    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

pub fn run(ctx: &RepoContext, args: SmokeArgs) -> anyhow::Result<ExitCode> {
    let format = OutputFormat::detect(args.json);
    let log = ctx.event_log();

    let record = match log.record(smoke_event()).context("failed to record test event") {
        Ok(record) => record,
        Err(error) => {
            output::print_anyhow_error(format, &error);
            return Err(error);
        }
    };

    let result = RecordResult { log_path: log.path().display().to_string(), record, sync: None };
    output::print_output(format, &result, |result| {
        format!("{}\nTest event logged successfully", format_human(result))
    })?;
    Ok(ExitCode::Success)
}

fn smoke_event() -> NewEvent {
    let mut meta = EventMeta::new();
    meta.insert("test".into(), json!(true));
    NewEvent::new("test-project", "test-agent", "done", "Test event logged successfully")
        .with_artifact("test/path.txt")
        .with_meta(meta)
}
