// `eventsync log`: print events from the log.

use anyhow::Context as _;
use clap::Args;
use eventsync_common::schema::format_timestamp;
use eventsync_common::EventRecord;
use eventsync_core::store::ReadSummary;

use super::RepoContext;
use crate::exit_code::ExitCode;
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct LogArgs {
    /// Only show the last N events.
    #[arg(long, value_name = "N")]
    tail: Option<usize>,

    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

pub fn run(ctx: &RepoContext, args: LogArgs) -> anyhow::Result<ExitCode> {
    let format = OutputFormat::detect(args.json);
    let log = ctx.event_log();

    let mut summary = match log.read_all().context("failed to read event log") {
        Ok(summary) => summary,
        Err(error) => {
            output::print_anyhow_error(format, &error);
            return Err(error);
        }
    };
    if let Some(count) = args.tail {
        summary.keep_last(count);
    }

    for bad in &summary.malformed {
        output::print_warning(
            format,
            "MALFORMED_LINE",
            &format!("{}:{}: {}", log.path().display(), bad.line_number, bad.error),
        );
    }
    output::print_output(format, &summary, format_human)?;
    Ok(ExitCode::Success)
}

fn format_human(summary: &ReadSummary) -> String {
    if summary.records.is_empty() {
        return "No events recorded.".to_string();
    }
    summary.records.iter().map(format_record).collect::<Vec<_>>().join("\n")
}

fn format_record(record: &EventRecord) -> String {
    let mut line = format!(
        "{}  {}/{}  {:<8} {}",
        format_timestamp(&record.timestamp),
        record.project,
        record.agent,
        record.status,
        record.message
    );
    if let Some(artifact) = &record.artifact {
        line.push_str(&format!("  -> {artifact}"));
    }
    line
}
