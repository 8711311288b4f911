// Output format auto-detection for the CLI.
//
// TTY → human-readable text. Piped/redirected → structured JSON.
// `--json` flag forces JSON output regardless of terminal.

use eventsync_core::RecordError;
use serde::Serialize;
use std::io::{self, IsTerminal, Write};

const ANSI_RED: &str = "\x1b[31m";
const ANSI_YELLOW: &str = "\x1b[33m";
const ANSI_RESET: &str = "\x1b[0m";

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    /// One JSON object per response.
    Json,
}

impl OutputFormat {
    /// JSON if `--json` was passed or stdout is not a TTY.
    pub fn detect(json_flag: bool) -> Self {
        if json_flag {
            return Self::Json;
        }
        Self::detect_from_terminal(io::stdout().is_terminal())
    }

    pub fn detect_from_terminal(is_tty: bool) -> Self {
        if is_tty {
            Self::Human
        } else {
            Self::Json
        }
    }
}

/// Write a value to stdout in the selected format.
pub fn print_output<T, F>(format: OutputFormat, value: &T, human_fn: F) -> io::Result<()>
where
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    write_output(&mut io::stdout().lock(), format, value, human_fn)
}

pub fn write_output<W, T, F>(
    writer: &mut W,
    format: OutputFormat,
    value: &T,
    human_fn: F,
) -> io::Result<()>
where
    W: Write,
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    match format {
        OutputFormat::Human => {
            writeln!(writer, "{}", human_fn(value))
        }
        OutputFormat::Json => {
            serde_json::to_writer(&mut *writer, value).map_err(io::Error::other)?;
            writeln!(writer)
        }
    }
}

/// Write an error to stderr in the selected format.
pub fn print_error(format: OutputFormat, code: &str, message: &str) {
    print_diagnostic(format, "error", ANSI_RED, code, message);
}

/// Write a warning to stderr in the selected format.
pub fn print_warning(format: OutputFormat, code: &str, message: &str) {
    print_diagnostic(format, "warning", ANSI_YELLOW, code, message);
}

/// Print an error with a code and a hint derived from its cause.
pub fn print_anyhow_error(format: OutputFormat, error: &anyhow::Error) {
    let (code, message) = actionable_error(error);
    print_error(format, code, &message);
}

fn print_diagnostic(format: OutputFormat, label: &str, color: &str, code: &str, message: &str) {
    let mut err = io::stderr().lock();
    let _ = match format {
        OutputFormat::Human => {
            let is_tty = io::stderr().is_terminal();
            writeln!(err, "{}", render_human_stderr_line(label, message, is_tty, color))
        }
        OutputFormat::Json => {
            let line = render_json_diagnostic(label, code, message);
            writeln!(err, "{line}")
        }
    };
}

fn render_json_diagnostic(label: &str, code: &str, message: &str) -> serde_json::Value {
    serde_json::json!({
        label: {
            "code": code,
            "message": message,
        }
    })
}

fn actionable_error(error: &anyhow::Error) -> (&'static str, String) {
    let message = format!("{error:#}");

    let record_error = error.chain().find_map(|cause| cause.downcast_ref::<RecordError>());
    if let Some(RecordError::Io { path, source, .. }) = record_error {
        return match source.kind() {
            io::ErrorKind::NotFound => (
                "LOG_DIR_NOT_FOUND",
                format!(
                    "Directory for {} does not exist. Pass --repo or set repo_dir in ~/.eventsync/config.toml",
                    path.display()
                ),
            ),
            io::ErrorKind::PermissionDenied => (
                "LOG_NOT_WRITABLE",
                format!("Permission denied writing {}", path.display()),
            ),
            _ => ("LOG_IO_ERROR", message),
        };
    }
    if record_error.is_some() {
        return ("RECORD_FAILED", message);
    }

    ("ERROR", message)
}

fn render_human_stderr_line(label: &str, message: &str, is_tty: bool, color: &str) -> String {
    if is_tty {
        format!("{color}{label}:{ANSI_RESET} {message}")
    } else {
        format!("{label}: {message}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventsync_core::SyncOutcome;
    use std::path::PathBuf;

    #[test]
    fn detect_tty_returns_human() {
        assert_eq!(OutputFormat::detect_from_terminal(true), OutputFormat::Human);
    }

    #[test]
    fn detect_pipe_returns_json() {
        assert_eq!(OutputFormat::detect_from_terminal(false), OutputFormat::Json);
    }

    #[test]
    fn detect_json_flag_overrides_tty() {
        assert_eq!(OutputFormat::detect(true), OutputFormat::Json);
    }

    #[test]
    fn write_output_human_format() {
        let mut buf = Vec::new();
        write_output(&mut buf, OutputFormat::Human, &SyncOutcome::NothingToCommit, |_| {
            "Nothing to commit".to_string()
        })
        .unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "Nothing to commit\n");
    }

    #[test]
    fn write_output_json_is_one_line() {
        let outcome = SyncOutcome::PushFailed("rejected".into());
        let mut buf = Vec::new();
        write_output(&mut buf, OutputFormat::Json, &outcome, |_| {
            unreachable!("human_fn should not be called in JSON mode")
        })
        .unwrap();

        let output = String::from_utf8(buf).unwrap();
        assert!(output.ends_with('\n'));
        assert_eq!(output.matches('\n').count(), 1);
        let parsed: serde_json::Value = serde_json::from_str(output.trim()).unwrap();
        assert_eq!(parsed["outcome"], "push_failed");
        assert_eq!(parsed["detail"], "rejected");
    }

    #[test]
    fn print_diagnostics_do_not_panic() {
        print_error(OutputFormat::Human, "TEST_ERR", "something broke");
        print_error(OutputFormat::Json, "TEST_ERR", "something broke");
        print_warning(OutputFormat::Json, "WARN", "heads up");
    }

    #[test]
    fn json_diagnostic_is_keyed_by_label() {
        let value = render_json_diagnostic("warning", "SYNC_FAILED", "push rejected");
        assert_eq!(value["warning"]["code"], "SYNC_FAILED");
        assert_eq!(value["warning"]["message"], "push rejected");
    }

    #[test]
    fn render_human_error_uses_color_for_tty() {
        let line = render_human_stderr_line("error", "boom", true, ANSI_RED);
        assert!(line.contains(ANSI_RED));
        assert!(line.contains(ANSI_RESET));
        assert!(line.contains("boom"));
    }

    #[test]
    fn render_human_warning_without_tty_is_plain() {
        let line = render_human_stderr_line("warning", "careful", false, ANSI_YELLOW);
        assert_eq!(line, "warning: careful");
    }

    fn record_io_error(kind: io::ErrorKind) -> anyhow::Error {
        anyhow::Error::new(RecordError::Io {
            action: "open",
            path: PathBuf::from("/srv/events/events.jsonl"),
            source: io::Error::new(kind, "io"),
        })
    }

    #[test]
    fn actionable_error_missing_directory_suggests_repo_flag() {
        let (code, message) = actionable_error(&record_io_error(io::ErrorKind::NotFound));
        assert_eq!(code, "LOG_DIR_NOT_FOUND");
        assert!(message.contains("/srv/events/events.jsonl"));
        assert!(message.contains("--repo"));
    }

    #[test]
    fn actionable_error_permission_denied() {
        let (code, message) = actionable_error(&record_io_error(io::ErrorKind::PermissionDenied));
        assert_eq!(code, "LOG_NOT_WRITABLE");
        assert!(message.starts_with("Permission denied"));
    }

    #[test]
    fn actionable_error_falls_back_to_full_chain() {
        let err = anyhow::anyhow!("inner").context("outer");
        let (code, message) = actionable_error(&err);
        assert_eq!(code, "ERROR");
        assert_eq!(message, "outer: inner");
    }
}
