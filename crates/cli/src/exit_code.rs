// Consistent exit codes for the eventsync CLI.
//
//   0  = success
//   1  = general error
//   2  = usage/argument error
//   3  = event log could not be written or read
//   20 = sync did not reach the remote (only with `--strict`)

use std::process;

use eventsync_core::config::ConfigError;
use eventsync_core::RecordError;

/// Named exit codes for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    Error = 1,
    Usage = 2,
    Io = 3,
    SyncFailed = 20,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Map an anyhow error to an exit code by inspecting the error chain.
    pub fn from_error(err: &anyhow::Error) -> Self {
        for cause in err.chain() {
            if cause.downcast_ref::<UsageError>().is_some() {
                return Self::Usage;
            }
            if cause.downcast_ref::<RecordError>().is_some() {
                return Self::Io;
            }
            if let Some(config_err) = cause.downcast_ref::<ConfigError>() {
                return match config_err {
                    ConfigError::Parse(_) => Self::Usage,
                    ConfigError::Io(_) | ConfigError::Serialize(_) => Self::Error,
                };
            }
            if cause.downcast_ref::<std::io::Error>().is_some() {
                return Self::Io;
            }
        }

        Self::Error
    }
}

impl From<ExitCode> for process::ExitCode {
    fn from(code: ExitCode) -> Self {
        process::ExitCode::from(code.code() as u8)
    }
}

/// Bad or missing command-line input, embedded in an `anyhow::Error` chain.
#[derive(Debug)]
pub struct UsageError(pub String);

impl std::fmt::Display for UsageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for UsageError {}
