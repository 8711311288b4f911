use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use eventsync_common::{EventRecord, NewEvent, SchemaError};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::LogConfig;

pub const DEFAULT_LOG_FILE_NAME: &str = "events.jsonl";

const FLUSH_ACTION: &str = "flush the appended line to";

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("failed to encode event: {0}")]
    Encode(#[from] SchemaError),

    #[error("failed to {action} event log `{}`: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RecordError {
    fn io(action: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::Io { action, path: path.to_path_buf(), source }
    }
}

/// A line that could not be decoded as an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MalformedLine {
    /// 1-based.
    pub line_number: usize,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReadSummary {
    pub records: Vec<EventRecord>,
    pub malformed: Vec<MalformedLine>,
}

impl ReadSummary {
    /// Drop all but the last `count` records. Malformed lines are kept.
    pub fn keep_last(&mut self, count: usize) {
        let skip = self.records.len().saturating_sub(count);
        self.records = self.records.split_off(skip);
    }
}

/// Append-only JSON Lines event log: one event object per line.
///
/// No locking is done. Each record is written with a single `write_all` on a
/// file opened in append mode, so appends from one process land in call
/// order; appends racing from several processes may interleave.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: PathBuf,
    fsync: bool,
}

impl EventLog {
    /// Log at `<repo_dir>/<config.file_name>`.
    pub fn new(repo_dir: impl AsRef<Path>, config: &LogConfig) -> Self {
        Self { path: repo_dir.as_ref().join(&config.file_name), fsync: config.fsync }
    }

    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), fsync: true }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stamp `event` with the current time and append it.
    ///
    /// The file is created if missing, but its parent directory is not.
    /// With `fsync` enabled, a flush failure is reported after the line has
    /// already been appended, so retrying the same event duplicates it.
    pub fn record(&self, event: NewEvent) -> Result<EventRecord, RecordError> {
        let record = EventRecord::stamp(event);
        self.append(&record)?;
        debug!(
            project = %record.project,
            agent = %record.agent,
            status = %record.status,
            path = %self.path.display(),
            "event recorded"
        );
        Ok(record)
    }

    pub fn append(&self, record: &EventRecord) -> Result<(), RecordError> {
        let mut line = record.to_line()?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|error| RecordError::io("open", &self.path, error))?;
        file.write_all(line.as_bytes())
            .map_err(|error| RecordError::io("append to", &self.path, error))?;
        if self.fsync {
            file.sync_data().map_err(|error| RecordError::io(FLUSH_ACTION, &self.path, error))?;
        }
        Ok(())
    }

    /// Read every event in file order. A missing log reads as empty. Lines
    /// that fail to decode are reported in [`ReadSummary::malformed`] and
    /// skipped; blank lines are ignored.
    pub fn read_all(&self) -> Result<ReadSummary, RecordError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Ok(ReadSummary::default());
            }
            Err(error) => return Err(RecordError::io("open", &self.path, error)),
        };

        let mut summary = ReadSummary::default();
        for (index, raw) in BufReader::new(file).split(b'\n').enumerate() {
            let raw = raw.map_err(|error| RecordError::io("read", &self.path, error))?;
            let line = String::from_utf8_lossy(&raw);
            if line.trim().is_empty() {
                continue;
            }

            match EventRecord::from_line(&line) {
                Ok(record) => summary.records.push(record),
                Err(error) => {
                    let line_number = index + 1;
                    warn!(
                        path = %self.path.display(),
                        line_number,
                        error = %error,
                        "skipping malformed event line"
                    );
                    summary
                        .malformed
                        .push(MalformedLine { line_number, error: error.to_string() });
                }
            }
        }
        Ok(summary)
    }

    /// The last `count` decodable events, oldest first.
    pub fn tail(&self, count: usize) -> Result<Vec<EventRecord>, RecordError> {
        let mut summary = self.read_all()?;
        summary.keep_last(count);
        Ok(summary.records)
    }
}
