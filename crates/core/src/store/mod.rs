// Persistence: the append-only JSON Lines event log.

pub mod event_log;

pub use event_log::{EventLog, MalformedLine, ReadSummary, RecordError, DEFAULT_LOG_FILE_NAME};
