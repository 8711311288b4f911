// eventsync-core: event log recorder/reader, git synchronizer and configuration.

pub mod config;
pub mod git;
pub mod store;

pub use config::{GlobalConfig, LogConfig, RepoConfig, SyncConfig};
pub use git::sync::{SyncOutcome, Synchronizer};
pub use store::{EventLog, RecordError};
