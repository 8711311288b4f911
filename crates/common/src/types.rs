// Event record types shared across eventsync crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::clock;
use crate::schema::{self, SchemaError};

/// Free-form metadata attached to an event.
pub type EventMeta = Map<String, Value>;

/// Caller-supplied fields of an event, before it is stamped.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub project: String,
    pub agent: String,
    /// Free-form status, e.g. `started`, `done`, `error`.
    pub status: String,
    /// Must be public-safe: the log is pushed to a remote repository.
    pub message: String,
    pub artifact: Option<String>,
    pub meta: Option<EventMeta>,
}

impl NewEvent {
    pub fn new(
        project: impl Into<String>,
        agent: impl Into<String>,
        status: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            agent: agent.into(),
            status: status.into(),
            message: message.into(),
            artifact: None,
            meta: None,
        }
    }

    pub fn with_artifact(mut self, artifact: impl Into<String>) -> Self {
        self.artifact = Some(artifact.into());
        self
    }

    pub fn with_meta(mut self, meta: EventMeta) -> Self {
        self.meta = Some(meta);
        self
    }
}

/// One line of the event log.
///
/// `artifact` and `meta` are omitted from the serialized form when absent,
/// never written as `null`. The canonical timestamp key is `timestamp`; the
/// legacy `ts` key is accepted on read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventRecord {
    #[serde(alias = "ts", with = "schema::timestamp")]
    pub timestamp: DateTime<Utc>,
    pub project: String,
    pub agent: String,
    pub status: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<EventMeta>,
}

impl EventRecord {
    /// Stamp an event with the next timestamp from the process clock.
    pub fn stamp(event: NewEvent) -> Self {
        Self::stamp_at(event, clock::now())
    }

    pub fn stamp_at(event: NewEvent, timestamp: DateTime<Utc>) -> Self {
        let NewEvent { project, agent, status, message, artifact, meta } = event;
        Self { timestamp, project, agent, status, message, artifact, meta }
    }

    /// Encode as a single JSON Lines line, without the trailing newline.
    pub fn to_line(&self) -> Result<String, SchemaError> {
        schema::encode_line(self)
    }

    /// Decode one JSON Lines line (surrounding whitespace is ignored).
    pub fn from_line(line: &str) -> Result<Self, SchemaError> {
        schema::decode_line(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).single().expect("valid timestamp")
    }

    #[test]
    fn required_fields_only_omit_optional_keys() {
        let event = NewEvent::new("proj1", "agentA", "started", "Job launched");
        let record = EventRecord::stamp_at(event, fixed_time());
        let value: Value = serde_json::to_value(&record).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object["project"], "proj1");
        assert_eq!(object["agent"], "agentA");
        assert_eq!(object["status"], "started");
        assert_eq!(object["message"], "Job launched");
        assert!(object.contains_key("timestamp"));
        assert!(!object.contains_key("artifact"));
        assert!(!object.contains_key("meta"));
        assert_eq!(object.len(), 5);
    }

    #[test]
    fn optional_fields_are_written_when_supplied() {
        let mut meta = EventMeta::new();
        meta.insert("n".into(), json!(1));
        let event = NewEvent::new("p", "a", "done", "ok").with_artifact("out.txt").with_meta(meta);
        let record = EventRecord::stamp_at(event, fixed_time());
        let value: Value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["artifact"], "out.txt");
        assert_eq!(value["meta"], json!({ "n": 1 }));
    }

    #[test]
    fn empty_meta_is_still_present() {
        let event = NewEvent::new("p", "a", "done", "ok").with_meta(EventMeta::new());
        let value = serde_json::to_value(EventRecord::stamp_at(event, fixed_time())).unwrap();
        assert_eq!(value["meta"], json!({}));
    }

    #[test]
    fn stamp_uses_utc_now() {
        let before = Utc::now() - chrono::Duration::seconds(1);
        let record = EventRecord::stamp(NewEvent::new("p", "a", "s", "m"));
        assert!(record.timestamp >= before);
    }

    #[test]
    fn serialized_key_order_starts_with_timestamp() {
        let record = EventRecord::stamp_at(NewEvent::new("p", "a", "s", "m"), fixed_time());
        let line = record.to_line().unwrap();
        assert!(line.starts_with(r#"{"timestamp":"2026-03-14T09:26:53.000000Z","project":"p""#));
    }
}
