// JSON Lines codec for event records.
//
// One compact JSON object per line. Control characters inside strings are
// escaped by serde_json, so an encoded record never spans more than one line.

use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

use crate::types::EventRecord;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("event line is blank")]
    Blank,

    #[error("event line is not a JSON object")]
    NotAnObject,

    #[error("invalid event JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn encode_line(record: &EventRecord) -> Result<String, SchemaError> {
    let line = serde_json::to_string(record)?;
    debug_assert!(!line.contains('\n'), "encoded event must fit on one line");
    Ok(line)
}

pub fn decode_line(line: &str) -> Result<EventRecord, SchemaError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(SchemaError::Blank);
    }
    if !trimmed.starts_with('{') {
        return Err(SchemaError::NotAnObject);
    }
    Ok(serde_json::from_str(trimmed)?)
}

/// RFC 3339 UTC with microsecond precision, e.g. `2026-10-18T09:15:02.123456Z`.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Serde adapter: writes [`format_timestamp`], reads any RFC 3339 offset and
/// normalizes it to UTC.
pub mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_timestamp(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(|error| D::Error::custom(format!("invalid timestamp `{raw}`: {error}")))
    }
}
