// eventsync-common: event record types and the JSON Lines schema.

pub mod clock;
pub mod schema;
pub mod types;

pub use schema::SchemaError;
pub use types::{EventMeta, EventRecord, NewEvent};
