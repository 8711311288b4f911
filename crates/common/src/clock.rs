// Process-wide monotonic event clock.
//
// Timestamps are issued at microsecond resolution as max(now, last issued),
// so records written by one process never go backwards when the wall clock
// is stepped back. No guarantee holds across processes.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};

static LAST_ISSUED_MICROS: AtomicI64 = AtomicI64::new(i64::MIN);

/// Next event timestamp for this process.
pub fn now() -> DateTime<Utc> {
    issue(Utc::now())
}

fn issue(candidate: DateTime<Utc>) -> DateTime<Utc> {
    let micros = candidate.timestamp_micros();
    let previous = LAST_ISSUED_MICROS.fetch_max(micros, Ordering::AcqRel);
    DateTime::from_timestamp_micros(previous.max(micros)).unwrap_or(candidate)
}
