use chrono::{DateTime, Utc};

/// Converts a timestamp to the INTEGER epoch milliseconds stored in SQLite.
pub fn to_millis(value: DateTime<Utc>) -> i64 {
    value.timestamp_millis()
}

/// Converts stored epoch milliseconds back to a timestamp.
///
/// Returns `None` when the value is outside chrono's supported range.
pub fn from_millis(value: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(value)
}
