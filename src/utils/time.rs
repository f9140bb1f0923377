//! Time helpers for the epoch-milliseconds timestamps used across the
//! storage schema and the wire format.

use chrono::{DateTime, TimeZone, Utc};

/// Current time as epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Convert epoch milliseconds to a UTC datetime. Out-of-range values fall
/// back to the epoch.
pub fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis).single().unwrap_or_default()
}

/// Human-readable UTC rendering of an epoch-milliseconds timestamp.
pub fn format_millis(millis: i64) -> String {
    millis_to_datetime(millis).format("%Y-%m-%d %H:%M:%S").to_string()
}
