//! Timestamp utilities
//!
//! Stored timestamps use one fixed-width UTC format so that SQLite's text
//! comparison orders them chronologically.

use chrono::{DateTime, NaiveDateTime, Utc};

const DB_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Format a timestamp for storage
pub fn to_db_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(DB_TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp
pub fn parse_db_timestamp(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s, DB_TIMESTAMP_FORMAT).map(|naive| naive.and_utc())
}
