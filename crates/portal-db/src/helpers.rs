//! Row-to-entity parsing helpers.
//!
//! Entity rows store the full record as JSON in a `data` column. These helpers
//! decode it and turn any mismatch into [`DatabaseError::Corrupt`], and handle
//! the dual datetime format issue (`SQLite`'s `datetime('now')` vs Rust's
//! `to_rfc3339()`).

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::DatabaseError;

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// Handles both RFC 3339 (`"2026-02-09T14:30:00+00:00"`) and `SQLite`'s default
/// format (`"2026-02-09 14:30:00"`).
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string cannot be parsed as either format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DatabaseError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Decode the JSON `data` column of a row in `table`.
///
/// # Errors
///
/// Returns `DatabaseError::Corrupt` if the text is not valid JSON for `T`.
pub fn decode_record<T: DeserializeOwned>(
    table: &'static str,
    id: &str,
    data: &str,
) -> Result<T, DatabaseError> {
    serde_json::from_str(data).map_err(|e| DatabaseError::Corrupt {
        table,
        id: id.to_string(),
        reason: e.to_string(),
    })
}

/// Serialize a record for the `data` column.
///
/// # Errors
///
/// Returns `DatabaseError::Other` if serialization fails.
pub fn encode_record<T: Serialize>(record: &T) -> Result<String, DatabaseError> {
    serde_json::to_string(record).map_err(|e| DatabaseError::Other(e.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_core::entities::InviteCode;

    #[test]
    fn parses_both_datetime_formats() {
        let a = parse_datetime("2026-02-09T14:30:00+00:00").unwrap();
        let b = parse_datetime("2026-02-09 14:30:00").unwrap();
        assert_eq!(a, b);
        assert!(parse_datetime("yesterday").is_err());
    }

    #[test]
    fn bad_json_is_corrupt() {
        let err = decode_record::<InviteCode>("invite_codes", "abc", "{not json").unwrap_err();
        match err {
            DatabaseError::Corrupt { table, id, .. } => {
                assert_eq!(table, "invite_codes");
                assert_eq!(id, "abc");
            }
            other => panic!("expected Corrupt, got {other:?}"),
        }
    }

    #[test]
    fn wrong_shape_is_corrupt() {
        let err = decode_record::<InviteCode>("invite_codes", "abc", r#"{"id": 4}"#).unwrap_err();
        assert!(matches!(err, DatabaseError::Corrupt { .. }));
    }
}
