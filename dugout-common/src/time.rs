//! Timestamp utilities

use chrono::{DateTime, SecondsFormat, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Format a timestamp as the canonical submission-group key.
///
/// Second precision: every row of one ingestion carries the identical
/// string, so distinct-timestamp grouping in SQL matches ingestion
/// boundaries exactly.
pub fn submission_key(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_now_returns_valid_timestamp() {
        let timestamp = now();
        // Should be a reasonable timestamp (after year 2000)
        assert!(timestamp.timestamp() > 946_684_800);
    }

    #[test]
    fn test_submission_key_is_second_precision() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 14, 15, 9, 26).unwrap();
        assert_eq!(submission_key(ts), "2025-03-14T15:09:26Z");
    }

    #[test]
    fn test_submission_key_sorts_chronologically() {
        let earlier = Utc.with_ymd_and_hms(2025, 3, 14, 15, 9, 26).unwrap();
        let later = Utc.with_ymd_and_hms(2025, 3, 14, 16, 0, 0).unwrap();
        assert!(submission_key(earlier) < submission_key(later));
    }
}
