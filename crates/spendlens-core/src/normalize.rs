//! Transaction normalization
//!
//! Turns caller-supplied [`Transaction`]s into [`NormalizedTransaction`]s:
//! - blank or missing categories become "Uncategorized"
//! - timestamps are parsed from ISO-8601 (date or date-time, optional offset)
//! - unparseable timestamps fall back to the request's "now" anchor; the
//!   record is kept and marked with `timestamp_recovered`
//!
//! Offsets are not converted: a timestamp keeps the wall-clock date and hour
//! it was written with.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike};
use tracing::debug;

use crate::models::{MonthBucket, NormalizedTransaction, Transaction, UNCATEGORIZED};

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-8601 timestamp, with or without a trailing `Z`/offset.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }

    // A bare "Z" suffix means UTC; treat what precedes it as wall-clock time
    let s = s
        .strip_suffix('Z')
        .or_else(|| s.strip_suffix('z'))
        .unwrap_or(s);

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.naive_local());
        }
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Resolve a category label, substituting "Uncategorized" for blank input
pub fn resolve_category(category: Option<&str>) -> String {
    match category {
        Some(c) if !c.trim().is_empty() => c.to_string(),
        _ => UNCATEGORIZED.to_string(),
    }
}

/// Normalize a single transaction against the request's "now" anchor
pub fn normalize_transaction(tx: &Transaction, now: NaiveDateTime) -> NormalizedTransaction {
    let (timestamp, recovered) = match parse_timestamp(&tx.timestamp) {
        Some(ts) => (ts, false),
        None => {
            debug!(
                id = tx.id,
                raw = %tx.timestamp,
                "Unparseable timestamp, substituting current time"
            );
            (now, true)
        }
    };

    NormalizedTransaction {
        id: tx.id,
        description: tx.description.clone(),
        amount: tx.amount,
        kind: tx.kind,
        category: resolve_category(tx.category.as_deref()),
        timestamp,
        month: MonthBucket::from_date(timestamp.date()),
        weekday: timestamp.weekday().num_days_from_monday(),
        hour: timestamp.hour(),
        timestamp_recovered: recovered,
    }
}

/// Normalize a batch; output has the same length and order as the input
pub fn normalize(transactions: &[Transaction], now: NaiveDateTime) -> Vec<NormalizedTransaction> {
    transactions
        .iter()
        .map(|tx| normalize_transaction(tx, now))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionKind;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(8, 15, 0)
            .unwrap();

        assert_eq!(parse_timestamp("2024-03-01T08:15:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T08:15:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T08:15:00+00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01 08:15:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T08:15"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-03-01T08:15:00.250"),
            Some(expected + chrono::Duration::milliseconds(250))
        );
    }

    #[test]
    fn test_parse_timestamp_keeps_wall_clock_of_offset() {
        let parsed = parse_timestamp("2024-01-31T23:30:00-05:00").unwrap();
        assert_eq!(parsed.date(), NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        assert_eq!(parsed.hour(), 23);
    }

    #[test]
    fn test_parse_timestamp_date_only() {
        let parsed = parse_timestamp("2024-02-29").unwrap();
        assert_eq!(parsed.date(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(parsed.hour(), 0);
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("2024-13-01"), None);
    }

    #[test]
    fn test_resolve_category() {
        assert_eq!(resolve_category(None), "Uncategorized");
        assert_eq!(resolve_category(Some("   ")), "Uncategorized");
        assert_eq!(resolve_category(Some("Food")), "Food");
    }

    #[test]
    fn test_normalize_derives_calendar_fields() {
        // 2024-03-02 is a Saturday
        let tx = Transaction::expense(1, "Lunch", 12.5, Some("Food"), "2024-03-02T13:45:00Z");
        let n = normalize_transaction(&tx, now());

        assert_eq!(n.month, MonthBucket::new(2024, 3));
        assert_eq!(n.weekday, 5);
        assert_eq!(n.hour, 13);
        assert!(n.is_weekend());
        assert!(!n.timestamp_recovered);
        assert_eq!(n.kind, TransactionKind::Expense);
    }

    #[test]
    fn test_normalize_recovers_bad_timestamp_with_now() {
        let tx = Transaction::income(2, "Salary", 1000.0, None, "not a date");
        let n = normalize_transaction(&tx, now());

        assert_eq!(n.timestamp, now());
        assert_eq!(n.month, MonthBucket::new(2024, 6));
        assert_eq!(n.category, "Uncategorized");
        assert!(n.timestamp_recovered);
    }

    #[test]
    fn test_normalize_preserves_length_and_order() {
        let txs = vec![
            Transaction::expense(3, "c", 1.0, None, "2024-01-03"),
            Transaction::expense(1, "a", 1.0, None, "bad"),
            Transaction::income(2, "b", 1.0, None, "2024-01-01"),
        ];
        let normalized = normalize(&txs, now());
        let ids: Vec<i64> = normalized.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert!(normalize(&[], now()).is_empty());
    }
}
