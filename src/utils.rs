//! Date and rounding helpers shared by the views.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Derive the zero-padded `"YYYY-MM"` bucket key from an ISO-8601-ish date
/// string, or `None` when the string parses as no known format. Callers skip
/// the record in that case; "unknown" is never a bucket.
///
/// The month is taken from the date components as written — an RFC 3339
/// offset is honored as part of the timestamp but nothing is converted to
/// the local timezone.
pub fn month_key(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.format("%Y-%m").to_string());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.format("%Y-%m").to_string());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.format("%Y-%m").to_string());
    }

    None
}

/// Percentage of `part` in `total`, rounded to one decimal place. Defined as
/// 0.0 for an empty collection instead of letting the division produce NaN.
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 / total as f64 * 1000.0).round() / 10.0
}

/// Mean of `sum` over `count`, rounded to two decimal places, 0.0 when the
/// collection is empty.
pub fn mean_2dp(sum: u64, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    (sum as f64 / count as f64 * 100.0).round() / 100.0
}
