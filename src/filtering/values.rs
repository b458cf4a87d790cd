//! Scalar parsing shared by the pagination, filter and operator parsers.
//!
//! Every function here is lenient: malformed input yields `None` and the
//! caller decides whether to fall back to a default or drop the value.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::Value;

// Largest integer an f64 holds exactly (2^53)
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Parse the leading integer of a string, ignoring trailing garbage.
///
/// Leading whitespace and a single `+`/`-` sign are accepted. Returns `None`
/// when no digit follows, so `"12abc"` is `12` and `"abc"` is `None`.
/// Overlong digit runs saturate instead of failing.
#[must_use]
pub fn parse_int_prefix(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut seen_digit = false;
    let mut value: i64 = 0;
    for byte in digits.bytes() {
        if !byte.is_ascii_digit() {
            break;
        }
        seen_digit = true;
        value = value
            .saturating_mul(10)
            .saturating_add(i64::from(byte - b'0'));
    }

    if !seen_digit {
        return None;
    }
    Some(if negative { -value } else { value })
}

/// Parse a complete, finite number. Empty strings are not numbers.
#[must_use]
pub fn parse_number(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse a date or timestamp, interpreting zone-less values as UTC.
///
/// Accepted shapes:
/// - RFC 3339 (`2024-01-01T10:00:00Z`, `2024-01-01T10:00:00+02:00`)
/// - `2024-01-01T10:00:00` and `2024-01-01 10:00:00`, optional fraction
/// - `2024-01-01` (midnight UTC)
#[must_use]
pub fn parse_date(input: &str) -> Option<DateTime<Utc>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Convert a number into JSON, keeping whole numbers as integers.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn number_value(number: f64) -> Value {
    if number.fract() == 0.0 && number.abs() <= MAX_SAFE_INTEGER {
        return Value::from(number as i64);
    }
    serde_json::Number::from_f64(number).map_or(Value::Null, Value::Number)
}

/// Render a timestamp the way condition trees carry dates.
#[must_use]
pub fn date_value(date: &DateTime<Utc>) -> Value {
    Value::String(date.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Split a comma-separated list, trimming parts and dropping empty ones.
pub fn split_list(input: &str) -> impl Iterator<Item = &str> {
    input.split(',').map(str::trim).filter(|part| !part.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_parse_int_prefix() {
        assert_eq!(parse_int_prefix("42"), Some(42));
        assert_eq!(parse_int_prefix("  7"), Some(7));
        assert_eq!(parse_int_prefix("-3"), Some(-3));
        assert_eq!(parse_int_prefix("+5"), Some(5));
        assert_eq!(parse_int_prefix("12abc"), Some(12));
        assert_eq!(parse_int_prefix("3.9"), Some(3));
    }

    #[test]
    fn test_parse_int_prefix_rejects_non_numeric() {
        assert_eq!(parse_int_prefix("abc"), None);
        assert_eq!(parse_int_prefix(""), None);
        assert_eq!(parse_int_prefix("-"), None);
        assert_eq!(parse_int_prefix("--1"), None);
    }

    #[test]
    fn test_parse_int_prefix_saturates() {
        assert_eq!(parse_int_prefix("99999999999999999999999"), Some(i64::MAX));
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("10"), Some(10.0));
        assert_eq!(parse_number(" 2.5 "), Some(2.5));
        assert_eq!(parse_number("-1e3"), Some(-1000.0));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("2024-01-01"), None);
    }

    #[test]
    fn test_parse_date_shapes() {
        let midnight = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_date("2024-01-01"), Some(midnight));
        assert_eq!(parse_date("2024-01-01T00:00:00Z"), Some(midnight));
        assert_eq!(parse_date("2024-01-01T00:00:00"), Some(midnight));
        assert_eq!(parse_date("2024-01-01 00:00:00"), Some(midnight));
        assert_eq!(parse_date("2024-01-01T02:00:00+02:00"), Some(midnight));
    }

    #[test]
    fn test_parse_date_invalid() {
        assert_eq!(parse_date("not-a-date"), None);
        assert_eq!(parse_date("2024-13-01"), None);
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("500"), None);
    }

    #[test]
    fn test_number_value_keeps_integers() {
        assert_eq!(number_value(10.0), json!(10));
        assert_eq!(number_value(-4.0), json!(-4));
        assert_eq!(number_value(2.5), json!(2.5));
    }

    #[test]
    fn test_date_value_format() {
        let date = Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap();
        assert_eq!(date_value(&date), json!("2024-12-31T00:00:00.000Z"));
    }

    #[test]
    fn test_split_list() {
        let parts: Vec<&str> = split_list(" a, b ,,c ").collect();
        assert_eq!(parts, vec!["a", "b", "c"]);
        assert_eq!(split_list("").count(), 0);
    }
}
