//! Date-like payload values (`created_at`, `scheduled_time`).
//!
//! Hasura sends ISO-8601 strings, with or without an offset. Integrators
//! replaying payloads sometimes send epoch milliseconds. Both are accepted as
//! long as they resolve to a representable instant.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Largest absolute epoch-millisecond value accepted as an instant
/// (100,000,000 days either side of the epoch).
const MAX_EPOCH_MILLIS: f64 = 8.64e15;

/// Offset-carrying formats tried after RFC 3339 and RFC 2822.
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%#z", "%Y-%m-%d %H:%M:%S%.f%#z"];

/// Offset-less formats, interpreted as UTC.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// A date as it appears on the wire: text or epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateValue {
    Text(String),
    Millis(f64),
}

impl DateValue {
    /// Resolves the value to a UTC instant.
    #[must_use]
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            DateValue::Text(text) => parse_date_str(text),
            DateValue::Millis(millis) => millis_to_datetime(*millis),
        }
    }
}

/// Returns true when `value` is a non-empty string or non-zero number that
/// resolves to a valid instant.
#[must_use]
pub fn is_valid_date(value: &Value) -> bool {
    match value {
        Value::String(text) => !text.is_empty() && parse_date_str(text).is_some(),
        Value::Number(number) => number
            .as_f64()
            .is_some_and(|millis| millis != 0.0 && millis_to_datetime(millis).is_some()),
        _ => false,
    }
}

/// Parses a date string in any of the accepted formats.
#[must_use]
pub fn parse_date_str(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

#[allow(clippy::cast_possible_truncation)]
fn millis_to_datetime(millis: f64) -> Option<DateTime<Utc>> {
    if !millis.is_finite() || millis.abs() > MAX_EPOCH_MILLIS {
        return None;
    }
    DateTime::from_timestamp_millis(millis.trunc() as i64)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn accepts_rfc3339_with_zulu() {
        assert!(is_valid_date(&json!("2022-05-29T09:56:00Z")));
    }

    #[test]
    fn accepts_hasura_created_at_without_offset() {
        assert!(is_valid_date(&json!("2021-09-27T07:04:53.456789")));
    }

    #[test]
    fn accepts_short_offset() {
        let dt = parse_date_str("2022-05-29T09:56:00+07").unwrap();
        assert_eq!(dt.to_rfc3339(), "2022-05-29T02:56:00+00:00");
    }

    #[test]
    fn accepts_plain_date() {
        assert!(is_valid_date(&json!("2022-05-29")));
    }

    #[test]
    fn accepts_epoch_millis() {
        assert!(is_valid_date(&json!(1_653_818_160_000_i64)));
    }

    #[test]
    fn rejects_garbage_and_falsy_values() {
        assert!(!is_valid_date(&json!("not a date")));
        assert!(!is_valid_date(&json!("")));
        assert!(!is_valid_date(&json!(0)));
        assert!(!is_valid_date(&json!(null)));
        assert!(!is_valid_date(&json!(true)));
        assert!(!is_valid_date(&json!({ "at": "2022-05-29" })));
    }

    #[test]
    fn rejects_out_of_range_millis() {
        assert!(!is_valid_date(&json!(9.0e15)));
    }

    #[test]
    fn date_value_deserializes_both_shapes() {
        let text: DateValue = serde_json::from_value(json!("2022-05-29T09:56:00Z")).unwrap();
        let millis: DateValue = serde_json::from_value(json!(1_653_818_160_000_i64)).unwrap();
        assert_eq!(text.to_datetime(), millis.to_datetime());
    }
}
