//! Field lookup and value coercion for loosely shaped oracle records.

use est_core::hours::Hours;
use serde_json::{Map, Value};

/// Working hours in a day, for estimates given in days.
const HOURS_PER_DAY: f64 = 8.0;

/// First present, non-null value among `keys`.
pub fn field<'a>(record: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| record.get(*k))
        .find(|v| !v.is_null())
}

/// A string or number as an identifier. Empty strings count as absent.
pub fn id_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Free text. Same rules as [`id_value`].
pub fn text_value(value: &Value) -> Option<String> {
    id_value(value)
}

/// Outcome of reading an estimate field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Estimate {
    Absent,
    Valid(Hours),
    Malformed,
}

/// Read an estimate: a non-negative number, or a string such as `6`, `6h`,
/// `1.5 hours`, `2-4 hours` (midpoint) or `2 days` (8h days).
pub fn estimate(value: Option<&Value>) -> Estimate {
    match value {
        None | Some(Value::Null) => Estimate::Absent,
        Some(Value::Number(n)) => n
            .as_f64()
            .and_then(Hours::from_f64)
            .map_or(Estimate::Malformed, Estimate::Valid),
        Some(Value::String(s)) if s.trim().is_empty() => Estimate::Absent,
        Some(Value::String(s)) => parse_duration(s).map_or(Estimate::Malformed, Estimate::Valid),
        Some(_) => Estimate::Malformed,
    }
}

fn parse_duration(raw: &str) -> Option<Hours> {
    let lower = raw.trim().to_ascii_lowercase();
    let (number, multiplier) = split_unit(&lower)?;
    let number = number.trim();

    let value = match number.split_once('-') {
        // A leading '-' is a negative number, not a range.
        Some((lo, hi)) if !lo.trim().is_empty() => {
            let lo: f64 = lo.trim().parse().ok()?;
            let hi: f64 = hi.trim().parse().ok()?;
            if lo < 0.0 || hi < lo {
                return None;
            }
            f64::midpoint(lo, hi)
        }
        _ => number.parse().ok()?,
    };
    Hours::from_f64(value * multiplier)
}

fn split_unit(s: &str) -> Option<(&str, f64)> {
    const UNITS: &[(&str, f64)] = &[
        ("hours", 1.0),
        ("hour", 1.0),
        ("hrs", 1.0),
        ("hr", 1.0),
        ("h", 1.0),
        ("days", HOURS_PER_DAY),
        ("day", HOURS_PER_DAY),
        ("d", HOURS_PER_DAY),
    ];
    for (suffix, multiplier) in UNITS {
        if let Some(number) = s.strip_suffix(suffix) {
            return Some((number, *multiplier));
        }
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    Some((s, 1.0))
}

/// Keys of `record` outside `known`, for logging.
pub fn unknown_keys<'a>(record: &'a Map<String, Value>, known: &[&str]) -> Vec<&'a str> {
    record
        .keys()
        .map(String::as_str)
        .filter(|k| !known.contains(k))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!(6), Estimate::Valid(Hours::from_whole(6)))]
    #[case(json!(2.5), Estimate::Valid(Hours::from_centi(250)))]
    #[case(json!("6"), Estimate::Valid(Hours::from_whole(6)))]
    #[case(json!("6h"), Estimate::Valid(Hours::from_whole(6)))]
    #[case(json!("1.5 hours"), Estimate::Valid(Hours::from_centi(150)))]
    #[case(json!("2-4 hours"), Estimate::Valid(Hours::from_whole(3)))]
    #[case(json!("2 days"), Estimate::Valid(Hours::from_whole(16)))]
    #[case(json!(-3), Estimate::Malformed)]
    #[case(json!("-3h"), Estimate::Malformed)]
    #[case(json!("a while"), Estimate::Malformed)]
    #[case(json!("4-2 hours"), Estimate::Malformed)]
    #[case(json!(true), Estimate::Malformed)]
    #[case(json!(null), Estimate::Absent)]
    #[case(json!(""), Estimate::Absent)]
    fn estimate_coercion(#[case] value: Value, #[case] expected: Estimate) {
        assert_eq!(estimate(Some(&value)), expected);
    }

    #[test]
    fn missing_estimate_is_absent() {
        assert_eq!(estimate(None), Estimate::Absent);
    }

    #[test]
    fn ids_accept_numbers() {
        assert_eq!(id_value(&json!(1)), Some("1".to_string()));
        assert_eq!(id_value(&json!(" a ")), Some("a".to_string()));
        assert_eq!(id_value(&json!("")), None);
        assert_eq!(id_value(&json!([1])), None);
    }

    #[test]
    fn field_skips_nulls() {
        let record = json!({"parent": null, "parent_id": "1"});
        let map = record.as_object().unwrap();
        assert_eq!(field(map, &["parent", "parent_id"]), Some(&json!("1")));
    }
}
