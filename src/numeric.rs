//! Locale-tolerant numeric parsing.
//!
//! Source files mix decimal conventions: `-78.1834`, `-78,1834`, and
//! thousands-separated `1.234,56` all appear in the wild. Coordinates must
//! parse to a finite value or the row is dropped, so the contract here is
//! `Option<f64>` with `None` for anything unusable — `NaN`/`Infinity` never
//! travel downstream.

use serde_json::Value;

/// Parse a possibly locale-formatted numeric string.
///
/// Rules, in order:
/// - empty input → `None`
/// - interior whitespace is stripped
/// - both `,` and `.` present → `.` is a thousands separator (removed),
///   `,` is the decimal separator (becomes `.`)
/// - only `,` present → `,` is the decimal separator
/// - otherwise parsed as-is
///
/// Returns `Some` only for finite values.
pub fn parse_number(raw: &str) -> Option<f64> {
    let mut s: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if s.is_empty() {
        return None;
    }
    if s.contains(',') && s.contains('.') {
        s = s.replace('.', "").replace(',', ".");
    } else if s.contains(',') {
        s = s.replace(',', ".");
    }
    match s.parse::<f64>() {
        Ok(n) if n.is_finite() => Some(n),
        _ => None,
    }
}

/// Parse a JSON value as a number.
///
/// Already-numeric values pass through (if finite); strings go through
/// [`parse_number`]; anything else is `None`. Structured-query backends
/// return typed numbers while tabular files return strings, and both land
/// here.
pub fn parse_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_thousands_and_decimal_comma() {
        assert_eq!(parse_number("1.234,56"), Some(1234.56));
    }

    #[test]
    fn test_plain_decimal_point() {
        assert_eq!(parse_number("1234.56"), Some(1234.56));
        assert_eq!(parse_number("-78.1834"), Some(-78.1834));
    }

    #[test]
    fn test_decimal_comma_only() {
        assert_eq!(parse_number("-78,1834"), Some(-78.1834));
    }

    #[test]
    fn test_interior_whitespace_stripped() {
        assert_eq!(parse_number(" 1 234,5 "), Some(1234.5));
    }

    #[test]
    fn test_garbage_and_empty() {
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("   "), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("NaN"), None);
    }

    #[test]
    fn test_value_passthrough() {
        assert_eq!(parse_value(&json!(-1.83)), Some(-1.83));
        assert_eq!(parse_value(&json!("-1,83")), Some(-1.83));
        assert_eq!(parse_value(&json!(null)), None);
        assert_eq!(parse_value(&json!(true)), None);
    }
}
