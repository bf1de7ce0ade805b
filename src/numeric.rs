//! Lenient money parsing for loosely-typed backend payloads.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde_json::Value;

static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,\s]+").expect("valid separator regex"));

/// Parse a JSON value into a `Decimal`.
///
/// Accepts numbers and numeric strings; strings may contain thousands
/// separators, whitespace, or scientific notation. Returns `None` for
/// anything that is not a finite number.
pub fn parse_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(Decimal::from(i));
            }
            if let Some(u) = n.as_u64() {
                return Some(Decimal::from(u));
            }
            let f = n.as_f64()?;
            if !f.is_finite() {
                return None;
            }
            parse_decimal_str(&f.to_string())
        }
        Value::String(s) => parse_decimal_str(s),
        _ => None,
    }
}

/// Parse a string into a `Decimal`, stripping separators and whitespace.
pub fn parse_decimal_str(s: &str) -> Option<Decimal> {
    let cleaned = SEPARATORS.replace_all(s.trim(), "");
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()
}

/// `parse_decimal`, degrading anything unusable (including a missing value) to zero.
pub fn decimal_or_zero(value: Option<&Value>) -> Decimal {
    value.and_then(parse_decimal).unwrap_or(Decimal::ZERO)
}

/// True for JSON values a dashboard would treat as "set": not null and not an empty string.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

/// JavaScript-style truthiness for flag fields such as `in_trade`.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
