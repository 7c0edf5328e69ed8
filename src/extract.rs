//! Helpers shared by the per-system extractors.

use crate::error::{Error, Result};
use crate::field_tables::FixedLayout;
use crate::types::ParsedRecord;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;

/// Slice a fixed-width record into trimmed `(field, value)` pairs.
///
/// Fails when the payload is shorter than the layout's minimum length.
/// Optional trailing columns past the end of the payload are skipped.
pub(crate) fn slice_fixed(payload: &str, layout: &FixedLayout) -> Result<Vec<(&'static str, String)>> {
    let chars: Vec<char> = payload.trim_end_matches(&['\r', '\n'][..]).chars().collect();
    if chars.len() < layout.min_length {
        return Err(Error::invalid_format(
            layout.format,
            format!(
                "record length {} is shorter than the required {} characters",
                chars.len(),
                layout.min_length
            ),
        ));
    }

    let mut fields = Vec::with_capacity(layout.fields.len());
    for field in layout.fields {
        if field.start >= chars.len() {
            continue;
        }
        let end = field.end.min(chars.len());
        let value: String = chars[field.start..end].iter().collect();
        fields.push((field.name, value.trim().to_string()));
    }
    Ok(fields)
}

/// Parse a decimal amount, rejecting anything that is not a plain number.
pub(crate) fn parse_decimal(field: &str, raw: &str) -> Result<Decimal> {
    let cleaned = raw.trim();
    Decimal::from_str(cleaned).map_err(|_| Error::malformed(field, raw))
}

/// Parse an amount stored as integer cents.
pub(crate) fn parse_cents(field: &str, raw: &str) -> Result<Decimal> {
    let cents = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| Error::malformed(field, raw))?;
    Ok(Decimal::new(cents, 2))
}

/// JSON number for a decimal amount.
pub(crate) fn decimal_value(amount: Decimal) -> Value {
    amount.to_f64().map(Value::from).unwrap_or(Value::Null)
}

/// Parse a payload as a JSON object.
pub(crate) fn parse_json_object(format: &str, payload: &str) -> Result<Map<String, Value>> {
    let value: Value = serde_json::from_str(payload)
        .map_err(|e| Error::invalid_format(format, format!("malformed JSON: {}", e)))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(Error::invalid_format(format, "JSON payload is not an object")),
    }
}

/// Copy the listed keys onto the record unchanged. Absent keys are skipped.
pub(crate) fn copy_keys(mut record: ParsedRecord, source: &Map<String, Value>, keys: &[&str]) -> ParsedRecord {
    for key in keys {
        if let Some(value) = source.get(*key) {
            record = record.with(key, value.clone());
        }
    }
    record
}

/// Require a non-null key in a JSON object.
pub(crate) fn require_key<'a>(format: &str, source: &'a Map<String, Value>, key: &str) -> Result<&'a Value> {
    match source.get(key) {
        Some(Value::Null) | None => Err(Error::missing_field(format, key)),
        Some(value) => Ok(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field_tables::FIS_FIXED_LAYOUT;

    #[test]
    fn test_slice_fixed_too_short() {
        let err = slice_fixed("short", &FIS_FIXED_LAYOUT).unwrap_err();
        assert!(err.to_string().contains("shorter than the required 100"));
    }

    #[test]
    fn test_parse_cents() {
        let amount = parse_cents("amount", "000000000150075").unwrap();
        assert_eq!(amount.to_string(), "1500.75");
        assert!(parse_cents("amount", "12A").is_err());
    }

    #[test]
    fn test_require_key_rejects_null() {
        let map = parse_json_object("X", r#"{"a": null, "b": 1}"#).unwrap();
        assert!(require_key("X", &map, "a").is_err());
        assert!(require_key("X", &map, "b").is_ok());
        assert!(parse_json_object("X", "[1,2]").is_err());
    }
}
