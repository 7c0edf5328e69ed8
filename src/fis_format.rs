//! FIS core banking transaction parser.
//!
//! Three shapes: JSON objects, pipe-delimited records in
//! [`FIS_DELIMITED_COLUMNS`] order and 100-character fixed-width records
//! laid out by [`FIS_FIXED_LAYOUT`]. Fixed-width amounts are integer cents.

use crate::error::{Error, Result};
use crate::extract::{
    copy_keys, decimal_value, parse_cents, parse_decimal, parse_json_object, require_key, slice_fixed,
};
use crate::field_tables::{FIS_DELIMITED_COLUMNS, FIS_FIXED_LAYOUT};
use crate::registry::{variant_from_label, MessageExtractor};
use crate::types::ParsedRecord;

const PARSER: &str = "fis";

pub const VARIANTS: [&str; 3] = ["JSON", "FIXED", "DELIMITED"];

const JSON_KEYS: &[&str] = &[
    "transactionId",
    "accountNumber",
    "transactionType",
    "amount",
    "currency",
    "effectiveDate",
    "branchCode",
    "customerName",
    "description",
    "status",
];

/// Parser for FIS payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct FisParser;

impl FisParser {
    pub fn new() -> Self {
        Self
    }

    /// FIS sub-format of a payload: `JSON`, `DELIMITED` or `FIXED`.
    pub fn detect_format(payload: &str) -> &'static str {
        let trimmed = payload.trim_start();
        if trimmed.starts_with('{') && serde_json::from_str::<serde_json::Value>(trimmed).is_ok() {
            "JSON"
        } else if payload.contains('|') {
            "DELIMITED"
        } else {
            "FIXED"
        }
    }

    pub fn parse_json(&self, payload: &str) -> Result<ParsedRecord> {
        let json = parse_json_object("FIS_JSON", payload)?;
        require_key("FIS_JSON", &json, "transactionId")?;
        Ok(copy_keys(ParsedRecord::new("FIS_JSON", PARSER, "JSON"), &json, JSON_KEYS))
    }

    /// Parse a fixed-width record. The amount column holds cents.
    pub fn parse_fixed(&self, payload: &str) -> Result<ParsedRecord> {
        let mut record = ParsedRecord::new("FIS_FIXED", PARSER, "FIXED");
        for (name, value) in slice_fixed(payload, &FIS_FIXED_LAYOUT)? {
            match name {
                "transactionId" if value.is_empty() => {
                    return Err(Error::missing_field("FIS_FIXED", name));
                }
                "amount" => record = record.with(name, decimal_value(parse_cents(name, &value)?)),
                _ => record = record.with(name, value),
            }
        }
        Ok(record)
    }

    /// Parse a pipe-delimited record. Columns past the eighth are ignored.
    pub fn parse_delimited(&self, payload: &str) -> Result<ParsedRecord> {
        let parts: Vec<&str> = payload.trim_end_matches(&['\r', '\n'][..]).split('|').collect();
        if parts.len() < FIS_DELIMITED_COLUMNS.len() {
            return Err(Error::invalid_format(
                "FIS_DELIMITED",
                format!(
                    "expected {} pipe-separated fields, found {}",
                    FIS_DELIMITED_COLUMNS.len(),
                    parts.len()
                ),
            ));
        }

        let mut record = ParsedRecord::new("FIS_DELIMITED", PARSER, "DELIMITED");
        for (name, raw) in FIS_DELIMITED_COLUMNS.iter().zip(parts) {
            let value = raw.trim();
            match *name {
                "transactionId" if value.is_empty() => {
                    return Err(Error::missing_field("FIS_DELIMITED", *name));
                }
                "amount" => record = record.with(name, decimal_value(parse_decimal(name, value)?)),
                _ => record = record.with(name, value),
            }
        }
        Ok(record)
    }

    fn parse_variant(&self, payload: &str, variant: &str) -> Result<ParsedRecord> {
        match variant {
            "JSON" => self.parse_json(payload),
            "DELIMITED" => self.parse_delimited(payload),
            _ => self.parse_fixed(payload),
        }
    }
}

impl MessageExtractor for FisParser {
    fn name(&self) -> &'static str {
        PARSER
    }

    fn handles(&self, label: &str) -> bool {
        label.contains("FIS")
    }

    fn extract(&self, payload: &str, label: &str) -> Result<ParsedRecord> {
        let variant = variant_from_label(label, &VARIANTS).unwrap_or_else(|| Self::detect_format(payload));
        self.parse_variant(payload, variant)
    }
}
