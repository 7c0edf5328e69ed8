//! Fiserv transaction parser.
//!
//! DNA emits JSON objects whose `transactionId` carries a `DNA` prefix.
//! Premier emits comma-separated records in [`FISERV_PREMIER_COLUMNS`] order.

use crate::error::{Error, Result};
use crate::extract::{copy_keys, decimal_value, parse_decimal, parse_json_object, require_key};
use crate::field_tables::FISERV_PREMIER_COLUMNS;
use crate::registry::{variant_from_label, MessageExtractor};
use crate::types::ParsedRecord;
use csv::{ReaderBuilder, Trim};

const PARSER: &str = "fiserv";

pub const VARIANTS: [&str; 2] = ["DNA", "PREMIER"];

const DNA_KEYS: &[&str] = &[
    "transactionId",
    "accountNumber",
    "transactionType",
    "amount",
    "currency",
    "postingDate",
    "effectiveDate",
    "description",
    "status",
];

/// Parser for Fiserv DNA and Premier payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct FiservParser;

impl FiservParser {
    pub fn new() -> Self {
        Self
    }

    /// Fiserv sub-format of a payload: `DNA` for JSON, otherwise `PREMIER`.
    pub fn detect_format(payload: &str) -> &'static str {
        let trimmed = payload.trim_start();
        if trimmed.starts_with('{') && serde_json::from_str::<serde_json::Value>(trimmed).is_ok() {
            "DNA"
        } else {
            "PREMIER"
        }
    }

    pub fn parse_dna(&self, payload: &str) -> Result<ParsedRecord> {
        let json = parse_json_object("FISERV_DNA", payload)?;
        require_key("FISERV_DNA", &json, "transactionId")?;
        Ok(copy_keys(ParsedRecord::new("FISERV_DNA", PARSER, "DNA"), &json, DNA_KEYS))
    }

    /// Parse one comma-separated Premier record. Quoted fields may contain commas.
    pub fn parse_premier(&self, payload: &str) -> Result<ParsedRecord> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(payload.as_bytes());

        let row = match reader.records().next() {
            Some(row) => row?,
            None => return Err(Error::invalid_format("FISERV_PREMIER", "empty record")),
        };
        if row.len() < FISERV_PREMIER_COLUMNS.len() {
            return Err(Error::invalid_format(
                "FISERV_PREMIER",
                format!(
                    "expected {} comma-separated fields, found {}",
                    FISERV_PREMIER_COLUMNS.len(),
                    row.len()
                ),
            ));
        }

        let mut record = ParsedRecord::new("FISERV_PREMIER", PARSER, "PREMIER");
        for (name, value) in FISERV_PREMIER_COLUMNS.iter().zip(row.iter()) {
            match *name {
                "transactionId" if value.is_empty() => {
                    return Err(Error::missing_field("FISERV_PREMIER", *name));
                }
                "amount" => record = record.with(name, decimal_value(parse_decimal(name, value)?)),
                _ => record = record.with(name, value),
            }
        }
        Ok(record)
    }
}

impl MessageExtractor for FiservParser {
    fn name(&self) -> &'static str {
        PARSER
    }

    fn handles(&self, label: &str) -> bool {
        label.contains("FISERV")
    }

    fn extract(&self, payload: &str, label: &str) -> Result<ParsedRecord> {
        match variant_from_label(label, &VARIANTS).unwrap_or_else(|| Self::detect_format(payload)) {
            "DNA" => self.parse_dna(payload),
            _ => self.parse_premier(payload),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dna() {
        let payload = r#"{"transactionId": "DNA-20230701-01", "accountNumber": "555", "amount": 42.5, "currency": "USD"}"#;
        let record = FiservParser::new().parse_dna(payload).unwrap();
        assert_eq!(record.message_type(), "FISERV_DNA");
        assert_eq!(record.metadata().format, "DNA");
        assert_eq!(record.get_f64("amount"), Some(42.5));

        assert!(matches!(
            FiservParser::new().parse_dna(r#"{"accountNumber": "555"}"#),
            Err(Error::MissingField { .. })
        ));
    }

    #[test]
    fn test_parse_premier() {
        let payload = r#"PRM001,7788990011,DEBIT,99.95,USD,2023-07-01,"Utility bill, July""#;
        let record = FiservParser::new().parse_premier(payload).unwrap();
        assert_eq!(record.message_type(), "FISERV_PREMIER");
        assert_eq!(record.get_str("transactionCode"), Some("DEBIT"));
        assert_eq!(record.get_f64("amount"), Some(99.95));
        assert_eq!(record.get_str("description"), Some("Utility bill, July"));
    }

    #[test]
    fn test_parse_premier_short_record() {
        let err = FiservParser::new().parse_premier("PRM001,7788990011,DEBIT").unwrap_err();
        assert!(matches!(err, Error::InvalidFormat { .. }));
    }

    #[test]
    fn test_extract_detects_variant() {
        let parser = FiservParser::new();
        let record = parser
            .extract(r#"{"transactionId": "DNA1"}"#, "FISERV")
            .unwrap();
        assert_eq!(record.message_type(), "FISERV_DNA");
    }
}
