//! TCS BaNCS transaction parser.
//!
//! BaNCS emits the same transaction in three shapes: an XML `<Transaction>`
//! element, a JSON object keyed by `transactionId`, and a fixed-width flat
//! record (see [`BANCS_FLAT_LAYOUT`]).

use crate::error::{Error, Result};
use crate::extract::{copy_keys, decimal_value, parse_decimal, parse_json_object, require_key, slice_fixed};
use crate::field_tables::BANCS_FLAT_LAYOUT;
use crate::registry::{variant_from_label, MessageExtractor};
use crate::types::ParsedRecord;
use regex::Regex;
use std::sync::OnceLock;

const PARSER: &str = "bancs";

/// Sub-formats, as they appear in `BANCS_<VARIANT>` labels.
pub const VARIANTS: [&str; 3] = ["XML", "JSON", "FLAT"];

/// XML element name to record key.
const XML_ELEMENTS: &[(&str, &str)] = &[
    ("TransactionID", "transactionId"),
    ("AccountNumber", "accountNumber"),
    ("Amount", "amount"),
    ("Currency", "currency"),
    ("TransactionDate", "transactionDate"),
    ("TransactionType", "transactionType"),
    ("BranchCode", "branchCode"),
    ("Description", "description"),
    ("Status", "status"),
];

const JSON_KEYS: &[&str] = &[
    "transactionId",
    "accountNumber",
    "amount",
    "currency",
    "transactionDate",
    "transactionType",
    "branchCode",
    "description",
    "status",
    "channel",
];

/// Parser for BaNCS payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct BancsParser;

impl BancsParser {
    pub fn new() -> Self {
        Self
    }

    /// BaNCS sub-format of a payload: `XML`, `JSON` or `FLAT`.
    pub fn detect_format(payload: &str) -> &'static str {
        let trimmed = payload.trim_start();
        if trimmed.starts_with('<') {
            "XML"
        } else if trimmed.starts_with('{') && serde_json::from_str::<serde_json::Value>(trimmed).is_ok() {
            "JSON"
        } else {
            "FLAT"
        }
    }

    /// Parse a `<Transaction>` element by targeted element extraction.
    pub fn parse_xml(&self, payload: &str) -> Result<ParsedRecord> {
        if !root_regex().is_match(payload) {
            return Err(Error::invalid_format("BANCS_XML", "missing <Transaction> root element"));
        }

        let mut record = ParsedRecord::new("BANCS_XML", PARSER, "XML");
        let mut has_id = false;
        for (key, pattern) in xml_patterns() {
            let Some(value) = pattern.captures(payload).and_then(|caps| caps.get(1)) else {
                continue;
            };
            let value = value.as_str();
            if *key == "amount" {
                record = record.with(key, decimal_value(parse_decimal("Amount", value)?));
            } else {
                has_id |= *key == "transactionId" && !value.is_empty();
                record = record.with(key, value);
            }
        }

        if !has_id {
            return Err(Error::missing_field("BANCS_XML", "TransactionID"));
        }
        Ok(record)
    }

    /// Parse a JSON transaction; `transactionId` is required.
    pub fn parse_json(&self, payload: &str) -> Result<ParsedRecord> {
        let json = parse_json_object("BANCS_JSON", payload)?;
        require_key("BANCS_JSON", &json, "transactionId")?;
        Ok(copy_keys(ParsedRecord::new("BANCS_JSON", PARSER, "JSON"), &json, JSON_KEYS))
    }

    /// Parse a fixed-width flat record.
    pub fn parse_flat(&self, payload: &str) -> Result<ParsedRecord> {
        let mut record = ParsedRecord::new("BANCS_FLAT", PARSER, "FLAT");
        for (name, value) in slice_fixed(payload, &BANCS_FLAT_LAYOUT)? {
            match name {
                "transactionId" if value.is_empty() => {
                    return Err(Error::missing_field("BANCS_FLAT", name));
                }
                "amount" => record = record.with(name, decimal_value(parse_decimal(name, &value)?)),
                "description" if value.is_empty() => {}
                _ => record = record.with(name, value),
            }
        }
        Ok(record)
    }

    fn parse_variant(&self, payload: &str, variant: &str) -> Result<ParsedRecord> {
        match variant {
            "XML" => self.parse_xml(payload),
            "JSON" => self.parse_json(payload),
            _ => self.parse_flat(payload),
        }
    }
}

fn root_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<Transaction[\s>/]").expect("valid BaNCS root pattern"))
}

fn xml_patterns() -> &'static [(&'static str, Regex)] {
    static PATTERNS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        XML_ELEMENTS
            .iter()
            .map(|(element, key)| {
                let pattern = format!(r"<{0}>\s*([^<]*?)\s*</{0}>", element);
                (*key, Regex::new(&pattern).expect("valid BaNCS element pattern"))
            })
            .collect()
    })
}

impl MessageExtractor for BancsParser {
    fn name(&self) -> &'static str {
        PARSER
    }

    fn handles(&self, label: &str) -> bool {
        label.contains("BANCS")
    }

    fn extract(&self, payload: &str, label: &str) -> Result<ParsedRecord> {
        let variant = variant_from_label(label, &VARIANTS).unwrap_or_else(|| Self::detect_format(payload));
        self.parse_variant(payload, variant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const XML: &str = "<Transaction>\n  <TransactionID>BNC-1001</TransactionID>\n  <AccountNumber>1234567890</AccountNumber>\n  <Amount>2500.50</Amount>\n  <Currency>INR</Currency>\n  <TransactionDate>2023-07-01</TransactionDate>\n</Transaction>";

    fn flat_record() -> String {
        format!(
            "{:<16}{:<20}{:<4}{:>15}{:<3}{:<8}{:<6}{:<40}",
            "BNC0000000001", "00012345678901234567", "DR", "1250.75", "INR", "20230701", "BR0001", "ATM WITHDRAWAL"
        )
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(BancsParser::detect_format(XML), "XML");
        assert_eq!(BancsParser::detect_format(r#"{"transactionId": "TXN1"}"#), "JSON");
        assert_eq!(BancsParser::detect_format(&flat_record()), "FLAT");
    }

    #[test]
    fn test_parse_xml() {
        let record = BancsParser::new().parse_xml(XML).unwrap();
        assert_eq!(record.message_type(), "BANCS_XML");
        assert_eq!(record.get_str("transactionId"), Some("BNC-1001"));
        assert_eq!(record.get_f64("amount"), Some(2500.5));
        assert_eq!(record.get_str("currency"), Some("INR"));
        assert!(record.get("branchCode").is_none());
    }

    #[test]
    fn test_parse_xml_errors() {
        let parser = BancsParser::new();
        assert!(matches!(
            parser.parse_xml("<Txn><TransactionID>1</TransactionID></Txn>"),
            Err(Error::InvalidFormat { .. })
        ));
        assert!(matches!(
            parser.parse_xml("<Payment><TransactionID>X1</TransactionID></Payment>"),
            Err(Error::InvalidFormat { .. })
        ));
        assert!(parser.parse_xml(r#"<Transaction type="DR"><TransactionID>1</TransactionID></Transaction>"#).is_ok());
        assert!(matches!(
            parser.parse_xml("<Transaction><Amount>1</Amount></Transaction>"),
            Err(Error::MissingField { .. })
        ));
        assert!(matches!(
            parser.parse_xml("<Transaction><TransactionID>1</TransactionID><Amount>abc</Amount></Transaction>"),
            Err(Error::MalformedValue { .. })
        ));
    }

    #[test]
    fn test_parse_json_copies_values_unchanged() {
        let payload = r#"{"transactionId": "TXN-77", "amount": "100.10", "currency": "INR", "extra": true}"#;
        let record = BancsParser::new().parse_json(payload).unwrap();
        assert_eq!(record.get_str("amount"), Some("100.10"));
        assert!(record.get("extra").is_none());

        assert!(matches!(
            BancsParser::new().parse_json(r#"{"amount": 1}"#),
            Err(Error::MissingField { .. })
        ));
        assert!(matches!(
            BancsParser::new().parse_json("{not json"),
            Err(Error::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_parse_flat() {
        let record = BancsParser::new().parse_flat(&flat_record()).unwrap();
        assert_eq!(record.get_str("transactionId"), Some("BNC0000000001"));
        assert_eq!(record.get_f64("amount"), Some(1250.75));
        assert_eq!(record.get_str("branchCode"), Some("BR0001"));
        assert_eq!(record.get_str("description"), Some("ATM WITHDRAWAL"));

        let short = &flat_record()[..60];
        assert!(matches!(BancsParser::new().parse_flat(short), Err(Error::InvalidFormat { .. })));
    }

    #[test]
    fn test_extract_uses_label_variant() {
        let parser = BancsParser::new();
        assert_eq!(parser.extract(XML, "BANCS").unwrap().message_type(), "BANCS_XML");
        assert!(parser.extract(XML, "BANCS_FLAT").is_err());
    }
}
