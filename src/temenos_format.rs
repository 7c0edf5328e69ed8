//! Temenos transaction parser.
//!
//! Covers the JSON message envelope (`header` + `body`), the
//! `<TemenosTransaction>` XML document and T24 `KEY=VALUE` records.

use crate::error::{Error, Result};
use crate::extract::{decimal_value, parse_decimal, parse_json_object};
use crate::registry::{variant_from_label, MessageExtractor};
use crate::types::ParsedRecord;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::{Map, Value};

const PARSER: &str = "temenos";

pub const VARIANTS: [&str; 3] = ["JSON", "XML", "T24"];

const XML_ROOT: &str = "TemenosTransaction";

/// XML element name to record key.
const XML_ELEMENTS: &[(&str, &str)] = &[
    ("TransactionRef", "transactionRef"),
    ("DebitAccount", "debitAccount"),
    ("CreditAccount", "creditAccount"),
    ("Amount", "amount"),
    ("Currency", "currency"),
    ("ValueDate", "valueDate"),
    ("TransactionType", "transactionType"),
    ("Narrative", "narrative"),
];

/// Parser for Temenos payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemenosParser;

impl TemenosParser {
    pub fn new() -> Self {
        Self
    }

    /// Temenos sub-format of a payload: `JSON`, `XML` or `T24`.
    pub fn detect_format(payload: &str) -> &'static str {
        let trimmed = payload.trim_start();
        if trimmed.starts_with('{') && serde_json::from_str::<Value>(trimmed).is_ok() {
            "JSON"
        } else if trimmed.starts_with('<') {
            "XML"
        } else {
            "T24"
        }
    }

    /// Parse the JSON envelope; `header.messageId` is required.
    pub fn parse_json(&self, payload: &str) -> Result<ParsedRecord> {
        let json = parse_json_object("TEMENOS_JSON", payload)?;
        let header = json
            .get("header")
            .and_then(Value::as_object)
            .ok_or_else(|| Error::missing_field("TEMENOS_JSON", "header"))?;
        let message_id = match header.get("messageId") {
            Some(Value::Null) | None => return Err(Error::missing_field("TEMENOS_JSON", "header.messageId")),
            Some(id) => id.clone(),
        };

        let mut record = ParsedRecord::new("TEMENOS_JSON", PARSER, "JSON")
            .with("messageId", message_id)
            .with("header", Value::Object(header.clone()));
        if let Some(body) = json.get("body") {
            record = record.with("body", body.clone());
        }
        Ok(record)
    }

    /// Parse a `<TemenosTransaction>` document.
    ///
    /// Each known element is read once; later repeats are ignored.
    pub fn parse_xml(&self, payload: &str) -> Result<ParsedRecord> {
        let elements = collect_elements(payload)?;

        let reference = elements
            .get("TransactionRef")
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| Error::missing_field("TEMENOS_XML", "TransactionRef"))?
            .to_string();

        let mut record = ParsedRecord::new("TEMENOS_XML", PARSER, "XML").with("transactionRef", reference);
        for (element, key) in XML_ELEMENTS.iter().skip(1) {
            let Some(text) = elements.get(*element).and_then(Value::as_str) else {
                continue;
            };
            record = if *key == "amount" {
                record.with(key, decimal_value(parse_decimal("Amount", text)?))
            } else {
                record.with(key, text)
            };
        }
        Ok(record)
    }

    /// Parse T24 `KEY=VALUE` lines; `TXN.REF` is required.
    pub fn parse_t24(&self, payload: &str) -> Result<ParsedRecord> {
        let mut values = Map::new();
        for line in payload.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            if !key.is_empty() {
                values.insert(key.to_string(), Value::String(value.trim().to_string()));
            }
        }

        let reference = match values.get("TXN.REF") {
            Some(Value::String(reference)) if !reference.is_empty() => reference.clone(),
            _ => return Err(Error::missing_field("TEMENOS_T24", "TXN.REF")),
        };
        Ok(ParsedRecord::new("TEMENOS_T24", PARSER, "T24")
            .with("transactionRef", reference)
            .with("values", Value::Object(values)))
    }
}

/// First text of every known element under a `<TemenosTransaction>` root.
fn collect_elements(xml: &str) -> Result<Map<String, Value>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut elements = Map::new();
    let mut current: Option<String> = None;
    let mut saw_root = false;
    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
                if !saw_root {
                    if name != XML_ROOT {
                        return Err(Error::invalid_format(
                            "TEMENOS_XML",
                            format!("expected <{}> root element, found <{}>", XML_ROOT, name),
                        ));
                    }
                    saw_root = true;
                }
                current = Some(name);
            }
            Event::Text(text) => {
                if let Some(name) = current.as_deref() {
                    if XML_ELEMENTS.iter().any(|(element, _)| *element == name) && !elements.contains_key(name) {
                        let text = text.unescape().map_err(|e| Error::XmlError(e.to_string()))?;
                        elements.insert(name.to_string(), Value::String(text.into_owned()));
                    }
                }
            }
            Event::End(_) => current = None,
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(Error::invalid_format(
            "TEMENOS_XML",
            format!("missing <{}> root element", XML_ROOT),
        ));
    }
    Ok(elements)
}

impl MessageExtractor for TemenosParser {
    fn name(&self) -> &'static str {
        PARSER
    }

    fn handles(&self, label: &str) -> bool {
        label.contains("TEMENOS") || label.contains("T24")
    }

    fn extract(&self, payload: &str, label: &str) -> Result<ParsedRecord> {
        match variant_from_label(label, &VARIANTS).unwrap_or_else(|| Self::detect_format(payload)) {
            "JSON" => self.parse_json(payload),
            "XML" => self.parse_xml(payload),
            _ => self.parse_t24(payload),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const XML: &str = r#"<?xml version="1.0"?>
<TemenosTransaction>
  <TransactionRef>FT23182ABCDE</TransactionRef>
  <DebitAccount>10001234</DebitAccount>
  <CreditAccount>20005678</CreditAccount>
  <Amount>7500.00</Amount>
  <Currency>EUR</Currency>
  <ValueDate>20230701</ValueDate>
  <Narrative>Rent &amp; service</Narrative>
</TemenosTransaction>"#;

    #[test]
    fn test_parse_json() {
        let payload = r#"{"header": {"messageId": "TMN-0001", "source": "T24"}, "body": {"amount": 12.5}}"#;
        let record = TemenosParser::new().parse_json(payload).unwrap();
        assert_eq!(record.message_type(), "TEMENOS_JSON");
        assert_eq!(record.get_str("messageId"), Some("TMN-0001"));
        assert_eq!(record.get("body"), Some(&json!({"amount": 12.5})));

        assert!(matches!(
            TemenosParser::new().parse_json(r#"{"header": {"source": "T24"}}"#),
            Err(Error::MissingField { .. })
        ));
    }

    #[test]
    fn test_parse_xml() {
        let record = TemenosParser::new().parse_xml(XML).unwrap();
        assert_eq!(record.message_type(), "TEMENOS_XML");
        assert_eq!(record.get_str("transactionRef"), Some("FT23182ABCDE"));
        assert_eq!(record.get_f64("amount"), Some(7500.0));
        assert_eq!(record.get_str("narrative"), Some("Rent & service"));
        assert!(record.get("transactionType").is_none());
    }

    #[test]
    fn test_parse_xml_requires_root_and_reference() {
        let parser = TemenosParser::new();
        assert!(matches!(
            parser.parse_xml("<Transaction><TransactionRef>X</TransactionRef></Transaction>"),
            Err(Error::InvalidFormat { .. })
        ));
        assert!(matches!(
            parser.parse_xml("<TemenosTransaction><Amount>1</Amount></TemenosTransaction>"),
            Err(Error::MissingField { .. })
        ));
    }

    #[test]
    fn test_parse_t24() {
        let payload = "TXN.REF=FT2318200001\nDEBIT.ACCT.NO=10001234\nDEBIT.AMOUNT=250.00\nNARRATIVE=a=b";
        let record = TemenosParser::new().parse_t24(payload).unwrap();
        assert_eq!(record.message_type(), "TEMENOS_T24");
        assert_eq!(record.get_str("transactionRef"), Some("FT2318200001"));
        assert_eq!(record.get("values").and_then(|v| v.get("NARRATIVE")), Some(&json!("a=b")));

        assert!(matches!(
            TemenosParser::new().parse_t24("DEBIT.AMOUNT=1"),
            Err(Error::MissingField { .. })
        ));
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(TemenosParser::detect_format(XML), "XML");
        assert_eq!(TemenosParser::detect_format("TXN.REF=1"), "T24");
        assert_eq!(TemenosParser::detect_format(r#"{"header": {}}"#), "JSON");
    }
}
