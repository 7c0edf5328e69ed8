//! Format detection.
//!
//! Detection is an ordered decision table: each [`DetectionRule`] inspects
//! the payload and either claims it or passes. The first rule that claims
//! a payload wins. There is no scoring and no backtracking, so formats that
//! share discriminators are separated only by the order of the table.

use crate::types::FormatLabel;
use regex::Regex;
use serde_json::{Map, Value};
use std::cell::OnceCell;
use std::sync::OnceLock;
use tracing::debug;

/// Payload under inspection, with a lazily parsed JSON view shared by rules.
pub struct Probe<'a> {
    payload: &'a str,
    json: OnceCell<Option<Map<String, Value>>>,
}

impl<'a> Probe<'a> {
    pub fn new(payload: &'a str) -> Self {
        Self {
            payload,
            json: OnceCell::new(),
        }
    }

    pub fn payload(&self) -> &'a str {
        self.payload
    }

    /// The payload as a JSON object, if it parses as one.
    pub fn json(&self) -> Option<&Map<String, Value>> {
        self.json
            .get_or_init(|| match serde_json::from_str::<Value>(self.payload.trim()) {
                Ok(Value::Object(map)) => Some(map),
                _ => None,
            })
            .as_ref()
    }
}

/// One row of the detection table.
pub struct DetectionRule {
    pub name: &'static str,
    pub apply: fn(&Probe<'_>) -> Option<FormatLabel>,
}

impl DetectionRule {
    /// Evaluate this rule alone against a payload.
    pub fn check(&self, payload: &str) -> Option<FormatLabel> {
        (self.apply)(&Probe::new(payload))
    }
}

/// Detection rules in priority order.
pub const RULES: &[DetectionRule] = &[
    DetectionRule { name: "swift_mt", apply: swift_mt },
    DetectionRule { name: "iso20022", apply: iso20022 },
    DetectionRule { name: "bancs_xml", apply: bancs_xml },
    DetectionRule { name: "json_discriminators", apply: json_discriminators },
    DetectionRule { name: "temenos_xml", apply: temenos_xml },
    DetectionRule { name: "cobol", apply: cobol },
];

/// A discriminator applied to a parsed JSON object.
struct JsonDiscriminator {
    label: FormatLabel,
    matches: fn(&Map<String, Value>) -> bool,
}

/// JSON discriminators in priority order.
const JSON_DISCRIMINATORS: &[JsonDiscriminator] = &[
    JsonDiscriminator {
        label: FormatLabel::FiservDna,
        matches: |json| transaction_id_prefix(json, "DNA"),
    },
    JsonDiscriminator {
        label: FormatLabel::FisJson,
        matches: |json| {
            transaction_id_prefix(json, "TXN")
                && json.contains_key("transactionType")
                && json.contains_key("branchCode")
        },
    },
    JsonDiscriminator {
        label: FormatLabel::BancsJson,
        matches: |json| transaction_id_prefix(json, "TXN"),
    },
    JsonDiscriminator {
        label: FormatLabel::TemenosJson,
        matches: |json| {
            json.get("header")
                .and_then(|header| header.get("messageId"))
                .and_then(Value::as_str)
                .is_some_and(|id| id.starts_with("TMN"))
        },
    },
];

/// Classify a payload. Never fails; unclassifiable input is `Unknown`.
pub fn detect(payload: &str) -> FormatLabel {
    if payload.trim().is_empty() {
        return FormatLabel::Unknown;
    }

    let probe = Probe::new(payload);
    for rule in RULES {
        if let Some(label) = (rule.apply)(&probe) {
            debug!(rule = rule.name, label = %label, "format detected");
            return label;
        }
    }

    debug!("no detection rule matched");
    FormatLabel::Unknown
}

/// Classify an arbitrary JSON value. Anything but a string is `Unknown`.
pub fn detect_value(value: &Value) -> FormatLabel {
    match value {
        Value::String(payload) => detect(payload),
        _ => FormatLabel::Unknown,
    }
}

fn transaction_id_prefix(json: &Map<String, Value>, prefix: &str) -> bool {
    json.get("transactionId")
        .and_then(Value::as_str)
        .is_some_and(|id| id.starts_with(prefix))
}

pub(crate) fn swift_type_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{2:[IO](\d{3})").expect("valid SWIFT header pattern"))
}

fn swift_mt(probe: &Probe<'_>) -> Option<FormatLabel> {
    let payload = probe.payload();
    if !(payload.contains("{1:") && payload.contains("{2:") && payload.contains("{4:")) {
        return None;
    }
    let code = swift_type_regex().captures(payload)?.get(1)?.as_str();
    code.parse().ok().map(FormatLabel::SwiftMt)
}

fn iso20022(probe: &Probe<'_>) -> Option<FormatLabel> {
    let payload = probe.payload();
    (payload.contains("<?xml") && payload.contains("urn:iso:std:iso:20022")).then_some(FormatLabel::Iso20022)
}

fn bancs_xml(probe: &Probe<'_>) -> Option<FormatLabel> {
    let payload = probe.payload();
    (payload.contains("<Transaction>") || payload.contains("TransactionID")).then_some(FormatLabel::BancsXml)
}

fn json_discriminators(probe: &Probe<'_>) -> Option<FormatLabel> {
    let json = probe.json()?;
    JSON_DISCRIMINATORS
        .iter()
        .find(|discriminator| (discriminator.matches)(json))
        .map(|discriminator| discriminator.label)
}

fn temenos_xml(probe: &Probe<'_>) -> Option<FormatLabel> {
    probe
        .payload()
        .contains("<TemenosTransaction>")
        .then_some(FormatLabel::TemenosXml)
}

fn cobol_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            // sequence-number columns
            r"(?m)^\d{6}[ *]",
            r"(?i)IDENTIFICATION\s+DIVISION",
            r"(?i)PROCEDURE\s+DIVISION",
            r"(?i)\bPIC(TURE)?\s+[SXAVZ9(]",
            r"(?im)^\s*COPY\s+[A-Z0-9-]+",
        ]
        .iter()
        .map(|pattern| Regex::new(pattern).expect("valid COBOL pattern"))
        .collect()
    })
}

fn cobol(probe: &Probe<'_>) -> Option<FormatLabel> {
    cobol_patterns()
        .iter()
        .any(|pattern| pattern.is_match(probe.payload()))
        .then_some(FormatLabel::Cobol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MT103: &str = "{1:F01BANKBEBBAXXX0000000000}{2:I103BANKDEFFXXXXN}{4:\n:20:REF\n-}";

    #[test]
    fn test_empty_and_non_string_are_unknown() {
        assert_eq!(detect(""), FormatLabel::Unknown);
        assert_eq!(detect("   \n"), FormatLabel::Unknown);
        assert_eq!(detect_value(&Value::Null), FormatLabel::Unknown);
        assert_eq!(detect_value(&json!(42)), FormatLabel::Unknown);
        assert_eq!(detect_value(&json!(MT103)), FormatLabel::SwiftMt(103));
    }

    #[test]
    fn test_swift_requires_all_blocks() {
        assert_eq!(detect(MT103), FormatLabel::SwiftMt(103));
        assert_eq!(detect("{1:F01}{2:I103BANK}"), FormatLabel::Unknown);
        assert_eq!(detect("{1:F01}{2:O202BANK}{4:\n-}"), FormatLabel::SwiftMt(202));
    }

    #[test]
    fn test_iso20022_needs_declaration_and_namespace() {
        let xml = r#"<?xml version="1.0"?><Document xmlns="urn:iso:std:iso:20022:tech:xsd:pacs.008.001.10"/>"#;
        assert_eq!(detect(xml), FormatLabel::Iso20022);
        let no_decl = r#"<Document xmlns="urn:iso:std:iso:20022:tech:xsd:pacs.008.001.10"/>"#;
        assert_eq!(detect(no_decl), FormatLabel::Unknown);
    }

    #[test]
    fn test_json_discriminator_order() {
        assert_eq!(detect(r#"{"transactionId": "DNA1"}"#), FormatLabel::FiservDna);
        assert_eq!(
            detect(r#"{"transactionId": "TXN1", "transactionType": "DR", "branchCode": "001"}"#),
            FormatLabel::FisJson
        );
        assert_eq!(detect(r#"{"transactionId": "TXN1", "branchCode": "001"}"#), FormatLabel::BancsJson);
        assert_eq!(detect(r#"{"header": {"messageId": "TMN-9"}}"#), FormatLabel::TemenosJson);
        assert_eq!(detect(r#"{"transactionId": "ABC"}"#), FormatLabel::Unknown);
    }

    #[test]
    fn test_bancs_xml_precedes_temenos() {
        assert_eq!(detect("<TemenosTransaction><Ref>1</Ref></TemenosTransaction>"), FormatLabel::TemenosXml);
        assert_eq!(
            detect("<TemenosTransaction><TransactionID>1</TransactionID></TemenosTransaction>"),
            FormatLabel::BancsXml
        );
    }

    #[test]
    fn test_cobol_heuristics() {
        assert_eq!(detect("       IDENTIFICATION DIVISION.\n       PROGRAM-ID. X."), FormatLabel::Cobol);
        assert_eq!(detect("       01 WS-AMOUNT PIC 9(7)V99."), FormatLabel::Cobol);
        assert_eq!(detect("000100 01 REC."), FormatLabel::Cobol);
        assert_eq!(detect("       COPY CUSTREC."), FormatLabel::Cobol);
    }

    #[test]
    fn test_rules_are_independently_checkable() {
        let rule = RULES.iter().find(|rule| rule.name == "bancs_xml").unwrap();
        assert_eq!(rule.check("<Transaction/>"), None);
        assert_eq!(rule.check("x TransactionID y"), Some(FormatLabel::BancsXml));
    }
}
