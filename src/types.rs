//! Common types shared by the detector, the extractors and the façade.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Format labels produced by detection or accepted as hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatLabel {
    /// SWIFT MT message with its three-digit type code.
    SwiftMt(u16),
    /// ISO 20022 XML document.
    Iso20022,
    /// TCS BaNCS XML transaction.
    BancsXml,
    /// TCS BaNCS JSON transaction.
    BancsJson,
    /// TCS BaNCS fixed-width flat record.
    BancsFlat,
    /// FIS JSON transaction.
    FisJson,
    /// FIS fixed-width record.
    FisFixed,
    /// FIS pipe-delimited record.
    FisDelimited,
    /// Fiserv DNA JSON transaction.
    FiservDna,
    /// Fiserv Premier comma-delimited record.
    FiservPremier,
    /// Temenos JSON message.
    TemenosJson,
    /// Temenos XML transaction.
    TemenosXml,
    /// Temenos T24 key=value record.
    TemenosT24,
    /// COBOL source or copybook.
    Cobol,
    /// Nothing matched.
    Unknown,
}

impl FormatLabel {
    /// Every label with a fixed spelling, in detection-table order.
    pub const NAMED: [FormatLabel; 14] = [
        FormatLabel::Iso20022,
        FormatLabel::BancsXml,
        FormatLabel::BancsJson,
        FormatLabel::BancsFlat,
        FormatLabel::FisJson,
        FormatLabel::FisFixed,
        FormatLabel::FisDelimited,
        FormatLabel::FiservDna,
        FormatLabel::FiservPremier,
        FormatLabel::TemenosJson,
        FormatLabel::TemenosXml,
        FormatLabel::TemenosT24,
        FormatLabel::Cobol,
        FormatLabel::Unknown,
    ];

    fn name(&self) -> &'static str {
        match self {
            FormatLabel::SwiftMt(_) => "MT",
            FormatLabel::Iso20022 => "ISO20022",
            FormatLabel::BancsXml => "BANCS_XML",
            FormatLabel::BancsJson => "BANCS_JSON",
            FormatLabel::BancsFlat => "BANCS_FLAT",
            FormatLabel::FisJson => "FIS_JSON",
            FormatLabel::FisFixed => "FIS_FIXED",
            FormatLabel::FisDelimited => "FIS_DELIMITED",
            FormatLabel::FiservDna => "FISERV_DNA",
            FormatLabel::FiservPremier => "FISERV_PREMIER",
            FormatLabel::TemenosJson => "TEMENOS_JSON",
            FormatLabel::TemenosXml => "TEMENOS_XML",
            FormatLabel::TemenosT24 => "TEMENOS_T24",
            FormatLabel::Cobol => "COBOL",
            FormatLabel::Unknown => "UNKNOWN",
        }
    }

    /// Whether detection failed to classify the payload.
    pub fn is_unknown(&self) -> bool {
        matches!(self, FormatLabel::Unknown)
    }
}

impl fmt::Display for FormatLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatLabel::SwiftMt(code) => write!(f, "MT{:03}", code),
            other => f.write_str(other.name()),
        }
    }
}

impl FromStr for FormatLabel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_uppercase();
        if let Some(code) = upper.strip_prefix("MT") {
            if code.len() == 3 && code.chars().all(|c| c.is_ascii_digit()) {
                if let Ok(code) = code.parse::<u16>() {
                    return Ok(FormatLabel::SwiftMt(code));
                }
            }
        }
        FormatLabel::NAMED
            .iter()
            .find(|label| label.name() == upper)
            .copied()
            .ok_or_else(|| Error::UnsupportedFormat(s.to_string()))
    }
}

/// Debit/Credit indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DebitCredit {
    /// Debit (outgoing).
    Debit,
    /// Credit (incoming).
    Credit,
}

impl FromStr for DebitCredit {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "D" | "RC" | "DBIT" | "DEBIT" => Ok(DebitCredit::Debit),
            "C" | "RD" | "CRDT" | "CREDIT" => Ok(DebitCredit::Credit),
            _ => Err(format!("Invalid debit/credit indicator: {}", s)),
        }
    }
}

impl DebitCredit {
    /// Lower-case name used in parsed records.
    pub fn as_str(&self) -> &'static str {
        match self {
            DebitCredit::Debit => "debit",
            DebitCredit::Credit => "credit",
        }
    }
}

/// Provenance attached to every parsed record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseMetadata {
    /// Correlation id, unique per parse.
    pub parse_id: Uuid,

    /// Name of the extractor that produced the record.
    pub parser: String,

    /// Detected sub-format (variant keyword or message definition).
    pub format: String,

    /// Wall-clock parse time in whole milliseconds, never below 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time_ms: Option<u64>,
}

/// Uniform record produced from any supported payload.
///
/// Extractor-specific fields sit next to the envelope keys when
/// serialized, e.g. `{"messageType": "MT103", "amount": 1000.0, ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedRecord {
    message_type: String,
    timestamp: DateTime<Utc>,
    parse_metadata: ParseMetadata,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl ParsedRecord {
    /// Start a record for the given message type.
    pub(crate) fn new(message_type: impl Into<String>, parser: &str, format: impl Into<String>) -> Self {
        Self {
            message_type: message_type.into(),
            timestamp: Utc::now(),
            parse_metadata: ParseMetadata {
                parse_id: Uuid::new_v4(),
                parser: parser.to_string(),
                format: format.into(),
                processing_time_ms: None,
            },
            fields: Map::new(),
        }
    }

    /// Add a field, builder style.
    pub(crate) fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// Add a field only when a value is present.
    pub(crate) fn with_opt<V: Into<Value>>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with(key, value),
            None => self,
        }
    }

    /// Stamp the envelope once the façade has finished with the record.
    pub(crate) fn stamped(mut self, elapsed_ms: u64) -> Self {
        self.timestamp = Utc::now();
        self.parse_metadata.processing_time_ms = Some(elapsed_ms.max(1));
        self
    }

    /// Message type label, e.g. `MT103` or `BANCS_JSON`.
    pub fn message_type(&self) -> &str {
        &self.message_type
    }

    /// Time the record was produced.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Parse provenance.
    pub fn metadata(&self) -> &ParseMetadata {
        &self.parse_metadata
    }

    /// Extractor-specific fields.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Look up a top-level field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Look up a nested field by dotted path, e.g. `sender.account`.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut current = self.fields.get(parts.next()?)?;
        for part in parts {
            current = current.get(part)?;
        }
        Some(current)
    }

    /// String value at a dotted path.
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get_path(path).and_then(Value::as_str)
    }

    /// Numeric value at a dotted path.
    pub fn get_f64(&self, path: &str) -> Option<f64> {
        self.get_path(path).and_then(Value::as_f64)
    }

    /// Serialize to the JSON interchange form.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize to indented JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rebuild a record from its JSON interchange form.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Batch slot for a payload that failed to parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
    /// Human-readable failure message.
    pub error: String,

    /// The payload exactly as supplied.
    pub original_message: Value,
}

/// Outcome of one element of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchOutcome {
    /// Payload parsed successfully.
    Parsed(ParsedRecord),
    /// Payload failed; the error is captured in place.
    Failed(ErrorRecord),
}

impl BatchOutcome {
    /// Whether this slot carries an error.
    pub fn is_error(&self) -> bool {
        matches!(self, BatchOutcome::Failed(_))
    }

    /// The parsed record, if any.
    pub fn record(&self) -> Option<&ParsedRecord> {
        match self {
            BatchOutcome::Parsed(record) => Some(record),
            BatchOutcome::Failed(_) => None,
        }
    }
}

/// Point-in-time copy of the façade counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    /// Every parse call, including rejected input.
    pub total_attempted: u64,
    /// Calls that returned a record.
    pub successful: u64,
    /// Calls that returned an error.
    pub failed: u64,
}
