//! The parsing façade.
//!
//! [`MessageParser`] resolves a format (caller hint or detection), routes
//! the payload through the [`ExtractorRegistry`], stamps timing onto the
//! record and keeps success/failure counters.

use crate::bancs_format::BancsParser;
use crate::config::ParserConfig;
use crate::detector;
use crate::enterprise::{CommunityEdition, EnterpriseServices};
use crate::error::{Error, Result};
use crate::fis_format::FisParser;
use crate::fiserv_format::FiservParser;
use crate::iso20022_format::Iso20022Parser;
use crate::registry::ExtractorRegistry;
use crate::swift_mt_format::SwiftMtParser;
use crate::temenos_format::TemenosParser;
use crate::types::{BatchOutcome, ErrorRecord, FormatLabel, MetricsSnapshot, ParsedRecord};
use serde_json::Value;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Detects, dispatches and measures parses.
///
/// Counters sit behind one lock, so one parser can be shared across threads
/// and every snapshot satisfies `successful + failed == total_attempted`.
///
/// # Examples
///
/// ```
/// use ypbank_parser::MessageParser;
///
/// let parser = MessageParser::new();
/// let record = parser.parse(r#"{"transactionId": "DNA-1", "amount": 5}"#, None)?;
/// assert_eq!(record.message_type(), "FISERV_DNA");
/// assert_eq!(parser.metrics().successful, 1);
/// # Ok::<(), ypbank_parser::Error>(())
/// ```
pub struct MessageParser {
    registry: ExtractorRegistry,
    enterprise: Box<dyn EnterpriseServices>,
    config: ParserConfig,
    metrics: Mutex<MetricsSnapshot>,
}

impl Default for MessageParser {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageParser {
    /// Parser with the default configuration.
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    pub fn with_config(config: ParserConfig) -> Self {
        let mut registry = ExtractorRegistry::new();
        registry.register(Box::new(SwiftMtParser::new(config.swift_profile)));
        registry.register(Box::new(Iso20022Parser::new()));
        registry.register(Box::new(BancsParser::new()));
        // FISERV labels contain FIS
        registry.register(Box::new(FiservParser::new()));
        registry.register(Box::new(FisParser::new()));
        registry.register(Box::new(TemenosParser::new()));

        Self {
            registry,
            enterprise: Box::new(CommunityEdition::new(config.enterprise_contact.clone())),
            config,
            metrics: Mutex::new(MetricsSnapshot::default()),
        }
    }

    /// Replace the enterprise capability provider.
    pub fn with_enterprise_services(mut self, services: Box<dyn EnterpriseServices>) -> Self {
        self.enterprise = services;
        self
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn registry(&self) -> &ExtractorRegistry {
        &self.registry
    }

    pub fn enterprise(&self) -> &dyn EnterpriseServices {
        self.enterprise.as_ref()
    }

    /// Classify a payload without parsing it.
    pub fn detect(&self, payload: &str) -> FormatLabel {
        detector::detect(payload)
    }

    /// Parse a payload, using `hint` as the format when given.
    ///
    /// Every call counts as an attempt; the outcome bumps exactly one of the
    /// success and failure counters.
    pub fn parse(&self, payload: &str, hint: Option<&str>) -> Result<ParsedRecord> {
        let started = Instant::now();

        match self.dispatch(payload, hint) {
            Ok(record) => {
                self.count(true);
                let elapsed = started.elapsed().as_millis() as u64;
                Ok(record.stamped(elapsed))
            }
            Err(err) => Err(self.failure(err)),
        }
    }

    /// Parse an arbitrary JSON value. Only strings are payloads.
    pub fn parse_value(&self, payload: &Value, hint: Option<&str>) -> Result<ParsedRecord> {
        match payload {
            Value::String(payload) => self.parse(payload, hint),
            other => Err(self.failure(Error::InvalidInput(format!(
                "payload must be a string, got {}",
                json_kind(other)
            )))),
        }
    }

    /// Parse with a caller-asserted format that detection must not contradict.
    ///
    /// When detection cannot classify the payload the assertion is trusted.
    pub fn parse_with_format(&self, payload: &str, format: &str) -> Result<ParsedRecord> {
        let detected = detector::detect(payload);
        if !detected.is_unknown() && !formats_agree(format, detected) {
            return Err(self.failure(Error::FormatMismatch {
                asserted: format.to_string(),
                detected: detected.to_string(),
            }));
        }
        self.parse(payload, Some(format))
    }

    /// Parse each payload independently. Failures occupy their own slot.
    pub fn batch_parse<S: AsRef<str>>(&self, payloads: &[S]) -> Vec<BatchOutcome> {
        let outcomes: Vec<BatchOutcome> = payloads
            .iter()
            .map(|payload| {
                let payload = payload.as_ref();
                match self.parse(payload, None) {
                    Ok(record) => BatchOutcome::Parsed(record),
                    Err(err) => BatchOutcome::Failed(ErrorRecord {
                        error: err.to_string(),
                        original_message: Value::String(payload.to_string()),
                    }),
                }
            })
            .collect();
        log_batch(&outcomes);
        outcomes
    }

    /// Batch over JSON values; non-string elements become error slots.
    pub fn batch_parse_values(&self, payloads: &[Value]) -> Vec<BatchOutcome> {
        let outcomes: Vec<BatchOutcome> = payloads
            .iter()
            .map(|payload| match self.parse_value(payload, None) {
                Ok(record) => BatchOutcome::Parsed(record),
                Err(err) => BatchOutcome::Failed(ErrorRecord {
                    error: err.to_string(),
                    original_message: payload.clone(),
                }),
            })
            .collect();
        log_batch(&outcomes);
        outcomes
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        *self.counters()
    }

    pub fn reset_metrics(&self) {
        *self.counters() = MetricsSnapshot::default();
    }

    // Counter updates cannot panic, so a poisoned lock still holds consistent counts.
    fn counters(&self) -> MutexGuard<'_, MetricsSnapshot> {
        self.metrics.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn dispatch(&self, payload: &str, hint: Option<&str>) -> Result<ParsedRecord> {
        if payload.trim().is_empty() {
            return Err(Error::InvalidInput("payload is empty".to_string()));
        }

        let label = match hint.map(str::trim).filter(|hint| !hint.is_empty()) {
            Some(hint) => hint.to_uppercase(),
            None => detector::detect(payload).to_string(),
        };
        debug!(label = %label, hinted = hint.is_some(), "resolved format");

        if label.contains("COBOL") {
            return self
                .enterprise
                .transpile_cobol(Some(payload))?
                .ok_or_else(|| Error::UnsupportedFormat(label));
        }
        if label == FormatLabel::Unknown.to_string() {
            return Err(Error::UnsupportedFormat(
                "payload does not match any known format".to_string(),
            ));
        }

        let extractor = self
            .registry
            .resolve(&label)
            .ok_or_else(|| Error::UnsupportedFormat(label.clone()))?;
        debug!(extractor = extractor.name(), label = %label, "dispatching");
        extractor.extract(payload, &label)
    }

    /// Record one attempt and its outcome under a single lock.
    fn count(&self, succeeded: bool) {
        let mut metrics = self.counters();
        metrics.total_attempted += 1;
        if succeeded {
            metrics.successful += 1;
        } else {
            metrics.failed += 1;
        }
    }

    fn failure(&self, err: Error) -> Error {
        self.count(false);
        warn!(error = %err, "parse failed");
        err
    }
}

/// Whether an asserted format is compatible with a detected label.
///
/// A full label (`BANCS_XML`, `MT103`) must match exactly; a bare system
/// name (`bancs`, `swift`, `pacs.008`) only has to name the same system.
/// `T24` names the Temenos key=value variant, not the whole system.
fn formats_agree(asserted: &str, detected: FormatLabel) -> bool {
    if let Ok(label) = asserted.parse::<FormatLabel>() {
        return label == detected;
    }
    let asserted = asserted.trim().to_uppercase();
    if asserted.contains("T24") {
        return detected == FormatLabel::TemenosT24;
    }
    family(&asserted).is_some_and(|family| family == detected_family(detected))
}

fn family(label: &str) -> Option<&'static str> {
    const FAMILIES: &[(&[&str], &str)] = &[
        (&["SWIFT"], "SWIFT"),
        (&["ISO", "PACS", "CAMT"], "ISO20022"),
        (&["BANCS"], "BANCS"),
        (&["FISERV"], "FISERV"),
        (&["FIS"], "FIS"),
        (&["TEMENOS"], "TEMENOS"),
        (&["COBOL"], "COBOL"),
    ];
    if label.starts_with("MT") {
        return Some("SWIFT");
    }
    FAMILIES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|keyword| label.contains(keyword)))
        .map(|(_, family)| *family)
}

fn detected_family(detected: FormatLabel) -> &'static str {
    match detected {
        FormatLabel::SwiftMt(_) => "SWIFT",
        FormatLabel::Iso20022 => "ISO20022",
        FormatLabel::BancsXml | FormatLabel::BancsJson | FormatLabel::BancsFlat => "BANCS",
        FormatLabel::FisJson | FormatLabel::FisFixed | FormatLabel::FisDelimited => "FIS",
        FormatLabel::FiservDna | FormatLabel::FiservPremier => "FISERV",
        FormatLabel::TemenosJson | FormatLabel::TemenosXml | FormatLabel::TemenosT24 => "TEMENOS",
        FormatLabel::Cobol => "COBOL",
        FormatLabel::Unknown => "UNKNOWN",
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn log_batch(outcomes: &[BatchOutcome]) {
    let failed = outcomes.iter().filter(|outcome| outcome.is_error()).count();
    info!(
        total = outcomes.len(),
        parsed = outcomes.len() - failed,
        failed,
        "batch parsed"
    );
}
