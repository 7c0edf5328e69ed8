//! Extractor registry.
//!
//! Maps a format label to the extractor that handles it. Extractors are
//! consulted in registration order and the first one whose [`handles`]
//! test accepts the label wins, so more specific system names must be
//! registered before names they contain (`FISERV` before `FIS`).
//!
//! [`handles`]: MessageExtractor::handles

use crate::error::Result;
use crate::types::ParsedRecord;
use tracing::debug;

/// A parser for one system's family of payload formats.
pub trait MessageExtractor: Send + Sync {
    /// Extractor name, reported in parse metadata.
    fn name(&self) -> &'static str;

    /// Whether this extractor handles an upper-cased format label.
    fn handles(&self, label: &str) -> bool;

    /// Extract a record. `label` is the upper-cased hint or detected label;
    /// extractors use its variant keyword, or detect their own sub-format
    /// when the label names only the system.
    fn extract(&self, payload: &str, label: &str) -> Result<ParsedRecord>;
}

/// Variant keyword named in a label, e.g. `FIXED` in `FIS_FIXED`.
pub fn variant_from_label(label: &str, variants: &[&'static str]) -> Option<&'static str> {
    label
        .split(|c: char| !c.is_ascii_alphanumeric())
        .find_map(|token| variants.iter().copied().find(|variant| token.eq_ignore_ascii_case(variant)))
}

/// Ordered set of extractors.
#[derive(Default)]
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn MessageExtractor>>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an extractor after the ones already present.
    pub fn register(&mut self, extractor: Box<dyn MessageExtractor>) {
        debug!(extractor = extractor.name(), "extractor registered");
        self.extractors.push(extractor);
    }

    /// First extractor that handles the label (matched case-insensitively).
    pub fn resolve(&self, label: &str) -> Option<&dyn MessageExtractor> {
        let label = label.to_uppercase();
        self.extractors
            .iter()
            .find(|extractor| extractor.handles(&label))
            .map(|extractor| extractor.as_ref())
    }

    /// Names of registered extractors, in order.
    pub fn names(&self) -> Vec<&'static str> {
        self.extractors.iter().map(|extractor| extractor.name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str);

    impl MessageExtractor for Fixed {
        fn name(&self) -> &'static str {
            self.0
        }

        fn handles(&self, label: &str) -> bool {
            label.contains(self.0)
        }

        fn extract(&self, _payload: &str, label: &str) -> Result<ParsedRecord> {
            Ok(ParsedRecord::new(label, self.0, "TEST"))
        }
    }

    #[test]
    fn test_first_registered_match_wins() {
        let mut registry = ExtractorRegistry::new();
        registry.register(Box::new(Fixed("FISERV")));
        registry.register(Box::new(Fixed("FIS")));

        assert_eq!(registry.resolve("fiserv_dna").unwrap().name(), "FISERV");
        assert_eq!(registry.resolve("FIS_JSON").unwrap().name(), "FIS");
        assert!(registry.resolve("TEMENOS_XML").is_none());
        assert_eq!(registry.names(), vec!["FISERV", "FIS"]);
    }

    #[test]
    fn test_variant_from_label() {
        let variants = ["XML", "JSON", "FLAT"];
        assert_eq!(variant_from_label("BANCS_FLAT", &variants), Some("FLAT"));
        assert_eq!(variant_from_label("bancs-json", &variants), Some("JSON"));
        assert_eq!(variant_from_label("BANCS", &variants), None);
    }
}
