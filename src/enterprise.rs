//! Enterprise-only capabilities.
//!
//! The community build ships [`CommunityEdition`], which answers every
//! capability with [`Error::EnterpriseRequired`]. COBOL transpilation of a
//! missing payload is a no-op rather than an error.

use crate::error::{Error, Result};
use crate::types::ParsedRecord;
use serde_json::Value;

/// Capabilities reserved for the enterprise edition.
pub trait EnterpriseServices: Send + Sync {
    /// Transpile COBOL source or a copybook into a record.
    fn transpile_cobol(&self, source: Option<&str>) -> Result<Option<ParsedRecord>>;

    /// Run compliance screening over a parsed record.
    fn extract_compliance(&self, record: &ParsedRecord) -> Result<Value>;

    /// Convert a parsed record into a ledger payload.
    fn convert_to_blockchain(&self, record: &ParsedRecord) -> Result<Value>;

    /// Choose a payment route for a parsed record.
    fn smart_route(&self, record: &ParsedRecord) -> Result<Value>;
}

/// Community build: every capability is unavailable.
#[derive(Debug, Clone)]
pub struct CommunityEdition {
    contact: String,
}

impl CommunityEdition {
    pub fn new(contact: impl Into<String>) -> Self {
        Self { contact: contact.into() }
    }

    fn required(&self, capability: &str) -> Error {
        Error::EnterpriseRequired {
            capability: capability.to_string(),
            contact: self.contact.clone(),
        }
    }
}

impl EnterpriseServices for CommunityEdition {
    fn transpile_cobol(&self, source: Option<&str>) -> Result<Option<ParsedRecord>> {
        match source {
            None => Ok(None),
            Some(_) => Err(self.required("COBOL transpilation")),
        }
    }

    fn extract_compliance(&self, _record: &ParsedRecord) -> Result<Value> {
        Err(self.required("Compliance extraction"))
    }

    fn convert_to_blockchain(&self, _record: &ParsedRecord) -> Result<Value> {
        Err(self.required("Blockchain conversion"))
    }

    fn smart_route(&self, _record: &ParsedRecord) -> Result<Value> {
        Err(self.required("Smart routing"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cobol_requires_enterprise() {
        let edition = CommunityEdition::new("sales@example.com");
        assert!(edition.transpile_cobol(None).unwrap().is_none());

        let err = edition.transpile_cobol(Some("IDENTIFICATION DIVISION.")).unwrap_err();
        assert!(matches!(err, Error::EnterpriseRequired { .. }));
        assert!(err.to_string().contains("sales@example.com"));
    }

    #[test]
    fn test_other_capabilities_fail() {
        let edition = CommunityEdition::new("sales@example.com");
        let record = ParsedRecord::new("MT103", "test", "FIN");
        assert!(edition.extract_compliance(&record).is_err());
        assert!(edition.convert_to_blockchain(&record).is_err());
        assert!(edition.smart_route(&record).is_err());
    }
}
