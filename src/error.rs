//! Error types for the ypbank-parser library.

use std::io;
use thiserror::Error;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during detection, extraction and dispatch.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error occurred while reading a payload.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error parsing JSON.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error parsing CSV.
    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error parsing XML.
    #[error("XML parsing error: {0}")]
    XmlError(String),

    /// Payload is missing or empty.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Payload lacks the structural envelope the extractor requires.
    #[error("Invalid {format} format: {message}")]
    InvalidFormat { format: String, message: String },

    /// Structurally valid, but the message sub-type is not supported.
    #[error("Unsupported {format} message type: {message_type}")]
    UnsupportedType { format: String, message_type: String },

    /// Required field absent after a successful structural parse.
    #[error("Missing required {format} field: {field}")]
    MissingField { format: String, field: String },

    /// Field content does not match its expected micro-format.
    #[error("Malformed value for {field}: {value}")]
    MalformedValue { field: String, value: String },

    /// Caller-asserted format contradicts detection.
    #[error("Format mismatch: asserted {asserted}, detected {detected}")]
    FormatMismatch { asserted: String, detected: String },

    /// No extractor is registered for the resolved format.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Capability is not part of this build.
    #[error("{capability} requires the enterprise edition. Contact {contact}")]
    EnterpriseRequired { capability: String, contact: String },
}

impl Error {
    pub(crate) fn invalid_format(format: &str, message: impl Into<String>) -> Self {
        Error::InvalidFormat {
            format: format.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn missing_field(format: &str, field: impl Into<String>) -> Self {
        Error::MissingField {
            format: format.to_string(),
            field: field.into(),
        }
    }

    pub(crate) fn malformed(field: impl Into<String>, value: impl Into<String>) -> Self {
        Error::MalformedValue {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Format family responsible for the failure, when one is known.
    pub fn format_family(&self) -> Option<&str> {
        match self {
            Error::InvalidFormat { format, .. }
            | Error::UnsupportedType { format, .. }
            | Error::MissingField { format, .. } => Some(format),
            Error::FormatMismatch { asserted, .. } => Some(asserted),
            Error::UnsupportedFormat(format) => Some(format),
            _ => None,
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlError(err.to_string())
    }
}

impl From<serde_xml_rs::Error> for Error {
    fn from(err: serde_xml_rs::Error) -> Self {
        Error::XmlError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_family() {
        let err = Error::missing_field("MT103", "32A");
        assert_eq!(err.format_family(), Some("MT103"));
        assert_eq!(err.to_string(), "Missing required MT103 field: 32A");

        let err = Error::InvalidInput("empty".into());
        assert_eq!(err.format_family(), None);
    }

    #[test]
    fn test_enterprise_message() {
        let err = Error::EnterpriseRequired {
            capability: "COBOL transpilation".into(),
            contact: "sales@example.com".into(),
        };
        assert!(err.to_string().contains("requires the enterprise edition"));
    }
}
