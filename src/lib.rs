//! YP Bank Message Parser Library
//!
//! A library for detecting and parsing banking messages from heterogeneous
//! core systems into one uniform record shape.
//!
//! # Supported Formats
//!
//! - **SWIFT MT**: MT103, MT202 and, with the enhanced profile, MT515,
//!   MT700, MT798, MT950 and MT101
//! - **ISO 20022**: pacs.008 (pacs.009, camt.053 and camt.052 are recognised)
//! - **TCS BaNCS**: XML, JSON and fixed-width flat records
//! - **FIS**: JSON, fixed-width and pipe-delimited records
//! - **Fiserv**: DNA (JSON) and Premier (comma-delimited)
//! - **Temenos**: JSON, XML and T24 `KEY=VALUE` records
//!
//! COBOL sources are detected but need the enterprise edition.
//!
//! # Examples
//!
//! ## Parsing with auto-detection
//!
//! ```
//! use ypbank_parser::{detect, FormatLabel, MessageParser};
//!
//! let payload = r#"{"transactionId": "TXN-1001", "amount": 250.0, "currency": "INR"}"#;
//! assert_eq!(detect(payload), FormatLabel::BancsJson);
//!
//! let parser = MessageParser::new();
//! let record = parser.parse(payload, None)?;
//! assert_eq!(record.message_type(), "BANCS_JSON");
//! assert_eq!(record.get_f64("amount"), Some(250.0));
//! # Ok::<(), ypbank_parser::Error>(())
//! ```
//!
//! ## Batch parsing
//!
//! ```
//! use ypbank_parser::MessageParser;
//!
//! let parser = MessageParser::new();
//! let results = parser.batch_parse(&["", r#"{"transactionId": "DNA-7"}"#]);
//! assert!(results[0].is_error());
//! assert_eq!(results[1].record().map(|r| r.message_type()), Some("FISERV_DNA"));
//! ```

pub mod error;
pub mod types;
pub mod config;
pub mod field_tables;
mod extract;
pub mod detector;
pub mod registry;
pub mod swift_mt_format;
pub mod iso20022_format;
pub mod bancs_format;
pub mod fis_format;
pub mod fiserv_format;
pub mod temenos_format;
pub mod enterprise;
pub mod parser;

// Re-export commonly used types
pub use config::{ParserConfig, SwiftProfile};
pub use detector::{detect, detect_value};
pub use error::{Error, Result};
pub use parser::MessageParser;
pub use swift_mt_format::is_valid_bic;
pub use types::{BatchOutcome, DebitCredit, ErrorRecord, FormatLabel, MetricsSnapshot, ParseMetadata, ParsedRecord};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_named_label_round_trips() {
        for label in FormatLabel::NAMED {
            assert_eq!(label.to_string().parse::<FormatLabel>().unwrap(), label);
        }
    }

    #[test]
    fn test_detected_labels_route_to_an_extractor() {
        let parser = MessageParser::new();
        for label in FormatLabel::NAMED {
            if matches!(label, FormatLabel::Cobol | FormatLabel::Unknown) {
                continue;
            }
            assert!(parser.registry().resolve(&label.to_string()).is_some(), "{label}");
        }
        assert!(parser.registry().resolve("MT103").is_some());
    }
}
