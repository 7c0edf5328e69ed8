//! Parser configuration.

use crate::error::{Error, Result};
use crate::field_tables::{BASE_MT_TYPES, ENHANCED_MT_TYPES};
use std::str::FromStr;

/// Default contact channel quoted by enterprise-gated capabilities.
pub const DEFAULT_ENTERPRISE_CONTACT: &str = "enterprise@ypbank.example";

/// Which set of SWIFT MT message types the parser accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SwiftProfile {
    /// MT103 and MT202 only.
    Base,
    /// MT103, MT202, MT515, MT700, MT798, MT950 and MT101.
    #[default]
    Enhanced,
}

impl SwiftProfile {
    /// Message type codes accepted by this profile.
    pub fn supported_types(&self) -> &'static [u16] {
        match self {
            SwiftProfile::Base => BASE_MT_TYPES,
            SwiftProfile::Enhanced => ENHANCED_MT_TYPES,
        }
    }

    /// Extractor name reported in parse metadata.
    pub fn parser_name(&self) -> &'static str {
        match self {
            SwiftProfile::Base => "swift-mt",
            SwiftProfile::Enhanced => "swift-mt-enhanced",
        }
    }
}

impl FromStr for SwiftProfile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "base" | "basic" => Ok(SwiftProfile::Base),
            "enhanced" | "extended" => Ok(SwiftProfile::Enhanced),
            _ => Err(Error::InvalidInput(format!("unknown SWIFT profile: {}", s))),
        }
    }
}

/// Settings for [`MessageParser`](crate::parser::MessageParser).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Supported SWIFT MT set.
    pub swift_profile: SwiftProfile,
    /// Contact channel quoted by enterprise-gated capabilities.
    pub enterprise_contact: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            swift_profile: SwiftProfile::default(),
            enterprise_contact: DEFAULT_ENTERPRISE_CONTACT.to_string(),
        }
    }
}

impl ParserConfig {
    pub fn with_swift_profile(mut self, profile: SwiftProfile) -> Self {
        self.swift_profile = profile;
        self
    }

    pub fn with_enterprise_contact(mut self, contact: impl Into<String>) -> Self {
        self.enterprise_contact = contact.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_from_str() {
        assert_eq!("BASE".parse::<SwiftProfile>().unwrap(), SwiftProfile::Base);
        assert_eq!("enhanced".parse::<SwiftProfile>().unwrap(), SwiftProfile::Enhanced);
        assert!("full".parse::<SwiftProfile>().is_err());
    }

    #[test]
    fn test_default_config() {
        let config = ParserConfig::default();
        assert_eq!(config.swift_profile, SwiftProfile::Enhanced);
        assert!(config.swift_profile.supported_types().contains(&950));
        assert!(!SwiftProfile::Base.supported_types().contains(&950));
    }
}
