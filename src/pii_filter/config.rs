// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Configuration types for the PII scanner

use serde::{Deserialize, Serialize};

/// PII categories, in detection priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PIIType {
    Ssn,
    Email,
    Phone,
    AccountNumber,
}

impl PIIType {
    /// Fixed evaluation order. The first matching category wins.
    pub const PRIORITY: [PIIType; 4] = [
        PIIType::Ssn,
        PIIType::Email,
        PIIType::Phone,
        PIIType::AccountNumber,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PIIType::Ssn => "ssn",
            PIIType::Email => "email",
            PIIType::Phone => "phone",
            PIIType::AccountNumber => "account_number",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PIIType::Ssn => "SSN",
            PIIType::Email => "Email",
            PIIType::Phone => "Phone",
            PIIType::AccountNumber => "Account Number",
        }
    }
}

/// How a detected cell is rewritten
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MaskingStrategy {
    #[default]
    Redact, // Whole cell becomes [REDACTED]
    Partial, // Each match becomes a typed placeholder (e.g. XXX-XX-XXXX)
}

impl MaskingStrategy {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "redact" => Some(MaskingStrategy::Redact),
            "partial" => Some(MaskingStrategy::Partial),
            _ => None,
        }
    }
}

pub const DEFAULT_SSN_PATTERN: &str = r"\b\d{3}[- ]\d{2}[- ]\d{4}\b";
pub const DEFAULT_EMAIL_PATTERN: &str = r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b";
pub const DEFAULT_PHONE_PATTERN: &str = r"(?:\(\d{3}\)\s?|\b\d{3}[-.\s]?)\d{3}[-.\s]?\d{4}\b";
pub const DEFAULT_ACCOUNT_PATTERN: &str = r"\b(?:\d{8,}|\d{4}(?:[ -]\d{4})+)\b";

/// Configuration for the PII scanner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PIIConfig {
    // Detection patterns; evaluation order is fixed regardless of field order
    pub ssn_pattern: String,
    pub email_pattern: String,
    pub phone_pattern: String,
    pub account_number_pattern: String,

    // Masking configuration
    pub mask_strategy: MaskingStrategy,
    pub redaction_text: String,

    // Columns copied through without scanning
    pub exempt_columns: Vec<String>,

    // Whitelist patterns (regex strings)
    pub whitelist_patterns: Vec<String>,
}

impl Default for PIIConfig {
    fn default() -> Self {
        Self {
            ssn_pattern: DEFAULT_SSN_PATTERN.to_string(),
            email_pattern: DEFAULT_EMAIL_PATTERN.to_string(),
            phone_pattern: DEFAULT_PHONE_PATTERN.to_string(),
            account_number_pattern: DEFAULT_ACCOUNT_PATTERN.to_string(),

            mask_strategy: MaskingStrategy::Redact,
            redaction_text: "[REDACTED]".to_string(),

            exempt_columns: Vec::new(),
            whitelist_patterns: Vec::new(),
        }
    }
}

impl PIIConfig {
    /// Configured pattern for a category
    pub fn pattern_for(&self, pii_type: PIIType) -> &str {
        match pii_type {
            PIIType::Ssn => &self.ssn_pattern,
            PIIType::Email => &self.email_pattern,
            PIIType::Phone => &self.phone_pattern,
            PIIType::AccountNumber => &self.account_number_pattern,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pii_type_as_str() {
        assert_eq!(PIIType::Ssn.as_str(), "ssn");
        assert_eq!(PIIType::AccountNumber.as_str(), "account_number");
        assert_eq!(PIIType::Email.label(), "Email");
    }

    #[test]
    fn test_priority_order() {
        assert_eq!(
            PIIType::PRIORITY,
            [
                PIIType::Ssn,
                PIIType::Email,
                PIIType::Phone,
                PIIType::AccountNumber
            ]
        );
    }

    #[test]
    fn test_default_config() {
        let config = PIIConfig::default();
        assert_eq!(config.redaction_text, "[REDACTED]");
        assert_eq!(config.mask_strategy, MaskingStrategy::Redact);
        assert_eq!(config.pattern_for(PIIType::Ssn), DEFAULT_SSN_PATTERN);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: PIIConfig = serde_json::from_str(r#"{"mask_strategy": "partial"}"#).unwrap();
        assert_eq!(config.mask_strategy, MaskingStrategy::Partial);
        assert_eq!(config.email_pattern, DEFAULT_EMAIL_PATTERN);
    }
}
