// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Regex pattern compilation for PII detection
// RegexSet indices follow the fixed category priority

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder, RegexSet, RegexSetBuilder};

use super::config::{PIIConfig, PIIType};
use crate::error::{AnalysisError, Result};

/// Compiled pattern with metadata
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub pii_type: PIIType,
    pub regex: Regex,
    pub description: &'static str,
}

/// All compiled patterns; `patterns[i]` backs `regex_set` index `i`
#[derive(Debug, Clone)]
pub struct CompiledPatterns {
    pub regex_set: RegexSet,
    pub patterns: Vec<CompiledPattern>,
    pub whitelist: Vec<Regex>,
}

impl CompiledPatterns {
    /// Check if a matched value is whitelisted
    pub fn is_whitelisted(&self, matched: &str) -> bool {
        self.whitelist.iter().any(|pattern| pattern.is_match(matched))
    }
}

/// Category descriptions, in priority order
static PATTERN_DESCRIPTIONS: Lazy<Vec<(PIIType, &'static str)>> = Lazy::new(|| {
    vec![
        (PIIType::Ssn, "US Social Security Number"),
        (PIIType::Email, "Email address"),
        (PIIType::Phone, "North American phone number"),
        (PIIType::AccountNumber, "Account number"),
    ]
});

/// Compile the configured patterns in priority order
pub fn compile_patterns(config: &PIIConfig) -> Result<CompiledPatterns> {
    let mut pattern_strings = Vec::with_capacity(PATTERN_DESCRIPTIONS.len());
    let mut patterns = Vec::with_capacity(PATTERN_DESCRIPTIONS.len());

    for (pii_type, description) in PATTERN_DESCRIPTIONS.iter() {
        let pattern = config.pattern_for(*pii_type);
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| AnalysisError::InvalidPattern {
                name: pii_type.as_str().to_string(),
                source,
            })?;
        pattern_strings.push(pattern);
        patterns.push(CompiledPattern {
            pii_type: *pii_type,
            regex,
            description: *description,
        });
    }

    let regex_set = RegexSetBuilder::new(&pattern_strings)
        .case_insensitive(true)
        .build()
        .map_err(|source| AnalysisError::InvalidPattern {
            name: "pattern set".to_string(),
            source,
        })?;

    let whitelist = config
        .whitelist_patterns
        .iter()
        .map(|pattern| {
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|source| AnalysisError::InvalidPattern {
                    name: format!("whitelist '{}'", pattern),
                    source,
                })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CompiledPatterns {
        regex_set,
        patterns,
        whitelist,
    })
}
