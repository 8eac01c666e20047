// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Masking strategies for detected PII

use regex::Captures;
use std::borrow::Cow;

use super::config::{MaskingStrategy, PIIConfig, PIIType};
use super::patterns::CompiledPatterns;

/// Passes of `partial_mask` before a cell that keeps changing is redacted whole
const MAX_PARTIAL_PASSES: usize = 8;

/// Rewrite a cell that was classified as PII
///
/// `Redact` replaces the whole cell. `Partial` replaces every
/// non-whitelisted match of every pattern, in priority order, with the
/// category placeholder and keeps the surrounding text. Placeholders can
/// join neighbouring text into a new match (`o@76.XXXXXXXXX` reads as an
/// email), so the passes repeat until the text is stable.
pub fn mask_value(text: &str, patterns: &CompiledPatterns, config: &PIIConfig) -> String {
    match config.mask_strategy {
        MaskingStrategy::Redact => config.redaction_text.clone(),
        MaskingStrategy::Partial => {
            let mut masked = partial_mask(text, patterns);
            for _ in 0..MAX_PARTIAL_PASSES {
                let next = partial_mask(&masked, patterns);
                if next == masked {
                    return masked;
                }
                masked = next;
            }
            tracing::warn!("partial masking did not settle, redacting whole cell");
            config.redaction_text.clone()
        }
    }
}

/// One pass of every pattern over the text
fn partial_mask(text: &str, patterns: &CompiledPatterns) -> String {
    let mut masked = text.to_string();

    for pattern in &patterns.patterns {
        let replaced = pattern.regex.replace_all(&masked, |caps: &Captures| {
            let matched = &caps[0];
            if patterns.is_whitelisted(matched) {
                matched.to_string()
            } else {
                placeholder(pattern.pii_type, matched)
            }
        });
        let next = match replaced {
            Cow::Borrowed(_) => None,
            Cow::Owned(s) => Some(s),
        };
        if let Some(next) = next {
            masked = next;
        }
    }

    masked
}

/// Category placeholder for a single match
fn placeholder(pii_type: PIIType, matched: &str) -> String {
    match pii_type {
        PIIType::Ssn => "XXX-XX-XXXX".to_string(),
        PIIType::Phone => "XXX-XXX-XXXX".to_string(),
        PIIType::Email => "REDACTED@EMAIL.COM".to_string(),
        // Keep the length so column widths survive
        PIIType::AccountNumber => "X".repeat(matched.chars().count()),
    }
}
