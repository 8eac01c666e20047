// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// PII Scanner
//
// Cell-level PII detection and redaction using:
// - RegexSet ordered by category priority (first match wins)
// - Whole-cell or in-place masking strategies
// - Explicitly passed, compiled configuration

pub mod config;
pub mod detector;
pub mod masking;
pub mod patterns;

pub use config::{MaskingStrategy, PIIConfig, PIIType};
pub use detector::{CellRedaction, ColumnPii, PIIScanner, RedactedTable};
