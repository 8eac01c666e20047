// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Cell classification and the table redaction pass

use serde::Serialize;
use std::collections::BTreeSet;

use super::config::{PIIConfig, PIIType};
use super::masking;
use super::patterns::{compile_patterns, CompiledPatterns};
use crate::error::{AnalysisError, Result};
use crate::table::{Table, Value};

/// What the scan found in one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CellRedaction {
    pub redacted: bool,
    pub pii_type: Option<PIIType>,
}

impl CellRedaction {
    fn found(pii_type: PIIType) -> Self {
        Self {
            redacted: true,
            pii_type: Some(pii_type),
        }
    }
}

/// Per-column rollup of the redaction records
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnPii {
    pub column: String,
    pub pii_types: BTreeSet<PIIType>,
    pub count: usize,
}

/// Output of the redaction pass: same shape as the input table
#[derive(Debug, Clone)]
pub struct RedactedTable {
    pub table: Table,
    /// `records[row][col]` parallels `table.rows()[row][col]`
    pub records: Vec<Vec<CellRedaction>>,
    /// Columns with at least one redaction, in column order
    pub columns: Vec<ColumnPii>,
}

impl RedactedTable {
    pub fn total_redacted(&self) -> usize {
        self.columns.iter().map(|c| c.count).sum()
    }

    /// Whether any cell of the column was rewritten
    pub fn column_touched(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c.column == column)
    }
}

/// Regex-driven PII scanner
///
/// Holds its compiled patterns explicitly; there is no process-wide cache.
#[derive(Debug, Clone)]
pub struct PIIScanner {
    patterns: CompiledPatterns,
    config: PIIConfig,
}

impl PIIScanner {
    pub fn new(config: PIIConfig) -> Result<Self> {
        let patterns = compile_patterns(&config)?;
        let scanner = Self { patterns, config };

        // A placeholder that looks like PII would be redacted again on the next pass
        if let Some(pii_type) = scanner.classify(&scanner.config.redaction_text) {
            return Err(AnalysisError::InvalidConfig(format!(
                "redaction_text '{}' matches the {} pattern",
                scanner.config.redaction_text,
                pii_type.as_str()
            )));
        }

        for pattern in &scanner.patterns.patterns {
            tracing::debug!(
                pii_type = pattern.pii_type.as_str(),
                description = pattern.description,
                "compiled PII pattern"
            );
        }

        Ok(scanner)
    }

    pub fn config(&self) -> &PIIConfig {
        &self.config
    }

    /// Highest-priority category with a non-whitelisted match in `text`
    pub fn classify(&self, text: &str) -> Option<PIIType> {
        if text.is_empty() {
            return None;
        }

        // RegexSet indices ascend in priority order, so the first hit wins
        self.patterns
            .regex_set
            .matches(text)
            .iter()
            .map(|idx| &self.patterns.patterns[idx])
            .find(|pattern| {
                pattern
                    .regex
                    .find_iter(text)
                    .any(|mat| !self.patterns.is_whitelisted(mat.as_str()))
            })
            .map(|pattern| pattern.pii_type)
    }

    /// Scan one value; returns the category and masked text when PII is found
    pub fn scan_value(&self, value: &Value) -> Option<(PIIType, String)> {
        let text = value.to_string();
        let pii_type = self.classify(&text)?;
        Some((
            pii_type,
            masking::mask_value(&text, &self.patterns, &self.config),
        ))
    }

    /// Redact every non-exempt column of `table`
    pub fn redact(&self, table: &Table) -> RedactedTable {
        self.redact_except(table, &[])
    }

    /// Redact, additionally leaving `extra_exempt` columns untouched
    pub fn redact_except(&self, table: &Table, extra_exempt: &[&str]) -> RedactedTable {
        let exempt: Vec<bool> = table
            .columns()
            .iter()
            .map(|name| {
                self.config.exempt_columns.iter().any(|c| c == name)
                    || extra_exempt.contains(&name.as_str())
            })
            .collect();

        let mut rows = Vec::with_capacity(table.row_count());
        let mut records = Vec::with_capacity(table.row_count());
        let mut column_types: Vec<BTreeSet<PIIType>> = vec![BTreeSet::new(); table.columns().len()];
        let mut column_counts = vec![0usize; table.columns().len()];

        for row in table.rows() {
            let mut new_row = Vec::with_capacity(row.len());
            let mut row_records = Vec::with_capacity(row.len());

            for (col, value) in row.iter().enumerate() {
                let scanned = if exempt[col] {
                    None
                } else {
                    self.scan_value(value)
                };

                match scanned {
                    Some((pii_type, masked)) => {
                        column_types[col].insert(pii_type);
                        column_counts[col] += 1;
                        new_row.push(Value::Text(masked));
                        row_records.push(CellRedaction::found(pii_type));
                    }
                    None => {
                        new_row.push(value.clone());
                        row_records.push(CellRedaction::default());
                    }
                }
            }

            rows.push(new_row);
            records.push(row_records);
        }

        let columns: Vec<ColumnPii> = table
            .columns()
            .iter()
            .zip(column_types.into_iter().zip(column_counts))
            .filter(|(_, (_, count))| *count > 0)
            .map(|(name, (pii_types, count))| ColumnPii {
                column: name.clone(),
                pii_types,
                count,
            })
            .collect();

        for column in &columns {
            tracing::debug!(
                column = %column.column,
                count = column.count,
                "redacted PII cells"
            );
        }

        RedactedTable {
            table: table.with_rows(rows),
            records,
            columns,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pii_filter::config::MaskingStrategy;

    fn scanner() -> PIIScanner {
        PIIScanner::new(PIIConfig::default()).unwrap()
    }

    fn table(columns: &[&str], rows: Vec<Vec<Value>>) -> Table {
        Table::new(columns.iter().map(|c| c.to_string()).collect(), rows).unwrap()
    }

    #[test]
    fn test_classify_ssn_wins() {
        let scanner = scanner();
        assert_eq!(scanner.classify("123-45-6789"), Some(PIIType::Ssn));
    }

    #[test]
    fn test_classify_email() {
        let scanner = scanner();
        assert_eq!(scanner.classify("jane.doe@example.com"), Some(PIIType::Email));
    }

    #[test]
    fn test_classify_ten_digits_is_phone() {
        let scanner = scanner();
        assert_eq!(scanner.classify("8876543210"), Some(PIIType::Phone));
        assert_eq!(scanner.classify("123456789012"), Some(PIIType::AccountNumber));
    }

    #[test]
    fn test_classify_email_before_phone() {
        let scanner = scanner();
        assert_eq!(
            scanner.classify("555-123-4567 or ops@corp.com"),
            Some(PIIType::Email)
        );
    }

    #[test]
    fn test_classify_nothing() {
        let scanner = scanner();
        assert_eq!(scanner.classify(""), None);
        assert_eq!(scanner.classify("Office supplies purchase"), None);
    }

    #[test]
    fn test_numeric_value_is_scanned_as_string() {
        let scanner = scanner();
        let (pii_type, masked) = scanner.scan_value(&Value::Integer(12345678901)).unwrap();
        assert_eq!(pii_type, PIIType::AccountNumber);
        assert_eq!(masked, "[REDACTED]");
        assert!(scanner.scan_value(&Value::Float(245.67)).is_none());
        assert!(scanner.scan_value(&Value::Missing).is_none());
    }

    #[test]
    fn test_whitelisted_match_falls_through_to_next_category() {
        let config = PIIConfig {
            whitelist_patterns: vec![r"^support@corp\.com$".to_string()],
            ..Default::default()
        };
        let scanner = PIIScanner::new(config).unwrap();
        assert_eq!(scanner.classify("support@corp.com"), None);
        assert_eq!(
            scanner.classify("support@corp.com 555-123-4567"),
            Some(PIIType::Phone)
        );
    }

    #[test]
    fn test_redaction_text_must_not_look_like_pii() {
        let config = PIIConfig {
            redaction_text: "000-00-0000".to_string(),
            ..Default::default()
        };
        let err = PIIScanner::new(config).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidConfig(_)));
    }

    #[test]
    fn test_redact_table_preserves_shape_and_records() {
        let scanner = scanner();
        let input = table(
            &["id", "contact", "amount"],
            vec![
                vec!["1".into(), "jane@corp.com".into(), "10".into()],
                vec!["2".into(), Value::Missing, "12".into()],
                vec!["3".into(), "123-45-6789".into(), "11".into()],
            ],
        );

        let redacted = scanner.redact(&input);

        assert_eq!(redacted.table.shape(), input.shape());
        assert_eq!(redacted.table.rows()[0][1], Value::from("[REDACTED]"));
        assert_eq!(redacted.table.rows()[1][1], Value::Missing);
        assert_eq!(redacted.records[0][1], CellRedaction::found(PIIType::Email));
        assert_eq!(redacted.records[2][1], CellRedaction::found(PIIType::Ssn));
        assert!(!redacted.records[1][1].redacted);
        assert_eq!(redacted.total_redacted(), 2);
        assert_eq!(redacted.columns.len(), 1);
        assert_eq!(redacted.columns[0].column, "contact");
        assert_eq!(
            redacted.columns[0].pii_types,
            BTreeSet::from([PIIType::Ssn, PIIType::Email])
        );
        assert!(redacted.column_touched("contact"));
        assert!(!redacted.column_touched("amount"));
    }

    #[test]
    fn test_exempt_columns_pass_through() {
        let config = PIIConfig {
            exempt_columns: vec!["account".to_string()],
            ..Default::default()
        };
        let scanner = PIIScanner::new(config).unwrap();
        let input = table(
            &["account", "amount"],
            vec![vec!["12345678".into(), "5551234567".into()]],
        );

        let redacted = scanner.redact_except(&input, &["amount"]);
        assert_eq!(redacted.table, input);
        assert_eq!(redacted.total_redacted(), 0);
    }

    #[test]
    fn test_redact_is_idempotent_with_partial_masking() {
        let config = PIIConfig {
            mask_strategy: MaskingStrategy::Partial,
            ..Default::default()
        };
        let scanner = PIIScanner::new(config).unwrap();
        let input = table(
            &["note"],
            vec![
                vec!["ssn 123-45-6789".into()],
                vec!["mail a.b@c.org".into()],
                vec!["plain".into()],
            ],
        );

        let once = scanner.redact(&input);
        let twice = scanner.redact(&once.table);
        assert_eq!(once.table, twice.table);
    }
}
