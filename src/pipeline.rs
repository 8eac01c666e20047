// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Request-scoped analysis: load -> redact -> detect -> summarize -> encode

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;

use crate::anomaly::{
    build_alerts, Alert, AnalysisStatus, AnomalyDetector, AnomalyTag, Fence, FiveNumberSummary,
    Histogram, NumericColumn, QuantileMethod,
};
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::pii_filter::{ColumnPii, PIIScanner, PIIType, RedactedTable};
use crate::table::Table;

/// Summary statistics over the amount column
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total_rows: usize,
    /// Rows with a numeric amount
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

impl SummaryStats {
    pub fn from_column(
        column: &NumericColumn,
        total_rows: usize,
        method: QuantileMethod,
    ) -> Option<Self> {
        let sorted = column.sorted();
        let sum: f64 = column.values().iter().map(|(_, v)| v).sum();
        Some(Self {
            total_rows,
            count: sorted.len(),
            sum,
            mean: sum / sorted.len() as f64,
            median: column.quantile(0.5, method)?,
            min: *sorted.first()?,
            max: *sorted.last()?,
        })
    }
}

/// Everything the presentation layer needs from one upload
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub status: AnalysisStatus,
    pub amount_column: Option<String>,
    pub total_rows: usize,

    pub pii_detected: Vec<ColumnPii>,
    pub pii_count: usize,

    /// Tag set per row
    pub anomalies: Vec<BTreeSet<AnomalyTag>>,
    pub anomaly_count: usize,
    pub alerts: Vec<Alert>,

    pub summary: Option<SummaryStats>,
    pub fence: Option<Fence>,
    pub five_number_summary: Option<FiveNumberSummary>,
    pub histogram: Option<Histogram>,

    /// Duplicate-key or amount columns whose values redaction rewrote
    /// before detection ran
    pub redaction_touched_columns: Vec<String>,

    pub redacted_csv: String,
    pub redacted_sha256: String,

    #[serde(skip)]
    pub redacted: RedactedTable,
}

/// Validated configuration plus compiled patterns
///
/// Holds no per-request state; one instance can serve any number of
/// independent `analyze` calls.
pub struct Analyzer {
    config: AnalysisConfig,
    delimiter: u8,
    scanner: PIIScanner,
    detector: AnomalyDetector,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        let delimiter = config.delimiter_byte()?;
        let scanner = PIIScanner::new(config.pii.clone())?;
        let detector = AnomalyDetector::new(config.anomaly.clone())?;
        Ok(Self {
            config,
            delimiter,
            scanner,
            detector,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Category of a single value, if it looks like PII
    pub fn scan_value(&self, text: &str) -> Option<PIIType> {
        self.scanner.classify(text)
    }

    /// Parse and analyze delimited text
    pub fn analyze(&self, input: &[u8]) -> Result<AnalysisReport> {
        let table = Table::from_csv(input, self.delimiter)?;
        tracing::debug!(
            rows = table.row_count(),
            columns = table.columns().len(),
            "parsed input table"
        );
        self.analyze_table(&table)
    }

    /// Redact first, then detect on the redacted table
    pub fn analyze_table(&self, table: &Table) -> Result<AnalysisReport> {
        let amount_name = self
            .config
            .amount_column
            .resolve(table)
            .map(|idx| table.columns()[idx].as_str());

        let exempt: Vec<&str> = match amount_name {
            Some(name) if !self.config.redact_amount_column => vec![name],
            _ => Vec::new(),
        };
        let redacted = self.scanner.redact_except(table, &exempt);

        let report = self.detector.detect(&redacted.table, &self.config.amount_column);
        let method = self.detector.config().quantile_method;

        let redaction_touched_columns = self.touched_columns(&redacted, amount_name);
        if !redaction_touched_columns.is_empty() {
            tracing::info!(
                columns = ?redaction_touched_columns,
                "redaction rewrote columns used for anomaly detection"
            );
        }

        let summary = SummaryStats::from_column(&report.numeric, table.row_count(), method);
        let histogram = report
            .numeric
            .histogram(self.detector.config().histogram_bins);
        let alerts = build_alerts(&report, &redacted.table, method, |row, col| {
            redacted.records[row][col].redacted
        });

        if self.config.log_detections {
            for column in &redacted.columns {
                let types: Vec<&str> = column.pii_types.iter().map(PIIType::label).collect();
                tracing::info!(
                    column = %column.column,
                    count = column.count,
                    types = ?types,
                    "PII detected and redacted"
                );
            }
            tracing::info!(
                status = ?report.status,
                anomalies = report.anomaly_count(),
                alerts = alerts.len(),
                "anomaly detection finished"
            );
        }

        let redacted_csv = redacted.table.to_csv(self.delimiter)?;
        let redacted_sha256 = format!("{:x}", Sha256::digest(redacted_csv.as_bytes()));

        Ok(AnalysisReport {
            status: report.status,
            amount_column: report.amount_column.clone(),
            total_rows: table.row_count(),
            pii_detected: redacted.columns.clone(),
            pii_count: redacted.total_redacted(),
            anomaly_count: report.anomaly_count(),
            anomalies: report.flags,
            alerts,
            summary,
            fence: report.fence,
            five_number_summary: report.five_number_summary,
            histogram,
            redaction_touched_columns,
            redacted_csv,
            redacted_sha256,
            redacted,
        })
    }

    /// Detection inputs that redaction changed, in column order
    fn touched_columns(&self, redacted: &RedactedTable, amount: Option<&str>) -> Vec<String> {
        let key = self.detector.duplicate_key(&redacted.table);
        redacted
            .table
            .columns()
            .iter()
            .enumerate()
            .filter(|(idx, name)| key.contains(idx) || Some(name.as_str()) == amount)
            .filter(|(_, name)| redacted.column_touched(name))
            .map(|(_, name)| name.clone())
            .collect()
    }
}

/// One-shot convenience around `Analyzer`
pub fn analyze(input: &[u8], config: &AnalysisConfig) -> Result<AnalysisReport> {
    Analyzer::new(config.clone())?.analyze(input)
}
