// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Duplicate, IQR outlier and negative amount detection

use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};

use super::config::{AmountColumn, AnomalyConfig};
use super::quantile::{FiveNumberSummary, NumericColumn};
use crate::error::{AnalysisError, Result};
use crate::table::{CellKey, Table};

/// Tags attached to a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnomalyTag {
    Duplicate,
    OutlierHigh,
    OutlierLow,
    NegativeAmount,
}

impl AnomalyTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyTag::Duplicate => "duplicate",
            AnomalyTag::OutlierHigh => "outlier-high",
            AnomalyTag::OutlierLow => "outlier-low",
            AnomalyTag::NegativeAmount => "negative-amount",
        }
    }
}

/// Whether anomaly analysis could run at all
///
/// `ColumnMissing` and `NoNumericValues` are not the same as `Analyzed` with
/// zero anomalies: no row was examined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Analyzed,
    ColumnMissing,
    NoNumericValues,
}

impl AnalysisStatus {
    pub fn is_analyzed(&self) -> bool {
        matches!(self, AnalysisStatus::Analyzed)
    }
}

/// IQR fence computed from the amount column
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Fence {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub low: f64,
    pub high: f64,
}

#[derive(Debug, Clone)]
pub struct AnomalyReport {
    pub status: AnalysisStatus,
    pub amount_column: Option<String>,
    /// One tag set per input row
    pub flags: Vec<BTreeSet<AnomalyTag>>,
    pub fence: Option<Fence>,
    pub five_number_summary: Option<FiveNumberSummary>,
    /// Rows sharing a duplicate key, first occurrence included
    pub duplicate_groups: Vec<Vec<usize>>,
    /// Column indices compared for duplicates
    pub duplicate_key: Vec<usize>,
    pub numeric: NumericColumn,
}

impl AnomalyReport {
    fn unavailable(status: AnalysisStatus, amount_column: Option<String>, rows: usize) -> Self {
        Self {
            status,
            amount_column,
            flags: vec![BTreeSet::new(); rows],
            fence: None,
            five_number_summary: None,
            duplicate_groups: Vec::new(),
            duplicate_key: Vec::new(),
            numeric: NumericColumn::from_values(&[]),
        }
    }

    /// Total number of tags over all rows
    pub fn anomaly_count(&self) -> usize {
        self.flags.iter().map(BTreeSet::len).sum()
    }

    pub fn rows_with(&self, tag: AnomalyTag) -> Vec<usize> {
        self.flags
            .iter()
            .enumerate()
            .filter(|(_, tags)| tags.contains(&tag))
            .map(|(row, _)| row)
            .collect()
    }
}

/// Upper bound on `histogram_bins`
pub const MAX_HISTOGRAM_BINS: usize = 10_000;

pub struct AnomalyDetector {
    config: AnomalyConfig,
}

impl AnomalyDetector {
    pub fn new(config: AnomalyConfig) -> Result<Self> {
        if !config.iqr_multiplier.is_finite() || config.iqr_multiplier < 0.0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "iqr_multiplier must be a non-negative number, got {}",
                config.iqr_multiplier
            )));
        }
        if config.histogram_bins == 0 || config.histogram_bins > MAX_HISTOGRAM_BINS {
            return Err(AnalysisError::InvalidConfig(format!(
                "histogram_bins must be between 1 and {}, got {}",
                MAX_HISTOGRAM_BINS, config.histogram_bins
            )));
        }
        if matches!(&config.duplicate_key_columns, Some(cols) if cols.is_empty()) {
            return Err(AnalysisError::InvalidConfig(
                "duplicate_key_columns must not be empty".to_string(),
            ));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnomalyConfig {
        &self.config
    }

    /// Tag every row of `table`
    pub fn detect(&self, table: &Table, amount: &AmountColumn) -> AnomalyReport {
        let rows = table.row_count();

        let Some(amount_idx) = amount.resolve(table) else {
            tracing::warn!(?amount, "amount column not found, skipping anomaly analysis");
            return AnomalyReport::unavailable(AnalysisStatus::ColumnMissing, None, rows);
        };
        let amount_name = table.columns()[amount_idx].clone();

        let numeric = NumericColumn::from_table(table, amount_idx);
        let Some(summary) = numeric.five_number_summary(self.config.quantile_method) else {
            tracing::warn!(column = %amount_name, "amount column has no numeric values");
            return AnomalyReport::unavailable(
                AnalysisStatus::NoNumericValues,
                Some(amount_name),
                rows,
            );
        };

        let iqr = summary.iqr();
        let fence = Fence {
            q1: summary.q1,
            q3: summary.q3,
            iqr,
            low: summary.q1 - self.config.iqr_multiplier * iqr,
            high: summary.q3 + self.config.iqr_multiplier * iqr,
        };

        let mut flags = vec![BTreeSet::new(); rows];

        let duplicate_key = self.duplicate_key(table);
        let duplicate_groups = duplicate_groups(table, &duplicate_key);
        for group in &duplicate_groups {
            for &row in &group[1..] {
                flags[row].insert(AnomalyTag::Duplicate);
            }
        }

        for &(row, value) in numeric.values() {
            if value < fence.low {
                flags[row].insert(AnomalyTag::OutlierLow);
            } else if value > fence.high {
                flags[row].insert(AnomalyTag::OutlierHigh);
            }
            if value < 0.0 {
                flags[row].insert(AnomalyTag::NegativeAmount);
            }
        }

        tracing::debug!(
            column = %amount_name,
            numeric = numeric.len(),
            low = fence.low,
            high = fence.high,
            duplicate_groups = duplicate_groups.len(),
            "anomaly analysis complete"
        );

        AnomalyReport {
            status: AnalysisStatus::Analyzed,
            amount_column: Some(amount_name),
            flags,
            fence: Some(fence),
            five_number_summary: Some(summary),
            duplicate_groups,
            duplicate_key,
            numeric,
        }
    }

    /// Column indices compared for duplicates
    pub fn duplicate_key(&self, table: &Table) -> Vec<usize> {
        match &self.config.duplicate_key_columns {
            Some(names) => names
                .iter()
                .filter_map(|name| {
                    let idx = table.column_index(name);
                    if idx.is_none() {
                        tracing::warn!(column = %name, "duplicate key column not found");
                    }
                    idx
                })
                .collect(),
            None => table
                .columns()
                .iter()
                .enumerate()
                .filter(|(_, name)| self.config.id_column.as_deref() != Some(name.as_str()))
                .map(|(idx, _)| idx)
                .collect(),
        }
    }
}

/// Groups of rows with equal keys, in order of first occurrence
fn duplicate_groups(table: &Table, key_columns: &[usize]) -> Vec<Vec<usize>> {
    if key_columns.is_empty() {
        return Vec::new();
    }

    let mut first_seen: HashMap<Vec<CellKey<'_>>, usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();

    for (row_idx, row) in table.rows().iter().enumerate() {
        let key: Vec<CellKey<'_>> = key_columns.iter().map(|&c| row[c].key()).collect();
        match first_seen.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(groups.len());
                groups.push(vec![row_idx]);
            }
            Entry::Occupied(slot) => groups[*slot.get()].push(row_idx),
        }
    }

    groups.retain(|group| group.len() > 1);
    groups
}
