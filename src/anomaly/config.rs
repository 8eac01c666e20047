// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Configuration types for the anomaly detector

use serde::{Deserialize, Serialize};

use super::quantile::QuantileMethod;
use crate::table::Table;

/// Which column holds the transaction amount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountColumn {
    /// Zero-based column position
    Index(usize),
    Name(String),
}

impl Default for AmountColumn {
    fn default() -> Self {
        AmountColumn::Name("amount".to_string())
    }
}

impl AmountColumn {
    pub fn resolve(&self, table: &Table) -> Option<usize> {
        match self {
            AmountColumn::Index(idx) => (*idx < table.columns().len()).then_some(*idx),
            AmountColumn::Name(name) => table.column_index(name),
        }
    }
}

/// Configuration for the anomaly detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    pub quantile_method: QuantileMethod,
    /// Fence distance from the quartiles, in IQRs
    pub iqr_multiplier: f64,
    /// Row identifier left out of duplicate comparison
    pub id_column: Option<String>,
    /// Explicit duplicate key; all non-id columns when unset
    pub duplicate_key_columns: Option<Vec<String>>,
    pub histogram_bins: usize,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            quantile_method: QuantileMethod::Linear,
            iqr_multiplier: 1.5,
            id_column: None,
            duplicate_key_columns: None,
            histogram_bins: 20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnomalyConfig::default();
        assert_eq!(config.quantile_method, QuantileMethod::Linear);
        assert_eq!(config.iqr_multiplier, 1.5);
        assert_eq!(config.histogram_bins, 20);
        assert!(config.duplicate_key_columns.is_none());
    }

    #[test]
    fn test_amount_column_from_json() {
        let by_name: AmountColumn = serde_json::from_str(r#""total""#).unwrap();
        let by_index: AmountColumn = serde_json::from_str("3").unwrap();
        assert_eq!(by_name, AmountColumn::Name("total".to_string()));
        assert_eq!(by_index, AmountColumn::Index(3));
    }

    #[test]
    fn test_amount_column_resolve() {
        let table = Table::new(vec!["id".to_string(), "amount".to_string()], vec![]).unwrap();
        assert_eq!(AmountColumn::default().resolve(&table), Some(1));
        assert_eq!(AmountColumn::Index(0).resolve(&table), Some(0));
        assert_eq!(AmountColumn::Index(2).resolve(&table), None);
        assert_eq!(AmountColumn::Name("total".into()).resolve(&table), None);
    }
}
