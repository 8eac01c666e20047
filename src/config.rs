// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Top-level configuration for an analysis run

#[cfg(feature = "python")]
use pyo3::prelude::*;
#[cfg(feature = "python")]
use pyo3::types::PyDict;
use serde::{Deserialize, Serialize};

#[cfg(feature = "python")]
use crate::anomaly::QuantileMethod;
use crate::anomaly::{AmountColumn, AnomalyConfig};
use crate::error::{AnalysisError, Result};
#[cfg(feature = "python")]
use crate::pii_filter::MaskingStrategy;
use crate::pii_filter::PIIConfig;

/// Everything an `Analyzer` needs; passed in explicitly, never global
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub pii: PIIConfig,
    pub anomaly: AnomalyConfig,
    pub amount_column: AmountColumn,
    /// Field delimiter of the input and of the redacted output
    pub delimiter: char,
    /// Scan the amount column for PII too (off keeps amounts untouched)
    pub redact_amount_column: bool,
    /// Log per-column detection summaries at info level
    pub log_detections: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            pii: PIIConfig::default(),
            anomaly: AnomalyConfig::default(),
            amount_column: AmountColumn::default(),
            delimiter: ',',
            redact_amount_column: false,
            log_detections: true,
        }
    }
}

impl AnalysisConfig {
    /// Parse a JSON document; missing keys keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Delimiter as a byte; only ASCII delimiters are accepted
    pub fn delimiter_byte(&self) -> Result<u8> {
        if self.delimiter.is_ascii() && self.delimiter != '"' && self.delimiter != '\n' {
            Ok(self.delimiter as u8)
        } else {
            Err(AnalysisError::InvalidConfig(format!(
                "unsupported delimiter {:?}",
                self.delimiter
            )))
        }
    }
}

#[cfg(feature = "python")]
impl AnalysisConfig {
    /// Extract configuration from a flat Python dict
    pub fn from_py_dict(dict: &Bound<'_, PyDict>) -> PyResult<Self> {
        let mut config = Self::default();

        // Helper macro to extract optional values into a field path
        macro_rules! extract {
            ($key:literal => $($field:ident).+) => {
                if let Some(value) = dict.get_item($key)? {
                    config.$($field).+ = value.extract()?;
                }
            };
        }

        extract!("ssn_pattern" => pii.ssn_pattern);
        extract!("email_pattern" => pii.email_pattern);
        extract!("phone_pattern" => pii.phone_pattern);
        extract!("account_number_pattern" => pii.account_number_pattern);
        extract!("redaction_text" => pii.redaction_text);
        extract!("exempt_columns" => pii.exempt_columns);
        extract!("whitelist_patterns" => pii.whitelist_patterns);
        extract!("iqr_multiplier" => anomaly.iqr_multiplier);
        extract!("id_column" => anomaly.id_column);
        extract!("duplicate_key_columns" => anomaly.duplicate_key_columns);
        extract!("histogram_bins" => anomaly.histogram_bins);
        extract!("delimiter" => delimiter);
        extract!("redact_amount_column" => redact_amount_column);
        extract!("log_detections" => log_detections);

        if let Some(value) = dict.get_item("mask_strategy")? {
            let strategy_str: String = value.extract()?;
            config.pii.mask_strategy = MaskingStrategy::parse(&strategy_str).ok_or_else(|| {
                pyo3::exceptions::PyValueError::new_err(format!(
                    "Unknown mask_strategy '{}'",
                    strategy_str
                ))
            })?;
        }

        if let Some(value) = dict.get_item("quantile_method")? {
            let method_str: String = value.extract()?;
            config.anomaly.quantile_method =
                QuantileMethod::parse(&method_str).ok_or_else(|| {
                    pyo3::exceptions::PyValueError::new_err(format!(
                        "Unknown quantile_method '{}'",
                        method_str
                    ))
                })?;
        }

        if let Some(value) = dict.get_item("amount_column")? {
            config.amount_column = match value.extract::<usize>() {
                Ok(idx) => AmountColumn::Index(idx),
                Err(_) => AmountColumn::Name(value.extract()?),
            };
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anomaly::QuantileMethod;
    use crate::pii_filter::MaskingStrategy;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.amount_column, AmountColumn::Name("amount".to_string()));
        assert_eq!(config.delimiter_byte().unwrap(), b',');
        assert!(!config.redact_amount_column);
        assert_eq!(config.pii.redaction_text, "[REDACTED]");
    }

    #[test]
    fn test_from_json_nested_overrides() {
        let config = AnalysisConfig::from_json(
            r#"{
                "amount_column": 3,
                "delimiter": ";",
                "pii": {"mask_strategy": "partial"},
                "anomaly": {"quantile_method": "midpoint", "id_column": "transaction_id"}
            }"#,
        )
        .unwrap();

        assert_eq!(config.amount_column, AmountColumn::Index(3));
        assert_eq!(config.delimiter_byte().unwrap(), b';');
        assert_eq!(config.pii.mask_strategy, MaskingStrategy::Partial);
        assert_eq!(config.anomaly.quantile_method, QuantileMethod::Midpoint);
        assert_eq!(config.anomaly.id_column.as_deref(), Some("transaction_id"));
        assert_eq!(config.anomaly.iqr_multiplier, 1.5);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = AnalysisConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidConfig(_)));
    }

    #[test]
    fn test_non_ascii_delimiter_rejected() {
        let config = AnalysisConfig {
            delimiter: '§',
            ..Default::default()
        };
        assert!(config.delimiter_byte().is_err());
    }
}
