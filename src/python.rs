// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// PyO3 bindings around `Analyzer`

use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};
use serde_json::Value as JsonValue;

use crate::config::AnalysisConfig;
use crate::pipeline::Analyzer;

/// Analyzer exposed to Python
///
/// # Example (Python)
/// ```python
/// from ledger_guard import TransactionAnalyzer
///
/// analyzer = TransactionAnalyzer({"mask_strategy": "partial"})
/// analyzer.scan_value("123-45-6789")   # "ssn"
/// analyzer.scan_value("Office supplies")  # None
/// ```
#[pyclass]
pub struct TransactionAnalyzer {
    analyzer: Analyzer,
}

#[pymethods]
impl TransactionAnalyzer {
    /// Create a new analyzer
    ///
    /// # Configuration Keys
    /// * `ssn_pattern`, `email_pattern`, `phone_pattern`, `account_number_pattern` (str)
    /// * `mask_strategy` (str): "redact" or "partial"
    /// * `redaction_text` (str): Placeholder for "redact" (default: "[REDACTED]")
    /// * `exempt_columns` (list[str]): Columns never scanned
    /// * `whitelist_patterns` (list[str]): Regex patterns to exclude from detection
    /// * `amount_column` (str | int): Amount column name or position (default: "amount")
    /// * `redact_amount_column` (bool): Scan the amount column too
    /// * `quantile_method` (str): "linear", "lower", "higher", "nearest", "midpoint"
    /// * `iqr_multiplier` (float), `histogram_bins` (int)
    /// * `id_column` (str), `duplicate_key_columns` (list[str])
    /// * `delimiter` (str): Single ASCII character
    /// * `log_detections` (bool)
    #[new]
    #[pyo3(signature = (config_dict=None))]
    pub fn new(config_dict: Option<&Bound<'_, PyDict>>) -> PyResult<Self> {
        let config = match config_dict {
            Some(dict) => AnalysisConfig::from_py_dict(dict).map_err(|e| {
                PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("Invalid config: {}", e))
            })?,
            None => AnalysisConfig::default(),
        };

        let analyzer = Analyzer::new(config)
            .map_err(|e| PyErr::new::<pyo3::exceptions::PyValueError, _>(e.to_string()))?;

        Ok(Self { analyzer })
    }

    /// Analyze CSV bytes and return the report as a dict
    pub fn analyze(&self, py: Python<'_>, data: &[u8]) -> PyResult<Py<PyAny>> {
        let report = self
            .analyzer
            .analyze(data)
            .map_err(|e| PyErr::new::<pyo3::exceptions::PyValueError, _>(e.to_string()))?;

        let json = serde_json::to_value(&report).map_err(|e| {
            PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!(
                "Report serialization failed: {}",
                e
            ))
        })?;

        json_to_py(py, &json)
    }

    /// PII category of a single value, or None
    pub fn scan_value(&self, text: &str) -> Option<&'static str> {
        self.analyzer.scan_value(text).map(|pii_type| pii_type.as_str())
    }
}

/// Convert a serde_json value into native Python objects
fn json_to_py(py: Python<'_>, value: &JsonValue) -> PyResult<Py<PyAny>> {
    Ok(match value {
        JsonValue::Null => py.None(),
        JsonValue::Bool(b) => b.into_pyobject(py)?.to_owned().into_any().unbind(),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => i.into_pyobject(py)?.into_any().unbind(),
            None => n
                .as_f64()
                .unwrap_or(f64::NAN)
                .into_pyobject(py)?
                .into_any()
                .unbind(),
        },
        JsonValue::String(s) => s.into_pyobject(py)?.into_any().unbind(),
        JsonValue::Array(items) => {
            let py_list = PyList::empty(py);
            for item in items {
                py_list.append(json_to_py(py, item)?)?;
            }
            py_list.into_any().unbind()
        }
        JsonValue::Object(map) => {
            let py_dict = PyDict::new(py);
            for (key, item) in map {
                py_dict.set_item(key, json_to_py(py, item)?)?;
            }
            py_dict.into_any().unbind()
        }
    })
}
