// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// PII redaction and anomaly flagging for accounting transaction tables
// Optional PyO3 bindings for the Python front end

// Allow non-local definitions for PyO3 macros
#![cfg_attr(feature = "python", allow(non_local_definitions))]

pub mod anomaly;
pub mod config;
pub mod error;
pub mod pii_filter;
pub mod pipeline;
#[cfg(feature = "python")]
pub mod python;
pub mod table;

pub use config::AnalysisConfig;
pub use error::{AnalysisError, Result};
pub use pipeline::{analyze, AnalysisReport, Analyzer, SummaryStats};
pub use table::{Table, Value};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Python module: ledger_guard
///
/// # Examples
///
/// ```python
/// from ledger_guard import TransactionAnalyzer
///
/// analyzer = TransactionAnalyzer({"id_column": "transaction_id"})
/// report = analyzer.analyze(open("ledger.csv", "rb").read())
///
/// print(report["status"])        # "analyzed"
/// print(report["pii_detected"])  # [{"column": "employee_contact", ...}]
/// print(report["alerts"])        # [{"kind": "duplicate_payment", ...}]
/// cleaned = report["redacted_csv"]
/// ```
#[cfg(feature = "python")]
#[pymodule]
fn ledger_guard(m: &Bound<'_, pyo3::types::PyModule>) -> PyResult<()> {
    m.add_class::<python::TransactionAnalyzer>()?;

    // Module metadata
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add(
        "__doc__",
        "PII redaction and anomaly flagging for accounting transaction tables",
    )?;

    Ok(())
}
