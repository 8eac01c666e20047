// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Anomaly Detector
//
// Flags duplicate rows, IQR outliers and negative amounts on one numeric
// column. The same sorted column feeds the box-plot and histogram data.

pub mod alerts;
pub mod config;
pub mod detector;
pub mod quantile;

pub use alerts::{build_alerts, Alert, AlertKind, Severity};
pub use config::{AmountColumn, AnomalyConfig};
pub use detector::{AnalysisStatus, AnomalyDetector, AnomalyReport, AnomalyTag, Fence};
pub use quantile::{FiveNumberSummary, Histogram, HistogramBucket, NumericColumn, QuantileMethod};
