// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Human-readable alerts derived from row tags

use serde::Serialize;

use super::detector::{AnomalyReport, AnomalyTag};
use super::quantile::QuantileMethod;
use crate::table::{Table, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    DuplicatePayment,
    AmountOutlier,
    NegativeAmount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub severity: Severity,
    pub description: String,
    /// Affected rows (zero-based)
    pub rows: Vec<usize>,
}

/// Build alerts: one per duplicate group, then one per outlier and per
/// negative row, in row order.
///
/// `table` is the table `report` was detected on. Duplicate descriptions
/// name the group's non-amount key values, skipping cells for which
/// `is_redacted(row, column)` holds.
pub fn build_alerts<F>(
    report: &AnomalyReport,
    table: &Table,
    method: QuantileMethod,
    is_redacted: F,
) -> Vec<Alert>
where
    F: Fn(usize, usize) -> bool,
{
    if !report.status.is_analyzed() {
        return Vec::new();
    }

    // `values()` is in row order
    let values = report.numeric.values();
    let amount_of = |row: usize| {
        values
            .binary_search_by_key(&row, |(r, _)| *r)
            .ok()
            .map(|idx| values[idx].1)
    };
    let amount_idx = report
        .amount_column
        .as_deref()
        .and_then(|name| table.column_index(name));

    let mut alerts = Vec::new();

    for group in &report.duplicate_groups {
        let first = group[0];
        let context: Vec<String> = report
            .duplicate_key
            .iter()
            .filter(|&&col| Some(col) != amount_idx && !is_redacted(first, col))
            .filter_map(|&col| match &table.rows()[first][col] {
                Value::Missing => None,
                value => Some(format!("{}: {}", table.columns()[col], value)),
            })
            .collect();

        let mut description = match amount_of(first) {
            Some(amount) => format!(
                "{} payment appears {} times",
                format_currency(amount),
                group.len()
            ),
            None => format!("Identical transaction appears {} times", group.len()),
        };
        if !context.is_empty() {
            description.push_str(&format!(" ({})", context.join(", ")));
        }
        alerts.push(Alert {
            kind: AlertKind::DuplicatePayment,
            severity: Severity::Medium,
            description,
            rows: group.clone(),
        });
    }

    let median = report.numeric.quantile(0.5, method).unwrap_or(0.0);

    for &(row, amount) in report.numeric.values() {
        let tags = &report.flags[row];
        if tags.contains(&AnomalyTag::OutlierHigh) || tags.contains(&AnomalyTag::OutlierLow) {
            let severity = if amount.abs() > median * 10.0 {
                Severity::High
            } else {
                Severity::Medium
            };
            alerts.push(Alert {
                kind: AlertKind::AmountOutlier,
                severity,
                description: format!("Unusual amount: {}", format_currency(amount)),
                rows: vec![row],
            });
        }
    }

    for row in report.rows_with(AnomalyTag::NegativeAmount) {
        let amount = amount_of(row).unwrap_or_default();
        alerts.push(Alert {
            kind: AlertKind::NegativeAmount,
            severity: Severity::Medium,
            description: format!("Negative transaction: {}", format_currency(amount)),
            rows: vec![row],
        });
    }

    alerts
}

/// `$1,234.56`, with a leading minus for negatives
pub fn format_currency(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, cents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anomaly::config::{AmountColumn, AnomalyConfig};
    use crate::anomaly::detector::AnomalyDetector;

    fn table_for(amounts: &[&str]) -> Table {
        let rows = amounts
            .iter()
            .enumerate()
            .map(|(i, a)| vec![Value::Integer(i as i64), Value::from(*a)])
            .collect();
        Table::new(vec!["id".into(), "amount".into()], rows).unwrap()
    }

    fn report_for(table: &Table) -> AnomalyReport {
        let detector = AnomalyDetector::new(AnomalyConfig {
            id_column: Some("id".into()),
            ..Default::default()
        })
        .unwrap();
        detector.detect(table, &AmountColumn::default())
    }

    fn alerts_for(amounts: &[&str]) -> Vec<Alert> {
        let table = table_for(amounts);
        let report = report_for(&table);
        build_alerts(&report, &table, QuantileMethod::Linear, |_, _| false)
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(245.67), "$245.67");
        assert_eq!(format_currency(1250.0), "$1,250.00");
        assert_eq!(format_currency(1234567.891), "$1,234,567.89");
        assert_eq!(format_currency(-150.0), "-$150.00");
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(-0.001), "$0.00");
    }

    #[test]
    fn test_outlier_severity() {
        let alerts = alerts_for(&["10", "12", "11", "13", "1000"]);

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::AmountOutlier);
        assert_eq!(alerts[0].severity, Severity::High);
        assert_eq!(alerts[0].rows, vec![4]);
        assert_eq!(alerts[0].description, "Unusual amount: $1,000.00");
    }

    #[test]
    fn test_duplicate_and_negative_alerts() {
        let alerts = alerts_for(&["245.67", "100", "245.67", "-150", "120"]);

        let duplicate = alerts
            .iter()
            .find(|a| a.kind == AlertKind::DuplicatePayment)
            .unwrap();
        assert_eq!(duplicate.rows, vec![0, 2]);
        assert_eq!(duplicate.description, "$245.67 payment appears 2 times");

        let negative = alerts
            .iter()
            .find(|a| a.kind == AlertKind::NegativeAmount)
            .unwrap();
        assert_eq!(negative.rows, vec![3]);
        assert_eq!(negative.description, "Negative transaction: -$150.00");
    }

    #[test]
    fn test_no_alerts_without_analysis() {
        assert!(alerts_for(&["x", "y"]).is_empty());
    }

    #[test]
    fn test_duplicate_description_names_key_values() {
        let rows = vec![
            vec!["Acme".into(), "jo@acme.com".into(), "50".into()],
            vec!["Acme".into(), "jo@acme.com".into(), "50".into()],
            vec!["Beta".into(), "ap@beta.com".into(), "70".into()],
        ];
        let columns = vec!["vendor".into(), "contact".into(), "amount".into()];
        let table = Table::new(columns, rows).unwrap();
        let report = AnomalyDetector::new(AnomalyConfig::default())
            .unwrap()
            .detect(&table, &AmountColumn::default());

        let alerts = build_alerts(&report, &table, QuantileMethod::Linear, |_, col| col == 1);
        assert_eq!(alerts.len(), 1);
        assert_eq!(
            alerts[0].description,
            "$50.00 payment appears 2 times (vendor: Acme)"
        );

        let alerts = build_alerts(&report, &table, QuantileMethod::Linear, |_, _| false);
        assert_eq!(
            alerts[0].description,
            "$50.00 payment appears 2 times (vendor: Acme, contact: jo@acme.com)"
        );
    }

    #[test]
    fn test_many_negative_rows_each_get_their_amount() {
        let amounts: Vec<String> = (1..=5000).map(|i| format!("-{}", i)).collect();
        let refs: Vec<&str> = amounts.iter().map(String::as_str).collect();
        let alerts = alerts_for(&refs);

        let negatives: Vec<&Alert> = alerts
            .iter()
            .filter(|a| a.kind == AlertKind::NegativeAmount)
            .collect();
        assert_eq!(negatives.len(), 5000);
        assert_eq!(negatives[0].description, "Negative transaction: -$1.00");
        assert_eq!(negatives[4999].rows, vec![4999]);
        assert_eq!(negatives[4999].description, "Negative transaction: -$5,000.00");
    }
}
