// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Quantiles and distribution data over the amount column

use serde::{Deserialize, Serialize};

use crate::table::Table;

/// How a quantile is picked between the two closest ranks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuantileMethod {
    /// `x[i] + (h - i) * (x[j] - x[i])`
    #[default]
    Linear,
    Lower,
    Higher,
    /// Closest rank, ties to the even rank
    Nearest,
    Midpoint,
}

impl QuantileMethod {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "linear" => Some(QuantileMethod::Linear),
            "lower" => Some(QuantileMethod::Lower),
            "higher" => Some(QuantileMethod::Higher),
            "nearest" => Some(QuantileMethod::Nearest),
            "midpoint" => Some(QuantileMethod::Midpoint),
            _ => None,
        }
    }
}

/// Numeric values of one column, sorted, with the rows they came from
///
/// Fences, box-plot data, histogram and summary statistics are all derived
/// from this one value so they can never disagree.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericColumn {
    /// `(row, value)` in row order
    by_row: Vec<(usize, f64)>,
    sorted: Vec<f64>,
}

impl NumericColumn {
    /// Collect the finite numeric cells of column `idx`
    pub fn from_table(table: &Table, idx: usize) -> Self {
        let by_row: Vec<(usize, f64)> = table
            .column_values(idx)
            .enumerate()
            .filter_map(|(row, value)| value.as_f64().map(|v| (row, v)))
            .collect();
        Self::from_pairs(by_row)
    }

    pub fn from_values(values: &[f64]) -> Self {
        Self::from_pairs(
            values
                .iter()
                .copied()
                .filter(|v| v.is_finite())
                .enumerate()
                .collect(),
        )
    }

    fn from_pairs(by_row: Vec<(usize, f64)>) -> Self {
        let mut sorted: Vec<f64> = by_row.iter().map(|(_, v)| *v).collect();
        sorted.sort_by(f64::total_cmp);
        Self { by_row, sorted }
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// `(row, value)` pairs in row order
    pub fn values(&self) -> &[(usize, f64)] {
        &self.by_row
    }

    pub fn sorted(&self) -> &[f64] {
        &self.sorted
    }

    /// Quantile `p` in `[0, 1]`; `None` when the column is empty
    pub fn quantile(&self, p: f64, method: QuantileMethod) -> Option<f64> {
        let n = self.sorted.len();
        if n == 0 {
            return None;
        }

        let h = (n - 1) as f64 * p.clamp(0.0, 1.0);
        let lo = h.floor() as usize;
        let hi = h.ceil() as usize;
        let (x_lo, x_hi) = (self.sorted[lo], self.sorted[hi]);
        let frac = h - lo as f64;

        Some(match method {
            QuantileMethod::Linear => x_lo + frac * (x_hi - x_lo),
            QuantileMethod::Lower => x_lo,
            QuantileMethod::Higher => x_hi,
            QuantileMethod::Midpoint => (x_lo + x_hi) / 2.0,
            QuantileMethod::Nearest => {
                if frac < 0.5 || (frac == 0.5 && lo % 2 == 0) {
                    x_lo
                } else {
                    x_hi
                }
            }
        })
    }

    pub fn five_number_summary(&self, method: QuantileMethod) -> Option<FiveNumberSummary> {
        Some(FiveNumberSummary {
            min: *self.sorted.first()?,
            q1: self.quantile(0.25, method)?,
            median: self.quantile(0.5, method)?,
            q3: self.quantile(0.75, method)?,
            max: *self.sorted.last()?,
        })
    }

    /// Equal-width buckets over `[min, max]`, the last one closed
    pub fn histogram(&self, bins: usize) -> Option<Histogram> {
        let (&first, &last) = (self.sorted.first()?, self.sorted.last()?);
        let bins = bins.max(1);
        let (start, end) = if first == last {
            (first - 0.5, last + 0.5)
        } else {
            (first, last)
        };
        let width = (end - start) / bins as f64;

        let mut counts = vec![0usize; bins];
        for &value in &self.sorted {
            let idx = (((value - start) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }

        let buckets = counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBucket {
                start: start + width * i as f64,
                end: if i + 1 == bins {
                    end
                } else {
                    start + width * (i + 1) as f64
                },
                count,
            })
            .collect();

        Some(Histogram { buckets })
    }
}

/// Box-plot data
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FiveNumberSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl FiveNumberSummary {
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBucket {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub buckets: Vec<HistogramBucket>,
}

impl Histogram {
    pub fn total(&self) -> usize {
        self.buckets.iter().map(|b| b.count).sum()
    }
}
