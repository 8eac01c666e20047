// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// In-memory transaction table and its CSV encoding

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

use crate::error::{AnalysisError, Result};

/// A single table cell
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
    Missing,
}

impl Value {
    /// Numeric interpretation used by the anomaly detector.
    ///
    /// Text is trimmed and parsed as a float; only finite values count.
    /// Currency symbols and thousands separators are not stripped.
    pub fn as_f64(&self) -> Option<f64> {
        let number = match self {
            Value::Integer(i) => *i as f64,
            Value::Float(f) => *f,
            Value::Text(s) => s.trim().parse::<f64>().ok()?,
            Value::Missing => return None,
        };
        number.is_finite().then_some(number)
    }

    /// Hashable, type-aware identity of the cell for exact comparisons
    pub fn key(&self) -> CellKey<'_> {
        match self {
            Value::Text(s) => CellKey::Text(s),
            Value::Integer(i) => CellKey::Integer(*i),
            Value::Float(f) => CellKey::Float(f.to_bits()),
            Value::Missing => CellKey::Missing,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Missing => Ok(()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKey<'a> {
    Text(&'a str),
    Integer(i64),
    Float(u64),
    Missing,
}

/// Row-oriented table: every row holds exactly one value per column
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Build a table, rejecting duplicate column names and ragged rows
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let mut seen = HashSet::new();
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(AnalysisError::InputFormat(format!(
                    "duplicate column name '{}'",
                    name
                )));
            }
        }

        if let Some((idx, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(AnalysisError::InputFormat(format!(
                "row {} has {} fields, expected {}",
                idx,
                row.len(),
                columns.len()
            )));
        }

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// (row count, column names)
    pub fn shape(&self) -> (usize, &[String]) {
        (self.rows.len(), &self.columns)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column_values(&self, idx: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().map(move |row| &row[idx])
    }

    /// Parse delimited text with a mandatory header row.
    ///
    /// Empty fields load as `Missing`. Fields that are not valid UTF-8 also
    /// load as `Missing` so that the scan never aborts on a bad cell.
    pub fn from_csv(input: &[u8], delimiter: u8) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(false)
            .from_reader(input);

        let headers = reader.byte_headers()?.clone();
        if headers.is_empty() {
            return Err(AnalysisError::InputFormat("missing header row".to_string()));
        }

        let columns = headers
            .iter()
            .map(|field| {
                std::str::from_utf8(field)
                    .map(str::to_string)
                    .map_err(|_| AnalysisError::InputFormat("header is not valid UTF-8".into()))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut rows: Vec<Vec<Value>> = Vec::new();
        for record in reader.byte_records() {
            let record = record?;
            let row: Vec<Value> = record
                .iter()
                .enumerate()
                .map(|(col, field)| decode_field(field, rows.len(), &columns[col]))
                .collect();
            rows.push(row);
        }

        Self::new(columns, rows)
    }

    /// Encode as delimited text, header first, `Missing` as empty fields
    pub fn to_csv(&self, delimiter: u8) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(Vec::new());

        writer
            .write_record(&self.columns)
            .map_err(|e| AnalysisError::Output(e.to_string()))?;
        for row in &self.rows {
            writer
                .write_record(row.iter().map(|value| value.to_string()))
                .map_err(|e| AnalysisError::Output(e.to_string()))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| AnalysisError::Output(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| AnalysisError::Output(e.to_string()))
    }

    /// Same shape, new cell values
    pub(crate) fn with_rows(&self, rows: Vec<Vec<Value>>) -> Self {
        debug_assert_eq!(rows.len(), self.rows.len());
        Self {
            columns: self.columns.clone(),
            rows,
        }
    }
}

fn decode_field(field: &[u8], row: usize, column: &str) -> Value {
    if field.is_empty() {
        return Value::Missing;
    }
    match std::str::from_utf8(field) {
        Ok(text) => Value::Text(text.to_string()),
        Err(_) => {
            tracing::warn!(row, column, "field is not valid UTF-8, treating as missing");
            Value::Missing
        }
    }
}
