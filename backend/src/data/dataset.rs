//! Column-oriented dataset
//!
//! A `Dataset` is a set of equally long, named, typed columns plus a row index.
//! Rows drained from the log buffer carry the simulation step they were emitted
//! in as their index label.
//!
//! Column order is significant: the processing pipeline relies on it to keep
//! feature columns in a stable order and to place `Target` last.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised by dataset operations
#[derive(Debug, Error, PartialEq)]
pub enum DatasetError {
    #[error("Column not found: {column}")]
    ColumnNotFound { column: String },

    #[error("Column already exists: {column}")]
    DuplicateColumn { column: String },

    #[error("Column {column} has {found} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("Column {column} holds {found} values, expected {expected}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Cannot append datasets with different schemas: {reason}")]
    SchemaMismatch { reason: String },
}

/// A single cell value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
    DateTime(NaiveDateTime),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{:.4}", v),
            Value::Text(v) => write!(f, "{}", v),
            Value::DateTime(v) => write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// Typed storage for one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnData {
    Int(Vec<i64>),
    Float(Vec<f64>),
    Text(Vec<String>),
    DateTime(Vec<NaiveDateTime>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Int(v) => v.len(),
            ColumnData::Float(v) => v.len(),
            ColumnData::Text(v) => v.len(),
            ColumnData::DateTime(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Human-readable element type, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            ColumnData::Int(_) => "int",
            ColumnData::Float(_) => "float",
            ColumnData::Text(_) => "text",
            ColumnData::DateTime(_) => "datetime",
        }
    }

    pub fn get(&self, row: usize) -> Option<Value> {
        match self {
            ColumnData::Int(v) => v.get(row).map(|x| Value::Int(*x)),
            ColumnData::Float(v) => v.get(row).map(|x| Value::Float(*x)),
            ColumnData::Text(v) => v.get(row).map(|x| Value::Text(x.clone())),
            ColumnData::DateTime(v) => v.get(row).map(|x| Value::DateTime(*x)),
        }
    }

    /// Append the values of `other`
    ///
    /// Callers check that both columns share an element type; mismatched
    /// kinds leave `self` unchanged.
    fn extend_from(&mut self, other: &ColumnData) {
        match (self, other) {
            (ColumnData::Int(a), ColumnData::Int(b)) => a.extend_from_slice(b),
            (ColumnData::Float(a), ColumnData::Float(b)) => a.extend_from_slice(b),
            (ColumnData::Text(a), ColumnData::Text(b)) => a.extend_from_slice(b),
            (ColumnData::DateTime(a), ColumnData::DateTime(b)) => a.extend_from_slice(b),
            _ => {}
        }
    }

    fn split_off(&mut self, at: usize) -> ColumnData {
        match self {
            ColumnData::Int(v) => ColumnData::Int(v.split_off(at)),
            ColumnData::Float(v) => ColumnData::Float(v.split_off(at)),
            ColumnData::Text(v) => ColumnData::Text(v.split_off(at)),
            ColumnData::DateTime(v) => ColumnData::DateTime(v.split_off(at)),
        }
    }
}

/// Named column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

/// Two-dimensional table of named columns over a set of rows
///
/// # Example
/// ```
/// use txn_simulator_core_rs::data::{ColumnData, Dataset};
///
/// let mut data = Dataset::from_columns(vec![
///     ("Amount".to_string(), ColumnData::Float(vec![12.5, 80.0])),
///     ("Target".to_string(), ColumnData::Int(vec![0, 1])),
/// ]).unwrap();
///
/// data.set_column("Ratio", ColumnData::Float(vec![0.5, 2.0])).unwrap();
/// data.move_column_to_end("Target").unwrap();
/// assert_eq!(data.column_names(), vec!["Amount", "Ratio", "Target"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Row labels
    index: Vec<u64>,
    columns: Vec<Column>,
}

impl Dataset {
    /// Create an empty dataset (no rows, no columns)
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dataset from `(name, data)` pairs with a positional index
    pub fn from_columns(columns: Vec<(String, ColumnData)>) -> Result<Self, DatasetError> {
        let mut dataset = Dataset::new();
        for (name, data) in columns {
            if dataset.has_column(&name) {
                return Err(DatasetError::DuplicateColumn { column: name });
            }
            dataset.set_column(&name, data)?;
        }
        Ok(dataset)
    }

    pub fn num_rows(&self) -> usize {
        self.index.len()
    }

    pub fn num_cols(&self) -> usize {
        self.columns.len()
    }

    /// True when the dataset has no rows
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn index(&self) -> &[u64] {
        &self.index
    }

    /// Replace the row labels
    pub fn set_index(&mut self, index: Vec<u64>) -> Result<(), DatasetError> {
        if !self.columns.is_empty() && index.len() != self.num_rows() {
            return Err(DatasetError::LengthMismatch {
                column: "<index>".to_string(),
                expected: self.num_rows(),
                found: index.len(),
            });
        }
        self.index = index;
        Ok(())
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnData> {
        self.columns.iter().find(|c| c.name == name).map(|c| &c.data)
    }

    fn require(&self, name: &str) -> Result<&ColumnData, DatasetError> {
        self.column(name).ok_or_else(|| DatasetError::ColumnNotFound {
            column: name.to_string(),
        })
    }

    /// Insert or replace a column
    ///
    /// A replaced column keeps its position; a new one is appended. The first
    /// column added to an empty dataset fixes the row count and, if no index
    /// was set, gets a positional index.
    pub fn set_column(&mut self, name: &str, data: ColumnData) -> Result<(), DatasetError> {
        if self.columns.is_empty() {
            if self.index.is_empty() {
                self.index = (0..data.len() as u64).collect();
            } else if self.index.len() != data.len() {
                return Err(DatasetError::LengthMismatch {
                    column: name.to_string(),
                    expected: self.index.len(),
                    found: data.len(),
                });
            }
        } else if data.len() != self.num_rows() {
            return Err(DatasetError::LengthMismatch {
                column: name.to_string(),
                expected: self.num_rows(),
                found: data.len(),
            });
        }

        match self.position(name) {
            Some(pos) => self.columns[pos].data = data,
            None => self.columns.push(Column {
                name: name.to_string(),
                data,
            }),
        }
        Ok(())
    }

    /// Remove the named columns
    ///
    /// Either every column is removed or, if one is missing, none are.
    pub fn drop_columns(&mut self, names: &[&str]) -> Result<(), DatasetError> {
        if let Some(missing) = names.iter().find(|n| !self.has_column(n)) {
            return Err(DatasetError::ColumnNotFound {
                column: missing.to_string(),
            });
        }
        self.columns.retain(|c| !names.contains(&c.name.as_str()));
        Ok(())
    }

    /// Move a column to the last position, keeping the others in order
    pub fn move_column_to_end(&mut self, name: &str) -> Result<(), DatasetError> {
        let pos = self.position(name).ok_or_else(|| DatasetError::ColumnNotFound {
            column: name.to_string(),
        })?;
        let column = self.columns.remove(pos);
        self.columns.push(column);
        Ok(())
    }

    pub fn int_column(&self, name: &str) -> Result<&[i64], DatasetError> {
        match self.require(name)? {
            ColumnData::Int(v) => Ok(v),
            other => Err(type_mismatch(name, "int", other)),
        }
    }

    pub fn float_column(&self, name: &str) -> Result<&[f64], DatasetError> {
        match self.require(name)? {
            ColumnData::Float(v) => Ok(v),
            other => Err(type_mismatch(name, "float", other)),
        }
    }

    pub fn text_column(&self, name: &str) -> Result<&[String], DatasetError> {
        match self.require(name)? {
            ColumnData::Text(v) => Ok(v),
            other => Err(type_mismatch(name, "text", other)),
        }
    }

    pub fn datetime_column(&self, name: &str) -> Result<&[NaiveDateTime], DatasetError> {
        match self.require(name)? {
            ColumnData::DateTime(v) => Ok(v),
            other => Err(type_mismatch(name, "datetime", other)),
        }
    }

    /// Values of one row in column order
    pub fn row(&self, row: usize) -> Option<Vec<Value>> {
        if row >= self.num_rows() {
            return None;
        }
        self.columns.iter().map(|c| c.data.get(row)).collect()
    }

    /// Iterate rows in order
    pub fn rows(&self) -> impl Iterator<Item = Vec<Value>> + '_ {
        (0..self.num_rows()).filter_map(move |r| self.row(r))
    }

    /// Append the rows of `other`
    ///
    /// Both datasets must have the same column names, in the same order, with
    /// the same element types. Appending to a dataset without columns adopts
    /// the schema of `other`.
    pub fn append(&mut self, other: &Dataset) -> Result<(), DatasetError> {
        if self.columns.is_empty() && self.index.is_empty() {
            *self = other.clone();
            return Ok(());
        }

        if self.column_names() != other.column_names() {
            return Err(DatasetError::SchemaMismatch {
                reason: format!(
                    "columns {:?} vs {:?}",
                    self.column_names(),
                    other.column_names()
                ),
            });
        }

        if let Some((mine, theirs)) = self
            .columns
            .iter()
            .zip(other.columns.iter())
            .find(|(a, b)| a.data.kind() != b.data.kind())
        {
            return Err(DatasetError::SchemaMismatch {
                reason: format!(
                    "column {} is {} here and {} in the appended rows",
                    mine.name,
                    mine.data.kind(),
                    theirs.data.kind()
                ),
            });
        }

        for (mine, theirs) in self.columns.iter_mut().zip(other.columns.iter()) {
            mine.data.extend_from(&theirs.data);
        }
        self.index.extend_from_slice(&other.index);
        Ok(())
    }

    /// Split the dataset in two at row `at`
    ///
    /// `self` keeps rows `[0, at)`, the returned dataset holds `[at, len)`.
    /// `at` is clamped to the row count.
    pub fn split_off(&mut self, at: usize) -> Dataset {
        let at = at.min(self.num_rows());
        let columns = self
            .columns
            .iter_mut()
            .map(|c| Column {
                name: c.name.clone(),
                data: c.data.split_off(at),
            })
            .collect();
        Dataset {
            index: self.index.split_off(at),
            columns,
        }
    }
}

fn type_mismatch(name: &str, expected: &'static str, found: &ColumnData) -> DatasetError {
    DatasetError::TypeMismatch {
        column: name.to_string(),
        expected,
        found: found.kind(),
    }
}

impl fmt::Display for Dataset {
    /// Fixed-width table with the index as first column
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.columns.is_empty() {
            return write!(f, "Empty Dataset\nColumns: []\nIndex: []");
        }

        let cells: Vec<Vec<String>> = self
            .rows()
            .map(|row| row.iter().map(|v| v.to_string()).collect())
            .collect();
        let index_cells: Vec<String> = self.index.iter().map(|i| i.to_string()).collect();

        let index_width = index_cells.iter().map(|s| s.len()).max().unwrap_or(0);
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(col, c)| {
                cells
                    .iter()
                    .map(|row| row[col].len())
                    .chain(std::iter::once(c.name.len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        write!(f, "{:width$}", "", width = index_width)?;
        for (c, width) in self.columns.iter().zip(&widths) {
            write!(f, "  {:>width$}", c.name, width = *width)?;
        }

        for (label, row) in index_cells.iter().zip(&cells) {
            writeln!(f)?;
            write!(f, "{:<width$}", label, width = index_width)?;
            for (cell, width) in row.iter().zip(&widths) {
                write!(f, "  {:>width$}", cell, width = *width)?;
            }
        }

        if self.is_empty() {
            write!(f, "\n[0 rows x {} columns]", self.num_cols())?;
        }
        Ok(())
    }
}
