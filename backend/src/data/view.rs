//! Flat view over a dataset for consumers that cannot read typed columns
//!
//! Foreign runtimes usually want three things from a table: the column names,
//! its shape, and the cells as one row-major list. `DataLogView` exposes
//! exactly that and nothing else.

use super::dataset::{Dataset, Value};

/// Read-only, row-major view over a [`Dataset`]
#[derive(Debug, Clone)]
pub struct DataLogView<'a> {
    dataset: &'a Dataset,
}

impl<'a> DataLogView<'a> {
    pub fn new(dataset: &'a Dataset) -> Self {
        Self { dataset }
    }

    pub fn column_names(&self) -> Vec<String> {
        self.dataset
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn num_rows(&self) -> usize {
        self.dataset.num_rows()
    }

    pub fn num_cols(&self) -> usize {
        self.dataset.num_cols()
    }

    /// All cells, row after row
    pub fn data_list(&self) -> Vec<Value> {
        self.dataset.rows().flatten().collect()
    }

    /// JSON document `{ "columns": [...], "num_rows": n, "num_cols": m, "data": [...] }`
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "columns": self.column_names(),
            "num_rows": self.num_rows(),
            "num_cols": self.num_cols(),
            "data": self.data_list(),
        })
    }
}
