//! Tabular data passed between the log buffer, the feature constructors and
//! downstream consumers.

pub mod dataset;
pub mod view;

pub use dataset::{Column, ColumnData, Dataset, DatasetError, Value};
pub use view::DataLogView;
