//! Feature constructors
//!
//! Two independent stateful transformers turn raw transaction columns into
//! numeric features:
//!
//! - **aggregate**: per-card statistics over sliding time windows; can keep
//!   learning from unlabeled data after it was fit
//! - **graph**: fraud risk propagated over the card–merchant graph; fit once
//!
//! Both are fit from a training batch. That batch should not be reused to
//! evaluate a downstream model, since the constructors have already seen it.

pub mod aggregate;
pub mod graph;

pub use aggregate::AggregateFeatures;
pub use graph::GraphFeatures;

use crate::data::{Dataset, DatasetError};
use thiserror::Error;

/// Errors raised while fitting or applying a feature constructor
#[derive(Debug, Error, PartialEq)]
pub enum FeatureError {
    #[error("Feature input is missing required data: {0}")]
    Dataset(#[from] DatasetError),
}

/// A transformer fit from a training batch that adds columns to datasets
pub trait FeatureConstructor: Sized {
    /// Fit the constructor on `training`
    fn fit(training: &Dataset) -> Result<Self, FeatureError>;

    /// Append this constructor's feature columns to `data`
    fn add_features(&self, data: &mut Dataset) -> Result<(), FeatureError>;

    /// Names of the columns `add_features` produces, in order
    fn feature_names(&self) -> Vec<String>;
}

/// Feature constructors that accept unlabeled data after fitting
pub trait IncrementalFeatures: FeatureConstructor {
    /// Extend fitted state with records never seen before
    fn update_unlabeled(&mut self, data: &Dataset) -> Result<(), FeatureError>;
}
