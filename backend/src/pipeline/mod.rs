//! Data processing pipeline
//!
//! Turns raw transaction logs into model-ready tables:
//!
//! ```text
//! process(data):
//! 1. Graph features      (fitted GraphFeatures)
//! 2. Aggregate features  (fitted, possibly updated AggregateFeatures)
//! 3. Drop identifier / non-numeric columns (fixed list)
//! 4. Move Target to the last position
//! ```
//!
//! Feature constructors live in an explicit `Unfit → Fitted` state; every
//! operation other than `prepare` fails with
//! [`PipelineError::UninitializedFeatureConstructor`] while unfit.

use crate::data::{Dataset, DatasetError};
use crate::features::{
    AggregateFeatures, FeatureConstructor, FeatureError, GraphFeatures, IncrementalFeatures,
};
use crate::models::columns;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Columns removed by `process` once features have been added
pub const DROPPED_COLUMNS: [&str; 6] = [
    columns::GLOBAL_DATE,
    columns::LOCAL_DATE,
    columns::CARD_ID,
    columns::MERCHANT_ID,
    columns::CURRENCY,
    columns::COUNTRY,
];

/// Errors raised by the processing pipeline
#[derive(Debug, Error, PartialEq)]
pub enum PipelineError {
    #[error("Feature constructors are not prepared; call prepare() with training data first")]
    UninitializedFeatureConstructor,

    #[error("Input dataset has no column {column}")]
    ColumnSchemaMismatch { column: String },

    #[error("Feature construction failed: {0}")]
    Feature(#[from] FeatureError),
}

impl From<DatasetError> for PipelineError {
    fn from(err: DatasetError) -> Self {
        match err {
            DatasetError::ColumnNotFound { column } => {
                PipelineError::ColumnSchemaMismatch { column }
            }
            other => PipelineError::Feature(FeatureError::Dataset(other)),
        }
    }
}

/// Fit state of the feature constructors
#[derive(Debug, Clone, Default)]
pub enum FeatureState {
    #[default]
    Unfit,
    Fitted {
        aggregate: AggregateFeatures,
        graph: GraphFeatures,
    },
}

/// Owns the feature constructors and applies them to datasets
#[derive(Debug, Clone, Default)]
pub struct FeaturePipeline {
    state: FeatureState,
}

impl FeaturePipeline {
    /// Create a pipeline whose constructors are not fit yet
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_prepared(&self) -> bool {
        matches!(self.state, FeatureState::Fitted { .. })
    }

    pub fn state(&self) -> &FeatureState {
        &self.state
    }

    /// Fit both feature constructors on `training`
    ///
    /// `training` must carry `Target` labels. Rows used here should not be
    /// used to evaluate a downstream model: the constructors have seen them,
    /// so their features are unrealistically informative.
    ///
    /// Preparing again discards the previous fit.
    pub fn prepare(&mut self, training: &Dataset) -> Result<(), PipelineError> {
        let aggregate = AggregateFeatures::fit(training)?;
        let graph = GraphFeatures::fit(training)?;

        if self.is_prepared() {
            warn!("re-preparing feature constructors; previous fit is discarded");
        }

        info!(
            rows = training.num_rows(),
            cards = aggregate.num_cards(),
            graph_edges = graph.num_edges(),
            "feature constructors prepared"
        );

        self.state = FeatureState::Fitted { aggregate, graph };
        Ok(())
    }

    /// Add features, prune identifier columns and move `Target` last
    ///
    /// The dataset is taken by value and transformed in place; the returned
    /// value is the same table, not a copy. The drop-list columns must all be
    /// present; `Target` is optional.
    pub fn process(&self, mut data: Dataset) -> Result<Dataset, PipelineError> {
        let FeatureState::Fitted { aggregate, graph } = &self.state else {
            return Err(PipelineError::UninitializedFeatureConstructor);
        };

        if let Some(missing) = DROPPED_COLUMNS.iter().find(|c| !data.has_column(c)) {
            return Err(PipelineError::ColumnSchemaMismatch {
                column: missing.to_string(),
            });
        }

        graph.add_features(&mut data)?;
        aggregate.add_features(&mut data)?;

        data.drop_columns(&DROPPED_COLUMNS)?;

        if data.has_column(columns::TARGET) {
            data.move_column_to_end(columns::TARGET)?;
        }

        debug!(rows = data.num_rows(), cols = data.num_cols(), "processed dataset");
        Ok(data)
    }

    /// Feed new, unlabeled records into the aggregate constructor
    ///
    /// The graph constructor is only ever fit once. `data` must be disjoint
    /// from everything passed to `prepare` or earlier updates.
    pub fn update_unlabeled(&mut self, data: &Dataset) -> Result<(), PipelineError> {
        let FeatureState::Fitted { aggregate, .. } = &mut self.state else {
            return Err(PipelineError::UninitializedFeatureConstructor);
        };

        IncrementalFeatures::update_unlabeled(aggregate, data)?;
        debug!(rows = data.num_rows(), "aggregate features updated");
        Ok(())
    }

    /// Columns `process` adds, in order
    pub fn feature_names(&self) -> Result<Vec<String>, PipelineError> {
        let FeatureState::Fitted { aggregate, graph } = &self.state else {
            return Err(PipelineError::UninitializedFeatureConstructor);
        };
        let mut names = graph.feature_names();
        names.extend(aggregate.feature_names());
        Ok(names)
    }
}
