//! Online simulator facade
//!
//! Bundles an [`OnlineDriver`] with a [`FeaturePipeline`] so a caller can
//! generate data, fit feature constructors on it and score later batches
//! through one object.

use crate::config::SimulationParams;
use crate::data::Dataset;
use crate::driver::OnlineDriver;
use crate::generator::{SimulationError, TransactionModel, UniMausModel};
use crate::pipeline::{FeaturePipeline, PipelineError};

/// Driver plus feature pipeline
#[derive(Debug)]
pub struct OnlineSimulator<M: TransactionModel = UniMausModel> {
    driver: OnlineDriver<M>,
    pipeline: FeaturePipeline,
}

impl OnlineSimulator<UniMausModel> {
    pub fn new(params: SimulationParams) -> Result<Self, SimulationError> {
        Ok(Self::from_driver(OnlineDriver::new(params)?))
    }

    pub fn with_default_params() -> Result<Self, SimulationError> {
        Self::new(SimulationParams::default())
    }
}

impl<M: TransactionModel> OnlineSimulator<M> {
    pub fn from_driver(driver: OnlineDriver<M>) -> Self {
        Self {
            driver,
            pipeline: FeaturePipeline::new(),
        }
    }

    pub fn driver(&self) -> &OnlineDriver<M> {
        &self.driver
    }

    pub fn pipeline(&self) -> &FeaturePipeline {
        &self.pipeline
    }

    /// See [`OnlineDriver::step`]
    pub fn step_simulator(&mut self, num_steps: usize) -> Result<bool, SimulationError> {
        self.driver.step(num_steps)
    }

    /// See [`OnlineDriver::drain_log`]
    pub fn get_log(&mut self, clear_after: bool) -> Dataset {
        self.driver.drain_log(clear_after)
    }

    pub fn clear_log(&mut self) {
        self.driver.clear_log();
    }

    /// Fit the aggregate and graph constructors on labeled data
    pub fn prepare_feature_constructors(
        &mut self,
        training: &Dataset,
    ) -> Result<(), PipelineError> {
        self.pipeline.prepare(training)
    }

    /// Add features, drop identifier columns and move `Target` last
    pub fn process_data(&self, data: Dataset) -> Result<Dataset, PipelineError> {
        self.pipeline.process(data)
    }

    /// Feed unlabeled records into the aggregate history
    pub fn update_feature_constructors_unlabeled(
        &mut self,
        data: &Dataset,
    ) -> Result<(), PipelineError> {
        self.pipeline.update_unlabeled(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::columns;
    use chrono::Duration;

    fn short_params(hours: i64) -> SimulationParams {
        let base = SimulationParams::default();
        SimulationParams {
            end: base.start + Duration::hours(hours - 1),
            num_genuine_customers: 50,
            num_fraudulent_customers: 10,
            ..base
        }
    }

    #[test]
    fn test_process_before_prepare_fails() {
        let mut sim = OnlineSimulator::new(short_params(2)).unwrap();
        sim.step_simulator(1).unwrap();
        let log = sim.get_log(true);
        assert_eq!(
            sim.process_data(log),
            Err(PipelineError::UninitializedFeatureConstructor)
        );
    }

    #[test]
    fn test_full_round_trip() {
        let mut sim = OnlineSimulator::new(short_params(48)).unwrap();
        while sim.step_simulator(1).unwrap() {}
        let training = sim.get_log(true);
        assert!(training.num_rows() > 0);

        sim.prepare_feature_constructors(&training).unwrap();
        let processed = sim.process_data(training).unwrap();

        let names = processed.column_names();
        assert_eq!(names.last().copied(), Some(columns::TARGET));
        assert!(!names.contains(&columns::CARD_ID));
        assert!(sim.get_log(false).is_empty());
    }
}
