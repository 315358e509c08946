//! Generative transaction models
//!
//! The online driver only relies on the [`TransactionModel`] trait: advance one
//! step, report termination, and write emitted records into a log buffer owned
//! by the caller. [`UniMausModel`] is the bundled agent-based implementation.

mod unimaus;

pub use unimaus::UniMausModel;

use crate::config::ConfigError;
use crate::models::LogBuffer;
use chrono::NaiveDateTime;
use thiserror::Error;

/// Errors raised by a generative model
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Invalid simulation parameters: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("Model already terminated after step {step}")]
    AlreadyTerminated { step: usize },
}

/// A stateful model advanced one unit of simulated time at a time
pub trait TransactionModel {
    /// Simulate one step, appending emitted records to `log`
    ///
    /// Returns the number of records emitted. May set the termination flag;
    /// stepping a terminated model is an error.
    fn step(&mut self, log: &mut LogBuffer) -> Result<usize, SimulationError>;

    /// True once the model's end condition has been reached
    fn is_terminated(&self) -> bool;

    /// Steps completed so far
    fn current_step(&self) -> usize;

    /// Simulated time of the next step
    fn current_time(&self) -> NaiveDateTime;
}
