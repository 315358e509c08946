//! Online Driver Engine
//!
//! Owns the generative model and the log buffer it writes to:
//!
//! ```text
//! step(n):
//! 1. Terminated?  → warn, return false (end of stream, not an error)
//! 2. Advance the model one step (records land in the log buffer)
//! 3. Model reached its horizon? → Running becomes Terminated
//! 4. Return true
//! ```
//!
//! Only one step is simulated per call, whatever `n` is. Callers wanting
//! several hours of data between drains call `step` several times.
//!
//! # Example
//!
//! ```rust
//! use txn_simulator_core_rs::{OnlineDriver, SimulationParams};
//!
//! let params = SimulationParams {
//!     end: SimulationParams::default().start + chrono::Duration::hours(3),
//!     ..Default::default()
//! };
//! let mut driver = OnlineDriver::new(params).unwrap();
//!
//! while driver.step(1).unwrap() {
//!     let log = driver.drain_log(true);
//!     println!("{} transactions", log.num_rows());
//! }
//! assert!(driver.is_terminated());
//! ```

use crate::config::SimulationParams;
use crate::data::Dataset;
use crate::generator::{SimulationError, TransactionModel, UniMausModel};
use crate::models::LogBuffer;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Lifecycle of a driver; `Terminated` is final
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Running,
    Terminated,
}

/// Steps a transaction model on demand and buffers what it emits
pub struct OnlineDriver<M: TransactionModel = UniMausModel> {
    /// Generative model, advanced only through `step`
    model: M,

    /// Records emitted since the last clear
    log: LogBuffer,

    state: DriverState,

    /// Identifies this run in log output
    run_id: Uuid,

    /// Successful `step` calls
    steps_taken: usize,
}

impl OnlineDriver<UniMausModel> {
    /// Build a driver around a fresh `UniMausModel`
    pub fn new(params: SimulationParams) -> Result<Self, SimulationError> {
        Ok(Self::from_model(UniMausModel::new(params)?))
    }

    /// Build a driver using `SimulationParams::default()`
    pub fn with_default_params() -> Result<Self, SimulationError> {
        Self::new(SimulationParams::default())
    }
}

impl<M: TransactionModel> OnlineDriver<M> {
    /// Wrap an existing model
    pub fn from_model(model: M) -> Self {
        let state = if model.is_terminated() {
            DriverState::Terminated
        } else {
            DriverState::Running
        };
        let run_id = Uuid::new_v4();

        info!(%run_id, start = %model.current_time(), ?state, "online driver created");

        Self {
            model,
            log: LogBuffer::new(),
            state,
            run_id,
            steps_taken: 0,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn is_terminated(&self) -> bool {
        self.state == DriverState::Terminated
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Buffered records, without draining
    pub fn log(&self) -> &LogBuffer {
        &self.log
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn steps_taken(&self) -> usize {
        self.steps_taken
    }

    // ========================================================================
    // Stepping
    // ========================================================================

    /// Advance the simulation
    ///
    /// Returns `Ok(true)` after one step was simulated and `Ok(false)` when
    /// the model had already terminated. Once `false` is returned every later
    /// call returns `false` too.
    ///
    /// At most one step is simulated per call; `num_steps` greater than one
    /// does not advance further, and `num_steps == 0` advances nothing and
    /// returns `false`.
    ///
    /// # Errors
    ///
    /// Failures of the model other than termination are propagated.
    pub fn step(&mut self, num_steps: usize) -> Result<bool, SimulationError> {
        if num_steps == 0 {
            debug!("step called with num_steps = 0; nothing to do");
            return Ok(false);
        }

        if self.is_terminated() || self.model.is_terminated() {
            self.state = DriverState::Terminated;
            warn!(
                run_id = %self.run_id,
                "cannot step simulator because model is already terminated; \
                 specify a later end date in the parameters to allow for a longer simulation"
            );
            return Ok(false);
        }

        let emitted = self.model.step(&mut self.log)?;
        self.steps_taken += 1;

        if num_steps > 1 {
            debug!(requested = num_steps, "advanced a single step");
        }

        if self.model.is_terminated() {
            self.state = DriverState::Terminated;
            info!(
                run_id = %self.run_id,
                steps = self.steps_taken,
                "simulation horizon reached"
            );
        }

        debug!(step = self.steps_taken, emitted, buffered = self.log.len(), "driver step");
        Ok(true)
    }

    // ========================================================================
    // Log Access
    // ========================================================================

    /// Everything logged so far as one dataset
    ///
    /// With `clear_after` the buffer is emptied after the snapshot, so the
    /// next call only returns newer records. Without it, results accumulate.
    pub fn drain_log(&mut self, clear_after: bool) -> Dataset {
        self.log.drain(clear_after)
    }

    /// Discard all buffered records
    pub fn clear_log(&mut self) {
        self.log.clear();
    }
}

// Manual Debug implementation (models need not implement Debug)
impl<M: TransactionModel> std::fmt::Debug for OnlineDriver<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnlineDriver")
            .field("run_id", &self.run_id)
            .field("state", &self.state)
            .field("steps_taken", &self.steps_taken)
            .field("current_time", &self.model.current_time())
            .field("buffered_records", &self.log.len())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    /// Model emitting a fixed number of records per step for a fixed horizon
    struct ScriptedModel {
        per_step: usize,
        horizon: usize,
        done: usize,
        fail_at: Option<usize>,
    }

    impl TransactionModel for ScriptedModel {
        fn step(&mut self, log: &mut LogBuffer) -> Result<usize, SimulationError> {
            if self.fail_at == Some(self.done) {
                return Err(SimulationError::AlreadyTerminated { step: self.done });
            }
            for i in 0..self.per_step {
                log.record(
                    "genuine",
                    self.done,
                    crate::models::TransactionRecord {
                        global_date: self.current_time(),
                        local_date: self.current_time(),
                        card_id: i as u64,
                        merchant_id: 0,
                        amount: 1.0,
                        currency: "EUR".to_string(),
                        country: "NL".to_string(),
                        target: 0,
                    },
                );
            }
            self.done += 1;
            Ok(self.per_step)
        }

        fn is_terminated(&self) -> bool {
            self.done >= self.horizon
        }

        fn current_step(&self) -> usize {
            self.done
        }

        fn current_time(&self) -> NaiveDateTime {
            NaiveDateTime::default()
        }
    }

    fn scripted(per_step: usize, horizon: usize) -> OnlineDriver<ScriptedModel> {
        OnlineDriver::from_model(ScriptedModel {
            per_step,
            horizon,
            done: 0,
            fail_at: None,
        })
    }

    #[test]
    fn test_step_advances_one_unit_regardless_of_n() {
        let mut driver = scripted(2, 10);
        assert!(driver.step(5).unwrap());
        assert_eq!(driver.model().current_step(), 1);
        assert_eq!(driver.log().len(), 2);
    }

    #[test]
    fn test_zero_steps_does_nothing() {
        let mut driver = scripted(2, 10);
        assert!(!driver.step(0).unwrap());
        assert_eq!(driver.model().current_step(), 0);
        assert_eq!(driver.state(), DriverState::Running);
    }

    #[test]
    fn test_state_machine() {
        let mut driver = scripted(1, 2);
        assert_eq!(driver.state(), DriverState::Running);
        assert!(driver.step(1).unwrap());
        assert_eq!(driver.state(), DriverState::Running);
        assert!(driver.step(1).unwrap());
        assert_eq!(driver.state(), DriverState::Terminated);
        assert!(!driver.step(1).unwrap());
        assert_eq!(driver.steps_taken(), 2);
    }

    #[test]
    fn test_already_terminated_model() {
        let mut driver = scripted(1, 0);
        assert!(driver.is_terminated());
        assert!(!driver.step(1).unwrap());
    }

    #[test]
    fn test_model_failure_propagates() {
        let mut driver = OnlineDriver::from_model(ScriptedModel {
            per_step: 1,
            horizon: 5,
            done: 0,
            fail_at: Some(1),
        });
        assert!(driver.step(1).unwrap());
        assert!(driver.step(1).is_err());
        assert_eq!(driver.state(), DriverState::Running);
    }

    #[test]
    fn test_clear_log_keeps_model_state() {
        let mut driver = scripted(3, 5);
        driver.step(1).unwrap();
        driver.clear_log();
        assert!(driver.log().is_empty());
        assert_eq!(driver.model().current_step(), 1);
        assert_eq!(driver.drain_log(false).num_rows(), 0);
    }
}
