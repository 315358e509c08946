//! Integration tests for the online driver
//!
//! Covers the drain/clear contract of the log buffer, termination behaviour
//! and the two-hour horizon scenario.

use chrono::Duration;
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;
use txn_simulator_core_rs::{
    columns, DriverState, LogBuffer, OnlineDriver, SimulationParams, TransactionModel,
    UniMausModel,
};

// ============================================================================
// Helpers
// ============================================================================

fn params_with_horizon(hours: i64, seed: u64) -> SimulationParams {
    let base = SimulationParams::default();
    SimulationParams {
        seed,
        end: base.start + Duration::hours(hours - 1),
        num_genuine_customers: 100,
        num_fraudulent_customers: 20,
        ..base
    }
}

/// Records a bare model emits per step for the given parameters
fn emitted_per_step(params: SimulationParams) -> Vec<usize> {
    let mut model = UniMausModel::new(params).unwrap();
    let mut log = LogBuffer::new();
    let mut counts = Vec::new();
    while !model.is_terminated() {
        counts.push(model.step(&mut log).unwrap());
    }
    counts
}

/// Counts WARN events emitted while installed
#[derive(Clone, Default)]
struct WarnCounter(Arc<AtomicUsize>);

impl WarnCounter {
    fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl<S: Subscriber> Layer<S> for WarnCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_default_params_driver() {
    let driver = OnlineDriver::with_default_params().unwrap();
    assert_eq!(driver.state(), DriverState::Running);
    assert_eq!(driver.model().clock().horizon_steps(), 366 * 24);
    assert!(driver.log().is_empty());
}

#[test]
fn test_invalid_params_rejected() {
    let base = SimulationParams::default();
    let params = SimulationParams {
        end: base.start - Duration::hours(1),
        ..base
    };
    assert!(OnlineDriver::new(params).is_err());
}

#[test]
fn test_run_ids_are_unique() {
    let a = OnlineDriver::new(params_with_horizon(2, 1)).unwrap();
    let b = OnlineDriver::new(params_with_horizon(2, 1)).unwrap();
    assert_ne!(a.run_id(), b.run_id());
}

// ============================================================================
// Drain / Clear
// ============================================================================

#[test]
fn test_drain_then_drain_is_empty() {
    let mut driver = OnlineDriver::new(params_with_horizon(24, 3)).unwrap();
    for _ in 0..12 {
        driver.step(1).unwrap();
    }

    let first = driver.drain_log(true);
    assert!(!first.is_empty());

    let second = driver.drain_log(true);
    assert_eq!(second.num_rows(), 0);
    assert_eq!(second.column_names(), columns::RAW.to_vec());
}

#[test]
fn test_drain_without_clear_is_cumulative() {
    let mut driver = OnlineDriver::new(params_with_horizon(24, 5)).unwrap();
    let mut previous = driver.drain_log(false);

    for _ in 0..24 {
        driver.step(1).unwrap();
        let current = driver.drain_log(false);

        assert!(current.num_rows() >= previous.num_rows());
        for row in 0..previous.num_rows() {
            assert_eq!(current.row(row), previous.row(row));
        }
        previous = current;
    }
}

#[test]
fn test_clear_log_does_not_rewind_model() {
    let mut driver = OnlineDriver::new(params_with_horizon(10, 9)).unwrap();
    driver.step(1).unwrap();
    driver.step(1).unwrap();
    driver.clear_log();

    assert_eq!(driver.drain_log(false).num_rows(), 0);
    assert_eq!(driver.model().current_step(), 2);
}

#[test]
fn test_drained_index_is_step() {
    let mut driver = OnlineDriver::new(params_with_horizon(24, 21)).unwrap();
    while driver.step(1).unwrap() {}

    let log = driver.drain_log(false);
    assert!(log.index().windows(2).all(|w| w[0] <= w[1]));
    assert!(log.index().iter().all(|step| *step < 24));
}

// ============================================================================
// Termination
// ============================================================================

#[test]
fn test_step_past_termination_is_not_an_error() {
    let mut driver = OnlineDriver::new(params_with_horizon(3, 1)).unwrap();
    let results: Vec<bool> = (0..6).map(|_| driver.step(1).unwrap()).collect();

    assert_eq!(results, vec![true, true, true, false, false, false]);
    assert_eq!(driver.state(), DriverState::Terminated);
    assert_eq!(driver.steps_taken(), 3);
}

#[test]
fn test_step_past_termination_warns_once_per_call() {
    let warnings = WarnCounter::default();
    let subscriber = tracing_subscriber::registry().with(warnings.clone());

    tracing::subscriber::with_default(subscriber, || {
        let mut driver = OnlineDriver::new(params_with_horizon(2, 77)).unwrap();
        assert!(driver.step(1).unwrap());
        assert!(driver.step(1).unwrap());
        assert_eq!(warnings.count(), 0);

        assert!(!driver.step(1).unwrap());
        assert_eq!(warnings.count(), 1);

        assert!(!driver.step(1).unwrap());
        assert_eq!(warnings.count(), 2);
    });
}

#[test]
fn test_step_n_advances_single_unit() {
    let mut driver = OnlineDriver::new(params_with_horizon(10, 1)).unwrap();
    assert!(driver.step(4).unwrap());
    assert_eq!(driver.model().current_step(), 1);
}

#[test]
fn test_two_hour_horizon_scenario() {
    let params = params_with_horizon(2, 77);
    let expected: usize = emitted_per_step(params.clone()).iter().sum();

    let mut driver = OnlineDriver::new(params).unwrap();
    assert!(driver.step(1).unwrap());
    assert!(driver.step(1).unwrap());
    assert!(!driver.step(1).unwrap());

    let drained = driver.drain_log(true);
    assert_eq!(drained.num_rows(), expected);
    assert_eq!(driver.drain_log(true).num_rows(), 0);
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_termination_is_monotonic(seed in 1u64..1_000, hours in 1i64..6, extra in 1usize..5) {
        let mut driver = OnlineDriver::new(params_with_horizon(hours, seed)).unwrap();

        let mut trues = 0;
        while driver.step(1).unwrap() {
            trues += 1;
        }
        prop_assert_eq!(trues, hours as usize);

        for _ in 0..extra {
            prop_assert!(!driver.step(1).unwrap());
        }
        prop_assert!(driver.is_terminated());
    }

    #[test]
    fn prop_drain_matches_emitted(seed in 1u64..1_000, hours in 1i64..8) {
        let params = params_with_horizon(hours, seed);
        let counts = emitted_per_step(params.clone());
        let mut driver = OnlineDriver::new(params).unwrap();

        for count in counts {
            prop_assert!(driver.step(1).unwrap());
            prop_assert_eq!(driver.drain_log(true).num_rows(), count);
            prop_assert!(driver.drain_log(true).is_empty());
        }
    }
}
