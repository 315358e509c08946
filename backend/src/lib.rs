//! Transaction Simulator Core - Rust Engine
//!
//! Online (step-by-step) card transaction simulator with a streaming feature
//! pipeline and deterministic execution.
//!
//! # Architecture
//!
//! - **core**: Simulated hourly clock
//! - **rng**: Deterministic random number generation
//! - **config**: Simulation parameters (JSON loadable)
//! - **models**: Domain types (Customer, Merchant, TransactionRecord, LogBuffer)
//! - **generator**: Generative transaction models
//! - **driver**: Online driver stepping a model and buffering its log
//! - **data**: Column-oriented datasets and the tabular interop view
//! - **features**: Aggregate and graph feature constructors
//! - **pipeline**: Feature augmentation, column pruning, Target ordering
//! - **online**: Facade combining driver and pipeline
//!
//! # Critical Invariants
//!
//! 1. All randomness is deterministic (seeded RNG)
//! 2. Once terminated, a driver never simulates another step
//! 3. A processed dataset always ends with `Target` when the input had one

// Module declarations
pub mod config;
pub mod core;
pub mod data;
pub mod driver;
pub mod features;
pub mod generator;
pub mod models;
pub mod online;
pub mod pipeline;
pub mod rng;

// Re-exports for convenience
pub use config::{BehaviorParams, ConfigError, CountryProfile, SimulationParams};
pub use core::time::SimClock;
pub use data::{Column, ColumnData, DataLogView, Dataset, DatasetError, Value};
pub use driver::{DriverState, OnlineDriver};
pub use features::{
    AggregateFeatures, FeatureConstructor, FeatureError, GraphFeatures, IncrementalFeatures,
};
pub use generator::{SimulationError, TransactionModel, UniMausModel};
pub use models::{
    columns, Customer, CustomerKind, LogBuffer, LogRecord, Merchant, Population,
    TransactionRecord,
};
pub use online::OnlineSimulator;
pub use pipeline::{FeaturePipeline, FeatureState, PipelineError, DROPPED_COLUMNS};
pub use rng::RngManager;
