//! Simulation parameters
//!
//! `SimulationParams` is consumed once, when the driver builds its generative
//! model. Every field has a documented default so a caller can start with
//! `SimulationParams::default()` and override only what matters, either in code
//! or through a JSON document (missing keys fall back to the defaults).
//!
//! # Example
//!
//! ```rust
//! use txn_simulator_core_rs::SimulationParams;
//!
//! let params = SimulationParams::from_json_str(r#"{
//!     "start": "2016-03-01T00:00:00",
//!     "end": "2016-03-01T23:00:00",
//!     "seed": 7
//! }"#).unwrap();
//!
//! assert_eq!(params.seed, 7);
//! assert_eq!(params.horizon_steps(), 24);
//! ```

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading or validating parameters
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Simulation horizon ends ({end}) before it starts ({start})")]
    InvalidHorizon {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("Population must contain at least one customer")]
    EmptyPopulation,

    #[error("At least one merchant is required")]
    NoMerchants,

    #[error("Country catalogue is empty or has no positive weight")]
    NoCountries,

    #[error("Parameter {field} must be {expected}, got {value}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
        value: f64,
    },

    #[error("Failed to read parameter file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse parameters: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Country a customer is based in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryProfile {
    /// ISO-style country code written to the `Country` column
    pub code: String,

    /// Currency written to the `Currency` column
    pub currency: String,

    /// Offset from global (UTC) time, used for `Local_Date`
    pub utc_offset_hours: i32,

    /// Relative share of customers living in this country
    pub weight: f64,
}

impl CountryProfile {
    pub fn new(code: &str, currency: &str, utc_offset_hours: i32, weight: f64) -> Self {
        Self {
            code: code.to_string(),
            currency: currency.to_string(),
            utc_offset_hours,
            weight,
        }
    }
}

/// Spending behaviour of one customer class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorParams {
    /// Expected transactions per hour at peak activity (Poisson λ)
    pub transactions_per_hour: f64,

    /// Mean of ln(amount)
    pub amount_log_mean: f64,

    /// Standard deviation of ln(amount)
    pub amount_log_std: f64,
}

/// Complete parameter set for the generative model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    /// First simulated hour
    pub start: NaiveDateTime,

    /// Last simulated hour (inclusive); the model terminates after it
    pub end: NaiveDateTime,

    /// RNG seed for deterministic simulation
    pub seed: u64,

    pub num_genuine_customers: usize,

    pub num_fraudulent_customers: usize,

    pub num_merchants: usize,

    /// Number of merchants each genuine customer returns to
    pub favourite_merchants: usize,

    /// Probability a genuine customer shops at a favourite merchant
    pub favourite_merchant_prob: f64,

    pub countries: Vec<CountryProfile>,

    pub genuine: BehaviorParams,

    pub fraudulent: BehaviorParams,

    /// Probability a fraudster keeps using a card after transacting with it
    pub fraud_persistence: f64,

    /// Relative activity per local hour of day (index 0 = midnight)
    pub hourly_activity: Vec<f64>,
}

/// Daily activity curve: quiet nights, a morning ramp and an evening peak
const DEFAULT_HOURLY_ACTIVITY: [f64; 24] = [
    0.10, 0.05, 0.03, 0.02, 0.02, 0.05, 0.15, 0.35, 0.55, 0.70, 0.80, 0.90, //
    1.00, 0.95, 0.85, 0.80, 0.85, 0.90, 0.95, 0.90, 0.75, 0.55, 0.35, 0.20,
];

fn default_instant(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, 0, 0))
        .unwrap_or_default()
}

impl Default for SimulationParams {
    /// One year of hourly steps over a small European/US population
    fn default() -> Self {
        Self {
            start: default_instant(2016, 1, 1, 0),
            end: default_instant(2016, 12, 31, 23),
            seed: 42,
            num_genuine_customers: 200,
            num_fraudulent_customers: 20,
            num_merchants: 50,
            favourite_merchants: 5,
            favourite_merchant_prob: 0.8,
            countries: vec![
                CountryProfile::new("NL", "EUR", 1, 0.35),
                CountryProfile::new("DE", "EUR", 1, 0.25),
                CountryProfile::new("GB", "GBP", 0, 0.20),
                CountryProfile::new("US", "USD", -5, 0.15),
                CountryProfile::new("JP", "JPY", 9, 0.05),
            ],
            genuine: BehaviorParams {
                transactions_per_hour: 0.02,
                amount_log_mean: 3.5,
                amount_log_std: 0.8,
            },
            fraudulent: BehaviorParams {
                transactions_per_hour: 0.25,
                amount_log_mean: 4.5,
                amount_log_std: 1.0,
            },
            fraud_persistence: 0.9,
            hourly_activity: DEFAULT_HOURLY_ACTIVITY.to_vec(),
        }
    }
}

impl SimulationParams {
    /// Parse parameters from JSON, filling missing keys with defaults
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let params: SimulationParams = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    /// Read and parse a JSON parameter file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Number of hourly steps inside the horizon
    pub fn horizon_steps(&self) -> usize {
        if self.end < self.start {
            return 0;
        }
        ((self.end - self.start).num_hours() as usize) + 1
    }

    /// Activity multiplier for a local hour of day
    ///
    /// An empty profile means flat activity.
    pub fn activity_at(&self, local_hour: u32) -> f64 {
        if self.hourly_activity.is_empty() {
            return 1.0;
        }
        self.hourly_activity[local_hour as usize % self.hourly_activity.len()]
    }

    /// Check parameter consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.end < self.start {
            return Err(ConfigError::InvalidHorizon {
                start: self.start,
                end: self.end,
            });
        }

        if self.num_genuine_customers + self.num_fraudulent_customers == 0 {
            return Err(ConfigError::EmptyPopulation);
        }

        if self.num_merchants == 0 {
            return Err(ConfigError::NoMerchants);
        }

        if !self.countries.iter().any(|c| c.weight > 0.0) {
            return Err(ConfigError::NoCountries);
        }

        for (field, value) in [
            ("genuine.transactions_per_hour", self.genuine.transactions_per_hour),
            ("fraudulent.transactions_per_hour", self.fraudulent.transactions_per_hour),
            ("genuine.amount_log_std", self.genuine.amount_log_std),
            ("fraudulent.amount_log_std", self.fraudulent.amount_log_std),
        ] {
            if !(value >= 0.0) {
                return Err(ConfigError::OutOfRange {
                    field,
                    expected: "non-negative",
                    value,
                });
            }
        }

        for (field, value) in [
            ("fraud_persistence", self.fraud_persistence),
            ("favourite_merchant_prob", self.favourite_merchant_prob),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfRange {
                    field,
                    expected: "a probability in [0, 1]",
                    value,
                });
            }
        }

        if self.hourly_activity.iter().any(|a| !(*a >= 0.0)) {
            return Err(ConfigError::OutOfRange {
                field: "hourly_activity",
                expected: "non-negative",
                value: self
                    .hourly_activity
                    .iter()
                    .copied()
                    .find(|a| !(*a >= 0.0))
                    .unwrap_or(f64::NAN),
            });
        }

        Ok(())
    }
}
