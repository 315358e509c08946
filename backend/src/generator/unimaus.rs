//! Agent-based card transaction model
//!
//! Each hourly step walks the customer population in card order:
//!
//! ```text
//! For each active customer c:
//! 1. λ = base rate(c.kind) × activity(local hour of c)
//! 2. n ~ Poisson(λ)
//! 3. n times: pick merchant, sample amount, log record under c.kind.reporter()
//! 4. Fraudster that transacted: leave with probability 1 - persistence
//! Then advance the clock; past the horizon the model terminates.
//! ```
//!
//! All randomness comes from one seeded `RngManager`, so identical parameters
//! produce identical logs.

use super::{SimulationError, TransactionModel};
use crate::config::SimulationParams;
use crate::core::time::SimClock;
use crate::models::{Customer, CustomerKind, LogBuffer, Merchant, Population, TransactionRecord};
use crate::rng::RngManager;
use chrono::{NaiveDateTime, Timelike};
use tracing::debug;

/// Agent-based generator of genuine and fraudulent card transactions
#[derive(Debug, Clone)]
pub struct UniMausModel {
    params: SimulationParams,
    clock: SimClock,
    rng: RngManager,
    population: Population,
    terminated: bool,
}

impl UniMausModel {
    /// Validate parameters and build the population
    pub fn new(params: SimulationParams) -> Result<Self, SimulationError> {
        params.validate()?;

        let mut rng = RngManager::new(params.seed);
        let population = Population::generate(&params, &mut rng)?;
        let clock = SimClock::new(params.start, params.end);

        Ok(Self {
            params,
            clock,
            rng,
            population,
            terminated: false,
        })
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Choose a merchant index for one purchase
    fn pick_merchant(
        customer: &Customer,
        num_merchants: usize,
        favourite_prob: f64,
        rng: &mut RngManager,
    ) -> usize {
        let favourites = customer.favourite_merchants();
        if !favourites.is_empty() && rng.bernoulli(favourite_prob) {
            let idx = rng.range(0, favourites.len() as i64) as usize;
            return favourites[idx];
        }
        rng.range(0, num_merchants as i64) as usize
    }

    fn sample_amount(&mut self, kind: CustomerKind, merchant: &Merchant) -> f64 {
        let behavior = match kind {
            CustomerKind::Genuine => &self.params.genuine,
            CustomerKind::Fraudulent => &self.params.fraudulent,
        };
        let raw = self
            .rng
            .log_normal(behavior.amount_log_mean, behavior.amount_log_std)
            * merchant.amount_scale();

        // Whole cents, never below one cent
        ((raw * 100.0).round() / 100.0).max(0.01)
    }
}

impl TransactionModel for UniMausModel {
    fn step(&mut self, log: &mut LogBuffer) -> Result<usize, SimulationError> {
        if self.terminated {
            return Err(SimulationError::AlreadyTerminated {
                step: self.clock.current_step(),
            });
        }

        let step = self.clock.current_step();
        let now = self.clock.current_time();
        let num_merchants = self.population.merchants().len();
        let mut emitted = 0;

        for idx in 0..self.population.num_customers() {
            let customer = self.population.customers()[idx].clone();
            if !customer.is_active() {
                continue;
            }

            let kind = customer.kind();
            let local = customer.local_time(now);
            let rate = match kind {
                CustomerKind::Genuine => self.params.genuine.transactions_per_hour,
                CustomerKind::Fraudulent => self.params.fraudulent.transactions_per_hour,
            } * self.params.activity_at(local.hour());

            let count = self.rng.poisson(rate);
            for _ in 0..count {
                let merchant_idx = Self::pick_merchant(
                    &customer,
                    num_merchants,
                    self.params.favourite_merchant_prob,
                    &mut self.rng,
                );
                let merchant = self.population.merchants()[merchant_idx].clone();
                let amount = self.sample_amount(kind, &merchant);

                log.record(
                    kind.reporter(),
                    step,
                    TransactionRecord {
                        global_date: now,
                        local_date: local,
                        card_id: customer.card_id(),
                        merchant_id: merchant.merchant_id(),
                        amount,
                        currency: customer.currency().to_string(),
                        country: customer.country().to_string(),
                        target: kind.target(),
                    },
                );
                emitted += 1;
            }

            if kind == CustomerKind::Fraudulent
                && count > 0
                && !self.rng.bernoulli(self.params.fraud_persistence)
            {
                self.population.customers_mut()[idx].deactivate();
            }
        }

        self.clock.advance();
        if self.clock.is_past_horizon() {
            self.terminated = true;
        }

        debug!(
            step,
            time = %now,
            emitted,
            terminated = self.terminated,
            "simulated step"
        );

        Ok(emitted)
    }

    fn is_terminated(&self) -> bool {
        self.terminated
    }

    fn current_step(&self) -> usize {
        self.clock.current_step()
    }

    fn current_time(&self) -> NaiveDateTime {
        self.clock.current_time()
    }
}
