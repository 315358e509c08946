//! Customer and merchant population
//!
//! Built once from `SimulationParams` and the seeded RNG, so the same seed
//! always yields the same cards, countries and merchant preferences.
//!
//! # Card numbering
//!
//! Genuine customers hold cards `0..num_genuine`, fraudulent customers the
//! cards that follow. Merchant IDs are `0..num_merchants`.

use crate::config::{ConfigError, SimulationParams};
use crate::models::customer::{Customer, CustomerKind};
use crate::models::merchant::Merchant;
use crate::rng::RngManager;

/// All agents taking part in a simulation
#[derive(Debug, Clone)]
pub struct Population {
    customers: Vec<Customer>,
    merchants: Vec<Merchant>,
}

impl Population {
    pub fn new(customers: Vec<Customer>, merchants: Vec<Merchant>) -> Self {
        Self {
            customers,
            merchants,
        }
    }

    /// Generate a population from parameters
    pub fn generate(params: &SimulationParams, rng: &mut RngManager) -> Result<Self, ConfigError> {
        let merchants: Vec<Merchant> = (0..params.num_merchants)
            .map(|id| Merchant::new(id as u64, rng.log_normal(0.0, 0.3)))
            .collect();

        let country_weights: Vec<f64> = params.countries.iter().map(|c| c.weight).collect();
        let total = params.num_genuine_customers + params.num_fraudulent_customers;
        let mut customers = Vec::with_capacity(total);

        for card in 0..total {
            let kind = if card < params.num_genuine_customers {
                CustomerKind::Genuine
            } else {
                CustomerKind::Fraudulent
            };

            let country = rng
                .weighted_index(&country_weights)
                .map(|idx| &params.countries[idx])
                .ok_or(ConfigError::NoCountries)?;

            let mut customer = Customer::new(
                card as u64,
                kind,
                country.code.clone(),
                country.currency.clone(),
                country.utc_offset_hours,
            );

            if kind == CustomerKind::Genuine {
                let favourites = pick_distinct(
                    params.favourite_merchants.min(params.num_merchants),
                    params.num_merchants,
                    rng,
                );
                customer = customer.with_favourite_merchants(favourites);
            }

            customers.push(customer);
        }

        Ok(Self::new(customers, merchants))
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn customers_mut(&mut self) -> &mut [Customer] {
        &mut self.customers
    }

    pub fn merchants(&self) -> &[Merchant] {
        &self.merchants
    }

    pub fn num_customers(&self) -> usize {
        self.customers.len()
    }

    pub fn num_active(&self, kind: CustomerKind) -> usize {
        self.customers
            .iter()
            .filter(|c| c.kind() == kind && c.is_active())
            .count()
    }
}

/// `count` distinct indices from `0..upper`, in draw order
fn pick_distinct(count: usize, upper: usize, rng: &mut RngManager) -> Vec<usize> {
    let mut picked = Vec::with_capacity(count);
    while picked.len() < count {
        let idx = rng.range(0, upper as i64) as usize;
        if !picked.contains(&idx) {
            picked.push(idx);
        }
    }
    picked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_population_sizes_and_card_ids() {
        let params = SimulationParams {
            num_genuine_customers: 5,
            num_fraudulent_customers: 2,
            num_merchants: 4,
            favourite_merchants: 3,
            ..Default::default()
        };
        let mut rng = RngManager::new(1);
        let population = Population::generate(&params, &mut rng).unwrap();

        assert_eq!(population.num_customers(), 7);
        assert_eq!(population.merchants().len(), 4);
        assert_eq!(population.num_active(CustomerKind::Fraudulent), 2);

        let ids: Vec<u64> = population.customers().iter().map(|c| c.card_id()).collect();
        assert_eq!(ids, (0..7).collect::<Vec<u64>>());
        assert!(population.customers()[6].is_fraudulent());
    }

    #[test]
    fn test_favourites_are_distinct_and_bounded() {
        let params = SimulationParams {
            num_genuine_customers: 20,
            num_fraudulent_customers: 0,
            num_merchants: 3,
            favourite_merchants: 10,
            ..Default::default()
        };
        let mut rng = RngManager::new(5);
        let population = Population::generate(&params, &mut rng).unwrap();

        for customer in population.customers() {
            let favourites = customer.favourite_merchants();
            assert_eq!(favourites.len(), 3);
            let mut sorted = favourites.to_vec();
            sorted.sort();
            sorted.dedup();
            assert_eq!(sorted.len(), 3);
        }
    }
}
