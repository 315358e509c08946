//! xorshift64* random number generator
//!
//! Fast 64-bit PRNG with a single word of state. Same seed → same sequence,
//! which is what makes simulated transaction logs reproducible.

use serde::{Deserialize, Serialize};

/// Largest mean sampled exactly by one run of Knuth's method
const KNUTH_CHUNK: f64 = 500.0;

/// Means above this use the normal approximation
const NORMAL_APPROX_LAMBDA: f64 = 10_000.0;

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use txn_simulator_core_rs::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let merchant = rng.range(0, 20); // [0, 20)
/// let fired = rng.bernoulli(0.25);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngManager {
    state: u64,
}

impl RngManager {
    /// Create a new RNG with given seed
    ///
    /// A zero seed is mapped to 1 (xorshift cannot leave the all-zero state).
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u64 value
    pub fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Generate random value in range [min, max)
    ///
    /// # Panics
    /// Panics if min >= max
    pub fn range(&mut self, min: i64, max: i64) -> i64 {
        assert!(min < max, "min must be less than max");

        let value = self.next();
        let range_size = (max - min) as u64;
        min + (value % range_size) as i64
    }

    /// Current internal state
    pub fn get_state(&self) -> u64 {
        self.state
    }

    /// Generate random f64 in range [0.0, 1.0)
    pub fn next_f64(&mut self) -> f64 {
        let value = self.next();
        (value >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// True with probability `p` (clamped to [0, 1])
    pub fn bernoulli(&mut self, p: f64) -> bool {
        self.next_f64() < p.clamp(0.0, 1.0)
    }

    /// Sample a Poisson-distributed count with mean `lambda`
    ///
    /// Knuth's multiplication method on chunks of at most `KNUTH_CHUNK`,
    /// summed (a sum of Poisson draws is Poisson). `exp(-lambda)` underflows
    /// for a single large chunk. Above `NORMAL_APPROX_LAMBDA` a rounded
    /// normal approximation keeps the cost constant.
    pub fn poisson(&mut self, lambda: f64) -> u64 {
        if !(lambda > 0.0) {
            return 0;
        }
        if lambda > NORMAL_APPROX_LAMBDA {
            let sample = lambda + lambda.sqrt() * self.standard_normal();
            return sample.round().max(0.0) as u64;
        }

        let mut remaining = lambda;
        let mut count = 0;
        while remaining > 0.0 {
            let chunk = remaining.min(KNUTH_CHUNK);
            count += self.poisson_knuth(chunk);
            remaining -= chunk;
        }
        count
    }

    fn poisson_knuth(&mut self, lambda: f64) -> u64 {
        let limit = (-lambda).exp();
        let mut count = 0;
        let mut product = self.next_f64();
        while product > limit {
            count += 1;
            product *= self.next_f64();
        }
        count
    }

    /// Standard normal sample (Box-Muller)
    pub fn standard_normal(&mut self) -> f64 {
        // 1 - u keeps the logarithm argument in (0, 1]
        let u1 = 1.0 - self.next_f64();
        let u2 = self.next_f64();
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }

    /// Log-normal sample with the given parameters of the underlying normal
    pub fn log_normal(&mut self, mu: f64, sigma: f64) -> f64 {
        (mu + sigma * self.standard_normal()).exp()
    }

    /// Pick an index proportionally to `weights`
    ///
    /// Returns `None` when the slice is empty or no weight is positive.
    pub fn weighted_index(&mut self, weights: &[f64]) -> Option<usize> {
        let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
        if total <= 0.0 {
            return None;
        }

        let mut target = self.next_f64() * total;
        let mut last_positive = None;
        for (idx, weight) in weights.iter().enumerate() {
            if *weight <= 0.0 {
                continue;
            }
            last_positive = Some(idx);
            target -= weight;
            if target < 0.0 {
                return Some(idx);
            }
        }

        // Floating point residue lands on the last eligible entry
        last_positive
    }
}
