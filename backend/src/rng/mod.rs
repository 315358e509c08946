//! Deterministic random number generation
//!
//! Uses xorshift64* so a seed fully determines the generated transaction stream.
//! All randomness in the generative model MUST go through this module.

mod xorshift;

pub use xorshift::RngManager;
