//! Online simulation driver
//!
//! Advances a generative model one step per call and buffers its output until
//! the caller drains it.
//!
//! See `engine.rs` for the implementation.

pub mod engine;

pub use engine::{DriverState, OnlineDriver};
