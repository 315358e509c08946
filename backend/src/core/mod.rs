//! Core primitives shared by the simulator (simulated time)

pub mod time;
