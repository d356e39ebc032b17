//! Integration tests across all layers
//!
//! End-to-end question generation: rule sets, strategies, the simulated
//! executor, rendering, and run configurations.

mod demos;
mod scenarios;
mod sessions;
