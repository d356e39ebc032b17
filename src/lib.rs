//! Multihop - rule-based multi-hop question synthesis
//!
//! This crate re-exports all layers of the Multihop system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: multihop_runtime    — Config loading, rule catalog, simulated executor, CLI
//! Layer 2: multihop_render     — Chain → question text
//! Layer 1: multihop_engine     — Rules, chains, executor contract, generation strategies
//! Layer 0: multihop_foundation — Core types (InfoType, OperatorType, Value, Error)
//! ```

pub use multihop_engine as engine;
pub use multihop_foundation as foundation;
pub use multihop_render as render;
pub use multihop_runtime as runtime;
