//! Configuration, rule catalog, simulated executor, and CLI for Multihop.
//!
//! This crate provides:
//! - [`RunConfig`] - TOML run configuration
//! - [`catalog`] - The built-in rule catalog
//! - [`SimulatedExecutor`] - A deterministic fact-table executor
//! - [`Session`] - Resolves a configuration and generates questions

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod session;
pub mod simulate;

pub use config::{RunConfig, SeedSpec, parse_value};
pub use error::RuntimeError;
pub use session::{Outcome, Session};
pub use simulate::{Operation, SimulatedExecutor};
