//! Core types, values, and errors for Multihop.
//!
//! This crate provides:
//! - [`InfoType`] and [`OperatorType`] - The closed tag sets rules are typed over
//! - [`CompatibilityTable`] - Which operator/input/output transitions are legal
//! - [`Value`] - Concrete values carried by chain states
//! - [`Error`] - Rich error types with context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod compat;
pub mod error;
pub mod types;
pub mod value;

pub use compat::CompatibilityTable;
pub use error::{Error, ErrorContext, ErrorKind, RuleViolation};
pub use types::{InfoType, OperatorType};
pub use value::Value;

/// Result type alias using the Multihop [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;
