//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: InfoType, OperatorType, CompatibilityTable, Value, and Error.

mod compat;
mod errors;
mod types;
mod values;
