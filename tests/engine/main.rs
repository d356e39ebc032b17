//! Integration tests for Layer 1: Engine
//!
//! Tests for rule sets, chains, generation strategies, and backward planning.

mod planning;
mod rules;
mod strategies;
mod support;
