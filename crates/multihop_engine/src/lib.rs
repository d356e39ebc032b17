//! Rule sets, provenance chains, and generation strategies for Multihop.
//!
//! This crate provides:
//! - [`Rule`] and [`RuleSet`] - Validated transitions with input/output indexes
//! - [`Chain`] - The append-only provenance trace of one generation
//! - [`Executor`] - The boundary that turns rule applications into values
//! - [`Planner`] - AND-OR search for backward plans
//! - [`Strategy`] - The five generation strategies behind [`GenerationStrategy`]

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod chain;
pub mod executor;
pub mod plan;
pub mod rule;
pub mod strategy;

pub use chain::{Chain, Seed, State, StateRef};
pub use executor::{ExecutionError, Executor};
pub use plan::{DEFAULT_SEARCH_WIDTH, Plan, PlanNode, PlannedStep, Planner};
pub use rule::{Predicate, Rule, RuleId, RuleSet};
pub use strategy::{
    BackwardConfig, ConstrainedConfig, DistanceMap, FailureKind, ForwardConfig, GenerationContext,
    GenerationError, GenerationStrategy, GoalConfig, Strategy, TemplateConfig, TemplateStep,
};
