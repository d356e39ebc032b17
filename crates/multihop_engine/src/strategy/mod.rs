//! Generation strategies.
//!
//! Every strategy implements [`GenerationStrategy`]: given a rule set, an
//! executor and a seed, grow a [`Chain`] or fail with a [`GenerationError`]
//! carrying the partial chain built so far.
//!
//! | Strategy | Config | Selection |
//! |----------|--------|-----------|
//! | Forward chaining | [`ForwardConfig`] | uniform random |
//! | Template | [`TemplateConfig`] | first match, registration order |
//! | Constrained walk | [`ConstrainedConfig`] | uniform random within budget |
//! | Goal oriented | [`GoalConfig`] | nearest to target, random tie-break |
//! | Backward chaining | [`BackwardConfig`] | AND-OR plan, then execution |
//!
//! Randomized strategies draw from a generation-scoped `ChaCha8` source
//! seeded by their config, so identical inputs yield identical chains.

mod backward;
mod constrained;
mod forward;
mod goal;
mod template;
mod walk;

pub use backward::BackwardConfig;
pub use constrained::ConstrainedConfig;
pub use forward::ForwardConfig;
pub use goal::{DistanceMap, GoalConfig};
pub use template::{TemplateConfig, TemplateStep};

use multihop_foundation::{Error, InfoType, OperatorType};
use thiserror::Error;

use crate::chain::{Chain, Seed};
use crate::executor::Executor;
use crate::rule::RuleSet;

// =============================================================================
// Context
// =============================================================================

/// Read-only collaborators shared by one or more `generate` calls.
#[derive(Clone, Copy)]
pub struct GenerationContext<'a> {
    /// Rules available to the strategy.
    pub rules: &'a RuleSet,
    /// Produces concrete values for rule applications.
    pub executor: &'a dyn Executor,
}

impl<'a> GenerationContext<'a> {
    /// Creates a context.
    #[must_use]
    pub fn new(rules: &'a RuleSet, executor: &'a dyn Executor) -> Self {
        Self { rules, executor }
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Why a `generate` call ended without a chain.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FailureKind {
    /// The configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The frontier ran out of applicable rules before `min_steps`.
    #[error("no applicable rule after {steps} steps (minimum {min_steps})")]
    NoApplicableRule {
        /// Applications made.
        steps: usize,
        /// Applications required.
        min_steps: usize,
    },

    /// No affordable rule remained before `min_steps`.
    #[error("budget exceeded after {steps} steps with {remaining} left (minimum {min_steps})")]
    BudgetExceeded {
        /// Applications made.
        steps: usize,
        /// Applications required.
        min_steps: usize,
        /// Unspent budget.
        remaining: u64,
    },

    /// The target type was never produced.
    #[error("target {target} not reached after {steps} steps")]
    GoalUnreachable {
        /// The requested type.
        target: InfoType,
        /// Applications made.
        steps: usize,
    },

    /// A template entry could not be satisfied.
    #[error("template entry {index} ({operator}) has no applicable rule")]
    TemplateMismatch {
        /// Zero-based index of the unmatched entry.
        index: usize,
        /// Operator the entry asked for.
        operator: OperatorType,
    },

    /// The planner found no way to derive the target.
    #[error("no plan derives {target}")]
    PlanNotFound {
        /// The requested type.
        target: InfoType,
    },

    /// Every plan failed during execution.
    #[error("all {attempts} plans failed during execution")]
    ExecutionExhausted {
        /// Plans tried.
        attempts: usize,
    },

    /// Chain construction broke an invariant.
    #[error(transparent)]
    Invariant(#[from] Error),
}

/// A terminal generation failure with the chain built so far.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}")]
pub struct GenerationError {
    /// What went wrong.
    pub kind: FailureKind,
    /// The chain as it stood when generation stopped.
    pub partial: Box<Chain>,
}

impl GenerationError {
    /// Creates a generation error.
    #[must_use]
    pub fn new(kind: FailureKind, partial: Chain) -> Self {
        Self {
            kind,
            partial: Box::new(partial),
        }
    }

    fn invalid_config(message: impl Into<String>, seed: &Seed) -> Self {
        Self::new(FailureKind::InvalidConfig(message.into()), Chain::new(seed))
    }
}

fn check_steps(min_steps: usize, max_steps: usize, seed: &Seed) -> Result<(), GenerationError> {
    if max_steps == 0 {
        return Err(GenerationError::invalid_config("max_steps must be at least 1", seed));
    }
    if min_steps > max_steps {
        return Err(GenerationError::invalid_config(
            format!("min_steps {min_steps} exceeds max_steps {max_steps}"),
            seed,
        ));
    }
    Ok(())
}

// =============================================================================
// Strategy Contract
// =============================================================================

/// A chain generation algorithm.
pub trait GenerationStrategy {
    /// Short name used in logs and on the command line.
    fn name(&self) -> &'static str;

    /// Grows a chain from `seed`.
    ///
    /// # Errors
    /// Returns a [`GenerationError`] with the partial chain if the strategy
    /// cannot produce a chain satisfying its configuration.
    fn generate(&self, ctx: &GenerationContext<'_>, seed: &Seed) -> Result<Chain, GenerationError>;
}

/// One of the built-in strategies with its configuration.
#[derive(Clone, Debug, PartialEq)]
pub enum Strategy {
    /// Random forward chaining.
    Forward(ForwardConfig),
    /// Operator template.
    Template(TemplateConfig),
    /// Budgeted random walk.
    Constrained(ConstrainedConfig),
    /// Goal-directed search.
    Goal(GoalConfig),
    /// Backward planning with forward execution.
    Backward(BackwardConfig),
}

impl Strategy {
    /// Names accepted by [`GenerationStrategy::name`], in declaration order.
    pub const NAMES: [&'static str; 5] = ["forward", "template", "constrained", "goal", "backward"];
}

impl GenerationStrategy for Strategy {
    fn name(&self) -> &'static str {
        match self {
            Self::Forward(c) => c.name(),
            Self::Template(c) => c.name(),
            Self::Constrained(c) => c.name(),
            Self::Goal(c) => c.name(),
            Self::Backward(c) => c.name(),
        }
    }

    fn generate(&self, ctx: &GenerationContext<'_>, seed: &Seed) -> Result<Chain, GenerationError> {
        match self {
            Self::Forward(c) => c.generate(ctx, seed),
            Self::Template(c) => c.generate(ctx, seed),
            Self::Constrained(c) => c.generate(ctx, seed),
            Self::Goal(c) => c.generate(ctx, seed),
            Self::Backward(c) => c.generate(ctx, seed),
        }
    }
}

impl From<ForwardConfig> for Strategy {
    fn from(c: ForwardConfig) -> Self {
        Self::Forward(c)
    }
}

impl From<TemplateConfig> for Strategy {
    fn from(c: TemplateConfig) -> Self {
        Self::Template(c)
    }
}

impl From<ConstrainedConfig> for Strategy {
    fn from(c: ConstrainedConfig) -> Self {
        Self::Constrained(c)
    }
}

impl From<GoalConfig> for Strategy {
    fn from(c: GoalConfig) -> Self {
        Self::Goal(c)
    }
}

impl From<BackwardConfig> for Strategy {
    fn from(c: BackwardConfig) -> Self {
        Self::Backward(c)
    }
}
