//! Backward planning followed by forward execution of the plan.

use multihop_foundation::{Error, InfoType};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::chain::{Chain, Seed, State};
use crate::plan::{Plan, Planner};

use super::{FailureKind, GenerationContext, GenerationError, GenerationStrategy, check_steps};

/// Options for backward chaining.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BackwardConfig {
    /// Type the plan's root must produce.
    pub target_type: InfoType,
    /// Extra independently rooted entities plans may start from.
    #[cfg_attr(feature = "serde", serde(default))]
    pub auxiliary_seeds: Vec<Seed>,
    /// Alternative plans to try before giving up.
    pub plan_attempts: usize,
    /// Upper bound on rule applications per plan.
    pub max_steps: usize,
}

impl BackwardConfig {
    /// Creates a config targeting `target_type` with 3 attempts of up to 6 steps.
    #[must_use]
    pub fn new(target_type: InfoType) -> Self {
        Self {
            target_type,
            auxiliary_seeds: Vec::new(),
            plan_attempts: 3,
            max_steps: 6,
        }
    }

    /// Adds an auxiliary seed.
    #[must_use]
    pub fn with_auxiliary_seed(mut self, seed: Seed) -> Self {
        self.auxiliary_seeds.push(seed);
        self
    }

    /// Sets `plan_attempts`.
    #[must_use]
    pub fn with_plan_attempts(mut self, plan_attempts: usize) -> Self {
        self.plan_attempts = plan_attempts;
        self
    }

    /// Sets `max_steps`.
    #[must_use]
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    fn empty_chain(&self, seed: &Seed) -> Chain {
        Chain::new(seed)
            .with_auxiliary(&self.auxiliary_seeds)
            .with_limit(self.max_steps)
    }

    /// Plans for `seed`, cheapest first.
    #[must_use]
    pub fn plans(&self, ctx: &GenerationContext<'_>, seed: &Seed) -> Vec<Plan> {
        Planner::new(
            ctx.rules,
            seed.info_type,
            self.auxiliary_seeds.iter().map(|s| s.info_type),
        )
        .with_attempts(self.plan_attempts)
        .with_max_steps(self.max_steps)
        .plans(self.target_type)
    }

    /// Executes one plan, returning the chain or the chain at the failing step.
    fn execute(&self, ctx: &GenerationContext<'_>, seed: &Seed, plan: &Plan) -> Result<Chain, (Chain, String)> {
        let mut chain = self.empty_chain(seed);
        for step in plan.linearize() {
            let Some(rule) = ctx.rules.get(&step.rule) else {
                return Err((chain, format!("rule {} is not registered", step.rule)));
            };
            let inputs: Vec<&State> = step.inputs.iter().filter_map(|r| chain.resolve(*r)).collect();
            if inputs.len() != step.inputs.len() {
                return Err((chain, format!("unresolved input for {}", rule.id)));
            }
            if !rule.predicate.holds(&inputs) {
                return Err((chain, format!("predicate of {} rejected its inputs", rule.id)));
            }
            let value = match ctx.executor.execute(rule, &inputs) {
                Ok(value) => value,
                Err(e) => return Err((chain, e.to_string())),
            };
            if let Err(e) = chain.append(rule, step.inputs, value) {
                return Err((chain, e.to_string()));
            }
            debug!(rule = %rule.id, step = chain.applications(), "executed planned step");
        }
        Ok(chain)
    }
}

impl GenerationStrategy for BackwardConfig {
    fn name(&self) -> &'static str {
        "backward"
    }

    fn generate(&self, ctx: &GenerationContext<'_>, seed: &Seed) -> Result<Chain, GenerationError> {
        check_steps(0, self.max_steps, seed)?;
        if self.plan_attempts == 0 {
            return Err(GenerationError::invalid_config(
                "plan_attempts must be at least 1",
                seed,
            ));
        }

        let plans = self.plans(ctx, seed);
        if plans.is_empty() {
            info!(strategy = "backward", target = %self.target_type, "no plan found");
            return Err(GenerationError::new(
                FailureKind::PlanNotFound {
                    target: self.target_type,
                },
                self.empty_chain(seed),
            ));
        }

        let mut last = self.empty_chain(seed);
        for (attempt, plan) in plans.iter().take(self.plan_attempts).enumerate() {
            debug!(attempt, %plan, "executing plan");
            match self.execute(ctx, seed, plan) {
                Ok(chain) => {
                    if chain.final_state().map(|s| s.info_type) != Some(self.target_type) {
                        let err = Error::invariant(format!("plan {plan} does not produce {}", self.target_type));
                        return Err(GenerationError::new(err.into(), chain));
                    }
                    info!(
                        strategy = "backward",
                        steps = chain.applications(),
                        attempt,
                        "generation finished"
                    );
                    return Ok(chain);
                }
                Err((partial, reason)) => {
                    warn!(attempt, %plan, %reason, "plan abandoned");
                    last = partial;
                }
            }
        }

        Err(GenerationError::new(
            FailureKind::ExecutionExhausted {
                attempts: plans.len().min(self.plan_attempts),
            },
            last,
        ))
    }
}
