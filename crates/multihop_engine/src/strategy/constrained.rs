//! Budget-constrained random walk.
//!
//! Candidate generation matches forward chaining; each application spends the
//! rule's cost from a fixed budget, and rules costing more than what is left
//! are never selected.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::chain::{Chain, Seed};
use crate::rule::{Rule, RuleId, RuleSet};

use super::walk::{uniform, Walk};
use super::{FailureKind, GenerationContext, GenerationError, GenerationStrategy, check_steps};

/// Options for the budgeted walk.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConstrainedConfig {
    /// Upper bound on rule applications.
    pub max_steps: usize,
    /// Applications required for success.
    pub min_steps: usize,
    /// Total cost the walk may spend.
    pub complexity_budget: u64,
    /// Costs replacing the rules' own.
    pub cost_overrides: BTreeMap<RuleId, u32>,
    /// Seed of the generation-scoped random source.
    pub rng_seed: u64,
}

impl Default for ConstrainedConfig {
    fn default() -> Self {
        Self {
            max_steps: 5,
            min_steps: 1,
            complexity_budget: 5,
            cost_overrides: BTreeMap::new(),
            rng_seed: 0,
        }
    }
}

impl ConstrainedConfig {
    /// Sets `max_steps`.
    #[must_use]
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Sets `min_steps`.
    #[must_use]
    pub fn with_min_steps(mut self, min_steps: usize) -> Self {
        self.min_steps = min_steps;
        self
    }

    /// Sets the budget.
    #[must_use]
    pub fn with_budget(mut self, budget: u64) -> Self {
        self.complexity_budget = budget;
        self
    }

    /// Overrides the cost of one rule.
    #[must_use]
    pub fn with_cost(mut self, rule: impl Into<RuleId>, cost: u32) -> Self {
        self.cost_overrides.insert(rule.into(), cost);
        self
    }

    /// Sets the random seed.
    #[must_use]
    pub fn with_rng_seed(mut self, rng_seed: u64) -> Self {
        self.rng_seed = rng_seed;
        self
    }

    /// Effective cost of a rule under this configuration.
    #[must_use]
    pub fn cost_of(&self, rule: &Rule) -> u64 {
        u64::from(self.cost_overrides.get(&rule.id).copied().unwrap_or(rule.cost))
    }

    /// Cost of every applied rule in `chain`, priced with the overrides.
    #[must_use]
    pub fn chain_cost(&self, chain: &Chain, rules: &RuleSet) -> u64 {
        chain
            .rule_ids()
            .filter_map(|id| rules.get(id))
            .map(|r| self.cost_of(r))
            .sum()
    }
}

impl GenerationStrategy for ConstrainedConfig {
    fn name(&self) -> &'static str {
        "constrained"
    }

    fn generate(&self, ctx: &GenerationContext<'_>, seed: &Seed) -> Result<Chain, GenerationError> {
        check_steps(self.min_steps, self.max_steps, seed)?;

        let mut rng = ChaCha8Rng::seed_from_u64(self.rng_seed);
        let mut walk = Walk::new(ctx, Chain::new(seed).with_limit(self.max_steps));
        let mut remaining = self.complexity_budget;

        while walk.applications() < self.max_steps {
            let reached_min = walk.applications() >= self.min_steps;
            if remaining == 0 && reached_min {
                break;
            }

            let all = walk.candidates();
            let total = all.len();
            let affordable: Vec<_> = all
                .into_iter()
                .filter(|c| self.cost_of(c.rule) <= remaining)
                .collect();
            let priced_out = total - affordable.len();

            let applied = match walk.step(affordable, |c| uniform(&mut rng, c)) {
                Ok(applied) => applied,
                Err(e) => return Err(walk.fail(e.into())),
            };
            match applied {
                Some(rule) => {
                    let cost = self.cost_of(rule);
                    remaining -= cost;
                    debug!(rule = %rule.id, cost, remaining, "spent budget");
                }
                None if reached_min => break,
                None if priced_out > 0 => {
                    let steps = walk.applications();
                    info!(strategy = "constrained", steps, remaining, "budget exceeded");
                    return Err(walk.fail(FailureKind::BudgetExceeded {
                        steps,
                        min_steps: self.min_steps,
                        remaining,
                    }));
                }
                None => {
                    let steps = walk.applications();
                    return Err(walk.fail(FailureKind::NoApplicableRule {
                        steps,
                        min_steps: self.min_steps,
                    }));
                }
            }
        }

        let steps = walk.applications();
        if steps < self.min_steps {
            return Err(walk.fail(FailureKind::NoApplicableRule {
                steps,
                min_steps: self.min_steps,
            }));
        }
        info!(
            strategy = "constrained",
            steps,
            spent = self.complexity_budget - remaining,
            "generation finished"
        );
        Ok(walk.finish())
    }
}
