//! One configured generation run.

use multihop_engine::{Chain, GenerationContext, GenerationStrategy, RuleSet, Seed, Strategy};
use multihop_render::{Question, Renderer, TemplateRenderer};
use serde::Serialize;
use tracing::info;

use crate::config::RunConfig;
use crate::error::RuntimeError;
use crate::simulate::SimulatedExecutor;

/// A rule set, executor, strategy and seed ready to generate questions.
#[derive(Debug)]
pub struct Session {
    rules: RuleSet,
    executor: SimulatedExecutor,
    strategy: Strategy,
    seed: Seed,
}

/// The result of a successful run.
#[derive(Clone, Debug, Serialize)]
pub struct Outcome {
    /// Name of the strategy that produced the chain.
    pub strategy: &'static str,
    /// The rendered question.
    pub question: Question,
    /// The provenance chain behind it.
    pub chain: Chain,
}

impl Session {
    /// Creates a session from its parts.
    #[must_use]
    pub fn new(rules: RuleSet, executor: SimulatedExecutor, strategy: Strategy, seed: Seed) -> Self {
        Self {
            rules,
            executor,
            strategy,
            seed,
        }
    }

    /// Resolves a configuration into a session.
    ///
    /// # Errors
    /// Returns the first resolution error of the rule set, executor, strategy
    /// or seed.
    pub fn from_config(config: &RunConfig) -> Result<Self, RuntimeError> {
        let rules = config.rule_set()?;
        let executor = config.executor(&rules)?;
        Ok(Self::new(rules, executor, config.build_strategy()?, config.seed()?))
    }

    /// Replaces the strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: impl Into<Strategy>) -> Self {
        self.strategy = strategy.into();
        self
    }

    /// The rule set.
    #[must_use]
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// The strategy.
    #[must_use]
    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// The primary seed.
    #[must_use]
    pub fn seed(&self) -> &Seed {
        &self.seed
    }

    /// Grows a chain and renders it.
    ///
    /// # Errors
    /// Returns `Generation` with the partial chain if the strategy gives up,
    /// or `Render` if the chain cannot be described.
    pub fn generate(&self) -> Result<Outcome, RuntimeError> {
        let ctx = GenerationContext::new(&self.rules, &self.executor);
        let chain = self.strategy.generate(&ctx, &self.seed)?;
        let question = TemplateRenderer::new(&self.rules).render(&chain)?;
        info!(
            strategy = self.strategy.name(),
            seed = %self.seed.value,
            steps = chain.applications(),
            "question generated"
        );
        Ok(Outcome {
            strategy: self.strategy.name(),
            question,
            chain,
        })
    }
}
