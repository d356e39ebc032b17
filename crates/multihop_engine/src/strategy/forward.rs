//! Random forward chaining.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::chain::{Chain, Seed};

use super::walk::{uniform, Walk};
use super::{FailureKind, GenerationContext, GenerationError, GenerationStrategy, check_steps};

/// Options for random forward chaining.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ForwardConfig {
    /// Upper bound on rule applications.
    pub max_steps: usize,
    /// Applications required for success.
    pub min_steps: usize,
    /// Seed of the generation-scoped random source.
    pub rng_seed: u64,
}

impl Default for ForwardConfig {
    fn default() -> Self {
        Self {
            max_steps: 3,
            min_steps: 1,
            rng_seed: 0,
        }
    }
}

impl ForwardConfig {
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

    /// Sets the random seed.
    #[must_use]
    pub fn with_rng_seed(mut self, rng_seed: u64) -> Self {
        self.rng_seed = rng_seed;
        self
    }
}

impl GenerationStrategy for ForwardConfig {
    fn name(&self) -> &'static str {
        "forward"
    }

    fn generate(&self, ctx: &GenerationContext<'_>, seed: &Seed) -> Result<Chain, GenerationError> {
        check_steps(self.min_steps, self.max_steps, seed)?;

        let mut rng = ChaCha8Rng::seed_from_u64(self.rng_seed);
        let mut walk = Walk::new(ctx, Chain::new(seed).with_limit(self.max_steps));

        while walk.applications() < self.max_steps {
            let candidates = walk.candidates();
            match walk.step(candidates, |c| uniform(&mut rng, c)) {
                Ok(Some(_)) => {}
                Ok(None) => break,
                Err(e) => return Err(walk.fail(e.into())),
            }
        }

        let steps = walk.applications();
        if steps < self.min_steps {
            info!(strategy = "forward", steps, "frontier exhausted");
            return Err(walk.fail(FailureKind::NoApplicableRule {
                steps,
                min_steps: self.min_steps,
            }));
        }
        info!(strategy = "forward", steps, "generation finished");
        Ok(walk.finish())
    }
}
