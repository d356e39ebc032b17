//! Goal-directed search toward a target type.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use multihop_foundation::InfoType;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::chain::{Chain, Seed};
use crate::rule::RuleSet;

use super::walk::{Candidate, Walk};
use super::{FailureKind, GenerationContext, GenerationError, GenerationStrategy, check_steps};

// =============================================================================
// Distance Map
// =============================================================================

/// Type-level hop counts to a target.
///
/// Built once per generation. Only rules whose inputs are all reachable from
/// the starting types contribute, and a rule's distance ignores how its other
/// inputs are obtained, so the map is a heuristic rather than a guarantee.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DistanceMap {
    target: InfoType,
    distances: BTreeMap<InfoType, usize>,
}

impl DistanceMap {
    /// Computes distances to `target` over rules usable from `start`.
    #[must_use]
    pub fn compute(rules: &RuleSet, start: impl IntoIterator<Item = InfoType>, target: InfoType) -> Self {
        let mut reachable: BTreeSet<InfoType> = start.into_iter().collect();
        loop {
            let before = reachable.len();
            for rule in rules.rules() {
                if rule.inputs.iter().all(|t| reachable.contains(t)) {
                    reachable.insert(rule.output);
                }
            }
            if reachable.len() == before {
                break;
            }
        }

        let mut distances = BTreeMap::from([(target, 0)]);
        let mut queue = VecDeque::from([target]);
        while let Some(t) = queue.pop_front() {
            let d = distances[&t];
            for rule in rules.rules_producing(t) {
                if !rule.inputs.iter().all(|u| reachable.contains(u)) {
                    continue;
                }
                for input in &rule.inputs {
                    if !distances.contains_key(input) {
                        distances.insert(*input, d + 1);
                        queue.push_back(*input);
                    }
                }
            }
        }

        Self { target, distances }
    }

    /// Hops from `t` to the target, or `None` if it cannot lead there.
    #[must_use]
    pub fn distance(&self, t: InfoType) -> Option<usize> {
        self.distances.get(&t).copied()
    }

    /// The target type.
    #[must_use]
    pub fn target(&self) -> InfoType {
        self.target
    }

    /// Returns true if the target has a finite distance from `t`.
    #[must_use]
    pub fn reaches(&self, t: InfoType) -> bool {
        self.distances.contains_key(&t)
    }
}

// =============================================================================
// Strategy
// =============================================================================

/// Options for goal-directed search.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GoalConfig {
    /// Type the chain must end with.
    pub target_type: InfoType,
    /// Upper bound on rule applications.
    pub max_steps: usize,
    /// Seed of the generation-scoped random source.
    #[cfg_attr(feature = "serde", serde(default))]
    pub rng_seed: u64,
}

impl GoalConfig {
    /// Creates a config targeting `target_type` within 5 steps.
    #[must_use]
    pub fn new(target_type: InfoType) -> Self {
        Self {
            target_type,
            max_steps: 5,
            rng_seed: 0,
        }
    }

    /// Sets `max_steps`.
    #[must_use]
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Sets the random seed.
    #[must_use]
    pub fn with_rng_seed(mut self, rng_seed: u64) -> Self {
        self.rng_seed = rng_seed;
        self
    }
}

/// Picks among the candidates nearest to the target, then a binding,
/// uniformly at random. Unreachable outputs rank last.
fn nearest<R: Rng>(rng: &mut R, map: &DistanceMap, candidates: &[Candidate<'_>]) -> (usize, usize) {
    let rank = |c: &Candidate<'_>| map.distance(c.rule.output).unwrap_or(usize::MAX);
    let best = candidates.iter().map(rank).min().unwrap_or(usize::MAX);
    let tied: Vec<usize> = candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| rank(c) == best)
        .map(|(i, _)| i)
        .collect();
    let ci = tied[rng.gen_range(0..tied.len())];
    let bi = rng.gen_range(0..candidates[ci].bindings.len());
    (ci, bi)
}

impl GenerationStrategy for GoalConfig {
    fn name(&self) -> &'static str {
        "goal"
    }

    fn generate(&self, ctx: &GenerationContext<'_>, seed: &Seed) -> Result<Chain, GenerationError> {
        check_steps(0, self.max_steps, seed)?;

        let map = DistanceMap::compute(ctx.rules, [seed.info_type], self.target_type);
        if !map.reaches(seed.info_type) {
            debug!(target = %self.target_type, "target has no finite distance from the seed");
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.rng_seed);
        let mut walk = Walk::new(ctx, Chain::new(seed).with_limit(self.max_steps));

        while walk.applications() < self.max_steps {
            let candidates = walk.candidates();
            match walk.step(candidates, |c| nearest(&mut rng, &map, c)) {
                Ok(Some(rule)) if rule.output == self.target_type => {
                    info!(
                        strategy = "goal",
                        steps = walk.applications(),
                        target = %self.target_type,
                        "generation finished"
                    );
                    return Ok(walk.finish());
                }
                Ok(Some(_)) => {}
                Ok(None) => break,
                Err(e) => return Err(walk.fail(e.into())),
            }
        }

        let steps = walk.applications();
        info!(strategy = "goal", steps, target = %self.target_type, "target not reached");
        Err(walk.fail(FailureKind::GoalUnreachable {
            target: self.target_type,
            steps,
        }))
    }
}
