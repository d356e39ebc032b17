//! Candidate enumeration and the execute-or-prune step shared by the
//! frontier-growing strategies.

use std::collections::BTreeSet;

use multihop_foundation::Result;
use rand::Rng;
use tracing::{debug, trace};

use crate::chain::{Chain, State, StateRef};
use crate::executor::Executor;
use crate::rule::{Rule, RuleId, RuleSet};

use super::{FailureKind, GenerationContext, GenerationError};

/// A rule together with every admissible binding of its slots.
#[derive(Clone, Debug)]
pub(crate) struct Candidate<'a> {
    pub rule: &'a Rule,
    /// Bindings in frontier order, most recent states first.
    pub bindings: Vec<Vec<StateRef>>,
}

/// A chain under construction plus the applications already made.
pub(crate) struct Walk<'a> {
    rules: &'a RuleSet,
    executor: &'a dyn Executor,
    chain: Chain,
    refracted: BTreeSet<(RuleId, Vec<StateRef>)>,
}

impl<'a> Walk<'a> {
    pub fn new(ctx: &GenerationContext<'a>, chain: Chain) -> Self {
        Self {
            rules: ctx.rules,
            executor: ctx.executor,
            chain,
            refracted: BTreeSet::new(),
        }
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn applications(&self) -> usize {
        self.chain.applications()
    }

    pub fn finish(self) -> Chain {
        self.chain
    }

    pub fn fail(self, kind: FailureKind) -> GenerationError {
        GenerationError::new(kind, self.chain)
    }

    /// Structurally applicable rules whose predicate holds for at least one
    /// binding that has not fired yet, in registration order.
    pub fn candidates(&self) -> Vec<Candidate<'a>> {
        let frontier: Vec<(StateRef, &State)> = self.chain.frontier().collect();
        let rules = self.rules.rules_applicable_to(frontier.iter().map(|(_, s)| s.info_type));

        let candidates: Vec<_> = rules
            .into_iter()
            .filter_map(|rule| {
                let bindings: Vec<_> = bindings_for(rule, &frontier)
                    .into_iter()
                    .filter(|b| !self.refracted.contains(&(rule.id.clone(), b.clone())))
                    .filter(|b| rule.predicate.holds(&self.resolve(b)))
                    .collect();
                (!bindings.is_empty()).then_some(Candidate { rule, bindings })
            })
            .collect();

        trace!(
            frontier = frontier.len(),
            candidates = candidates.len(),
            "enumerated candidates"
        );
        candidates
    }

    fn resolve(&self, binding: &[StateRef]) -> Vec<&State> {
        binding
            .iter()
            .filter_map(|r| self.chain.resolve(*r))
            .collect()
    }

    /// Executes the candidate chosen by `choose`, pruning bindings the
    /// executor rejects and asking again until one succeeds.
    ///
    /// `choose` returns `(candidate index, binding index)` and is only called
    /// with a non-empty slice whose candidates all have bindings. Returns the
    /// applied rule, or `None` once every candidate has been pruned.
    pub fn step(
        &mut self,
        mut candidates: Vec<Candidate<'a>>,
        mut choose: impl FnMut(&[Candidate<'a>]) -> (usize, usize),
    ) -> Result<Option<&'a Rule>> {
        while !candidates.is_empty() {
            let (ci, bi) = choose(&candidates);
            let rule = candidates[ci].rule;
            let binding = candidates[ci].bindings[bi].clone();

            let result = self.executor.execute(rule, &self.resolve(&binding));
            match result {
                Ok(value) => {
                    self.refracted.insert((rule.id.clone(), binding.clone()));
                    let state = self.chain.append(rule, binding, value)?;
                    debug!(rule = %rule.id, step = state.step, value = %state.value, "applied rule");
                    return Ok(Some(rule));
                }
                Err(error) => {
                    debug!(rule = %rule.id, %error, "pruned candidate binding");
                    candidates[ci].bindings.remove(bi);
                    if candidates[ci].bindings.is_empty() {
                        candidates.remove(ci);
                    }
                }
            }
        }
        Ok(None)
    }
}

/// Every assignment of distinct frontier states to the rule's slots.
fn bindings_for(rule: &Rule, frontier: &[(StateRef, &State)]) -> Vec<Vec<StateRef>> {
    let mut partials: Vec<Vec<StateRef>> = vec![Vec::with_capacity(rule.arity())];
    for slot in &rule.inputs {
        let mut next = Vec::new();
        for partial in &partials {
            for (r, _) in frontier.iter().filter(|(_, s)| s.info_type == *slot) {
                if !partial.contains(r) {
                    let mut extended = partial.clone();
                    extended.push(*r);
                    next.push(extended);
                }
            }
        }
        partials = next;
    }
    partials
}

/// Picks a candidate, then one of its bindings, uniformly at random.
pub(crate) fn uniform<R: Rng>(rng: &mut R, candidates: &[Candidate<'_>]) -> (usize, usize) {
    let ci = rng.gen_range(0..candidates.len());
    let bi = rng.gen_range(0..candidates[ci].bindings.len());
    (ci, bi)
}
