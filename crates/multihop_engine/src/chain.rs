//! The provenance trace produced by one generation run.
//!
//! A [`Chain`] is an append-only sequence of [`State`]s. Step 0 is the
//! primary seed; every later step was produced by exactly one rule
//! application whose inputs refer only to earlier steps or to seeds.
//! Auxiliary seeds (independently rooted entities used by backward chaining)
//! live beside the step sequence and are referenced by position.

use std::collections::BTreeSet;
use std::fmt;

use multihop_foundation::{Error, ErrorContext, InfoType, OperatorType, Result, Value};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::rule::{Rule, RuleId, RuleSet};

// =============================================================================
// Seeds and References
// =============================================================================

/// A caller-supplied starting entity.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Seed {
    /// The entity's value.
    pub value: Value,
    /// The entity's type.
    pub info_type: InfoType,
}

impl Seed {
    /// Creates a seed.
    #[must_use]
    pub fn new(value: impl Into<Value>, info_type: InfoType) -> Self {
        Self {
            value: value.into(),
            info_type,
        }
    }
}

/// Reference from a bound input to the state it came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StateRef {
    /// The primary seed (step 0).
    Seed,
    /// An auxiliary seed, by position.
    Auxiliary(usize),
    /// A derived step (index >= 1).
    Step(usize),
}

impl fmt::Display for StateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seed => write!(f, "seed"),
            Self::Auxiliary(i) => write!(f, "aux#{i}"),
            Self::Step(i) => write!(f, "step#{i}"),
        }
    }
}

// =============================================================================
// State
// =============================================================================

/// A typed value at one point of the trace, with its provenance.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct State {
    /// Position in the chain (0 for seeds).
    pub step: usize,
    /// Type of the value.
    pub info_type: InfoType,
    /// The value itself.
    pub value: Value,
    /// Rule that produced this state, `None` for seeds.
    pub produced_by: Option<RuleId>,
    /// Bound inputs in slot order.
    pub inputs: Vec<StateRef>,
}

impl State {
    /// Creates a seed state.
    #[must_use]
    pub fn seed(seed: &Seed) -> Self {
        Self {
            step: 0,
            info_type: seed.info_type,
            value: seed.value.clone(),
            produced_by: None,
            inputs: Vec::new(),
        }
    }

    /// Returns true if this state was supplied rather than produced.
    #[must_use]
    pub fn is_seed(&self) -> bool {
        self.produced_by.is_none()
    }

    /// Indices of derived steps this state was computed from.
    ///
    /// Seed inputs are not steps and are not included.
    #[must_use]
    pub fn parent_steps(&self) -> BTreeSet<usize> {
        self.inputs
            .iter()
            .filter_map(|r| match r {
                StateRef::Step(i) => Some(*i),
                _ => None,
            })
            .collect()
    }
}

// =============================================================================
// Chain
// =============================================================================

/// Ordered, provenance-linked trace of one generation run.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Chain {
    states: Vec<State>,
    auxiliary: Vec<State>,
    limit: Option<usize>,
}

impl Chain {
    /// Creates a chain holding only the primary seed.
    #[must_use]
    pub fn new(seed: &Seed) -> Self {
        Self {
            states: vec![State::seed(seed)],
            auxiliary: Vec::new(),
            limit: None,
        }
    }

    /// Attaches auxiliary seeds.
    #[must_use]
    pub fn with_auxiliary<'s>(mut self, seeds: impl IntoIterator<Item = &'s Seed>) -> Self {
        self.auxiliary = seeds.into_iter().map(State::seed).collect();
        self
    }

    /// Bounds the number of rule applications.
    #[must_use]
    pub fn with_limit(mut self, max_applications: usize) -> Self {
        self.limit = Some(max_applications);
        self
    }

    /// Appends the result of applying `rule` to `inputs`.
    ///
    /// # Errors
    /// Returns `InvariantViolation` if the limit is reached, the arity is
    /// wrong, an input reference does not resolve to an earlier state, or the
    /// same state is bound twice; returns `TypeMismatch` if a bound input's
    /// type differs from the rule's slot type.
    pub fn append(&mut self, rule: &Rule, inputs: Vec<StateRef>, value: Value) -> Result<&State> {
        let step = self.states.len();
        let context = || {
            ErrorContext::new()
                .with_source(rule.id.as_str())
                .with_step(step)
        };

        if let Some(limit) = self.limit {
            if self.applications() >= limit {
                return Err(Error::invariant(format!(
                    "chain limit of {limit} applications reached"
                ))
                .with_context(context()));
            }
        }
        if inputs.len() != rule.arity() {
            return Err(Error::invariant(format!(
                "rule expects {} inputs, got {}",
                rule.arity(),
                inputs.len()
            ))
            .with_context(context()));
        }
        for (slot, (r, expected)) in inputs.iter().zip(&rule.inputs).enumerate() {
            if inputs[..slot].contains(r) {
                return Err(Error::invariant(format!("{r} bound twice")).with_context(context()));
            }
            let state = self.resolve_before(*r, step).ok_or_else(|| {
                Error::invariant(format!("input {r} does not precede step {step}"))
                    .with_context(context())
            })?;
            if state.info_type != *expected {
                return Err(
                    Error::type_mismatch(*expected, state.info_type).with_context(context())
                );
            }
        }

        self.states.push(State {
            step,
            info_type: rule.output,
            value,
            produced_by: Some(rule.id.clone()),
            inputs,
        });
        Ok(&self.states[step])
    }

    fn resolve_before(&self, r: StateRef, step: usize) -> Option<&State> {
        match r {
            StateRef::Step(i) if i == 0 || i >= step => None,
            r => self.resolve(r),
        }
    }

    /// Resolves a reference to its state.
    #[must_use]
    pub fn resolve(&self, r: StateRef) -> Option<&State> {
        match r {
            StateRef::Seed => self.states.first(),
            StateRef::Auxiliary(i) => self.auxiliary.get(i),
            StateRef::Step(0) => None,
            StateRef::Step(i) => self.states.get(i),
        }
    }

    /// Every state that can serve as an input, most recent first.
    ///
    /// Derived steps come first (newest to oldest), then auxiliary seeds, then
    /// the primary seed.
    pub fn frontier(&self) -> impl Iterator<Item = (StateRef, &State)> + '_ {
        let steps = self.states[1..]
            .iter()
            .rev()
            .map(|s| (StateRef::Step(s.step), s));
        let aux = self
            .auxiliary
            .iter()
            .enumerate()
            .map(|(i, s)| (StateRef::Auxiliary(i), s));
        steps.chain(aux).chain(std::iter::once((StateRef::Seed, &self.states[0])))
    }

    /// The primary seed state.
    #[must_use]
    pub fn seed(&self) -> &State {
        &self.states[0]
    }

    /// Auxiliary seed states.
    #[must_use]
    pub fn auxiliary(&self) -> &[State] {
        &self.auxiliary
    }

    /// All states, seed first.
    #[must_use]
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// Derived states only, in step order.
    #[must_use]
    pub fn steps(&self) -> &[State] {
        &self.states[1..]
    }

    /// Number of rule applications.
    #[must_use]
    pub fn applications(&self) -> usize {
        self.states.len() - 1
    }

    /// Last derived state, if any rule was applied.
    #[must_use]
    pub fn final_state(&self) -> Option<&State> {
        self.steps().last()
    }

    /// The application limit, if one was set.
    #[must_use]
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Ids of the applied rules, in step order.
    pub fn rule_ids(&self) -> impl Iterator<Item = &RuleId> + '_ {
        self.steps().iter().filter_map(|s| s.produced_by.as_ref())
    }

    /// Operators of the applied rules, in step order.
    #[must_use]
    pub fn operators(&self, rules: &RuleSet) -> Vec<OperatorType> {
        self.rule_ids()
            .filter_map(|id| rules.get(id))
            .map(|r| r.operator)
            .collect()
    }

    /// Sum of the base costs of all applied rules.
    ///
    /// Per-run cost overrides are not applied here; see
    /// `ConstrainedConfig::chain_cost`.
    #[must_use]
    pub fn total_cost(&self, rules: &RuleSet) -> u64 {
        self.rule_ids()
            .filter_map(|id| rules.get(id))
            .map(|r| u64::from(r.cost))
            .sum()
    }

    /// Rechecks every structural invariant against the rules that built it.
    ///
    /// # Errors
    /// Returns the first violated invariant.
    pub fn verify(&self, rules: &RuleSet) -> Result<()> {
        let seed = &self.states[0];
        if seed.step != 0 || !seed.is_seed() || !seed.inputs.is_empty() {
            return Err(Error::invariant("step 0 must be an unproduced seed"));
        }
        if let Some(limit) = self.limit {
            if self.applications() > limit {
                return Err(Error::invariant(format!(
                    "{} applications exceed limit {limit}",
                    self.applications()
                )));
            }
        }
        for (index, state) in self.states.iter().enumerate().skip(1) {
            let context = || ErrorContext::new().with_step(index);
            if state.step != index {
                return Err(Error::invariant(format!(
                    "state at position {index} claims step {}",
                    state.step
                ))
                .with_context(context()));
            }
            let id = state
                .produced_by
                .as_ref()
                .ok_or_else(|| Error::invariant("derived state without a rule").with_context(context()))?;
            let rule = rules.get(id).ok_or_else(|| {
                Error::invariant(format!("unknown rule {id}")).with_context(context())
            })?;
            if rule.output != state.info_type {
                return Err(
                    Error::type_mismatch(rule.output, state.info_type).with_context(context())
                );
            }
            if state.inputs.len() != rule.arity() {
                return Err(Error::invariant("arity mismatch").with_context(context()));
            }
            for (r, expected) in state.inputs.iter().zip(&rule.inputs) {
                let input = self.resolve_before(*r, index).ok_or_else(|| {
                    Error::invariant(format!("input {r} does not precede step {index}"))
                        .with_context(context())
                })?;
                if input.info_type != *expected {
                    return Err(
                        Error::type_mismatch(*expected, input.info_type).with_context(context())
                    );
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
