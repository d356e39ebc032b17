//! Rules and the indexed rule set.
//!
//! A [`Rule`] is a declarative transition from ordered input types to one
//! output type via an operator. A [`RuleSet`] validates rules against the
//! [`CompatibilityTable`] at registration and keeps two indexes:
//! - by input type, for forward search ("what can fire on these types?")
//! - by output type, for backward search ("what could produce this type?")
//!
//! Rule sets are built up front and only read during generation, so they can
//! be shared freely between independent `generate` calls.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use multihop_foundation::{CompatibilityTable, Error, InfoType, OperatorType, Result, RuleViolation};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::chain::State;

// =============================================================================
// Rule Id
// =============================================================================

/// Author-assigned identifier of a rule, unique within a [`RuleSet`].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RuleId(Arc<str>);

impl RuleId {
    /// Creates a rule id.
    #[must_use]
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RuleId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

// =============================================================================
// Predicate
// =============================================================================

/// Side-effect-free applicability check over a concrete candidate binding.
///
/// The predicate receives the bound input states in slot order. It decides
/// whether the rule makes sense for those particular values, e.g. "the event
/// must be a war".
#[derive(Clone, Default)]
pub enum Predicate {
    /// Always applicable.
    #[default]
    Always,
    /// The value bound to `slot` must contain `needle` (case-insensitive).
    TextContains {
        /// Input slot to inspect.
        slot: usize,
        /// Substring to look for.
        needle: String,
    },
    /// The value bound to `slot` must not contain `needle` (case-insensitive).
    TextExcludes {
        /// Input slot to inspect.
        slot: usize,
        /// Substring that must be absent.
        needle: String,
    },
    /// All bound inputs must carry pairwise different values.
    DistinctInputs,
    /// Arbitrary pure check.
    Custom(Arc<dyn Fn(&[&State]) -> bool + Send + Sync>),
}

impl Predicate {
    /// Wraps a closure as a custom predicate.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&[&State]) -> bool + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// Evaluates the predicate against bound inputs.
    #[must_use]
    pub fn holds(&self, inputs: &[&State]) -> bool {
        match self {
            Self::Always => true,
            Self::TextContains { slot, needle } => inputs
                .get(*slot)
                .is_some_and(|s| contains_ignore_case(&s.value.to_string(), needle)),
            Self::TextExcludes { slot, needle } => inputs
                .get(*slot)
                .is_some_and(|s| !contains_ignore_case(&s.value.to_string(), needle)),
            Self::DistinctInputs => inputs
                .iter()
                .enumerate()
                .all(|(i, a)| inputs[i + 1..].iter().all(|b| a.value != b.value)),
            Self::Custom(f) => f(inputs),
        }
    }

    /// Highest input slot this predicate inspects, if any.
    fn max_slot(&self) -> Option<usize> {
        match self {
            Self::TextContains { slot, .. } | Self::TextExcludes { slot, .. } => Some(*slot),
            _ => None,
        }
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => write!(f, "Always"),
            Self::TextContains { slot, needle } => write!(f, "TextContains({slot}, {needle:?})"),
            Self::TextExcludes { slot, needle } => write!(f, "TextExcludes({slot}, {needle:?})"),
            Self::DistinctInputs => write!(f, "DistinctInputs"),
            Self::Custom(_) => write!(f, "Custom(<fn>)"),
        }
    }
}

// =============================================================================
// Rule
// =============================================================================

/// An immutable transition definition.
#[derive(Clone, Debug)]
pub struct Rule {
    /// Unique id.
    pub id: RuleId,
    /// How the value is produced.
    pub operator: OperatorType,
    /// Ordered input slots.
    pub inputs: Vec<InfoType>,
    /// Produced type.
    pub output: InfoType,
    /// Non-negative cost, used by budgeted and planning strategies.
    pub cost: u32,
    /// Applicability check over a concrete binding.
    pub predicate: Predicate,
    /// Step wording with `{input0}`, `{input1}`, ..., `{output}` placeholders.
    pub template: String,
}

impl Rule {
    /// Creates a rule with cost 1 and an always-true predicate.
    #[must_use]
    pub fn new(
        id: impl Into<RuleId>,
        operator: OperatorType,
        inputs: impl Into<Vec<InfoType>>,
        output: InfoType,
        template: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            operator,
            inputs: inputs.into(),
            output,
            cost: 1,
            predicate: Predicate::Always,
            template: template.into(),
        }
    }

    /// Sets the cost.
    #[must_use]
    pub fn with_cost(mut self, cost: u32) -> Self {
        self.cost = cost;
        self
    }

    /// Sets the applicability predicate.
    #[must_use]
    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicate = predicate;
        self
    }

    /// Number of input slots.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.inputs.len()
    }

    /// Checks the rule's own invariants against a compatibility table.
    fn validate(&self, table: &CompatibilityTable) -> std::result::Result<(), RuleViolation> {
        if self.inputs.is_empty() {
            return Err(RuleViolation::NoInputs);
        }
        if self.inputs.contains(&self.output) {
            return Err(RuleViolation::SelfLoop(self.output));
        }
        if !table.allows(self.operator, &self.inputs, self.output) {
            return Err(RuleViolation::NotCompatible {
                operator: self.operator,
                inputs: self.inputs.clone(),
                output: self.output,
            });
        }
        if let Some(slot) = self.predicate.max_slot() {
            if slot >= self.inputs.len() {
                return Err(RuleViolation::PredicateSlot(slot));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}(", self.id, self.operator)?;
        for (i, t) in self.inputs.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{t}")?;
        }
        write!(f, ") -> {}", self.output)
    }
}

// =============================================================================
// Rule Set
// =============================================================================

/// An indexed collection of validated rules.
///
/// Rules keep their registration order, which is the stable tie-break used by
/// the deterministic strategies.
#[derive(Clone, Debug, Default)]
pub struct RuleSet {
    table: CompatibilityTable,
    rules: Vec<Rule>,
    by_id: BTreeMap<RuleId, usize>,
    by_input: BTreeMap<InfoType, Vec<usize>>,
    by_output: BTreeMap<InfoType, Vec<usize>>,
}

impl RuleSet {
    /// Creates an empty rule set validated against `table`.
    #[must_use]
    pub fn new(table: CompatibilityTable) -> Self {
        Self {
            table,
            ..Self::default()
        }
    }

    /// Creates a rule set from rules, registering them in order.
    ///
    /// # Errors
    /// Returns `InvalidRule` for the first rule that fails validation.
    pub fn from_rules(table: CompatibilityTable, rules: impl IntoIterator<Item = Rule>) -> Result<Self> {
        let mut set = Self::new(table);
        for rule in rules {
            set.register(rule)?;
        }
        Ok(set)
    }

    /// Registers a rule and rebuilds the indexes.
    ///
    /// # Errors
    /// Returns `InvalidRule` if the rule has no inputs, outputs one of its own
    /// input types, is absent from the compatibility table, has a predicate
    /// over a missing slot, or reuses an id.
    pub fn register(&mut self, rule: Rule) -> Result<()> {
        rule.validate(&self.table)
            .map_err(|reason| Error::invalid_rule(rule.id.as_str(), reason))?;
        if self.by_id.contains_key(&rule.id) {
            return Err(Error::invalid_rule(rule.id.as_str(), RuleViolation::DuplicateId));
        }
        self.rules.push(rule);
        self.reindex();
        Ok(())
    }

    /// Builder form of [`register`](Self::register).
    ///
    /// # Errors
    /// See [`register`](Self::register).
    pub fn with_rule(mut self, rule: Rule) -> Result<Self> {
        self.register(rule)?;
        Ok(self)
    }

    fn reindex(&mut self) {
        self.by_id.clear();
        self.by_input.clear();
        self.by_output.clear();
        for (index, rule) in self.rules.iter().enumerate() {
            self.by_id.insert(rule.id.clone(), index);
            self.by_output.entry(rule.output).or_default().push(index);
            let mut seen = Vec::with_capacity(rule.inputs.len());
            for t in &rule.inputs {
                if !seen.contains(t) {
                    seen.push(*t);
                    self.by_input.entry(*t).or_default().push(index);
                }
            }
        }
    }

    /// Rules whose every input slot can be bound to a distinct available state.
    ///
    /// `available` lists the types of the available states, one entry per
    /// state. Predicates are not evaluated here. Results are in registration
    /// order.
    #[must_use]
    pub fn rules_applicable_to(&self, available: impl IntoIterator<Item = InfoType>) -> Vec<&Rule> {
        let mut counts: BTreeMap<InfoType, usize> = BTreeMap::new();
        for t in available {
            *counts.entry(t).or_default() += 1;
        }

        let mut indices: Vec<usize> = counts
            .keys()
            .filter_map(|t| self.by_input.get(t))
            .flatten()
            .copied()
            .collect();
        indices.sort_unstable();
        indices.dedup();

        indices
            .into_iter()
            .map(|i| &self.rules[i])
            .filter(|rule| {
                rule.inputs.iter().all(|t| {
                    let needed = rule.inputs.iter().filter(|u| *u == t).count();
                    counts.get(t).copied().unwrap_or(0) >= needed
                })
            })
            .collect()
    }

    /// Rules producing `target`, in registration order.
    #[must_use]
    pub fn rules_producing(&self, target: InfoType) -> Vec<&Rule> {
        self.by_output
            .get(&target)
            .map(|indices| indices.iter().map(|&i| &self.rules[i]).collect())
            .unwrap_or_default()
    }

    /// Looks up a rule by id.
    #[must_use]
    pub fn get(&self, id: &RuleId) -> Option<&Rule> {
        self.by_id.get(id).map(|&i| &self.rules[i])
    }

    /// Registration position of a rule.
    #[must_use]
    pub fn position(&self, id: &RuleId) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    /// All rules in registration order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// The compatibility table rules are validated against.
    #[must_use]
    pub fn table(&self) -> &CompatibilityTable {
        &self.table
    }

    /// Number of registered rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if no rules are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
