//! Backward plans and the AND-OR planner that finds them.
//!
//! A [`Plan`] is a tree whose root produces the target type. Leaves are seeds;
//! inner nodes are rule applications whose children solve each input slot in
//! order. Because a multi-input rule needs every slot solved independently, a
//! plan can combine sub-trees rooted at different seeds.
//!
//! The [`Planner`] explores the rule graph from the target backwards:
//! - OR: any rule producing a type may solve it
//! - AND: a rule is usable only if each of its input types is solved
//!
//! Solved types are memoized. Cycle detection uses the set of types on the
//! current branch only, so sibling branches may freely reuse a type.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use multihop_foundation::InfoType;
use tracing::trace;

use crate::chain::StateRef;
use crate::rule::{Rule, RuleId, RuleSet};

// =============================================================================
// Plan
// =============================================================================

/// A node of a plan tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PlanNode {
    /// The primary seed.
    Seed,
    /// An auxiliary seed, by position.
    Auxiliary(usize),
    /// A rule applied to solved inputs, one child per slot.
    Apply {
        /// The applied rule.
        rule: RuleId,
        /// Sub-plans in slot order.
        children: Vec<PlanNode>,
    },
}

impl PlanNode {
    /// Returns true for seed leaves.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        !matches!(self, Self::Apply { .. })
    }

    /// Seed leaves reachable from this node, left to right.
    #[must_use]
    pub fn leaves(&self) -> Vec<StateRef> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves(&self, out: &mut Vec<StateRef>) {
        match self {
            Self::Seed => out.push(StateRef::Seed),
            Self::Auxiliary(i) => out.push(StateRef::Auxiliary(*i)),
            Self::Apply { children, .. } => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
        }
    }

    fn emit<'p>(&'p self, steps: &mut Vec<PlannedStep>, seen: &mut HashMap<&'p PlanNode, StateRef>) -> StateRef {
        match self {
            Self::Seed => StateRef::Seed,
            Self::Auxiliary(i) => StateRef::Auxiliary(*i),
            Self::Apply { rule, children } => {
                if let Some(r) = seen.get(self) {
                    return *r;
                }
                let inputs = children.iter().map(|c| c.emit(steps, seen)).collect();
                steps.push(PlannedStep {
                    rule: rule.clone(),
                    inputs,
                });
                let r = StateRef::Step(steps.len());
                seen.insert(self, r);
                r
            }
        }
    }
}

impl fmt::Display for PlanNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seed => write!(f, "seed"),
            Self::Auxiliary(i) => write!(f, "aux#{i}"),
            Self::Apply { rule, children } => {
                write!(f, "{rule}(")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{child}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// One rule application of a linearized plan.
///
/// `Step(n)` inputs refer to the n-th planned step (1-based), which is also
/// the chain step it will occupy once executed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedStep {
    /// The rule to apply.
    pub rule: RuleId,
    /// Bound inputs in slot order.
    pub inputs: Vec<StateRef>,
}

/// A plan tree with its total cost and number of applications.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plan {
    root: PlanNode,
    cost: u64,
    size: usize,
}

impl Plan {
    fn new(root: PlanNode, rules: &RuleSet) -> Self {
        let steps = linearize(&root);
        let cost = steps
            .iter()
            .filter_map(|s| rules.get(&s.rule))
            .map(|r| u64::from(r.cost))
            .sum();
        Self {
            root,
            cost,
            size: steps.len(),
        }
    }

    fn leaf(node: PlanNode) -> Self {
        Self {
            root: node,
            cost: 0,
            size: 0,
        }
    }

    /// The root node.
    #[must_use]
    pub fn root(&self) -> &PlanNode {
        &self.root
    }

    /// Sum of the costs of distinct applications.
    #[must_use]
    pub fn cost(&self) -> u64 {
        self.cost
    }

    /// Number of distinct applications.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Applications in execution order, children before parents.
    ///
    /// Structurally identical sub-plans are executed once and shared.
    #[must_use]
    pub fn linearize(&self) -> Vec<PlannedStep> {
        linearize(&self.root)
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [cost {}]", self.root, self.cost)
    }
}

fn linearize(root: &PlanNode) -> Vec<PlannedStep> {
    let mut steps = Vec::new();
    let mut seen = HashMap::new();
    root.emit(&mut steps, &mut seen);
    steps
}

// =============================================================================
// Planner
// =============================================================================

/// Alternatives kept per type during search, independent of how many
/// plans are returned.
pub const DEFAULT_SEARCH_WIDTH: usize = 20;

/// AND-OR search from a target type back to the available seeds.
pub struct Planner<'r> {
    rules: &'r RuleSet,
    leaves: BTreeMap<InfoType, Vec<PlanNode>>,
    attempts: usize,
    width: usize,
    max_steps: usize,
    memo: HashMap<InfoType, Vec<Plan>>,
}

impl<'r> Planner<'r> {
    /// Creates a planner whose leaves are the primary seed type and the
    /// auxiliary seed types, in order.
    #[must_use]
    pub fn new(rules: &'r RuleSet, seed: InfoType, auxiliary: impl IntoIterator<Item = InfoType>) -> Self {
        let mut leaves: BTreeMap<InfoType, Vec<PlanNode>> = BTreeMap::new();
        leaves.entry(seed).or_default().push(PlanNode::Seed);
        for (i, t) in auxiliary.into_iter().enumerate() {
            leaves.entry(t).or_default().push(PlanNode::Auxiliary(i));
        }
        Self {
            rules,
            leaves,
            attempts: 3,
            width: DEFAULT_SEARCH_WIDTH,
            max_steps: 6,
            memo: HashMap::new(),
        }
    }

    /// Bounds the number of plans returned for the target.
    #[must_use]
    pub fn with_attempts(mut self, attempts: usize) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    /// Bounds the alternatives kept per type while searching.
    #[must_use]
    pub fn with_search_width(mut self, width: usize) -> Self {
        self.width = width.max(1);
        self
    }

    /// Bounds the number of applications per plan.
    #[must_use]
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Plans deriving `target`, cheapest first, at most `attempts` of them.
    ///
    /// The root of every plan is a rule application, even when `target` is
    /// itself a seed type.
    pub fn plans(&mut self, target: InfoType) -> Vec<Plan> {
        let path = BTreeSet::from([target]);
        let (mut plans, _) = self.derive(target, &path);
        plans.truncate(self.attempts);
        trace!(target = %target, plans = plans.len(), "planning finished");
        plans
    }

    /// Alternatives for an input slot of type `t`: seed leaves first, then
    /// derivations. The flag reports whether a cycle cut pruned the result.
    fn solve(&mut self, t: InfoType, path: &BTreeSet<InfoType>) -> (Vec<Plan>, bool) {
        if let Some(plans) = self.memo.get(&t) {
            return (plans.clone(), false);
        }
        let mut plans: Vec<Plan> = self
            .leaves
            .get(&t)
            .map(|nodes| nodes.iter().cloned().map(Plan::leaf).collect())
            .unwrap_or_default();
        if path.contains(&t) {
            return (plans, true);
        }

        let mut path = path.clone();
        path.insert(t);
        let (derived, cut) = self.derive(t, &path);
        plans.extend(derived);
        plans.sort_by_key(Plan::cost);
        plans.truncate(self.width);

        if !cut {
            self.memo.insert(t, plans.clone());
        }
        (plans, cut)
    }

    /// Rule applications producing `t`, with `t` already on `path`.
    fn derive(&mut self, t: InfoType, path: &BTreeSet<InfoType>) -> (Vec<Plan>, bool) {
        let rules = self.rules;
        let mut plans = Vec::new();
        let mut cut = false;

        for rule in rules.rules_producing(t) {
            let mut slots = Vec::with_capacity(rule.arity());
            for input in &rule.inputs {
                let (alternatives, c) = self.solve(*input, path);
                cut |= c;
                slots.push(alternatives);
            }
            if slots.iter().any(Vec::is_empty) {
                continue;
            }
            plans.extend(self.combine(rule, &slots));
        }

        plans.sort_by_key(Plan::cost);
        plans.truncate(self.width);
        (plans, cut)
    }

    /// Every combination of slot alternatives, odometer order, up to
    /// the search width. Slots of the same type must use different sub-plans.
    fn combine(&self, rule: &Rule, slots: &[Vec<Plan>]) -> Vec<Plan> {
        let mut out = Vec::new();
        let mut index = vec![0usize; slots.len()];

        'odometer: loop {
            let picked: Vec<&Plan> = index.iter().zip(slots).map(|(&i, alts)| &alts[i]).collect();
            let distinct = (0..picked.len()).all(|i| {
                (i + 1..picked.len()).all(|j| {
                    rule.inputs[i] != rule.inputs[j] || picked[i].root != picked[j].root
                })
            });
            if distinct {
                let root = PlanNode::Apply {
                    rule: rule.id.clone(),
                    children: picked.iter().map(|p| p.root.clone()).collect(),
                };
                let plan = Plan::new(root, self.rules);
                if plan.size <= self.max_steps {
                    out.push(plan);
                    if out.len() >= self.width {
                        break;
                    }
                }
            }

            for slot in (0..index.len()).rev() {
                index[slot] += 1;
                if index[slot] < slots[slot].len() {
                    continue 'odometer;
                }
                index[slot] = 0;
            }
            break;
        }
        out
    }
}

// =============================================================================
// Tests
// =============================================================================
