//! Integration tests for backward planning and plan execution

use multihop_engine::{
    BackwardConfig, GenerationContext, GenerationStrategy, PlanNode, Planner, StateRef,
};
use multihop_foundation::InfoType as T;

use crate::support;

#[test]
fn plans_only_start_from_declared_seeds() {
    let rules = support::rules();
    let plans = Planner::new(&rules, T::PersonName, [T::EventName]).plans(T::DurationYears);

    assert_eq!(plans.len(), 2);
    for plan in &plans {
        assert!(matches!(plan.root(), PlanNode::Apply { rule, .. } if rule.as_str() == "duration"));
        assert!(plan
            .root()
            .leaves()
            .iter()
            .all(|leaf| matches!(leaf, StateRef::Seed | StateRef::Auxiliary(0))));
        assert_eq!(plan.size(), 3);
    }
    assert!(plans.windows(2).all(|w| w[0].cost() <= w[1].cost()));
    assert_eq!(
        plans[0].root().to_string(),
        "duration(birth-date(seed), event-date(aux#0))"
    );
}

#[test]
fn sibling_slots_need_distinct_sub_plans() {
    let rules = support::rules();
    let plans = Planner::new(&rules, T::PersonName, []).plans(T::DurationYears);
    assert!(plans.is_empty());
}

#[test]
fn plan_size_is_bounded() {
    let rules = support::rules();
    let plans = Planner::new(&rules, T::PersonName, [T::EventName])
        .with_max_steps(2)
        .plans(T::DurationYears);
    assert!(plans.is_empty());
}

#[test]
fn linearized_plans_run_children_first() {
    let rules = support::rules();
    let plans = Planner::new(&rules, T::PersonName, [T::EventName]).plans(T::DurationYears);
    let steps = plans[0].linearize();
    let order: Vec<(&str, &[StateRef])> = steps
        .iter()
        .map(|s| (s.rule.as_str(), s.inputs.as_slice()))
        .collect();
    assert_eq!(
        order,
        [
            ("birth-date", &[StateRef::Seed][..]),
            ("event-date", &[StateRef::Auxiliary(0)][..]),
            ("duration", &[StateRef::Step(1), StateRef::Step(2)][..]),
        ]
    );
}

#[test]
fn backward_chain_matches_the_first_plan() {
    let rules = support::rules();
    let exec = support::knowledge;
    let ctx = GenerationContext::new(&rules, &exec);
    let config = BackwardConfig::new(T::DurationYears).with_auxiliary_seed(support::ww2());

    let chain = config.generate(&ctx, &support::einstein()).unwrap();
    let plan = &config.plans(&ctx, &support::einstein())[0];

    let executed: Vec<_> = chain
        .steps()
        .iter()
        .map(|s| (s.produced_by.clone().unwrap(), s.inputs.clone()))
        .collect();
    let planned: Vec<_> = plan.linearize().into_iter().map(|s| (s.rule, s.inputs)).collect();
    assert_eq!(executed, planned);
    assert_eq!(chain.final_state().unwrap().value.to_string(), "60.47");
}

#[test]
fn target_that_is_a_seed_type_still_applies_a_rule() {
    let rules = support::rules();
    let plans = Planner::new(&rules, T::PersonName, [T::Date]).plans(T::Date);
    assert!(!plans.is_empty());
    assert!(plans.iter().all(|p| !p.root().is_leaf()));
}

#[test]
fn a_single_attempt_still_finds_the_two_date_plan() {
    let rules = support::rules();
    let exec = support::knowledge;
    let ctx = GenerationContext::new(&rules, &exec);
    let chain = BackwardConfig::new(T::DurationYears)
        .with_auxiliary_seed(support::ww2())
        .with_plan_attempts(1)
        .generate(&ctx, &support::einstein())
        .unwrap();

    assert_eq!(chain.applications(), 3);
    assert_eq!(chain.steps()[0].inputs, [StateRef::Seed]);
    assert_eq!(chain.steps()[1].inputs, [StateRef::Auxiliary(0)]);
    assert_eq!(chain.final_state().unwrap().value.to_string(), "60.47");
}

#[test]
fn attempts_bound_the_result_not_the_search() {
    let rules = support::rules();
    let all = Planner::new(&rules, T::PersonName, [T::EventName]).plans(T::DurationYears);
    let one = Planner::new(&rules, T::PersonName, [T::EventName])
        .with_attempts(1)
        .plans(T::DurationYears);
    assert_eq!(one.len(), 1);
    assert_eq!(one[0].root(), all[0].root());

    let narrow = Planner::new(&rules, T::PersonName, [T::EventName])
        .with_search_width(1)
        .plans(T::DurationYears);
    assert!(narrow.is_empty());
}
