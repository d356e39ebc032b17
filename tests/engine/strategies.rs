//! Integration tests for the generation strategies

use std::collections::BTreeSet;

use multihop_engine::{
    Chain, ConstrainedConfig, ExecutionError, FailureKind, ForwardConfig, GenerationContext,
    GenerationStrategy, GoalConfig, Rule, Seed, State, Strategy, TemplateConfig, TemplateStep,
};
use multihop_foundation::{InfoType as T, OperatorType as Op, Value};

use crate::support;

fn generate(strategy: impl Into<Strategy>, seed: &Seed) -> Result<Chain, multihop_engine::GenerationError> {
    let rules = support::rules();
    let exec = support::knowledge;
    let ctx = GenerationContext::new(&rules, &exec);
    strategy.into().generate(&ctx, seed)
}

fn no_repeated_applications(chain: &Chain) -> bool {
    let mut seen = BTreeSet::new();
    chain
        .steps()
        .iter()
        .all(|s| seen.insert((s.produced_by.clone(), s.inputs.clone())))
}

// =============================================================================
// Forward Chaining
// =============================================================================

#[test]
fn forward_chains_are_well_formed_for_any_rng_seed() {
    let rules = support::rules();
    for rng_seed in 0..32 {
        let chain = generate(
            ForwardConfig::default().with_max_steps(6).with_rng_seed(rng_seed),
            &support::einstein(),
        )
        .unwrap();
        chain.verify(&rules).unwrap();
        assert!((1..=6).contains(&chain.applications()));
        assert!(no_repeated_applications(&chain), "rng seed {rng_seed}");
    }
}

#[test]
fn forward_is_deterministic_per_rng_seed() {
    for rng_seed in [0, 7, 12_345] {
        let config = ForwardConfig::default().with_max_steps(5).with_rng_seed(rng_seed);
        let a = generate(config.clone(), &support::einstein()).unwrap();
        let b = generate(config, &support::einstein()).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn forward_reports_a_dead_end_below_min_steps() {
    let err = generate(
        ForwardConfig::default().with_min_steps(1),
        &Seed::new("Ada Lovelace", T::PersonName),
    )
    .unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::NoApplicableRule {
            steps: 0,
            min_steps: 1
        }
    );
    assert_eq!(err.partial.applications(), 0);
}

#[test]
fn forward_min_steps_above_max_is_invalid() {
    let err = generate(
        ForwardConfig::default().with_max_steps(2).with_min_steps(3),
        &support::einstein(),
    )
    .unwrap_err();
    assert!(matches!(err.kind, FailureKind::InvalidConfig(_)));
}

#[test]
fn failing_executions_prune_only_that_candidate() {
    let rules = support::rules();
    let exec = |rule: &Rule, inputs: &[&State]| {
        if rule.id.as_str() == "birth-date" {
            Err(ExecutionError::Backend("rate limited".into()))
        } else {
            support::knowledge(rule, inputs)
        }
    };
    let ctx = GenerationContext::new(&rules, &exec);
    for rng_seed in 0..8 {
        let chain = ForwardConfig::default()
            .with_max_steps(4)
            .with_rng_seed(rng_seed)
            .generate(&ctx, &support::einstein())
            .unwrap();
        assert!(chain.rule_ids().all(|id| id.as_str() != "birth-date"));
        assert_eq!(chain.steps()[0].produced_by.as_ref().map(|id| id.as_str()), Some("birth-place"));
    }
}

// =============================================================================
// Template
// =============================================================================

#[test]
fn template_follows_operators_in_order() {
    let rules = support::rules();
    let chain = generate(
        TemplateConfig::new([Op::Search, Op::Search, Op::Calculate]),
        &support::einstein(),
    )
    .unwrap();
    assert_eq!(chain.applications(), 3);
    assert_eq!(chain.operators(&rules), [Op::Search, Op::Search, Op::Calculate]);
    let ids: Vec<&str> = chain.rule_ids().map(|id| id.as_str()).collect();
    assert_eq!(ids, ["birth-date", "birth-place", "year"]);
}

#[test]
fn template_hints_narrow_the_choice() {
    let chain = generate(
        TemplateConfig::new([TemplateStep::hinted(Op::Search, "birth place")]),
        &support::einstein(),
    )
    .unwrap();
    assert_eq!(chain.final_state().unwrap().value, Value::from("Ulm"));
}

#[test]
fn template_mismatch_names_the_first_unmatched_entry() {
    let err = generate(TemplateConfig::new([Op::Search, Op::Compare, Op::Search]), &support::einstein())
        .unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TemplateMismatch {
            index: 1,
            operator: Op::Compare
        }
    );
    assert_eq!(err.partial.applications(), 1);
}

#[test]
fn template_longer_than_max_steps_is_invalid() {
    let err = generate(
        TemplateConfig::new([Op::Search, Op::Search, Op::Search]).with_max_steps(2),
        &support::einstein(),
    )
    .unwrap_err();
    assert!(matches!(err.kind, FailureKind::InvalidConfig(_)));
    assert_eq!(err.partial.applications(), 0);
}

// =============================================================================
// Constrained Walk
// =============================================================================

#[test]
fn constrained_walk_stops_when_the_budget_is_spent() {
    let rules = support::rules();
    for rng_seed in 0..16 {
        let chain = generate(
            ConstrainedConfig::default()
                .with_budget(2)
                .with_min_steps(2)
                .with_rng_seed(rng_seed),
            &support::einstein(),
        )
        .unwrap();
        assert_eq!(chain.applications(), 2, "rng seed {rng_seed}");
        assert_eq!(chain.total_cost(&rules), 2);
    }
}

#[test]
fn constrained_walk_reports_budget_exhaustion_below_min_steps() {
    let err = generate(
        ConstrainedConfig::default().with_budget(1).with_min_steps(2),
        &support::einstein(),
    )
    .unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::BudgetExceeded {
            steps: 1,
            min_steps: 2,
            remaining: 0
        }
    );
}

#[test]
fn cost_overrides_price_rules_out() {
    for rng_seed in 0..8 {
        let chain = generate(
            ConstrainedConfig::default()
                .with_budget(3)
                .with_min_steps(0)
                .with_cost("birth-date", 5)
                .with_rng_seed(rng_seed),
            &support::einstein(),
        )
        .unwrap();
        assert!(chain.rule_ids().all(|id| id.as_str() != "birth-date"));
    }
}

// =============================================================================
// Goal Oriented
// =============================================================================

#[test]
fn goal_success_ends_on_the_target_type() {
    for rng_seed in 0..16 {
        let chain = generate(
            GoalConfig::new(T::NumericalValue).with_rng_seed(rng_seed),
            &support::einstein(),
        )
        .unwrap();
        assert_eq!(chain.final_state().unwrap().info_type, T::NumericalValue);
        let earlier = &chain.steps()[..chain.applications() - 1];
        assert!(earlier.iter().all(|s| s.info_type != T::NumericalValue));
    }
}

#[test]
fn goal_failure_never_contains_the_target() {
    for rng_seed in 0..8 {
        let err = generate(
            GoalConfig::new(T::Boolean).with_max_steps(4).with_rng_seed(rng_seed),
            &support::einstein(),
        )
        .unwrap_err();
        assert!(matches!(err.kind, FailureKind::GoalUnreachable { target: T::Boolean, .. }));
        assert!(err.partial.steps().iter().all(|s| s.info_type != T::Boolean));
    }
}

#[test]
fn goal_without_any_producer_degrades_to_a_walk() {
    let err = generate(GoalConfig::new(T::Url).with_max_steps(3), &support::einstein()).unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::GoalUnreachable {
            target: T::Url,
            steps: 3
        }
    );
}
