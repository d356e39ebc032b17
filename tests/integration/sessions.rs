//! Catalog runs through a session, one per strategy

use multihop_engine::{
    ConstrainedConfig, FailureKind, ForwardConfig, GoalConfig, Seed, Strategy, TemplateConfig,
};
use multihop_foundation::{InfoType as T, OperatorType as Op};
use multihop_runtime::{RunConfig, RuntimeError, Session, SimulatedExecutor, catalog};

fn session(strategy: impl Into<Strategy>, seed: Seed) -> Session {
    Session::new(
        catalog::standard_rule_set().unwrap(),
        SimulatedExecutor::standard(),
        strategy.into(),
        seed,
    )
}

fn einstein() -> Seed {
    Seed::new("Albert Einstein", T::PersonName)
}

#[test]
fn forward_runs_stay_within_bounds() {
    for rng_seed in 0..8 {
        let s = session(
            ForwardConfig::default().with_max_steps(4).with_rng_seed(rng_seed),
            einstein(),
        );
        let outcome = s.generate().unwrap();
        outcome.chain.verify(s.rules()).unwrap();
        assert!((1..=4).contains(&outcome.chain.applications()));
        assert_eq!(outcome.question.steps.len(), outcome.chain.applications());
        assert!(outcome.question.text.ends_with('?'));
    }
}

#[test]
fn template_run_follows_the_operators() {
    let s = session(TemplateConfig::new([Op::Search, Op::Search]), einstein());
    let outcome = s.generate().unwrap();
    assert_eq!(outcome.chain.operators(s.rules()), vec![Op::Search, Op::Search]);
}

#[test]
fn constrained_run_respects_the_budget() {
    for rng_seed in 0..8 {
        let s = session(
            ConstrainedConfig::default()
                .with_budget(3)
                .with_min_steps(1)
                .with_rng_seed(rng_seed),
            Seed::new("Mona Lisa", T::ArtworkName),
        );
        let outcome = s.generate().unwrap();
        assert!(outcome.chain.total_cost(s.rules()) <= 3, "rng seed {rng_seed}");
    }
}

#[test]
fn goal_run_reaches_a_country() {
    let s = session(GoalConfig::new(T::CountryName), Seed::new("Marie Curie", T::PersonName));
    let outcome = s.generate().unwrap();
    assert_eq!(outcome.question.answer.as_deref(), Some("Poland"));
}

#[test]
fn goal_run_without_facts_fails_with_its_partial_chain() {
    let s = session(GoalConfig::new(T::CountryName), Seed::new("Grace Hopper", T::PersonName));
    let err = s.generate().unwrap_err();
    assert!(matches!(
        &err,
        RuntimeError::Generation(e) if matches!(e.kind, FailureKind::GoalUnreachable { .. })
    ));
    assert!(err.partial_chain().is_some());
}

#[test]
fn sessions_from_identical_configs_agree() {
    let source = r#"
        strategy = "forward"
        [seed]
        value = "Albert Einstein"
        type = "PERSON_NAME"
        [options]
        max_steps = 5
        rng_seed = 42
    "#;
    let a = Session::from_config(&RunConfig::from_toml_str(source).unwrap())
        .unwrap()
        .generate()
        .unwrap();
    let b = Session::from_config(&RunConfig::from_toml_str(source).unwrap())
        .unwrap()
        .generate()
        .unwrap();
    assert_eq!(a.chain, b.chain);
    assert_eq!(a.question, b.question);
}
