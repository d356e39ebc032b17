//! Small hand-built rule sets driven through a strategy and the renderer

use multihop_engine::{
    BackwardConfig, Chain, ConstrainedConfig, ExecutionError, GenerationContext, GenerationStrategy,
    Rule, RuleSet, Seed, State, StateRef,
};
use multihop_foundation::{CompatibilityTable, InfoType as T, OperatorType as Op, Value};
use multihop_render::{Renderer, TemplateRenderer};

fn einstein() -> Seed {
    Seed::new("Albert Einstein", T::PersonName)
}

fn duration_rules() -> RuleSet {
    RuleSet::from_rules(
        CompatibilityTable::standard(),
        [
            Rule::new("R1", Op::Search, [T::PersonName], T::Date, "Find the birth date of {input0}."),
            Rule::new("R2", Op::Search, [T::EventName], T::Date, "Find the start date of the event {input0}."),
            Rule::new(
                "R3",
                Op::Calculate,
                [T::Date, T::Date],
                T::DurationYears,
                "Calculate the years between {input0} and {input1}.",
            ),
        ],
    )
    .unwrap()
}

fn duration_facts(rule: &Rule, inputs: &[&State]) -> Result<Value, ExecutionError> {
    match rule.id.as_str() {
        "R1" => Ok(Value::date(1879, 3, 14).unwrap()),
        "R2" => Ok(Value::date(1939, 9, 1).unwrap()),
        "R3" => match (inputs[0].value.as_date(), inputs[1].value.as_date()) {
            (Some(a), Some(b)) => Ok(Value::Int((b - a).num_days().abs() / 365)),
            _ => Err(ExecutionError::invalid_input(rule, "expected dates")),
        },
        _ => Err(ExecutionError::not_found(rule, inputs[0].value.to_string())),
    }
}

/// Answers every rule with a value of its output type.
fn anything(rule: &Rule, _inputs: &[&State]) -> Result<Value, ExecutionError> {
    Ok(match rule.output {
        T::Date => Value::date(2000, 1, 1).unwrap(),
        T::NumericalValue | T::DurationYears => Value::Int(1),
        T::Boolean => Value::Bool(true),
        other => Value::text(format!("some {}", other.phrase())),
    })
}

fn backward_duration() -> Chain {
    let rules = duration_rules();
    let exec = duration_facts;
    let ctx = GenerationContext::new(&rules, &exec);
    BackwardConfig::new(T::DurationYears)
        .with_auxiliary_seed(Seed::new("WW2", T::EventName))
        .generate(&ctx, &einstein())
        .unwrap()
}

// =============================================================================
// Backward Chaining
// =============================================================================

#[test]
fn backward_duration_chain_has_three_steps() {
    let chain = backward_duration();
    let steps = chain.steps();
    assert_eq!(steps.len(), 3);

    assert_eq!(steps[0].produced_by.as_ref().map(|r| r.as_str()), Some("R1"));
    assert_eq!(steps[0].inputs, vec![StateRef::Seed]);
    assert!(steps[0].parent_steps().is_empty());

    assert_eq!(steps[1].produced_by.as_ref().map(|r| r.as_str()), Some("R2"));
    assert_eq!(steps[1].inputs, vec![StateRef::Auxiliary(0)]);
    assert!(steps[1].parent_steps().is_empty());

    assert_eq!(steps[2].produced_by.as_ref().map(|r| r.as_str()), Some("R3"));
    assert_eq!(steps[2].parent_steps().into_iter().collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(steps[2].info_type, T::DurationYears);
    assert_eq!(steps[2].value, Value::Int(60));
}

#[test]
fn backward_duration_renders_three_operations() {
    let rules = duration_rules();
    let question = TemplateRenderer::new(&rules).render(&backward_duration()).unwrap();

    assert_eq!(question.steps.len(), 3);
    assert!(question.text.contains("1. Find the birth date of the initial entity ('Albert Einstein')."));
    assert!(question.text.contains("2. Find the start date of the event the entity 'WW2'."));
    assert!(
        question
            .text
            .ends_with("3. Calculate the years between the result from step 1 and the result from step 2?")
    );
    assert!(!question.text.contains("4. "));
    assert_eq!(question.answer.as_deref(), Some("60"));
}

// =============================================================================
// Constrained Walk
// =============================================================================

fn walk_rules() -> RuleSet {
    RuleSet::from_rules(
        CompatibilityTable::standard(),
        [
            Rule::new("birth-date", Op::Search, [T::PersonName], T::Date, "Find the birth date of {input0}."),
            Rule::new("birth-place", Op::Search, [T::PersonName], T::LocationName, "Find where {input0} was born."),
            Rule::new("country", Op::Search, [T::LocationName], T::CountryName, "Find the country of {input0}."),
            Rule::new("year", Op::Calculate, [T::Date], T::NumericalValue, "Take the year of {input0}."),
            Rule::new("capital", Op::Search, [T::CountryName], T::CityName, "Find the capital of {input0}."),
        ],
    )
    .unwrap()
}

#[test]
fn constrained_walk_stops_when_the_budget_is_spent() {
    let rules = walk_rules();
    let exec = anything;
    let ctx = GenerationContext::new(&rules, &exec);

    for rng_seed in 0..16 {
        let chain = ConstrainedConfig::default()
            .with_max_steps(5)
            .with_min_steps(2)
            .with_budget(2)
            .with_rng_seed(rng_seed)
            .generate(&ctx, &einstein())
            .unwrap();
        assert_eq!(chain.applications(), 2, "rng seed {rng_seed}");
        assert_eq!(chain.total_cost(&rules), 2);
        chain.verify(&rules).unwrap();
    }
}
