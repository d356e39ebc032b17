//! Shared rule set and executor for the engine tests

use chrono::Datelike;
use multihop_engine::{ExecutionError, Predicate, Rule, RuleSet, Seed, State};
use multihop_foundation::{CompatibilityTable, InfoType as T, OperatorType as Op, Value};

pub fn einstein() -> Seed {
    Seed::new("Albert Einstein", T::PersonName)
}

pub fn ww2() -> Seed {
    Seed::new("WW2", T::EventName)
}

/// Eight unit-cost rules over people, places, events and dates.
pub fn rules() -> RuleSet {
    RuleSet::from_rules(
        CompatibilityTable::standard(),
        [
            Rule::new("birth-date", Op::Search, [T::PersonName], T::Date, "Find the birth date of {input0}."),
            Rule::new("birth-place", Op::Search, [T::PersonName], T::LocationName, "Find the birth place of {input0}."),
            Rule::new("place-city", Op::Search, [T::LocationName], T::CityName, "Identify the city for {input0}."),
            Rule::new("population", Op::Search, [T::CityName], T::NumericalValue, "Find the population of {input0}."),
            Rule::new("event-date", Op::Search, [T::EventName], T::Date, "Find the start date of {input0}."),
            Rule::new("duration", Op::Calculate, [T::Date, T::Date], T::DurationYears, "Calculate the years between {input0} and {input1}.")
                .with_predicate(Predicate::DistinctInputs),
            Rule::new("year", Op::Calculate, [T::Date], T::NumericalValue, "Take the year of {input0}."),
            Rule::new("earlier", Op::Compare, [T::Date, T::Date], T::Boolean, "Is {input0} earlier than {input1}?"),
        ],
    )
    .unwrap()
}

fn date(y: i32, m: u32, d: u32) -> Value {
    Value::date(y, m, d).unwrap()
}

/// Knows a handful of facts; everything else is not found.
pub fn knowledge(rule: &Rule, inputs: &[&State]) -> Result<Value, ExecutionError> {
    let subject = inputs[0].value.to_string();
    let found = match (rule.id.as_str(), subject.as_str()) {
        ("birth-date", "Albert Einstein") => Some(date(1879, 3, 14)),
        ("birth-date", "Marie Curie") => Some(date(1867, 11, 7)),
        ("birth-place", "Albert Einstein") => Some(Value::from("Ulm")),
        ("place-city", "Ulm") => Some(Value::from("Ulm")),
        ("population", "Ulm") => Some(Value::Int(126_000)),
        ("event-date", "WW2") => Some(date(1939, 9, 1)),
        ("year", _) => inputs[0].value.as_date().map(|d| Value::Int(i64::from(d.year()))),
        ("duration", _) => match (inputs[0].value.as_date(), inputs[1].value.as_date()) {
            (Some(a), Some(b)) => Some(Value::Float((a - b).num_days().abs() as f64 / 365.25)),
            _ => None,
        },
        ("earlier", _) => match (inputs[0].value.as_date(), inputs[1].value.as_date()) {
            (Some(a), Some(b)) => Some(Value::Bool(a < b)),
            _ => None,
        },
        _ => None,
    };
    found.ok_or_else(|| ExecutionError::not_found(rule, subject))
}
