//! A deterministic stand-in for search engines and calculators.
//!
//! [`SimulatedExecutor`] answers single-input lookups from a fact table keyed
//! by rule id and subject, and runs a small set of built-in [`Operation`]s for
//! calculation and comparison rules. It never guesses: a lookup with no fact
//! fails with [`ExecutionError::NotFound`], which the strategies treat as
//! "prune this candidate and try another".

use std::collections::BTreeMap;

use chrono::Datelike;

use multihop_engine::{ExecutionError, Executor, Rule, RuleId, State};
use multihop_foundation::{InfoType, Value};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::parse_value;

/// Built-in computations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Absolute distance between two dates, in years of 365.25 days.
    YearsBetween,
    /// Calendar year of a date.
    Year,
    /// Sum of all numeric inputs.
    Sum,
    /// First input divided by the second.
    Ratio,
    /// Largest number in a list input.
    Max,
    /// Whether the first date precedes the second.
    Earlier,
    /// Whether the first number exceeds the second.
    Greater,
}

impl Operation {
    #[allow(clippy::cast_precision_loss)]
    fn apply(self, rule: &Rule, inputs: &[&State]) -> Result<Value, ExecutionError> {
        match self {
            Self::YearsBetween => {
                let [a, b] = dates(rule, inputs)?;
                let days = (a - b).num_days().abs();
                Ok(Value::Float(days as f64 / 365.25))
            }
            Self::Year => inputs
                .first()
                .and_then(|s| s.value.as_date())
                .map(|d| Value::Int(i64::from(d.year())))
                .ok_or_else(|| ExecutionError::invalid_input(rule, "expected a date")),
            Self::Sum => Ok(Value::Float(numbers(rule, inputs)?.iter().sum())),
            Self::Ratio => match numbers(rule, inputs)?.as_slice() {
                [_, d] if *d == 0.0 => Err(ExecutionError::invalid_input(rule, "division by zero")),
                [n, d] => Ok(Value::Float(n / d)),
                _ => Err(ExecutionError::invalid_input(rule, "ratio needs two numbers")),
            },
            Self::Max => {
                let list = inputs
                    .first()
                    .and_then(|s| s.value.as_list())
                    .ok_or_else(|| ExecutionError::invalid_input(rule, "expected a list"))?;
                list.iter()
                    .filter_map(Value::as_f64)
                    .reduce(f64::max)
                    .map(Value::Float)
                    .ok_or_else(|| ExecutionError::invalid_input(rule, "list has no numbers"))
            }
            Self::Earlier => {
                let [a, b] = dates(rule, inputs)?;
                Ok(Value::Bool(a < b))
            }
            Self::Greater => match numbers(rule, inputs)?.as_slice() {
                [a, b] => Ok(Value::Bool(a > b)),
                _ => Err(ExecutionError::invalid_input(rule, "comparison needs two numbers")),
            },
        }
    }
}

fn dates(rule: &Rule, inputs: &[&State]) -> Result<[chrono::NaiveDate; 2], ExecutionError> {
    match inputs {
        [a, b] => match (a.value.as_date(), b.value.as_date()) {
            (Some(a), Some(b)) => Ok([a, b]),
            _ => Err(ExecutionError::invalid_input(rule, "expected two dates")),
        },
        _ => Err(ExecutionError::invalid_input(rule, "expected two dates")),
    }
}

fn numbers(rule: &Rule, inputs: &[&State]) -> Result<Vec<f64>, ExecutionError> {
    inputs
        .iter()
        .map(|s| {
            s.value
                .as_f64()
                .ok_or_else(|| ExecutionError::invalid_input(rule, format!("{} is not a number", s.value)))
        })
        .collect()
}

/// Facts shipped with the built-in catalog: rule id, subject, output type, value.
const STANDARD_FACTS: &[(&str, &str, InfoType, &str)] = &[
    ("birth-date", "Albert Einstein", InfoType::Date, "1879-03-14"),
    ("birth-date", "Leonardo da Vinci", InfoType::Date, "1452-04-15"),
    ("birth-date", "Marie Curie", InfoType::Date, "1867-11-07"),
    ("birth-place", "Albert Einstein", InfoType::LocationName, "Ulm"),
    ("birth-place", "Leonardo da Vinci", InfoType::LocationName, "Vinci"),
    ("birth-place", "Marie Curie", InfoType::LocationName, "Warsaw"),
    ("notable-concept", "Albert Einstein", InfoType::Concept, "Theory of relativity"),
    ("notable-concept", "Marie Curie", InfoType::Concept, "Radioactivity"),
    ("event-date", "WW2", InfoType::Date, "1939-09-01"),
    ("event-date", "World War II", InfoType::Date, "1939-09-01"),
    ("event-date", "World War I", InfoType::Date, "1914-07-28"),
    ("event-location", "WW2", InfoType::LocationName, "Europe"),
    ("event-location", "World War II", InfoType::LocationName, "Europe"),
    ("location-city", "Louvre Museum", InfoType::CityName, "Paris"),
    ("location-country", "Louvre Museum", InfoType::CountryName, "France"),
    ("location-country", "Ulm", InfoType::CountryName, "Germany"),
    ("location-country", "Warsaw", InfoType::CountryName, "Poland"),
    ("elevation", "Eiffel Tower", InfoType::NumericalValue, "330.0"),
    ("population", "Paris", InfoType::NumericalValue, "2100000"),
    ("population", "Berlin", InfoType::NumericalValue, "3700000"),
    ("capital", "France", InfoType::CityName, "Paris"),
    ("capital", "Germany", InfoType::CityName, "Berlin"),
    ("capital", "Brazil", InfoType::CityName, "Brasília"),
    ("artwork-location", "Mona Lisa", InfoType::LocationName, "Louvre Museum"),
    ("creator", "Mona Lisa", InfoType::PersonName, "Leonardo da Vinci"),
    ("currency", "Japan", InfoType::TextSnippet, "Japanese Yen"),
    ("city-country", "Paris", InfoType::CountryName, "France"),
    ("city-country", "Berlin", InfoType::CountryName, "Germany"),
    ("country-population", "France", InfoType::NumericalValue, "68000000"),
    ("country-population", "Germany", InfoType::NumericalValue, "84000000"),
];

/// Operations attached to catalog rules.
const STANDARD_OPERATIONS: &[(&str, Operation)] = &[
    ("years-between", Operation::YearsBetween),
    ("year-of", Operation::Year),
    ("total-years", Operation::Sum),
    ("duration-ratio", Operation::Ratio),
    ("earlier", Operation::Earlier),
    ("greater", Operation::Greater),
    ("list-max", Operation::Max),
];

/// Executor backed by a fact table and built-in operations.
#[derive(Clone, Debug, Default)]
pub struct SimulatedExecutor {
    facts: BTreeMap<(RuleId, String), Value>,
    operations: BTreeMap<RuleId, Operation>,
}

impl SimulatedExecutor {
    /// Creates an executor that knows nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an executor covering the built-in catalog.
    #[must_use]
    pub fn standard() -> Self {
        let mut executor = Self::new();
        for (rule, subject, info_type, raw) in STANDARD_FACTS {
            match parse_value(*info_type, raw) {
                Ok(value) => executor.insert_fact(RuleId::new(rule), subject, value),
                Err(e) => warn!(%rule, %subject, error = %e, "skipping malformed fact"),
            }
        }
        for (rule, operation) in STANDARD_OPERATIONS {
            executor.operations.insert(RuleId::new(rule), *operation);
        }
        executor
    }

    fn insert_fact(&mut self, rule: RuleId, subject: &str, value: Value) {
        self.facts.insert((rule, subject.trim().to_lowercase()), value);
    }

    /// Adds or replaces a fact: applying `rule` to `subject` yields `value`.
    #[must_use]
    pub fn with_fact(mut self, rule: impl Into<RuleId>, subject: &str, value: impl Into<Value>) -> Self {
        self.insert_fact(rule.into(), subject, value.into());
        self
    }

    /// Attaches a built-in operation to a rule.
    #[must_use]
    pub fn with_operation(mut self, rule: impl Into<RuleId>, operation: Operation) -> Self {
        self.operations.insert(rule.into(), operation);
        self
    }

    /// Number of known facts.
    #[must_use]
    pub fn fact_count(&self) -> usize {
        self.facts.len()
    }

    /// Looks up a fact.
    #[must_use]
    pub fn fact(&self, rule: &RuleId, subject: &str) -> Option<&Value> {
        self.facts.get(&(rule.clone(), subject.trim().to_lowercase()))
    }
}

impl Executor for SimulatedExecutor {
    fn execute(&self, rule: &Rule, inputs: &[&State]) -> Result<Value, ExecutionError> {
        if let Some(operation) = self.operations.get(&rule.id) {
            let result = operation.apply(rule, inputs);
            debug!(rule = %rule.id, ?operation, ok = result.is_ok(), "simulated operation");
            return result;
        }

        // Multi-input lookups key on every input joined in slot order.
        let subject = inputs
            .iter()
            .map(|s| s.value.to_string())
            .collect::<Vec<_>>()
            .join(" | ");
        match self.fact(&rule.id, &subject) {
            Some(value) => {
                debug!(rule = %rule.id, %subject, %value, "simulated lookup");
                Ok(value.clone())
            }
            None => Err(ExecutionError::not_found(rule, subject)),
        }
    }
}
