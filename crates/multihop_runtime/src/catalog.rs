//! The built-in rule catalog.
//!
//! Every rule here is registered against [`CompatibilityTable::standard`].
//! Ids are stable; the simulated executor and configuration files refer to
//! rules by id.

use multihop_engine::{Predicate, Rule, RuleSet};
use multihop_foundation::{CompatibilityTable, InfoType as T, OperatorType as Op, Result};

/// Rules of the built-in catalog, in registration order.
#[must_use]
pub fn standard_rules() -> Vec<Rule> {
    vec![
        // Search
        Rule::new("birth-date", Op::Search, [T::PersonName], T::Date, "Find the birth date of {input0}."),
        Rule::new("birth-place", Op::Search, [T::PersonName], T::LocationName, "Find the birth place of {input0}."),
        Rule::new(
            "notable-concept",
            Op::Search,
            [T::PersonName],
            T::Concept,
            "Find a notable concept or achievement associated with {input0}.",
        )
        .with_cost(2),
        Rule::new("event-date", Op::Search, [T::EventName], T::Date, "Find the start date of the event {input0}."),
        Rule::new(
            "event-location",
            Op::Search,
            [T::EventName],
            T::LocationName,
            "Find the primary location of the event {input0}.",
        ),
        Rule::new(
            "location-city",
            Op::Search,
            [T::LocationName],
            T::CityName,
            "Identify the city for the location {input0}.",
        ),
        Rule::new(
            "location-country",
            Op::Search,
            [T::LocationName],
            T::CountryName,
            "Identify the country for the location {input0}.",
        ),
        Rule::new(
            "elevation",
            Op::Search,
            [T::LocationName],
            T::NumericalValue,
            "Find the height or elevation of {input0}.",
        ),
        Rule::new("population", Op::Search, [T::CityName], T::NumericalValue, "Find the population of {input0}."),
        Rule::new("capital", Op::Search, [T::CountryName], T::CityName, "Find the capital city of {input0}."),
        Rule::new("artwork-location", Op::Search, [T::ArtworkName], T::LocationName, "Find where {input0} is located."),
        Rule::new("creator", Op::Search, [T::ArtworkName], T::PersonName, "Find the creator of {input0}."),
        Rule::new("currency", Op::Search, [T::CountryName], T::TextSnippet, "Find the currency used in {input0}."),
        Rule::new("city-country", Op::Search, [T::CityName], T::CountryName, "Find the country of {input0}."),
        // Lookup
        Rule::new(
            "country-population",
            Op::Lookup,
            [T::CountryName],
            T::NumericalValue,
            "Look up the population of the country {input0}.",
        ),
        // Calculate
        Rule::new(
            "years-between",
            Op::Calculate,
            [T::Date, T::Date],
            T::DurationYears,
            "Calculate the time duration in years between {input0} and {input1}.",
        )
        .with_cost(2)
        .with_predicate(Predicate::DistinctInputs),
        Rule::new(
            "year-of",
            Op::Calculate,
            [T::Date],
            T::NumericalValue,
            "Extract the year from {input0}.",
        ),
        Rule::new(
            "total-years",
            Op::Calculate,
            [T::DurationYears, T::DurationYears],
            T::NumericalValue,
            "Calculate the sum of {input0} and {input1}.",
        ),
        Rule::new(
            "duration-ratio",
            Op::Calculate,
            [T::DurationYears, T::DurationYears],
            T::NumericalValue,
            "Calculate the result of dividing {input0} by {input1}.",
        ),
        // Compare
        Rule::new(
            "earlier",
            Op::Compare,
            [T::Date, T::Date],
            T::Boolean,
            "Determine whether {input0} is earlier than {input1}.",
        )
        .with_predicate(Predicate::DistinctInputs),
        Rule::new(
            "greater",
            Op::Compare,
            [T::NumericalValue, T::NumericalValue],
            T::Boolean,
            "Determine whether {input0} is greater than {input1}.",
        )
        .with_predicate(Predicate::DistinctInputs),
        // Code
        Rule::new(
            "list-max",
            Op::RunCode,
            [T::TableData],
            T::NumericalValue,
            "Using code, find the maximum value in the list {input0}.",
        )
        .with_cost(3),
    ]
}

/// The built-in catalog as a rule set over the standard table.
///
/// # Errors
/// Returns `InvalidRule` if a catalog rule is rejected, which would indicate
/// the catalog and the standard table have drifted apart.
pub fn standard_rule_set() -> Result<RuleSet> {
    RuleSet::from_rules(CompatibilityTable::standard(), standard_rules())
}
