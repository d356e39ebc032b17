//! Compatibility table: which transitions are legal.
//!
//! The table answers `(OperatorType, ordered InfoTypes) -> allowed outputs`.
//! A rule instantiates one of these transitions with concrete wording and an
//! applicability predicate; the table alone decides whether the transition
//! may exist at all.

use std::collections::{BTreeMap, BTreeSet};

use crate::types::{InfoType, OperatorType};

use crate::types::InfoType as T;
use crate::types::OperatorType as Op;

/// Transitions allowed by [`CompatibilityTable::standard`].
const STANDARD_TRANSITIONS: &[(OperatorType, &[InfoType], InfoType)] = &[
    // Search
    (Op::Search, &[T::PersonName], T::Date),
    (Op::Search, &[T::PersonName], T::LocationName),
    (Op::Search, &[T::PersonName], T::Concept),
    (Op::Search, &[T::PersonName], T::OrganizationName),
    (Op::Search, &[T::EventName], T::Date),
    (Op::Search, &[T::EventName], T::LocationName),
    (Op::Search, &[T::LocationName], T::CityName),
    (Op::Search, &[T::LocationName], T::CountryName),
    (Op::Search, &[T::LocationName], T::NumericalValue),
    (Op::Search, &[T::CityName], T::NumericalValue),
    (Op::Search, &[T::CityName], T::CountryName),
    (Op::Search, &[T::CountryName], T::CityName),
    (Op::Search, &[T::CountryName], T::TextSnippet),
    (Op::Search, &[T::ArtworkName], T::LocationName),
    (Op::Search, &[T::ArtworkName], T::PersonName),
    (Op::Search, &[T::OrganizationName], T::PersonName),
    (Op::Search, &[T::OrganizationName], T::Date),
    (Op::Search, &[T::Concept], T::TextSnippet),
    (Op::Search, &[T::PersonName, T::LocationName], T::EventName),
    // Lookup
    (Op::Lookup, &[T::CountryName], T::NumericalValue),
    (Op::Lookup, &[T::CountryName], T::CurrencyValue),
    (Op::Lookup, &[T::PersonName], T::CountryName),
    (Op::Lookup, &[T::OrganizationName], T::CityName),
    (Op::Lookup, &[T::CityName], T::Url),
    // Calculate
    (Op::Calculate, &[T::Date, T::Date], T::DurationYears),
    (Op::Calculate, &[T::Date], T::NumericalValue),
    (Op::Calculate, &[T::DurationYears], T::NumericalValue),
    (Op::Calculate, &[T::NumericalValue, T::NumericalValue], T::DurationYears),
    (Op::Calculate, &[T::DurationYears, T::DurationYears], T::NumericalValue),
    // Compare
    (Op::Compare, &[T::Date, T::Date], T::Boolean),
    (Op::Compare, &[T::NumericalValue, T::NumericalValue], T::Boolean),
    (Op::Compare, &[T::DurationYears, T::DurationYears], T::Boolean),
    // Code and tables
    (Op::RunCode, &[T::TableData], T::NumericalValue),
    (Op::RunCode, &[T::TableData], T::CodeOutput),
    (Op::TableLookup, &[T::TableData, T::TextSnippet], T::NumericalValue),
    (Op::FilterTable, &[T::TableData, T::TextSnippet], T::CodeOutput),
    (Op::AggregateTable, &[T::TableData, T::TextSnippet], T::NumericalValue),
    // Text extraction
    (Op::ExtractInfo, &[T::TextSnippet], T::Date),
    (Op::ExtractInfo, &[T::TextSnippet], T::PersonName),
    (Op::ExtractInfo, &[T::TextSnippet], T::LocationName),
];

/// Set of legal `(operator, ordered inputs, output)` transitions.
///
/// One operator/input combination may legally produce several output types
/// (a search on a person can yield a date or a place).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompatibilityTable {
    entries: BTreeMap<(OperatorType, Vec<InfoType>), BTreeSet<InfoType>>,
}

impl CompatibilityTable {
    /// Creates an empty table that allows nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the table covering the built-in type catalog.
    #[must_use]
    pub fn standard() -> Self {
        let mut table = Self::new();
        for (operator, inputs, output) in STANDARD_TRANSITIONS {
            table.allow(*operator, inputs, *output);
        }
        table
    }

    /// Allows a transition.
    pub fn allow(&mut self, operator: OperatorType, inputs: &[InfoType], output: InfoType) {
        self.entries
            .entry((operator, inputs.to_vec()))
            .or_default()
            .insert(output);
    }

    /// Builder form of [`allow`](Self::allow).
    #[must_use]
    pub fn with(mut self, operator: OperatorType, inputs: &[InfoType], output: InfoType) -> Self {
        self.allow(operator, inputs, output);
        self
    }

    /// Returns the outputs allowed for an operator applied to ordered inputs,
    /// or `None` if the combination is not allowed at all.
    #[must_use]
    pub fn outputs(&self, operator: OperatorType, inputs: &[InfoType]) -> Option<&BTreeSet<InfoType>> {
        self.entries.get(&(operator, inputs.to_vec()))
    }

    /// Returns true if the full triple is allowed.
    #[must_use]
    pub fn allows(&self, operator: OperatorType, inputs: &[InfoType], output: InfoType) -> bool {
        self.outputs(operator, inputs)
            .is_some_and(|outputs| outputs.contains(&output))
    }

    /// Number of allowed triples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeSet::len).sum()
    }

    /// Returns true if nothing is allowed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates allowed triples in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = (OperatorType, &[InfoType], InfoType)> + '_ {
        self.entries.iter().flat_map(|((op, inputs), outputs)| {
            outputs.iter().map(move |out| (*op, inputs.as_slice(), *out))
        })
    }
}
