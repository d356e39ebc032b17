//! Information and operator categories.
//!
//! Both enumerations are closed: every tag the engine reasons about is listed
//! here, and new categories are added by extending the enum.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Error;

// =============================================================================
// InfoType
// =============================================================================

/// Category of a piece of information.
///
/// An `InfoType` is a pure classification and carries no value. Rules are
/// typed over these tags, and an engine `State` pairs one with a concrete value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum InfoType {
    /// Name of a person.
    PersonName,
    /// Calendar date.
    Date,
    /// Named place that is not necessarily a city or country.
    LocationName,
    /// Name of a city.
    CityName,
    /// Name of a country.
    CountryName,
    /// Plain number.
    NumericalValue,
    /// Name of an event.
    EventName,
    /// Name of an artwork.
    ArtworkName,
    /// Name of an organization.
    OrganizationName,
    /// Abstract concept or achievement.
    Concept,
    /// Free-form text.
    TextSnippet,
    /// Web address.
    Url,
    /// Structured rows or lists.
    TableData,
    /// Output of a code run.
    CodeOutput,
    /// Time span measured in years.
    DurationYears,
    /// Monetary amount.
    CurrencyValue,
    /// Truth value.
    Boolean,
    /// Generic fallback.
    Other,
}

impl InfoType {
    /// Every information type, in declaration order.
    pub const ALL: [InfoType; 18] = [
        Self::PersonName,
        Self::Date,
        Self::LocationName,
        Self::CityName,
        Self::CountryName,
        Self::NumericalValue,
        Self::EventName,
        Self::ArtworkName,
        Self::OrganizationName,
        Self::Concept,
        Self::TextSnippet,
        Self::Url,
        Self::TableData,
        Self::CodeOutput,
        Self::DurationYears,
        Self::CurrencyValue,
        Self::Boolean,
        Self::Other,
    ];

    /// Returns the canonical SCREAMING_SNAKE name of this type.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::PersonName => "PERSON_NAME",
            Self::Date => "DATE",
            Self::LocationName => "LOCATION_NAME",
            Self::CityName => "CITY_NAME",
            Self::CountryName => "COUNTRY_NAME",
            Self::NumericalValue => "NUMERICAL_VALUE",
            Self::EventName => "EVENT_NAME",
            Self::ArtworkName => "ARTWORK_NAME",
            Self::OrganizationName => "ORGANIZATION_NAME",
            Self::Concept => "CONCEPT",
            Self::TextSnippet => "TEXT_SNIPPET",
            Self::Url => "URL",
            Self::TableData => "TABLE_DATA",
            Self::CodeOutput => "CODE_OUTPUT",
            Self::DurationYears => "DURATION_YEARS",
            Self::CurrencyValue => "CURRENCY_VALUE",
            Self::Boolean => "BOOLEAN",
            Self::Other => "OTHER",
        }
    }

    /// Returns a lowercase phrase for prose, e.g. `"duration years"`.
    #[must_use]
    pub fn phrase(self) -> String {
        self.name().to_lowercase().replace('_', " ")
    }

    /// Looks up a type by name, ignoring case and accepting `-` or space for `_`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = normalize(name);
        Self::ALL.into_iter().find(|t| t.name() == normalized)
    }
}

impl fmt::Display for InfoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for InfoType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| Error::unknown_info_type(s))
    }
}

// =============================================================================
// OperatorType
// =============================================================================

/// Kind of operation that produces a value, independent of the types involved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum OperatorType {
    /// Web search or knowledge-base lookup.
    Search,
    /// Arithmetic or date calculation.
    Calculate,
    /// Comparison of two values.
    Compare,
    /// Direct lookup of a known attribute.
    Lookup,
    /// Running a code snippet.
    RunCode,
    /// Looking up a cell in a table.
    TableLookup,
    /// Extracting a fact from text.
    ExtractInfo,
    /// Filtering table rows.
    FilterTable,
    /// Aggregating a table column.
    AggregateTable,
}

impl OperatorType {
    /// Every operator type, in declaration order.
    pub const ALL: [OperatorType; 9] = [
        Self::Search,
        Self::Calculate,
        Self::Compare,
        Self::Lookup,
        Self::RunCode,
        Self::TableLookup,
        Self::ExtractInfo,
        Self::FilterTable,
        Self::AggregateTable,
    ];

    /// Returns the canonical SCREAMING_SNAKE name of this operator.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Search => "SEARCH",
            Self::Calculate => "CALCULATE",
            Self::Compare => "COMPARE",
            Self::Lookup => "LOOKUP",
            Self::RunCode => "RUN_CODE",
            Self::TableLookup => "TABLE_LOOKUP",
            Self::ExtractInfo => "EXTRACT_INFO",
            Self::FilterTable => "FILTER_TABLE",
            Self::AggregateTable => "AGGREGATE_TABLE",
        }
    }

    /// Looks up an operator by name, ignoring case and accepting `-` or space for `_`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = normalize(name);
        Self::ALL.into_iter().find(|op| op.name() == normalized)
    }
}

impl fmt::Display for OperatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OperatorType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| Error::unknown_operator(s))
    }
}

fn normalize(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
