//! TOML run configuration.
//!
//! A run configuration names a strategy and its options, the primary seed,
//! optional auxiliary seeds, extra rules, cost overrides, and extra facts
//! for the simulated executor:
//!
//! ```toml
//! strategy = "backward"
//!
//! [seed]
//! value = "Albert Einstein"
//! type = "PERSON_NAME"
//!
//! [[auxiliary_seeds]]
//! value = "WW2"
//! type = "EVENT_NAME"
//!
//! [options]
//! target_type = "DURATION_YEARS"
//! plan_attempts = 3
//!
//! [costs]
//! years-between = 1
//! ```
//!
//! Type and operator names are matched case-insensitively. Everything stays
//! as plain strings until [`RunConfig`] is resolved, so one bad name is
//! reported with the field it came from.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chrono::NaiveDate;
use multihop_engine::{
    BackwardConfig, ConstrainedConfig, ForwardConfig, GoalConfig, Predicate, Rule, RuleId,
    RuleSet, Seed, Strategy, TemplateConfig, TemplateStep,
};
use multihop_foundation::{CompatibilityTable, Error, InfoType, OperatorType, Result, Value};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog;
use crate::error::RuntimeError;
use crate::simulate::{Operation, SimulatedExecutor};

// =============================================================================
// Document
// =============================================================================

/// A parsed configuration document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Strategy name; one of [`Strategy::NAMES`]. Defaults to `forward`.
    #[serde(default)]
    pub strategy: Option<String>,
    /// The primary seed.
    #[serde(default)]
    pub seed: Option<SeedSpec>,
    /// Independently rooted entities for backward chaining.
    #[serde(default)]
    pub auxiliary_seeds: Vec<SeedSpec>,
    /// Strategy options.
    #[serde(default)]
    pub options: Options,
    /// Cost overrides by rule id, applied to the rule set.
    #[serde(default)]
    pub costs: BTreeMap<String, u32>,
    /// Rule set composition.
    #[serde(default)]
    pub rules: RulesSpec,
    /// Extra facts for the simulated executor.
    #[serde(default)]
    pub facts: Vec<FactSpec>,
}

/// A seed as written in the document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedSpec {
    /// Raw value, interpreted according to `info_type`.
    pub value: String,
    /// Type name, e.g. `PERSON_NAME`.
    #[serde(rename = "type")]
    pub info_type: String,
}

impl SeedSpec {
    /// Creates a seed spec.
    #[must_use]
    pub fn new(value: impl Into<String>, info_type: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            info_type: info_type.into(),
        }
    }

    /// Parses `<value>:<TYPE>`, splitting at the last colon.
    ///
    /// # Errors
    /// Returns a config error if there is no colon or either side is empty.
    pub fn parse(spec: &str) -> Result<Self> {
        match spec.rsplit_once(':') {
            Some((value, t)) if !value.is_empty() && !t.trim().is_empty() => Ok(Self::new(value, t.trim())),
            _ => Err(Error::config(format!("seed {spec:?} is not of the form <value>:<TYPE>"))),
        }
    }

    /// Resolves into a typed seed.
    ///
    /// # Errors
    /// Returns `UnknownInfoType` for a bad type name, or a config error if the
    /// value does not fit the type.
    pub fn resolve(&self) -> Result<Seed> {
        let info_type: InfoType = self.info_type.parse()?;
        Ok(Seed::new(parse_value(info_type, &self.value)?, info_type))
    }
}

/// Strategy options. Options a strategy does not use are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Options {
    /// Upper bound on rule applications.
    pub max_steps: Option<usize>,
    /// Applications required by forward and constrained generation.
    pub min_steps: Option<usize>,
    /// Seed of the generation-scoped random source.
    pub rng_seed: Option<u64>,
    /// Total cost the constrained walk may spend.
    pub complexity_budget: Option<u64>,
    /// Target type for goal and backward generation.
    pub target_type: Option<String>,
    /// Operator template for template generation.
    pub template: Option<Vec<TemplateEntry>>,
    /// Alternative plans backward generation may try.
    pub plan_attempts: Option<usize>,
}

/// A template entry: a bare operator name or an operator with a wording hint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemplateEntry {
    /// `"SEARCH"`
    Operator(String),
    /// `{ operator = "SEARCH", description_contains = "birth" }`
    Hinted {
        /// Operator name.
        operator: String,
        /// Substring the rule's wording must contain.
        #[serde(default)]
        description_contains: Option<String>,
    },
}

impl TemplateEntry {
    fn resolve(&self) -> Result<TemplateStep> {
        match self {
            Self::Operator(name) => Ok(name.parse::<OperatorType>()?.into()),
            Self::Hinted {
                operator,
                description_contains,
            } => Ok(TemplateStep {
                operator: operator.parse()?,
                description_contains: description_contains.clone(),
            }),
        }
    }
}

/// Rule set composition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RulesSpec {
    /// Start from the built-in catalog. Defaults to true.
    #[serde(default = "include_catalog_default")]
    pub include_catalog: bool,
    /// Extra transitions added to the standard compatibility table.
    #[serde(default)]
    pub allow: Vec<TransitionSpec>,
    /// Rules to register. A rule whose id matches a catalog rule replaces it.
    #[serde(default)]
    pub define: Vec<RuleSpec>,
}

fn include_catalog_default() -> bool {
    true
}

impl Default for RulesSpec {
    fn default() -> Self {
        Self {
            include_catalog: true,
            allow: Vec::new(),
            define: Vec::new(),
        }
    }
}

/// An extra legal transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransitionSpec {
    /// Operator name.
    pub operator: String,
    /// Ordered input type names.
    pub inputs: Vec<String>,
    /// Output type name.
    pub output: String,
}

/// A rule as written in the document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSpec {
    /// Unique id.
    pub id: String,
    /// Operator name.
    pub operator: String,
    /// Ordered input type names.
    pub inputs: Vec<String>,
    /// Output type name.
    pub output: String,
    /// Step wording.
    pub template: String,
    /// Cost; defaults to 1.
    #[serde(default)]
    pub cost: Option<u32>,
    /// Applicability check.
    #[serde(default)]
    pub predicate: Option<PredicateSpec>,
    /// Built-in computation the simulated executor runs for this rule.
    #[serde(default)]
    pub operation: Option<Operation>,
}

/// Declarative predicates expressible in a document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PredicateSpec {
    /// Always applicable.
    Always,
    /// Slot value contains a substring.
    TextContains {
        /// Input slot.
        slot: usize,
        /// Substring.
        needle: String,
    },
    /// Slot value lacks a substring.
    TextExcludes {
        /// Input slot.
        slot: usize,
        /// Substring.
        needle: String,
    },
    /// Bound values are pairwise different.
    DistinctInputs,
}

impl From<&PredicateSpec> for Predicate {
    fn from(spec: &PredicateSpec) -> Self {
        match spec {
            PredicateSpec::Always => Self::Always,
            PredicateSpec::TextContains { slot, needle } => Self::TextContains {
                slot: *slot,
                needle: needle.clone(),
            },
            PredicateSpec::TextExcludes { slot, needle } => Self::TextExcludes {
                slot: *slot,
                needle: needle.clone(),
            },
            PredicateSpec::DistinctInputs => Self::DistinctInputs,
        }
    }
}

impl RuleSpec {
    fn resolve(&self) -> Result<Rule> {
        let inputs = self
            .inputs
            .iter()
            .map(|t| t.parse())
            .collect::<Result<Vec<InfoType>>>()?;
        let mut rule = Rule::new(
            self.id.as_str(),
            self.operator.parse()?,
            inputs,
            self.output.parse()?,
            self.template.clone(),
        );
        if let Some(cost) = self.cost {
            rule = rule.with_cost(cost);
        }
        if let Some(predicate) = &self.predicate {
            rule = rule.with_predicate(predicate.into());
        }
        Ok(rule)
    }
}

/// A simulated-executor fact: applying `rule` to `subject` yields `value`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FactSpec {
    /// Rule id.
    pub rule: String,
    /// Input value as displayed, matched case-insensitively.
    pub subject: String,
    /// Raw value, interpreted according to the rule's output type.
    pub value: String,
}

// =============================================================================
// Resolution
// =============================================================================

impl RunConfig {
    /// Parses a configuration document.
    ///
    /// # Errors
    /// Returns `Parse` if the document is not valid TOML or has unknown keys.
    pub fn from_toml_str(source: &str) -> std::result::Result<Self, RuntimeError> {
        Ok(toml::from_str(source)?)
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    /// Returns `Io` if the file cannot be read, or `Parse` as for
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn load(path: impl AsRef<Path>) -> std::result::Result<Self, RuntimeError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| RuntimeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded configuration");
        Self::from_toml_str(&source)
    }

    /// The strategy name, defaulting to `forward`.
    #[must_use]
    pub fn strategy_name(&self) -> &str {
        self.strategy.as_deref().unwrap_or("forward")
    }

    /// The primary seed.
    ///
    /// # Errors
    /// Returns a config error if no seed is given, or the seed's own errors.
    pub fn seed(&self) -> Result<Seed> {
        self.seed
            .as_ref()
            .ok_or_else(|| Error::config("no seed given"))?
            .resolve()
    }

    /// The auxiliary seeds, in document order.
    ///
    /// # Errors
    /// See [`SeedSpec::resolve`].
    pub fn auxiliary_seeds(&self) -> Result<Vec<Seed>> {
        self.auxiliary_seeds.iter().map(SeedSpec::resolve).collect()
    }

    /// Builds the rule set: the catalog (unless excluded) with redefined ids
    /// replaced, then the document's rules, then cost overrides.
    ///
    /// # Errors
    /// Returns `InvalidRule` for a rejected rule, or a config error for a
    /// cost override naming an unknown rule.
    pub fn rule_set(&self) -> Result<RuleSet> {
        let mut table = CompatibilityTable::standard();
        for t in &self.rules.allow {
            let inputs = t.inputs.iter().map(|i| i.parse()).collect::<Result<Vec<InfoType>>>()?;
            table.allow(t.operator.parse()?, &inputs, t.output.parse()?);
        }

        let defined = self
            .rules
            .define
            .iter()
            .map(RuleSpec::resolve)
            .collect::<Result<Vec<_>>>()?;
        let redefined: BTreeSet<&RuleId> = defined.iter().map(|r| &r.id).collect();

        let mut rules: Vec<Rule> = if self.rules.include_catalog {
            catalog::standard_rules()
                .into_iter()
                .filter(|r| !redefined.contains(&r.id))
                .collect()
        } else {
            Vec::new()
        };
        rules.extend(defined.iter().cloned());

        for (id, cost) in &self.costs {
            let rule = rules
                .iter_mut()
                .find(|r| r.id.as_str() == id)
                .ok_or_else(|| Error::config(format!("cost override for unknown rule {id}")))?;
            rule.cost = *cost;
        }

        RuleSet::from_rules(table, rules)
    }

    /// Builds the simulated executor: standard facts, the operations of
    /// defined rules, then the document's facts.
    ///
    /// # Errors
    /// Returns a config error for a fact naming a rule missing from `rules`
    /// or a value that does not fit the rule's output type.
    pub fn executor(&self, rules: &RuleSet) -> Result<SimulatedExecutor> {
        let mut executor = SimulatedExecutor::standard();
        for spec in &self.rules.define {
            if let Some(operation) = spec.operation {
                executor = executor.with_operation(spec.id.as_str(), operation);
            }
        }
        for fact in &self.facts {
            let rule = rules
                .get(&RuleId::new(&fact.rule))
                .ok_or_else(|| Error::config(format!("fact for unknown rule {}", fact.rule)))?;
            let value = parse_value(rule.output, &fact.value)?;
            executor = executor.with_fact(rule.id.as_str(), &fact.subject, value);
        }
        Ok(executor)
    }

    /// Builds the configured strategy.
    ///
    /// # Errors
    /// Returns a config error for an unknown strategy name or a missing
    /// required option, or the parse errors of the options it uses.
    pub fn build_strategy(&self) -> Result<Strategy> {
        let o = &self.options;
        let strategy = match self.strategy_name().to_ascii_lowercase().as_str() {
            "forward" => {
                let mut c = ForwardConfig::default();
                if let Some(n) = o.max_steps {
                    c = c.with_max_steps(n);
                }
                if let Some(n) = o.min_steps {
                    c = c.with_min_steps(n);
                }
                if let Some(s) = o.rng_seed {
                    c = c.with_rng_seed(s);
                }
                c.into()
            }
            "template" => {
                let entries = o
                    .template
                    .as_ref()
                    .ok_or_else(|| Error::config("template strategy needs options.template"))?;
                let steps = entries
                    .iter()
                    .map(TemplateEntry::resolve)
                    .collect::<Result<Vec<_>>>()?;
                let mut c = TemplateConfig::new(steps);
                if let Some(n) = o.max_steps {
                    c = c.with_max_steps(n);
                }
                c.into()
            }
            "constrained" => {
                let mut c = ConstrainedConfig::default();
                if let Some(n) = o.max_steps {
                    c = c.with_max_steps(n);
                }
                if let Some(n) = o.min_steps {
                    c = c.with_min_steps(n);
                }
                if let Some(b) = o.complexity_budget {
                    c = c.with_budget(b);
                }
                if let Some(s) = o.rng_seed {
                    c = c.with_rng_seed(s);
                }
                c.into()
            }
            "goal" => {
                let mut c = GoalConfig::new(self.target_type("goal")?);
                if let Some(n) = o.max_steps {
                    c = c.with_max_steps(n);
                }
                if let Some(s) = o.rng_seed {
                    c = c.with_rng_seed(s);
                }
                c.into()
            }
            "backward" => {
                let mut c = BackwardConfig::new(self.target_type("backward")?);
                for seed in self.auxiliary_seeds()? {
                    c = c.with_auxiliary_seed(seed);
                }
                if let Some(n) = o.plan_attempts {
                    c = c.with_plan_attempts(n);
                }
                if let Some(n) = o.max_steps {
                    c = c.with_max_steps(n);
                }
                c.into()
            }
            other => {
                return Err(Error::config(format!(
                    "unknown strategy {other:?}; expected one of {}",
                    Strategy::NAMES.join(", ")
                )));
            }
        };
        Ok(strategy)
    }

    fn target_type(&self, strategy: &str) -> Result<InfoType> {
        self.options
            .target_type
            .as_deref()
            .ok_or_else(|| Error::config(format!("{strategy} strategy needs options.target_type")))?
            .parse()
    }
}

// =============================================================================
// Values
// =============================================================================

/// Interprets a raw string as a value of `info_type`.
///
/// | Type | Accepted form |
/// |------|---------------|
/// | `DATE` | `YYYY-MM-DD` |
/// | `NUMERICAL_VALUE`, `DURATION_YEARS`, `CURRENCY_VALUE` | integer or decimal |
/// | `BOOLEAN` | `true` / `false` |
/// | `TABLE_DATA` | comma-separated items, optionally in `[...]` |
/// | anything else | the text as given |
///
/// # Errors
/// Returns a config error if the text does not fit the type.
pub fn parse_value(info_type: InfoType, raw: &str) -> Result<Value> {
    let trimmed = raw.trim();
    let invalid = || Error::config(format!("{raw:?} is not a valid {info_type} value"));
    match info_type {
        InfoType::Date => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .map(Value::Date)
            .map_err(|_| invalid()),
        InfoType::NumericalValue | InfoType::DurationYears | InfoType::CurrencyValue => {
            parse_number(trimmed).ok_or_else(invalid)
        }
        InfoType::Boolean => trimmed
            .to_ascii_lowercase()
            .parse::<bool>()
            .map(Value::Bool)
            .map_err(|_| invalid()),
        InfoType::TableData => {
            let inner = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')).unwrap_or(trimmed);
            Ok(Value::list(
                inner
                    .split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(|item| parse_number(item).unwrap_or_else(|| Value::text(item))),
            ))
        }
        _ => Ok(Value::text(trimmed)),
    }
}

fn parse_number(s: &str) -> Option<Value> {
    s.parse::<i64>()
        .map(Value::Int)
        .or_else(|_| s.parse::<f64>().map(Value::Float))
        .ok()
}
