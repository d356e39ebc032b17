//! Deterministic execution of an operator template.

use multihop_foundation::OperatorType;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::chain::{Chain, Seed};
use crate::rule::Rule;

use super::walk::Walk;
use super::{FailureKind, GenerationContext, GenerationError, GenerationStrategy, check_steps};

/// One template entry: an operator and an optional wording hint.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TemplateStep {
    /// Operator the applied rule must use.
    pub operator: OperatorType,
    /// Substring the rule's description must contain (case-insensitive).
    #[cfg_attr(feature = "serde", serde(default))]
    pub description_contains: Option<String>,
}

impl TemplateStep {
    /// Creates a step with a wording hint.
    #[must_use]
    pub fn hinted(operator: OperatorType, hint: impl Into<String>) -> Self {
        Self {
            operator,
            description_contains: Some(hint.into()),
        }
    }

    /// Returns true if `rule` satisfies this entry.
    #[must_use]
    pub fn matches(&self, rule: &Rule) -> bool {
        rule.operator == self.operator
            && self.description_contains.as_ref().is_none_or(|hint| {
                rule.template.to_lowercase().contains(&hint.to_lowercase())
            })
    }
}

impl From<OperatorType> for TemplateStep {
    fn from(operator: OperatorType) -> Self {
        Self {
            operator,
            description_contains: None,
        }
    }
}

/// Options for template-driven generation.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TemplateConfig {
    /// Entries to satisfy, in order.
    pub template: Vec<TemplateStep>,
    /// Upper bound on rule applications.
    #[cfg_attr(feature = "serde", serde(default = "default_max_steps"))]
    pub max_steps: usize,
}

#[cfg(feature = "serde")]
fn default_max_steps() -> usize {
    10
}

impl TemplateConfig {
    /// Creates a config from template entries.
    #[must_use]
    pub fn new<S: Into<TemplateStep>>(template: impl IntoIterator<Item = S>) -> Self {
        Self {
            template: template.into_iter().map(Into::into).collect(),
            max_steps: 10,
        }
    }

    /// Sets `max_steps`.
    #[must_use]
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }
}

impl GenerationStrategy for TemplateConfig {
    fn name(&self) -> &'static str {
        "template"
    }

    fn generate(&self, ctx: &GenerationContext<'_>, seed: &Seed) -> Result<Chain, GenerationError> {
        check_steps(0, self.max_steps, seed)?;
        if self.template.is_empty() {
            return Err(GenerationError::invalid_config("template is empty", seed));
        }
        if self.template.len() > self.max_steps {
            return Err(GenerationError::invalid_config(
                format!(
                    "template has {} entries but max_steps is {}",
                    self.template.len(),
                    self.max_steps
                ),
                seed,
            ));
        }

        let mut walk = Walk::new(ctx, Chain::new(seed).with_limit(self.max_steps));
        for (index, entry) in self.template.iter().enumerate() {
            let candidates: Vec<_> = walk
                .candidates()
                .into_iter()
                .filter(|c| entry.matches(c.rule))
                .collect();
            match walk.step(candidates, |_| (0, 0)) {
                Ok(Some(rule)) => debug!(index, rule = %rule.id, "template entry satisfied"),
                Ok(None) => {
                    info!(strategy = "template", index, operator = %entry.operator, "template mismatch");
                    return Err(walk.fail(FailureKind::TemplateMismatch {
                        index,
                        operator: entry.operator,
                    }));
                }
                Err(e) => return Err(walk.fail(e.into())),
            }
        }

        info!(strategy = "template", steps = walk.applications(), "generation finished");
        Ok(walk.finish())
    }
}
