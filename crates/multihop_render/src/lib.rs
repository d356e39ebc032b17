//! Natural-language rendering of Multihop chains.
//!
//! This crate provides:
//! - [`Renderer`] - Turns a chain into numbered step descriptions and a question
//! - [`TemplateRenderer`] - Fills each rule's description template
//! - [`Question`] - The rendered question with its expected answer

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::fmt::Write;

use multihop_engine::{Chain, RuleId, RuleSet, StateRef};
#[cfg(feature = "serde")]
use serde::Serialize;
use thiserror::Error;

/// Rendering failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// A chain step names a rule the renderer does not know.
    #[error("step {step} was produced by unknown rule {rule}")]
    UnknownRule {
        /// The step.
        step: usize,
        /// The rule id recorded on it.
        rule: RuleId,
    },
}

// =============================================================================
// Question
// =============================================================================

/// A rendered question.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Question {
    /// The seed value as shown to the reader.
    pub seed: String,
    /// Numbered step descriptions.
    pub steps: Vec<String>,
    /// Value of the final state, if any rule was applied.
    pub answer: Option<String>,
    /// The full wrapped text.
    pub text: String,
}

// =============================================================================
// Renderer Trait
// =============================================================================

/// Turns chains into text.
pub trait Renderer {
    /// Describes each rule application, in step order, without numbering.
    ///
    /// # Errors
    /// Returns a [`RenderError`] if a step cannot be described.
    fn describe_steps(&self, chain: &Chain) -> Result<Vec<String>, RenderError>;

    /// Wraps step descriptions into the final question text.
    fn wrap(&self, chain: &Chain, steps: &[String]) -> String;

    /// Renders a chain into a [`Question`].
    ///
    /// # Errors
    /// Returns a [`RenderError`] if a step cannot be described.
    fn render(&self, chain: &Chain) -> Result<Question, RenderError> {
        let steps = self.describe_steps(chain)?;
        Ok(Question {
            seed: chain.seed().value.to_string(),
            text: self.wrap(chain, &steps),
            answer: chain.final_state().map(|s| s.value.to_string()),
            steps,
        })
    }
}

// =============================================================================
// Template Renderer
// =============================================================================

/// Fills rule description templates.
///
/// Supported placeholders:
/// - `{input0}`, `{input1}`, ... - the bound inputs
/// - `{output}` - "the resulting <type>", or "what is the resulting <type>"
///   on the final step
/// - `{step}` - the step number
///
/// Inputs render as "the initial entity ('<value>')" for the primary seed,
/// "the entity '<value>'" for auxiliary seeds, and "the result from step N"
/// for derived states. The final step always ends with a question mark.
#[derive(Clone, Debug)]
pub struct TemplateRenderer<'r> {
    rules: &'r RuleSet,
    separator: String,
}

impl<'r> TemplateRenderer<'r> {
    /// Creates a renderer joining steps with a single space.
    #[must_use]
    pub fn new(rules: &'r RuleSet) -> Self {
        Self {
            rules,
            separator: " ".to_string(),
        }
    }

    /// Sets the text placed between the intro and each numbered step.
    #[must_use]
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    fn input_label(chain: &Chain, r: StateRef) -> String {
        match (r, chain.resolve(r)) {
            (StateRef::Seed, Some(s)) => format!("the initial entity ('{}')", s.value),
            (StateRef::Auxiliary(_), Some(s)) => format!("the entity '{}'", s.value),
            (StateRef::Step(n), _) => format!("the result from step {n}"),
            (_, None) => format!("an earlier result ({r})"),
        }
    }
}

impl Renderer for TemplateRenderer<'_> {
    fn describe_steps(&self, chain: &Chain) -> Result<Vec<String>, RenderError> {
        let last = chain.applications();
        chain
            .steps()
            .iter()
            .map(|state| {
                let rule = state
                    .produced_by
                    .as_ref()
                    .and_then(|id| self.rules.get(id))
                    .ok_or_else(|| RenderError::UnknownRule {
                        step: state.step,
                        rule: state
                            .produced_by
                            .clone()
                            .unwrap_or_else(|| RuleId::new("?")),
                    })?;

                let mut text = rule.template.replace("{step}", &state.step.to_string());
                for (slot, r) in state.inputs.iter().enumerate() {
                    text = text.replace(&format!("{{input{slot}}}"), &Self::input_label(chain, *r));
                }

                let phrase = rule.output.phrase();
                if state.step == last {
                    text = text.replace("{output}", &format!("what is the resulting {phrase}"));
                    let mut text = text.trim().trim_end_matches('.').to_string();
                    if !text.ends_with('?') {
                        text.push('?');
                    }
                    Ok(text)
                } else {
                    Ok(text.replace("{output}", &format!("the resulting {phrase}")))
                }
            })
            .collect()
    }

    fn wrap(&self, chain: &Chain, steps: &[String]) -> String {
        let seed = chain.seed();
        if steps.is_empty() {
            return format!(
                "Starting with {} (type: {}), what can you determine about it?",
                seed.value, seed.info_type
            );
        }

        let mut text = format!(
            "Consider the starting entity: '{}'. Please perform the following sequence of operations:",
            seed.value
        );
        for (i, step) in steps.iter().enumerate() {
            let _ = write!(text, "{}{}. {step}", self.separator, i + 1);
        }
        text
    }
}
