//! The boundary to whatever produces concrete values.
//!
//! Generation never interprets an [`ExecutionError`]; every failure prunes the
//! candidate application that caused it.

use multihop_foundation::Value;
use thiserror::Error;

use crate::chain::State;
use crate::rule::Rule;

/// Why an executor could not produce a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// The executor has no answer for these inputs.
    #[error("no value found for {rule}: {detail}")]
    NotFound {
        /// Id of the rule being executed.
        rule: String,
        /// What was looked up.
        detail: String,
    },

    /// Inputs had the right type but an unusable value.
    #[error("invalid input for {rule}: {detail}")]
    InvalidInput {
        /// Id of the rule being executed.
        rule: String,
        /// What was wrong.
        detail: String,
    },

    /// The executor does not handle this operator.
    #[error("operator {0} is not supported")]
    Unsupported(String),

    /// A backend failure.
    #[error("backend failure: {0}")]
    Backend(String),
}

impl ExecutionError {
    /// Creates a not-found error for a rule.
    #[must_use]
    pub fn not_found(rule: &Rule, detail: impl Into<String>) -> Self {
        Self::NotFound {
            rule: rule.id.to_string(),
            detail: detail.into(),
        }
    }

    /// Creates an invalid-input error for a rule.
    #[must_use]
    pub fn invalid_input(rule: &Rule, detail: impl Into<String>) -> Self {
        Self::InvalidInput {
            rule: rule.id.to_string(),
            detail: detail.into(),
        }
    }
}

/// Turns a rule application into a concrete value.
///
/// Implementations receive the bound input states in slot order. They are
/// called synchronously; a failing call may be followed by a call for a
/// different binding of the same rule.
pub trait Executor {
    /// Executes `rule` over `inputs`.
    ///
    /// # Errors
    /// Returns an [`ExecutionError`] if no value can be produced.
    fn execute(&self, rule: &Rule, inputs: &[&State]) -> Result<Value, ExecutionError>;
}

impl<F> Executor for F
where
    F: Fn(&Rule, &[&State]) -> Result<Value, ExecutionError>,
{
    fn execute(&self, rule: &Rule, inputs: &[&State]) -> Result<Value, ExecutionError> {
        self(rule, inputs)
    }
}
