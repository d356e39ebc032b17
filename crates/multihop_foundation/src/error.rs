//! Error types for the Multihop system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.

use std::fmt;

use thiserror::Error;

use crate::types::{InfoType, OperatorType};

/// The main error type for Multihop operations.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates an invalid rule error.
    #[must_use]
    pub fn invalid_rule(rule: impl Into<String>, reason: RuleViolation) -> Self {
        Self::new(ErrorKind::InvalidRule {
            rule: rule.into(),
            reason,
        })
    }

    /// Creates a type mismatch error.
    #[must_use]
    pub fn type_mismatch(expected: InfoType, actual: InfoType) -> Self {
        Self::new(ErrorKind::TypeMismatch { expected, actual })
    }

    /// Creates an invariant violation error.
    #[must_use]
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvariantViolation(message.into()))
    }

    /// Creates an unknown information type error.
    #[must_use]
    pub fn unknown_info_type(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownInfoType(name.into()))
    }

    /// Creates an unknown operator error.
    #[must_use]
    pub fn unknown_operator(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownOperator(name.into()))
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config(message.into()))
    }

    /// Returns true if this error signals a broken internal invariant.
    #[must_use]
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::InvariantViolation(_) | ErrorKind::TypeMismatch { .. }
        )
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorKind {
    /// A rule was rejected at registration.
    #[error("invalid rule {rule}: {reason}")]
    InvalidRule {
        /// Id of the offending rule.
        rule: String,
        /// What was wrong with it.
        reason: RuleViolation,
    },

    /// A bound input or produced state had the wrong information type.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The expected type.
        expected: InfoType,
        /// The actual type encountered.
        actual: InfoType,
    },

    /// Chain construction broke one of its structural invariants.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// An information type name could not be parsed.
    #[error("unknown information type: {0}")]
    UnknownInfoType(String),

    /// An operator type name could not be parsed.
    #[error("unknown operator type: {0}")]
    UnknownOperator(String),

    /// Configuration could not be interpreted.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Reasons a rule can be rejected at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleViolation {
    /// The rule declares no input slots.
    NoInputs,
    /// The output type also appears among the input slots.
    SelfLoop(InfoType),
    /// The operator/inputs/output triple is not in the compatibility table.
    NotCompatible {
        /// The rule's operator.
        operator: OperatorType,
        /// The rule's input slots.
        inputs: Vec<InfoType>,
        /// The rule's output type.
        output: InfoType,
    },
    /// Another rule with the same id is already registered.
    DuplicateId,
    /// A predicate refers to an input slot the rule does not have.
    PredicateSlot(usize),
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoInputs => write!(f, "rule has no input slots"),
            Self::SelfLoop(t) => write!(f, "output type {t} is also an input type"),
            Self::NotCompatible {
                operator,
                inputs,
                output,
            } => {
                write!(f, "{operator}(")?;
                for (i, t) in inputs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{t}")?;
                }
                write!(f, ") -> {output} is not an allowed transition")
            }
            Self::DuplicateId => write!(f, "rule id is already registered"),
            Self::PredicateSlot(slot) => {
                write!(f, "predicate refers to missing input slot {slot}")
            }
        }
    }
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// Rule id or file the error relates to.
    pub source: Option<String>,
    /// Chain step the error relates to.
    pub step: Option<usize>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the chain step.
    #[must_use]
    pub fn with_step(mut self, step: usize) -> Self {
        self.step = Some(step);
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.source, self.step) {
            (Some(source), Some(step)) => write!(f, "at {source} (step {step})"),
            (Some(source), None) => write!(f, "at {source}"),
            (None, Some(step)) => write!(f, "(step {step})"),
            (None, None) => Ok(()),
        }
    }
}
