//! Build errors for transition system and transition builders.

use crate::fexpr::ParseError;
use crate::validation::Violation;
use thiserror::Error;

/// Errors that can occur when building transition systems and transitions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("Start state not specified. Call .start(state) before .build()")]
    MissingStart,

    #[error("Transition source state not specified. Call .from(state)")]
    MissingSource,

    #[error("Transition action not specified. Call .action(name)")]
    MissingAction,

    #[error("Transition target state not specified. Call .to(state)")]
    MissingTarget,

    #[error("Invalid guard '{text}': {source}")]
    InvalidGuard {
        text: String,
        #[source]
        source: ParseError,
    },

    #[error("Document has {} violation(s): {}", .0.len(), join(.0))]
    Invalid(Vec<Violation>),
}

impl BuildError {
    /// Violations carried by an `Invalid` error.
    pub fn violations(&self) -> &[Violation] {
        match self {
            BuildError::Invalid(violations) => violations,
            _ => &[],
        }
    }
}

fn join(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
