//! Structural violations and handling strategies.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A structural problem found in a transition system document.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    #[error("Document declares no states")]
    NoStates,

    #[error("Start state not specified")]
    MissingStart,

    #[error("Start state '{start}' is not declared")]
    UnknownStart { start: String },

    #[error("State at position {position} has an empty id")]
    EmptyStateId { position: usize },

    #[error("State '{id}' is declared more than once")]
    DuplicateState { id: String },

    #[error("Transition #{index} of state '{state}' has an empty action")]
    EmptyAction { state: String, index: usize },

    #[error("Transition '{action}' of state '{state}' targets undeclared state '{target}'")]
    UnknownTarget {
        state: String,
        action: String,
        target: String,
    },

    #[error("Guard '{guard}' of transition '{action}' in state '{state}' is malformed: {reason}")]
    MalformedGuard {
        state: String,
        action: String,
        guard: String,
        reason: String,
    },

    #[error("Guard of transition '{action}' in state '{state}' uses unknown signal '{signal}'")]
    UnknownSignal {
        state: String,
        action: String,
        signal: String,
    },

    #[error("Custom check failed: {message}")]
    Custom { message: String },
}

impl Violation {
    /// Whether a system can still be built despite the violation.
    ///
    /// Fatal violations leave dangling references or unparsable guards.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Violation::EmptyAction { .. } | Violation::UnknownSignal { .. } | Violation::Custom { .. }
        )
    }
}

/// Strategy for handling violations when loading or building.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationStrategy {
    /// Refuse the document on any violation
    #[default]
    Reject,

    /// Log non-fatal violations and continue; fatal ones still fail
    IgnoreAndLog,
}
