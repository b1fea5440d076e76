//! Builder for constructing guarded transitions.

use crate::builder::error::BuildError;
use crate::core::{Action, Guard, StateId};

/// A transition that has not been placed in a system yet.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionSpec {
    pub source: StateId,
    pub action: Action,
    pub target: StateId,
    pub guard: Guard,
}

#[derive(Clone, Debug)]
enum GuardSpec {
    Text(String),
    Parsed(Guard),
}

/// Builder for constructing transitions with a fluent API.
#[derive(Clone, Debug, Default)]
pub struct TransitionBuilder {
    from: Option<StateId>,
    action: Option<Action>,
    to: Option<StateId>,
    guard: Option<GuardSpec>,
}

impl TransitionBuilder {
    /// Create a new transition builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the source state (required).
    pub fn from(mut self, state: impl Into<StateId>) -> Self {
        self.from = Some(state.into());
        self
    }

    /// Set the action label (required).
    pub fn action(mut self, action: impl Into<Action>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Set the target state (required).
    pub fn to(mut self, state: impl Into<StateId>) -> Self {
        self.to = Some(state.into());
        self
    }

    /// Guard the transition with an expression in textual form.
    /// The text is parsed by `build`.
    pub fn when(mut self, expression: impl Into<String>) -> Self {
        self.guard = Some(GuardSpec::Text(expression.into()));
        self
    }

    /// Guard the transition with an already parsed guard.
    pub fn guard(mut self, guard: Guard) -> Self {
        self.guard = Some(GuardSpec::Parsed(guard));
        self
    }

    /// Make the transition unconditional. This is the default.
    pub fn always(mut self) -> Self {
        self.guard = Some(GuardSpec::Parsed(Guard::always()));
        self
    }

    /// Build the transition.
    pub fn build(self) -> Result<TransitionSpec, BuildError> {
        let source = self.from.ok_or(BuildError::MissingSource)?;
        let action = self.action.ok_or(BuildError::MissingAction)?;
        let target = self.to.ok_or(BuildError::MissingTarget)?;

        let guard = match self.guard {
            None => Guard::always(),
            Some(GuardSpec::Parsed(guard)) => guard,
            Some(GuardSpec::Text(text)) => {
                Guard::parse(&text).map_err(|source| BuildError::InvalidGuard { text, source })?
            }
        };

        Ok(TransitionSpec {
            source,
            action,
            target,
            guard,
        })
    }
}
