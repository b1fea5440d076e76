//! Builder for constructing featured transition systems.

use crate::builder::document::{Document, StateDecl, TransitionDecl};
use crate::builder::error::BuildError;
use crate::builder::transition::{TransitionBuilder, TransitionSpec};
use crate::core::{FeaturedTransitionSystem, StateId};
use crate::validation::ValidationRules;

/// Builder for constructing transition systems with a fluent API.
///
/// States are kept in the order they are first mentioned, either by
/// [`state`](Self::state) or as the source of a transition. Targets are
/// not declared implicitly.
#[derive(Debug, Default)]
pub struct FtsBuilder {
    start: Option<StateId>,
    document: Document,
    rules: ValidationRules,
}

impl FtsBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the start state (required).
    pub fn start(mut self, state: impl Into<StateId>) -> Self {
        self.start = Some(state.into());
        self
    }

    /// Declare a state. Declaring a state twice is a no-op.
    pub fn state(mut self, state: impl Into<StateId>) -> Self {
        self.declare(state.into().as_str());
        self
    }

    /// Add a transition using a builder.
    /// Returns an error if the builder fails validation.
    pub fn transition(self, builder: TransitionBuilder) -> Result<Self, BuildError> {
        let spec = builder.build()?;
        Ok(self.add_spec(spec))
    }

    /// Add a pre-built transition.
    pub fn add_spec(mut self, spec: TransitionSpec) -> Self {
        let decl = TransitionDecl {
            action: spec.action.to_string(),
            target: spec.target.to_string(),
            fexpression: spec.guard.source().to_string(),
        };
        self.declare(spec.source.as_str()).transitions.push(decl);
        self
    }

    /// Add a transition from its textual parts.
    /// The guard is checked when the system is built.
    pub fn add(
        mut self,
        source: impl Into<StateId>,
        action: impl Into<String>,
        target: impl Into<StateId>,
        guard: impl Into<String>,
    ) -> Self {
        let decl = TransitionDecl {
            action: action.into(),
            target: target.into().to_string(),
            fexpression: guard.into(),
        };
        self.declare(source.into().as_str()).transitions.push(decl);
        self
    }

    /// Use custom validation rules instead of the defaults.
    pub fn rules(mut self, rules: ValidationRules) -> Self {
        self.rules = rules;
        self
    }

    /// The document assembled so far.
    pub fn document(&self) -> Document {
        let mut document = self.document.clone();
        document.start = self.start.as_ref().map(ToString::to_string);
        document
    }

    /// Build the transition system.
    /// Returns an error if the start state is missing or the document
    /// violates the validation rules.
    pub fn build(self) -> Result<FeaturedTransitionSystem, BuildError> {
        if self.start.is_none() {
            return Err(BuildError::MissingStart);
        }
        self.document().build(&self.rules)
    }

    fn declare(&mut self, id: &str) -> &mut StateDecl {
        let position = match self.document.states.iter().position(|s| s.id == id) {
            Some(position) => position,
            None => {
                self.document.states.push(StateDecl {
                    id: id.to_string(),
                    transitions: Vec::new(),
                });
                self.document.states.len() - 1
            }
        };
        &mut self.document.states[position]
    }
}
