//! The raw document model and its conversion into a validated system.

use crate::builder::error::BuildError;
use crate::core::{Action, FeaturedTransitionSystem, Guard, State, StateId, Transition, TransitionId};
use crate::validation::{ValidationRules, Violation, ViolationStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use stillwater::validation::Validation;

/// A transition as written in a model file: all fields are plain text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionDecl {
    pub action: String,
    pub target: String,
    pub fexpression: String,
}

/// A state as written in a model file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDecl {
    pub id: String,
    pub transitions: Vec<TransitionDecl>,
}

/// An unvalidated transition system document.
///
/// Loaders produce documents without checking references, so every
/// structural problem can be reported at once by [`ValidationRules`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub start: Option<String>,
    pub states: Vec<StateDecl>,
}

impl Document {
    pub fn transition_count(&self) -> usize {
        self.states.iter().map(|s| s.transitions.len()).sum()
    }

    /// Validate the document and assemble the system.
    ///
    /// With [`ViolationStrategy::Reject`] any violation fails the build.
    /// With [`ViolationStrategy::IgnoreAndLog`] non-fatal violations are
    /// logged and skipped, fatal ones still fail.
    pub fn build(&self, rules: &ValidationRules) -> Result<FeaturedTransitionSystem, BuildError> {
        if let Validation::Failure(errors) = rules.validate(self) {
            let violations: Vec<Violation> = errors.iter().cloned().collect();
            match rules.violation_strategy() {
                ViolationStrategy::Reject => return Err(BuildError::Invalid(violations)),
                ViolationStrategy::IgnoreAndLog => {
                    let (fatal, tolerated): (Vec<_>, Vec<_>) =
                        violations.into_iter().partition(Violation::is_fatal);
                    for v in &tolerated {
                        tracing::warn!(violation = %v, "ignoring violation");
                    }
                    if !fatal.is_empty() {
                        return Err(BuildError::Invalid(fatal));
                    }
                }
            }
        }

        let start = self
            .start
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(BuildError::MissingStart)?;

        let mut states = Vec::with_capacity(self.states.len());
        for (si, decl) in self.states.iter().enumerate() {
            let source = StateId::new(decl.id.as_str());
            let mut transitions = Vec::with_capacity(decl.transitions.len());
            for (ti, t) in decl.transitions.iter().enumerate() {
                let guard =
                    Guard::parse(&t.fexpression).map_err(|source| BuildError::InvalidGuard {
                        text: t.fexpression.clone(),
                        source,
                    })?;
                transitions.push(Transition {
                    id: TransitionId::new(si, ti),
                    source: source.clone(),
                    action: Action::new(t.action.as_str()),
                    target: StateId::new(t.target.as_str()),
                    guard,
                });
            }
            states.push(State {
                id: source,
                transitions,
            });
        }

        let system = FeaturedTransitionSystem::from_parts(StateId::new(start), states);
        tracing::debug!(
            start = %system.start(),
            states = system.state_count(),
            transitions = system.transition_count(),
            "built transition system"
        );
        Ok(system)
    }

    /// Ids declared more than once, in first-duplicate order.
    pub fn duplicate_ids(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for s in &self.states {
            if !seen.insert(s.id.as_str()) && !out.contains(&s.id.as_str()) {
                out.push(s.id.as_str());
            }
        }
        out
    }
}

impl From<&FeaturedTransitionSystem> for Document {
    /// Guards are written in canonical form.
    fn from(system: &FeaturedTransitionSystem) -> Self {
        Document {
            start: Some(system.start().to_string()),
            states: system
                .states()
                .iter()
                .map(|s| StateDecl {
                    id: s.id().to_string(),
                    transitions: s
                        .transitions()
                        .iter()
                        .map(|t| TransitionDecl {
                            action: t.action.to_string(),
                            target: t.target.to_string(),
                            fexpression: t.guard.expr().to_string(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}
