//! Structural rules for transition system documents using Validation.

use crate::builder::Document;
use crate::fexpr;
use crate::validation::violations::{Violation, ViolationStrategy};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Type alias for custom document checks
pub type DocumentCheck =
    Arc<dyn Fn(&Document) -> Validation<(), NonEmptyVec<Violation>> + Send + Sync>;

/// Structural rules for documents.
/// Uses Validation to accumulate ALL violations.
#[derive(Clone)]
pub struct ValidationRules {
    pub(crate) signals: Option<BTreeSet<String>>,
    pub(crate) required_checks: Vec<DocumentCheck>,
    pub(crate) on_violation: ViolationStrategy,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            signals: None,
            required_checks: Vec::new(),
            on_violation: ViolationStrategy::Reject,
        }
    }
}

impl std::fmt::Debug for ValidationRules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationRules")
            .field("signals", &self.signals)
            .field("required_checks", &self.required_checks.len())
            .field("on_violation", &self.on_violation)
            .finish()
    }
}

impl ValidationRules {
    /// Check every structural rule, accumulating ALL violations.
    /// Returns Validation::Success(()) if the document is well formed.
    /// Returns Validation::Failure with ALL violations otherwise.
    pub fn validate(&self, doc: &Document) -> Validation<(), NonEmptyVec<Violation>> {
        let mut checks: Vec<Validation<(), NonEmptyVec<Violation>>> = Vec::new();

        if doc.states.is_empty() {
            checks.push(Validation::fail(Violation::NoStates));
        }

        let declared: HashSet<&str> = doc.states.iter().map(|s| s.id.as_str()).collect();

        match doc.start.as_deref().map(str::trim) {
            None | Some("") => checks.push(Validation::fail(Violation::MissingStart)),
            Some(start) if !declared.contains(start) => {
                checks.push(Validation::fail(Violation::UnknownStart {
                    start: start.to_string(),
                }))
            }
            Some(_) => {}
        }

        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        for (position, state) in doc.states.iter().enumerate() {
            if state.id.trim().is_empty() {
                checks.push(Validation::fail(Violation::EmptyStateId { position }));
                continue;
            }
            if !seen.insert(state.id.as_str()) && reported.insert(state.id.as_str()) {
                checks.push(Validation::fail(Violation::DuplicateState {
                    id: state.id.clone(),
                }));
            }
        }

        for state in &doc.states {
            for (index, t) in state.transitions.iter().enumerate() {
                if t.action.trim().is_empty() {
                    checks.push(Validation::fail(Violation::EmptyAction {
                        state: state.id.clone(),
                        index,
                    }));
                }

                if !declared.contains(t.target.as_str()) {
                    checks.push(Validation::fail(Violation::UnknownTarget {
                        state: state.id.clone(),
                        action: t.action.clone(),
                        target: t.target.clone(),
                    }));
                }

                match fexpr::parse(&t.fexpression) {
                    Err(e) => checks.push(Validation::fail(Violation::MalformedGuard {
                        state: state.id.clone(),
                        action: t.action.clone(),
                        guard: t.fexpression.clone(),
                        reason: e.to_string(),
                    })),
                    Ok(expr) => {
                        if let Some(vocabulary) = &self.signals {
                            for signal in expr.features() {
                                if !vocabulary.contains(&signal) {
                                    checks.push(Validation::fail(Violation::UnknownSignal {
                                        state: state.id.clone(),
                                        action: t.action.clone(),
                                        signal,
                                    }));
                                }
                            }
                        }
                    }
                }
            }
        }

        // Run custom checks
        for check_fn in &self.required_checks {
            checks.push(check_fn(doc));
        }

        // Accumulate ALL failures using all_vec
        Validation::all_vec(checks).map(|_| ())
    }

    /// Validate and flatten the outcome into a list of violations.
    pub fn violations(&self, doc: &Document) -> Vec<Violation> {
        match self.validate(doc) {
            Validation::Success(_) => Vec::new(),
            Validation::Failure(errors) => errors.iter().cloned().collect(),
        }
    }

    pub fn violation_strategy(&self) -> ViolationStrategy {
        self.on_violation
    }

    /// The allowed signal vocabulary, if restricted.
    pub fn signals(&self) -> Option<&BTreeSet<String>> {
        self.signals.as_ref()
    }
}
