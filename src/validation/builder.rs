//! Builder API for creating validation rules.

use crate::builder::Document;
use crate::validation::rules::{DocumentCheck, ValidationRules};
use crate::validation::violations::{Violation, ViolationStrategy};
use std::collections::BTreeSet;
use std::sync::Arc;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Builder for creating validation rules
pub struct RulesBuilder {
    signals: Option<BTreeSet<String>>,
    required_checks: Vec<DocumentCheck>,
    on_violation: ViolationStrategy,
}

impl RulesBuilder {
    pub fn new() -> Self {
        Self {
            signals: None,
            required_checks: Vec::new(),
            on_violation: ViolationStrategy::Reject,
        }
    }

    /// Restrict guards to the given signal names
    pub fn signals<I, K>(mut self, signals: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.signals = Some(signals.into_iter().map(Into::into).collect());
        self
    }

    /// Add a custom validation check
    pub fn require<F>(mut self, check: F) -> Self
    where
        F: Fn(&Document) -> Validation<(), NonEmptyVec<Violation>> + Send + Sync + 'static,
    {
        self.required_checks.push(Arc::new(check));
        self
    }

    /// Add a simple predicate check with error message
    pub fn require_pred<F>(mut self, predicate: F, error_msg: String) -> Self
    where
        F: Fn(&Document) -> bool + Send + Sync + 'static,
    {
        let check = move |doc: &Document| {
            if predicate(doc) {
                Validation::success(())
            } else {
                Validation::fail(Violation::Custom {
                    message: error_msg.clone(),
                })
            }
        };
        self.required_checks.push(Arc::new(check));
        self
    }

    /// Set violation handling strategy
    pub fn on_violation(mut self, strategy: ViolationStrategy) -> Self {
        self.on_violation = strategy;
        self
    }

    /// Build the validation rules
    pub fn build(self) -> ValidationRules {
        ValidationRules {
            signals: self.signals,
            required_checks: self.required_checks,
            on_violation: self.on_violation,
        }
    }
}

impl Default for RulesBuilder {
    fn default() -> Self {
        Self::new()
    }
}
