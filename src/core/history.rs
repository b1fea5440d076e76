//! Execution history: the sequence of transitions fired by a run.
//!
//! Provides immutable tracking of the steps taken through a featured
//! transition system. A history is also the unit that coverage criteria
//! measure.

use super::state::{Action, StateId};
use super::transition::TransitionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single fired transition.
///
/// # Example
///
/// ```rust
/// use ftsmind::core::{Action, StateId, StateTransition, TransitionId};
/// use chrono::Utc;
///
/// let step = StateTransition {
///     from: StateId::from("state0"),
///     action: Action::from("map"),
///     to: StateId::from("state1"),
///     transition: TransitionId::new(0, 0),
///     timestamp: Utc::now(),
///     step: 1,
/// };
/// assert_eq!(step.action, "map");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateTransition {
    /// The state being left
    pub from: StateId,
    /// Label of the fired transition
    pub action: Action,
    /// The state being entered
    pub to: StateId,
    /// Which transition fired
    pub transition: TransitionId,
    /// When the transition fired
    pub timestamp: DateTime<Utc>,
    /// 1-based position of the step in its run
    pub step: usize,
}

/// Ordered history of fired transitions.
///
/// History is immutable - the `record` method returns a new history
/// with the transition added.
///
/// # Example
///
/// ```rust
/// use ftsmind::core::{Action, StateHistory, StateId, StateTransition, TransitionId};
/// use chrono::Utc;
///
/// let history = StateHistory::new();
///
/// let history = history.record(StateTransition {
///     from: StateId::from("state2"),
///     action: Action::from("goAround"),
///     to: StateId::from("state3"),
///     transition: TransitionId::new(2, 0),
///     timestamp: Utc::now(),
///     step: 1,
/// });
///
/// let history = history.record(StateTransition {
///     from: StateId::from("state3"),
///     action: Action::from("clean"),
///     to: StateId::from("state5"),
///     transition: TransitionId::new(5, 0),
///     timestamp: Utc::now(),
///     step: 2,
/// });
///
/// let path = history.get_path();
/// assert_eq!(path.len(), 3); // state2 -> state3 -> state5
/// assert_eq!(history.actions(), vec!["goAround", "clean"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateHistory {
    transitions: Vec<StateTransition>,
}

impl StateHistory {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Record a transition, returning a new history.
    ///
    /// This is a pure function - it does not mutate the existing history
    /// but returns a new one with the transition added.
    pub fn record(&self, transition: StateTransition) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        Self { transitions }
    }

    /// Get the path of states traversed.
    ///
    /// Returns references to states in order: the first source state, then
    /// the `to` state of each transition.
    pub fn get_path(&self) -> Vec<&StateId> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Action labels in firing order.
    pub fn actions(&self) -> Vec<&str> {
        self.transitions.iter().map(|t| t.action.as_str()).collect()
    }

    /// Fired transition ids in order.
    pub fn transition_ids(&self) -> Vec<TransitionId> {
        self.transitions.iter().map(|t| t.transition).collect()
    }

    /// State reached by the last step.
    pub fn last_state(&self) -> Option<&StateId> {
        self.transitions.last().map(|t| &t.to)
    }

    /// Calculate total duration from first to last transition.
    ///
    /// Returns `None` if there are no transitions.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// Get all transitions.
    pub fn transitions(&self) -> &[StateTransition] {
        &self.transitions
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
