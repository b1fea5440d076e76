//! Guarded, action-labelled transitions.

use super::guard::Guard;
use super::state::{Action, StateId};
use crate::fexpr::{FExprError, SignalSource};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a transition: declaration index of its source state and
/// index within that state's transition list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TransitionId {
    pub state: usize,
    pub index: usize,
}

impl TransitionId {
    pub fn new(state: usize, index: usize) -> Self {
        Self { state, index }
    }
}

impl fmt::Display for TransitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}.{}", self.state, self.index)
    }
}

/// A transition from `source` to `target` labelled `action`, enabled when
/// its guard holds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub id: TransitionId,
    pub source: StateId,
    pub action: Action,
    pub target: StateId,
    pub guard: Guard,
}

impl Transition {
    /// Check whether the guard holds (pure).
    pub fn is_enabled<S: SignalSource + ?Sized>(&self, signals: &S) -> Result<bool, FExprError> {
        self.guard.check(signals)
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} --{} [{}]--> {}",
            self.source, self.action, self.guard, self.target
        )
    }
}
