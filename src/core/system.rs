//! The featured transition system model.

use super::guard::Guard;
use super::state::{Action, State, StateId};
use super::transition::{Transition, TransitionId};
use crate::fexpr::{Configuration, FExprError, SignalSource};
use std::collections::{BTreeSet, HashMap};

/// A featured transition system: states in declaration order, guarded
/// transitions and a start state.
///
/// Values of this type are structurally valid: the start state and every
/// transition target are declared and state ids are unique. They are
/// obtained through [`crate::builder::FtsBuilder`] or the loaders in
/// [`crate::io`].
#[derive(Clone, Debug, PartialEq)]
pub struct FeaturedTransitionSystem {
    start: StateId,
    states: Vec<State>,
    index: HashMap<StateId, usize>,
}

impl FeaturedTransitionSystem {
    /// Assemble a system from already validated parts.
    pub(crate) fn from_parts(start: StateId, states: Vec<State>) -> Self {
        let index = states
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.clone(), i))
            .collect();
        Self {
            start,
            states,
            index,
        }
    }

    pub fn start(&self) -> &StateId {
        &self.start
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn state(&self, id: &str) -> Option<&State> {
        self.index.get(id).map(|&i| &self.states[i])
    }

    /// Declaration index of a state.
    pub fn state_index(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn transition_count(&self) -> usize {
        self.states.iter().map(|s| s.transitions.len()).sum()
    }

    /// All transitions, grouped by source state in declaration order.
    pub fn transitions(&self) -> impl Iterator<Item = &Transition> {
        self.states.iter().flat_map(|s| s.transitions.iter())
    }

    pub fn transition(&self, id: TransitionId) -> Option<&Transition> {
        self.states.get(id.state)?.transitions.get(id.index)
    }

    /// Outgoing transitions of a state; empty for unknown states.
    pub fn outgoing(&self, id: &str) -> &[Transition] {
        self.state(id).map(|s| s.transitions()).unwrap_or(&[])
    }

    /// Transitions whose target is `id`.
    pub fn incoming<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Transition> + 'a {
        self.transitions().filter(move |t| t.target.as_str() == id)
    }

    /// Distinct action labels, sorted.
    pub fn actions(&self) -> BTreeSet<&Action> {
        self.transitions().map(|t| &t.action).collect()
    }

    /// Every feature referenced by some guard, sorted.
    pub fn features(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        for t in self.transitions() {
            out.extend(t.guard.features());
        }
        out
    }

    /// Features referenced by the guards leaving one state.
    pub fn state_features(&self, id: &str) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        for t in self.outgoing(id) {
            out.extend(t.guard.features());
        }
        out
    }

    pub fn sinks(&self) -> impl Iterator<Item = &State> {
        self.states.iter().filter(|s| s.is_sink())
    }

    /// Transitions of `id` whose guards hold, in declaration order.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ftsmind::fts;
    /// use ftsmind::fexpr::Configuration;
    ///
    /// let system = fts! {
    ///     start: idle;
    ///     idle => [
    ///         scan -> busy if "lidar",
    ///         look -> busy if "camera",
    ///     ];
    ///     busy => [];
    /// }
    /// .unwrap();
    ///
    /// let config = Configuration::new().with("lidar", true).with("camera", true);
    /// let enabled = system.enabled("idle", &config).unwrap();
    /// assert_eq!(enabled.len(), 2);
    /// ```
    pub fn enabled<S: SignalSource + ?Sized>(
        &self,
        id: &str,
        signals: &S,
    ) -> Result<Vec<&Transition>, FExprError> {
        let mut out = Vec::new();
        for t in self.outgoing(id) {
            if t.is_enabled(signals)? {
                out.push(t);
            }
        }
        Ok(out)
    }

    /// The plain transition system of one product.
    ///
    /// Keeps the transitions whose guard holds under `config` and replaces
    /// their guards by `true`. Every state is kept, so the projection may
    /// contain unreachable states.
    pub fn project(&self, config: &Configuration) -> Result<FeaturedTransitionSystem, FExprError> {
        let mut states = Vec::with_capacity(self.states.len());
        for (si, state) in self.states.iter().enumerate() {
            let mut transitions = Vec::new();
            for t in &state.transitions {
                if t.is_enabled(config)? {
                    transitions.push(Transition {
                        id: TransitionId::new(si, transitions.len()),
                        source: t.source.clone(),
                        action: t.action.clone(),
                        target: t.target.clone(),
                        guard: Guard::always(),
                    });
                }
            }
            states.push(State {
                id: state.id.clone(),
                transitions,
            });
        }
        Ok(Self::from_parts(self.start.clone(), states))
    }
}
