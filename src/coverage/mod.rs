//! Structural coverage of executions.
//!
//! A criterion fixes the set of elements of a system to be covered and
//! tells which of them an execution covers. Coverage is the covered
//! fraction over a set of executions, 0 when nothing is to be covered.

use crate::core::{Action, FeaturedTransitionSystem, StateHistory, StateId, TransitionId};
use std::collections::BTreeSet;

/// A structural coverage criterion over a fixed system.
pub trait CoverageCriteria {
    type Element: Ord + Clone;

    fn name(&self) -> &'static str;

    /// Elements of the system to be covered.
    fn elements(&self) -> &BTreeSet<Self::Element>;

    /// Elements one execution covers.
    fn covered_by(&self, history: &StateHistory) -> BTreeSet<Self::Element>;

    /// Fraction of elements covered by at least one execution.
    fn coverage(&self, histories: &[StateHistory]) -> f64 {
        let total = self.elements().len();
        if total == 0 {
            return 0.0;
        }
        let covered = histories
            .iter()
            .flat_map(|h| self.covered_by(h))
            .filter(|e| self.elements().contains(e))
            .collect::<BTreeSet<_>>();
        covered.len() as f64 / total as f64
    }

    /// Elements no execution covers, in order.
    fn uncovered(&self, histories: &[StateHistory]) -> Vec<Self::Element> {
        let covered: BTreeSet<Self::Element> =
            histories.iter().flat_map(|h| self.covered_by(h)).collect();
        self.elements()
            .iter()
            .filter(|e| !covered.contains(e))
            .cloned()
            .collect()
    }
}

/// Every state is visited.
#[derive(Clone, Debug)]
pub struct StateCoverage {
    elements: BTreeSet<StateId>,
}

impl StateCoverage {
    pub fn new(fts: &FeaturedTransitionSystem) -> Self {
        Self {
            elements: fts.states().iter().map(|s| s.id().clone()).collect(),
        }
    }
}

impl CoverageCriteria for StateCoverage {
    type Element = StateId;

    fn name(&self) -> &'static str {
        "state"
    }

    fn elements(&self) -> &BTreeSet<StateId> {
        &self.elements
    }

    fn covered_by(&self, history: &StateHistory) -> BTreeSet<StateId> {
        history.get_path().into_iter().cloned().collect()
    }
}

/// Every transition fires.
#[derive(Clone, Debug)]
pub struct TransitionCoverage {
    elements: BTreeSet<TransitionId>,
}

impl TransitionCoverage {
    pub fn new(fts: &FeaturedTransitionSystem) -> Self {
        Self {
            elements: fts.transitions().map(|t| t.id).collect(),
        }
    }
}

impl CoverageCriteria for TransitionCoverage {
    type Element = TransitionId;

    fn name(&self) -> &'static str {
        "transition"
    }

    fn elements(&self) -> &BTreeSet<TransitionId> {
        &self.elements
    }

    fn covered_by(&self, history: &StateHistory) -> BTreeSet<TransitionId> {
        history.transition_ids().into_iter().collect()
    }
}

/// Every action label fires at least once.
#[derive(Clone, Debug)]
pub struct ActionCoverage {
    elements: BTreeSet<Action>,
}

impl ActionCoverage {
    pub fn new(fts: &FeaturedTransitionSystem) -> Self {
        Self {
            elements: fts.actions().into_iter().cloned().collect(),
        }
    }
}

impl CoverageCriteria for ActionCoverage {
    type Element = Action;

    fn name(&self) -> &'static str {
        "action"
    }

    fn elements(&self) -> &BTreeSet<Action> {
        &self.elements
    }

    fn covered_by(&self, history: &StateHistory) -> BTreeSet<Action> {
        history
            .transitions()
            .iter()
            .map(|t| t.action.clone())
            .collect()
    }
}

/// Every (incoming, outgoing) pair of transitions around a state fires
/// consecutively.
#[derive(Clone, Debug)]
pub struct TransitionPairCoverage {
    elements: BTreeSet<(TransitionId, TransitionId)>,
}

impl TransitionPairCoverage {
    pub fn new(fts: &FeaturedTransitionSystem) -> Self {
        let mut elements = BTreeSet::new();
        for state in fts.states() {
            for incoming in fts.incoming(state.id()) {
                for outgoing in state.transitions() {
                    elements.insert((incoming.id, outgoing.id));
                }
            }
        }
        Self { elements }
    }
}

impl CoverageCriteria for TransitionPairCoverage {
    type Element = (TransitionId, TransitionId);

    fn name(&self) -> &'static str {
        "transition-pair"
    }

    fn elements(&self) -> &BTreeSet<(TransitionId, TransitionId)> {
        &self.elements
    }

    fn covered_by(&self, history: &StateHistory) -> BTreeSet<(TransitionId, TransitionId)> {
        history
            .transition_ids()
            .windows(2)
            .map(|w| (w[0], w[1]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{ResolutionPolicy, Scenario};
    use crate::fexpr::Configuration;
    use crate::fts;
    use std::sync::Arc;

    fn robot() -> Arc<FeaturedTransitionSystem> {
        Arc::new(
            fts! {
                start: state0;
                state0 => [
                    map -> state1 if "mapping",
                    liDet -> state2 if "(!mapping && lidar)",
                    caDet -> state2 if "(!mapping && camera)",
                    move -> state3 if "!mapping",
                ];
                state5 => [charge -> state4 if "true"];
                state2 => [goAround -> state3 if "true"];
                state1 => [
                    liDet -> state2 if "(mapping && lidar)",
                    caDet -> state2 if "(mapping && camera)",
                    move -> state3 if "mapping",
                ];
                state4 => [];
                state3 => [clean -> state5 if "true"];
            }
            .unwrap(),
        )
    }

    fn mapping_run(fts: &Arc<FeaturedTransitionSystem>) -> StateHistory {
        let config = Configuration::new()
            .with("mapping", true)
            .with("lidar", false)
            .with("camera", false);
        Scenario::new("mapping", ["map", "move", "clean", "charge"])
            .replay(Arc::clone(fts), &config, ResolutionPolicy::Reject)
            .unwrap()
    }

    fn lidar_run(fts: &Arc<FeaturedTransitionSystem>) -> StateHistory {
        let config = Configuration::new()
            .with("mapping", false)
            .with("lidar", true)
            .with("camera", false);
        Scenario::new("lidar", ["liDet", "goAround", "clean", "charge"])
            .replay(Arc::clone(fts), &config, ResolutionPolicy::Reject)
            .unwrap()
    }

    #[test]
    fn state_coverage() {
        let fts = robot();
        let criterion = StateCoverage::new(&fts);
        let histories = vec![mapping_run(&fts)];

        assert!((criterion.coverage(&histories) - 5.0 / 6.0).abs() < 1e-9);
        assert_eq!(criterion.uncovered(&histories), vec![StateId::from("state2")]);

        let histories = vec![mapping_run(&fts), lidar_run(&fts)];
        assert_eq!(criterion.coverage(&histories), 1.0);
    }

    #[test]
    fn transition_and_action_coverage() {
        let fts = robot();
        let histories = vec![mapping_run(&fts)];

        let transitions = TransitionCoverage::new(&fts);
        assert_eq!(transitions.elements().len(), 10);
        assert!((transitions.coverage(&histories) - 0.4).abs() < 1e-9);

        let actions = ActionCoverage::new(&fts);
        assert_eq!(actions.elements().len(), 7);
        assert!((actions.coverage(&histories) - 4.0 / 7.0).abs() < 1e-9);
        let missing = actions.uncovered(&histories);
        assert_eq!(
            missing,
            vec![Action::from("caDet"), Action::from("goAround"), Action::from("liDet")]
        );
    }

    #[test]
    fn transition_pair_coverage() {
        let fts = robot();
        let criterion = TransitionPairCoverage::new(&fts);
        assert_eq!(criterion.elements().len(), 11);

        let histories = vec![mapping_run(&fts)];
        assert!((criterion.coverage(&histories) - 3.0 / 11.0).abs() < 1e-9);
        assert_eq!(criterion.name(), "transition-pair");
    }

    #[test]
    fn nothing_to_cover_is_zero() {
        let fts = fts! {
            start: a;
            a => [];
        }
        .unwrap();

        let criterion = TransitionCoverage::new(&fts);
        assert_eq!(criterion.coverage(&[]), 0.0);
        assert!(criterion.uncovered(&[]).is_empty());
    }
}
