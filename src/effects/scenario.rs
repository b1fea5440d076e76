//! Action-sequence replay.

use crate::core::{Action, FeaturedTransitionSystem, StateHistory};
use crate::effects::executor::Executor;
use crate::effects::selection::{ExecutionError, ResolutionPolicy};
use crate::fexpr::SignalSource;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A named sequence of actions to replay from the start state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub actions: Vec<Action>,
}

impl Scenario {
    pub fn new<I, A>(id: impl Into<String>, actions: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Action>,
    {
        Self {
            id: id.into(),
            actions: actions.into_iter().map(Into::into).collect(),
        }
    }

    /// The action sequence of a recorded execution.
    pub fn from_history(id: impl Into<String>, history: &StateHistory) -> Self {
        Self::new(id, history.transitions().iter().map(|t| t.action.clone()))
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Replay the actions under `signals` and return the execution.
    ///
    /// Fails on the first action that is not enabled, or that is enabled
    /// through several transitions under [`ResolutionPolicy::Reject`].
    pub fn replay<S: SignalSource + ?Sized>(
        &self,
        fts: Arc<FeaturedTransitionSystem>,
        signals: &S,
        policy: ResolutionPolicy,
    ) -> Result<StateHistory, ExecutionError> {
        let mut executor = Executor::new(fts).with_policy(policy);
        for action in &self.actions {
            executor.fire(action, signals)?;
        }
        tracing::debug!(scenario = %self.id, steps = self.actions.len(), "replayed scenario");
        Ok(executor.history().clone())
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let actions: Vec<&str> = self.actions.iter().map(|a| a.as_str()).collect();
        write!(f, "{}: {}", self.id, actions.join(";"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fexpr::Configuration;
    use crate::fts;

    fn system() -> Arc<FeaturedTransitionSystem> {
        Arc::new(
            fts! {
                start: state0;
                state0 => [
                    map -> state1 if "mapping",
                    move -> state3 if "!mapping",
                ];
                state1 => [move -> state3 if "mapping"];
                state3 => [clean -> state0];
            }
            .unwrap(),
        )
    }

    #[test]
    fn replay_records_every_step() {
        let scenario = Scenario::new("tc1", ["map", "move", "clean", "map"]);
        let config = Configuration::new().with("mapping", true);

        let history = scenario
            .replay(system(), &config, ResolutionPolicy::Reject)
            .unwrap();

        assert_eq!(history.actions(), vec!["map", "move", "clean", "map"]);
        assert_eq!(history.last_state().map(|s| s.as_str()), Some("state1"));
        assert_eq!(Scenario::from_history("tc1", &history), scenario);
    }

    #[test]
    fn disabled_action_stops_replay() {
        let scenario = Scenario::new("tc2", ["map"]);
        let config = Configuration::new().with("mapping", false);

        let err = scenario
            .replay(system(), &config, ResolutionPolicy::Reject)
            .unwrap_err();
        assert_eq!(
            err,
            ExecutionError::ActionNotEnabled {
                state: "state0".to_string(),
                action: "map".to_string(),
            }
        );
    }

    #[test]
    fn empty_scenario_is_empty_history() {
        let scenario = Scenario::new("empty", Vec::<Action>::new());
        assert!(scenario.is_empty());
        let history = scenario
            .replay(system(), &Configuration::new(), ResolutionPolicy::Reject)
            .unwrap();
        assert!(history.is_empty());
    }

    #[test]
    fn display_joins_actions() {
        let scenario = Scenario::new("tc3", ["move", "clean"]);
        assert_eq!(scenario.to_string(), "tc3: move;clean");
        assert_eq!(scenario.len(), 2);
    }
}
