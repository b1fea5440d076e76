//! Transition selection: which enabled transition fires.

use crate::core::{FeaturedTransitionSystem, Transition, TransitionId};
use crate::fexpr::{FExprError, SignalSource};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What to do when several transitions are enabled at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionPolicy {
    /// Several enabled transitions is an error
    #[default]
    Reject,

    /// Fire the first enabled transition in declaration order
    FirstMatch,
}

impl fmt::Display for ResolutionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionPolicy::Reject => f.write_str("reject"),
            ResolutionPolicy::FirstMatch => f.write_str("first-match"),
        }
    }
}

impl FromStr for ResolutionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(ResolutionPolicy::Reject),
            "first-match" | "first_match" | "first" => Ok(ResolutionPolicy::FirstMatch),
            other => Err(format!(
                "unknown resolution policy '{other}', expected 'reject' or 'first-match'"
            )),
        }
    }
}

/// Errors that can occur while executing a transition system
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExecutionError {
    #[error("No transition enabled in state '{state}'")]
    Blocked { state: String },

    #[error("Several transitions enabled in state '{state}': {}", list(.candidates))]
    Ambiguous {
        state: String,
        candidates: Vec<TransitionId>,
    },

    #[error("Signal '{0}' has no value")]
    Unassigned(String),

    #[error("State '{0}' is not part of the system")]
    UnknownState(String),

    #[error("Action '{action}' is not enabled in state '{state}'")]
    ActionNotEnabled { state: String, action: String },

    #[error("Guard evaluation failed: {0}")]
    Evaluation(FExprError),
}

impl From<FExprError> for ExecutionError {
    fn from(err: FExprError) -> Self {
        match err {
            FExprError::UnassignedFeature(name) => ExecutionError::Unassigned(name),
            other => ExecutionError::Evaluation(other),
        }
    }
}

fn list(ids: &[TransitionId]) -> String {
    ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// Select the transition to fire from `state` (pure).
///
/// Only transitions accepted by `accept` are considered.
pub fn select<'a, S, F>(
    fts: &'a FeaturedTransitionSystem,
    state: &str,
    signals: &S,
    policy: ResolutionPolicy,
    accept: F,
) -> Result<&'a Transition, ExecutionError>
where
    S: SignalSource + ?Sized,
    F: Fn(&Transition) -> bool,
{
    let source = fts
        .state(state)
        .ok_or_else(|| ExecutionError::UnknownState(state.to_string()))?;

    let mut enabled = Vec::new();
    for t in source.transitions().iter().filter(|t| accept(*t)) {
        if t.is_enabled(signals)? {
            enabled.push(t);
        }
    }

    match (enabled.as_slice(), policy) {
        ([], _) => Err(ExecutionError::Blocked {
            state: state.to_string(),
        }),
        ([only], _) => Ok(*only),
        ([first, ..], ResolutionPolicy::FirstMatch) => Ok(*first),
        (candidates, ResolutionPolicy::Reject) => Err(ExecutionError::Ambiguous {
            state: state.to_string(),
            candidates: candidates.iter().map(|t| t.id).collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fexpr::Configuration;
    use crate::fts;

    fn system() -> FeaturedTransitionSystem {
        fts! {
            start: state0;
            state0 => [
                map -> state1 if "mapping",
                liDet -> state1 if "(!mapping && lidar)",
                move -> state1 if "!mapping",
            ];
            state1 => [];
        }
        .unwrap()
    }

    #[test]
    fn single_enabled_transition_is_selected() {
        let fts = system();
        let config = Configuration::new().with("mapping", true).with("lidar", true);
        let t = select(&fts, "state0", &config, ResolutionPolicy::Reject, |_| true).unwrap();
        assert_eq!(t.action, "map");
    }

    #[test]
    fn reject_reports_every_candidate() {
        let fts = system();
        let config = Configuration::new().with("mapping", false).with("lidar", true);
        let err = select(&fts, "state0", &config, ResolutionPolicy::Reject, |_| true).unwrap_err();
        assert_eq!(
            err,
            ExecutionError::Ambiguous {
                state: "state0".to_string(),
                candidates: vec![TransitionId::new(0, 1), TransitionId::new(0, 2)],
            }
        );
        assert_eq!(
            err.to_string(),
            "Several transitions enabled in state 'state0': t0.1, t0.2"
        );
    }

    #[test]
    fn first_match_uses_declaration_order() {
        let fts = system();
        let config = Configuration::new().with("mapping", false).with("lidar", true);
        let t = select(&fts, "state0", &config, ResolutionPolicy::FirstMatch, |_| true).unwrap();
        assert_eq!(t.action, "liDet");
    }

    #[test]
    fn filter_restricts_candidates() {
        let fts = system();
        let config = Configuration::new().with("mapping", false).with("lidar", true);
        let t = select(&fts, "state0", &config, ResolutionPolicy::Reject, |t| {
            t.action == "move"
        })
        .unwrap();
        assert_eq!(t.id, TransitionId::new(0, 2));
    }

    #[test]
    fn sinks_and_unknown_states() {
        let fts = system();
        let config = Configuration::new();
        assert_eq!(
            select(&fts, "state1", &config, ResolutionPolicy::Reject, |_| true).unwrap_err(),
            ExecutionError::Blocked {
                state: "state1".to_string()
            }
        );
        assert_eq!(
            select(&fts, "nowhere", &config, ResolutionPolicy::Reject, |_| true).unwrap_err(),
            ExecutionError::UnknownState("nowhere".to_string())
        );
    }

    #[test]
    fn unassigned_signal_is_an_error() {
        let fts = system();
        let config = Configuration::new().with("mapping", false);
        assert_eq!(
            select(&fts, "state0", &config, ResolutionPolicy::Reject, |_| true).unwrap_err(),
            ExecutionError::Unassigned("lidar".to_string())
        );
    }

    #[test]
    fn policy_parses_from_text() {
        assert_eq!(
            "first-match".parse::<ResolutionPolicy>(),
            Ok(ResolutionPolicy::FirstMatch)
        );
        assert_eq!("Reject".parse::<ResolutionPolicy>(), Ok(ResolutionPolicy::Reject));
        assert!("random".parse::<ResolutionPolicy>().is_err());
        assert_eq!(ResolutionPolicy::FirstMatch.to_string(), "first-match");
    }
}
