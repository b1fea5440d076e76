//! Guard overlap and coverage analysis.
//!
//! For every non-sink state, all configurations over the signals its guards
//! mention are enumerated. A configuration under which several transitions
//! are enabled is an ambiguity; one under which none is enabled blocks the
//! state. Ambiguities are reported, never resolved.

use crate::analysis::error::AnalysisError;
use crate::core::{FeaturedTransitionSystem, StateId, TransitionId};
use crate::fexpr::{Configuration, ConfigurationSpace, FExpr, FExprError, DEFAULT_FEATURE_LIMIT};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Options controlling which configurations are considered.
#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisOptions {
    /// Maximum number of features enumerated per state.
    pub limit: usize,
    /// Only configurations satisfying this formula are considered.
    pub constraint: FExpr,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_FEATURE_LIMIT,
            constraint: FExpr::true_value(),
        }
    }
}

impl AnalysisOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn constrained_by(mut self, constraint: FExpr) -> Self {
        self.constraint = constraint;
        self
    }
}

/// Several transitions of one state enabled at once.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ambiguity {
    pub state: StateId,
    pub enabled: Vec<TransitionId>,
    /// First configuration (in enumeration order) producing this set.
    pub witness: Configuration,
    /// Number of configurations producing this set.
    pub occurrences: usize,
}

/// No transition of a non-sink state enabled.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Blocking {
    pub state: StateId,
    pub witness: Configuration,
    pub occurrences: usize,
}

/// A transition whose guard holds under no considered configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeadTransition {
    pub transition: TransitionId,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DeterminismReport {
    pub ambiguities: Vec<Ambiguity>,
    pub blocking: Vec<Blocking>,
    pub dead: Vec<DeadTransition>,
    /// Total number of (state, configuration) pairs evaluated.
    pub configurations_checked: usize,
}

impl DeterminismReport {
    /// True when no configuration enables two transitions of one state.
    pub fn is_deterministic(&self) -> bool {
        self.ambiguities.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        self.ambiguities.is_empty() && self.blocking.is_empty() && self.dead.is_empty()
    }

    pub fn ambiguities_of<'a>(&'a self, state: &'a str) -> impl Iterator<Item = &'a Ambiguity> {
        self.ambiguities.iter().filter(move |a| a.state.as_str() == state)
    }

    pub fn blocking_of(&self, state: &str) -> Option<&Blocking> {
        self.blocking.iter().find(|b| b.state.as_str() == state)
    }
}

impl fmt::Display for DeterminismReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for a in &self.ambiguities {
            let ids: Vec<String> = a.enabled.iter().map(ToString::to_string).collect();
            writeln!(
                f,
                "ambiguous {}: [{}] enabled under {} ({} configuration(s))",
                a.state,
                ids.join(", "),
                a.witness,
                a.occurrences
            )?;
        }
        for b in &self.blocking {
            writeln!(
                f,
                "blocking {}: nothing enabled under {} ({} configuration(s))",
                b.state, b.witness, b.occurrences
            )?;
        }
        for d in &self.dead {
            writeln!(f, "dead {}", d.transition)?;
        }
        write!(
            f,
            "{} ambiguities, {} blocking states, {} dead transitions ({} configurations checked)",
            self.ambiguities.len(),
            self.blocking.len(),
            self.dead.len(),
            self.configurations_checked
        )
    }
}

/// Analyse every non-sink state of `fts`.
///
/// # Example
///
/// ```rust
/// use ftsmind::fts;
/// use ftsmind::analysis::determinism::{analyze, AnalysisOptions};
///
/// let system = fts! {
///     start: idle;
///     idle => [scan -> idle if "lidar", look -> idle if "camera"];
/// }
/// .unwrap();
///
/// let report = analyze(&system, &AnalysisOptions::default()).unwrap();
/// assert_eq!(report.ambiguities.len(), 1);
/// assert_eq!(report.blocking.len(), 1);
/// ```
pub fn analyze(
    fts: &FeaturedTransitionSystem,
    options: &AnalysisOptions,
) -> Result<DeterminismReport, AnalysisError> {
    let mut report = DeterminismReport::default();

    for state in fts.states().iter().filter(|s| !s.is_sink()) {
        let space = ConfigurationSpace::new(fts.state_features(state.id()))
            .constrained_by(options.constraint.clone())
            .with_limit(options.limit);

        let configs = space.iter().map_err(|e| match e {
            FExprError::TooManyFeatures { count, limit } => AnalysisError::TooManyFeatures {
                state: state.id().to_string(),
                count,
                limit,
            },
            other => AnalysisError::Evaluation(other),
        })?;

        let transitions = state.transitions();
        let mut ever_enabled = vec![false; transitions.len()];
        let mut groups: Vec<(Vec<TransitionId>, Configuration, usize)> = Vec::new();

        for config in configs {
            report.configurations_checked += 1;
            let mut enabled = Vec::new();
            for (i, t) in transitions.iter().enumerate() {
                if t.is_enabled(&config)? {
                    ever_enabled[i] = true;
                    enabled.push(t.id);
                }
            }
            match groups.iter_mut().find(|(set, _, _)| *set == enabled) {
                Some((_, _, occurrences)) => *occurrences += 1,
                None => groups.push((enabled, config, 1)),
            }
        }

        for (enabled, witness, occurrences) in groups {
            match enabled.len() {
                0 => report.blocking.push(Blocking {
                    state: state.id().clone(),
                    witness,
                    occurrences,
                }),
                1 => {}
                _ => report.ambiguities.push(Ambiguity {
                    state: state.id().clone(),
                    enabled,
                    witness,
                    occurrences,
                }),
            }
        }

        report.dead.extend(
            transitions
                .iter()
                .zip(&ever_enabled)
                .filter(|(_, enabled)| !**enabled)
                .map(|(t, _)| DeadTransition { transition: t.id }),
        );

        tracing::debug!(state = %state.id(), "analysed guards");
    }

    tracing::info!(
        ambiguities = report.ambiguities.len(),
        blocking = report.blocking.len(),
        dead = report.dead.len(),
        "determinism analysis complete"
    );
    Ok(report)
}
