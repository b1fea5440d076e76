//! Size and shape metrics of a transition system.

use crate::analysis::reachability::levels;
use crate::core::FeaturedTransitionSystem;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Statistics of a transition system.
///
/// BFS levels are shortest distances from the start state. A back-level
/// transition goes from a deeper level to a shallower one. Unreachable
/// states have no level and are counted separately.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelStatistics {
    pub states: usize,
    pub transitions: usize,
    pub actions: usize,
    pub features: usize,
    pub sinks: usize,
    pub average_degree: f64,
    pub bfs_height: usize,
    pub back_level_transitions: usize,
    pub unreachable_states: usize,
}

impl ModelStatistics {
    pub fn compute(fts: &FeaturedTransitionSystem) -> Self {
        let level: HashMap<&str, usize> = levels(fts)
            .into_iter()
            .map(|(id, l)| (id.as_str(), l))
            .collect();

        let back_level_transitions = fts
            .transitions()
            .filter(|t| {
                match (level.get(t.source.as_str()), level.get(t.target.as_str())) {
                    (Some(from), Some(to)) => from > to,
                    _ => false,
                }
            })
            .count();

        let states = fts.state_count();
        let transitions = fts.transition_count();

        Self {
            states,
            transitions,
            actions: fts.actions().len(),
            features: fts.features().len(),
            sinks: fts.sinks().count(),
            average_degree: if states == 0 {
                0.0
            } else {
                transitions as f64 / states as f64
            },
            bfs_height: level.values().copied().max().unwrap_or(0),
            back_level_transitions,
            unreachable_states: states - level.len(),
        }
    }
}

impl fmt::Display for ModelStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "NUMBER_OF_STATES = {}", self.states)?;
        writeln!(f, "NUMBER_OF_TRANSITIONS = {}", self.transitions)?;
        writeln!(f, "NUMBER_OF_ACTIONS = {}", self.actions)?;
        writeln!(f, "NUMBER_OF_FEATURES = {}", self.features)?;
        writeln!(f, "NUMBER_OF_SINKS = {}", self.sinks)?;
        writeln!(f, "AVG_DEGREE = {:.2}", self.average_degree)?;
        writeln!(f, "BFS_HEIGHT = {}", self.bfs_height)?;
        writeln!(f, "NB_BACK_LEVEL_TRANSITIONS = {}", self.back_level_transitions)?;
        write!(f, "NUMBER_OF_UNREACHABLE_STATES = {}", self.unreachable_states)
    }
}
