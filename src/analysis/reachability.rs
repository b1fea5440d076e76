//! Breadth-first reachability over the transition graph.

use crate::core::{FeaturedTransitionSystem, StateId};
use crate::fexpr::{Configuration, FExprError};
use std::collections::{HashMap, HashSet, VecDeque};

/// States reachable from the start state, ignoring guards, in BFS order.
pub fn reachable(fts: &FeaturedTransitionSystem) -> Vec<&StateId> {
    levels(fts).into_iter().map(|(id, _)| id).collect()
}

/// States reachable from the start state in the product of one
/// configuration, in BFS order.
///
/// Fails if a guard on the way mentions a signal `config` leaves unassigned.
pub fn reachable_under<'a>(
    fts: &'a FeaturedTransitionSystem,
    config: &Configuration,
) -> Result<Vec<&'a StateId>, FExprError> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut order = Vec::new();
    let mut queue = VecDeque::new();

    seen.insert(fts.start().as_str());
    queue.push_back(fts.start());

    while let Some(id) = queue.pop_front() {
        order.push(id);
        for t in fts.outgoing(id) {
            if t.is_enabled(config)? && seen.insert(t.target.as_str()) {
                queue.push_back(&t.target);
            }
        }
    }
    Ok(order)
}

/// States not reachable from the start state, in declaration order.
pub fn unreachable(fts: &FeaturedTransitionSystem) -> Vec<&StateId> {
    let reached: HashSet<&str> = reachable(fts).into_iter().map(|id| id.as_str()).collect();
    fts.states()
        .iter()
        .map(|s| s.id())
        .filter(|id| !reached.contains(id.as_str()))
        .collect()
}

/// BFS level of every reachable state, in discovery order. The start state
/// is at level 0.
pub fn levels(fts: &FeaturedTransitionSystem) -> Vec<(&StateId, usize)> {
    let mut level: HashMap<&str, usize> = HashMap::new();
    let mut order = Vec::new();
    let mut queue = VecDeque::new();

    level.insert(fts.start().as_str(), 0);
    queue.push_back((fts.start(), 0));

    while let Some((id, depth)) = queue.pop_front() {
        order.push((id, depth));
        for t in fts.outgoing(id) {
            if !level.contains_key(t.target.as_str()) {
                level.insert(t.target.as_str(), depth + 1);
                queue.push_back((&t.target, depth + 1));
            }
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fts;

    fn robot() -> FeaturedTransitionSystem {
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
        .unwrap()
    }

    fn names(ids: Vec<&StateId>) -> Vec<&str> {
        ids.into_iter().map(|id| id.as_str()).collect()
    }

    #[test]
    fn every_robot_state_is_reachable() {
        let system = robot();
        assert_eq!(
            names(reachable(&system)),
            vec!["state0", "state1", "state2", "state3", "state5", "state4"]
        );
        assert!(unreachable(&system).is_empty());
    }

    #[test]
    fn product_reachability_follows_guards() {
        let system = robot();
        let config = Configuration::new()
            .with("mapping", true)
            .with("lidar", false)
            .with("camera", false);

        let reached = names(reachable_under(&system, &config).unwrap());
        assert_eq!(reached, vec!["state0", "state1", "state3", "state5", "state4"]);
    }

    #[test]
    fn product_reachability_needs_assignments() {
        let system = robot();
        let config = Configuration::new().with("mapping", true);
        assert!(matches!(
            reachable_under(&system, &config),
            Err(FExprError::UnassignedFeature(_))
        ));
    }

    #[test]
    fn levels_are_shortest_distances() {
        let system = robot();
        let levels: HashMap<&str, usize> = levels(&system)
            .into_iter()
            .map(|(id, l)| (id.as_str(), l))
            .collect();
        assert_eq!(levels["state0"], 0);
        assert_eq!(levels["state3"], 1);
        assert_eq!(levels["state5"], 2);
        assert_eq!(levels["state4"], 3);
    }

    #[test]
    fn isolated_states_are_unreachable() {
        let system = fts! {
            start: a;
            a => [go -> b];
            b => [];
            island => [go -> a];
        }
        .unwrap();
        assert_eq!(names(unreachable(&system)), vec!["island"]);
    }
}
