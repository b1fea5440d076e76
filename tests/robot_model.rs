//! End-to-end tests over the cleaning robot model in `data/robot.fts`.

use ftsmind::analysis::{analyze, reachable_under, AnalysisOptions, ModelStatistics};
use ftsmind::checkpoint::Checkpoint;
use ftsmind::core::{FeaturedTransitionSystem, StateHistory};
use ftsmind::coverage::{
    ActionCoverage, CoverageCriteria, StateCoverage, TransitionCoverage, TransitionPairCoverage,
};
use ftsmind::effects::{ExecutionError, Executor, ResolutionPolicy, Scenario};
use ftsmind::fexpr::Configuration;
use ftsmind::io::{self, dot, xml};
use ftsmind::validation::{RulesBuilder, ValidationRules, Violation};
use std::path::PathBuf;
use std::sync::Arc;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/robot.fts")
}

fn fixture_text() -> String {
    std::fs::read_to_string(fixture_path()).unwrap()
}

fn robot() -> FeaturedTransitionSystem {
    xml::load_file(fixture_path(), &ValidationRules::default()).unwrap()
}

fn signals(mapping: bool, lidar: bool, camera: bool) -> Configuration {
    Configuration::new()
        .with("mapping", mapping)
        .with("lidar", lidar)
        .with("camera", camera)
}

#[test]
fn fixture_loads_in_declaration_order() {
    let fts = robot();
    let ids: Vec<&str> = fts.states().iter().map(|s| s.id().as_str()).collect();

    assert_eq!(fts.start(), "state0");
    assert_eq!(ids, vec!["state0", "state5", "state2", "state1", "state4", "state3"]);
    assert_eq!(fts.outgoing("state0").len(), 4);
    assert_eq!(fts.outgoing("state4").len(), 0);
}

#[test]
fn canonical_printer_reproduces_fixture() {
    assert_eq!(xml::to_string(&robot()), fixture_text());
}

#[test]
fn fixture_respects_signal_vocabulary() {
    let rules = RulesBuilder::new().signals(["mapping", "lidar", "camera"]).build();
    assert!(xml::load_file(fixture_path(), &rules).is_ok());

    let narrow = RulesBuilder::new().signals(["mapping"]).build();
    let doc = xml::parse_document(&fixture_text()).unwrap();
    let violations = narrow.violations(&doc);
    assert_eq!(violations.len(), 4);
    assert!(violations
        .iter()
        .all(|v| matches!(v, Violation::UnknownSignal { signal, .. } if signal == "lidar" || signal == "camera")));
}

#[test]
fn statistics_match_the_model() {
    let stats = ModelStatistics::compute(&robot());

    assert_eq!(stats.states, 6);
    assert_eq!(stats.transitions, 10);
    assert_eq!(stats.actions, 7);
    assert_eq!(stats.features, 3);
    assert_eq!(stats.sinks, 1);
    assert_eq!(stats.bfs_height, 3);
    assert_eq!(stats.back_level_transitions, 0);
    assert_eq!(stats.unreachable_states, 0);

    let text = stats.to_string();
    assert!(text.contains("NUMBER_OF_STATES = 6"));
    assert!(text.contains("BFS_HEIGHT = 3"));
}

#[test]
fn determinism_analysis_finds_overlaps() {
    let report = analyze(&robot(), &AnalysisOptions::default()).unwrap();

    assert_eq!(report.ambiguities_of("state0").count(), 3);
    assert_eq!(report.ambiguities_of("state1").count(), 3);
    assert_eq!(report.blocking_of("state1").map(|b| b.occurrences), Some(4));
    assert!(report.blocking_of("state0").is_none());
    assert!(report.dead.is_empty());
    assert_eq!(report.configurations_checked, 19);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["ambiguities"].as_array().map(Vec::len), Some(6));
}

#[test]
fn reachability_depends_on_configuration() {
    let fts = robot();
    let reached: Vec<&str> = reachable_under(&fts, &signals(true, false, false))
        .unwrap()
        .into_iter()
        .map(|s| s.as_str())
        .collect();
    assert_eq!(reached, vec!["state0", "state1", "state3", "state5", "state4"]);
}

#[test]
fn dot_export_imports_back() {
    let fts = robot();
    let text = dot::to_dot(&fts);

    assert!(text.contains("__start -> state0;"));
    assert!(text.contains(r#"state0 -> state2 [label="liDet/(!mapping && lidar)"];"#));
    assert!(text.contains(r#"state3 -> state5 [label="clean"];"#));
    assert_eq!(dot::from_dot(&text, &ValidationRules::default()).unwrap(), fts);
}

#[test]
fn files_round_trip_through_both_formats() {
    let fts = robot();
    let dir = tempfile::tempdir().unwrap();

    let xml_path = dir.path().join("robot.xml");
    io::save_path(&fts, &xml_path).unwrap();
    assert_eq!(std::fs::read_to_string(&xml_path).unwrap(), fixture_text());

    let dot_path = dir.path().join("robot.dot");
    io::save_path(&fts, &dot_path).unwrap();
    assert_eq!(io::load_path(&dot_path, &ValidationRules::default()).unwrap(), fts);
}

#[tokio::test]
async fn mapping_run_and_its_coverage() {
    let fts = Arc::new(robot());
    let mut executor = Executor::new(Arc::clone(&fts));

    let fired = executor.run(&signals(true, false, false), 100).await.unwrap();
    assert_eq!(fired, 4);
    assert_eq!(executor.history().actions(), vec!["map", "move", "clean", "charge"]);

    let runs = [executor.history().clone()];
    assert!((StateCoverage::new(&fts).coverage(&runs) - 5.0 / 6.0).abs() < 1e-9);
    assert!((TransitionCoverage::new(&fts).coverage(&runs) - 0.4).abs() < 1e-9);
    assert!((ActionCoverage::new(&fts).coverage(&runs) - 4.0 / 7.0).abs() < 1e-9);

    let pairs = TransitionPairCoverage::new(&fts);
    assert_eq!(pairs.elements().len(), 11);
    assert!((pairs.coverage(&runs) - 3.0 / 11.0).abs() < 1e-9);

    let missed: Vec<String> = StateCoverage::new(&fts)
        .uncovered(&runs)
        .into_iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(missed, vec!["state2"]);
}

#[tokio::test]
async fn sensor_run_is_ambiguous_unless_first_match() {
    let fts = Arc::new(robot());
    let env = signals(false, true, false);

    let mut strict = Executor::new(Arc::clone(&fts));
    let err = strict.run(&env, 100).await.unwrap_err();
    assert!(matches!(err, ExecutionError::Ambiguous { ref candidates, .. } if candidates.len() == 2));

    let mut lenient = Executor::new(fts).with_policy(ResolutionPolicy::FirstMatch);
    lenient.run(&env, 100).await.unwrap();
    assert_eq!(lenient.history().actions(), vec!["liDet", "goAround", "clean", "charge"]);
}

#[tokio::test]
async fn checkpointed_run_resumes_where_it_stopped() {
    let fts = Arc::new(robot());
    let env = signals(true, false, false);

    let mut first = Executor::new(Arc::clone(&fts));
    assert_eq!(first.run(&env, 2).await.unwrap(), 2);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("robot.checkpoint.json");
    first.checkpoint().save(&path).unwrap();

    let restored = Checkpoint::load(&path).unwrap();
    let mut second = Executor::resume(Arc::clone(&fts), restored).unwrap();
    assert_eq!(second.current_state(), "state3");

    assert_eq!(second.run(&env, 100).await.unwrap(), 2);
    assert_eq!(second.history().actions(), vec!["map", "move", "clean", "charge"]);

    let bytes = second.checkpoint().to_binary().unwrap();
    let again = Checkpoint::from_binary(&bytes).unwrap();
    assert_eq!(again.current, "state4");
    assert_eq!(again.metadata.steps, 4);
}

#[test]
fn scenarios_replay_and_record() {
    let fts = Arc::new(robot());
    let scenario = Scenario::new("mapping", ["map", "move", "clean", "charge"]);

    let history: StateHistory = scenario
        .replay(Arc::clone(&fts), &signals(true, false, false), ResolutionPolicy::Reject)
        .unwrap();
    assert_eq!(Scenario::from_history("mapping", &history), scenario);
    assert_eq!(scenario.to_string(), "mapping: map;move;clean;charge");

    let err = scenario
        .replay(fts, &signals(false, false, false), ResolutionPolicy::Reject)
        .unwrap_err();
    assert!(matches!(err, ExecutionError::ActionNotEnabled { ref action, .. } if action == "map"));
}
