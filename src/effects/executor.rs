//! Executor that walks a featured transition system.

use crate::core::{Action, FeaturedTransitionSystem, StateHistory, StateId, StateTransition, TransitionId};
use crate::effects::selection::{select, ExecutionError, ResolutionPolicy};
use crate::fexpr::SignalSource;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use stillwater::effect::Effect;
use stillwater::prelude::*;

/// Result of executing a single step
#[derive(Clone, Debug, PartialEq)]
pub enum StepResult {
    /// A transition fired
    Fired {
        transition: TransitionId,
        from: StateId,
        action: Action,
        to: StateId,
    },

    /// The current state is a sink
    Halted { state: StateId },
}

/// Executes a transition system one step at a time.
///
/// Signals are read from the effect environment when a step runs, so the
/// same executor can be driven by a fixed configuration or by live
/// sensor readings.
///
/// # Example
///
/// ```rust
/// use ftsmind::effects::{Executor, StepResult};
/// use ftsmind::fexpr::Configuration;
/// use ftsmind::fts;
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() {
/// let system = fts! {
///     start: state3;
///     state3 => [clean -> state5];
///     state5 => [charge -> state4];
///     state4 => [];
/// }
/// .unwrap();
///
/// let mut executor = Executor::new(Arc::new(system));
/// let fired = executor.run(&Configuration::new(), 10).await.unwrap();
///
/// assert_eq!(fired, 2);
/// assert!(executor.is_sink());
/// assert_eq!(executor.history().actions(), vec!["clean", "charge"]);
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Executor {
    pub(crate) fts: Arc<FeaturedTransitionSystem>,
    pub(crate) current: StateId,
    pub(crate) history: StateHistory,
    pub(crate) policy: ResolutionPolicy,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) fired: HashMap<String, usize>,
}

impl Executor {
    /// Create an executor positioned on the start state
    pub fn new(fts: Arc<FeaturedTransitionSystem>) -> Self {
        let current = fts.start().clone();
        Self {
            fts,
            current,
            history: StateHistory::new(),
            policy: ResolutionPolicy::default(),
            created_at: Utc::now(),
            fired: HashMap::new(),
        }
    }

    pub fn with_policy(mut self, policy: ResolutionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn system(&self) -> &Arc<FeaturedTransitionSystem> {
        &self.fts
    }

    /// Get current state (pure)
    pub fn current_state(&self) -> &StateId {
        &self.current
    }

    /// Check if the current state has no outgoing transitions (pure)
    pub fn is_sink(&self) -> bool {
        self.fts.outgoing(&self.current).is_empty()
    }

    /// Get execution history (pure)
    pub fn history(&self) -> &StateHistory {
        &self.history
    }

    pub fn policy(&self) -> ResolutionPolicy {
        self.policy
    }

    /// Number of times each action fired.
    pub fn fired_counts(&self) -> &HashMap<String, usize> {
        &self.fired
    }

    /// Execute one step.
    /// Returns impl Effect for zero-cost composition.
    /// After running the effect, call apply_result() to update the executor.
    pub fn step<Env>(
        &self,
    ) -> impl Effect<Output = StepResult, Error = ExecutionError, Env = Env> + '_
    where
        Env: SignalSource + Clone + Send + Sync + 'static,
    {
        let state = self.current.clone();

        if self.is_sink() {
            return pure(StepResult::Halted { state }).boxed();
        }

        let fts = Arc::clone(&self.fts);
        let policy = self.policy;

        from_fn(move |env: &Env| {
            let t = select(&fts, &state, env, policy, |_| true)?;
            Ok(StepResult::Fired {
                transition: t.id,
                from: state.clone(),
                action: t.action.clone(),
                to: t.target.clone(),
            })
        })
        .boxed()
    }

    /// Apply the result from step() to update the executor.
    /// Call this after running the effect.
    pub fn apply_result(&mut self, result: StepResult) {
        match result {
            StepResult::Fired {
                transition,
                from,
                action,
                to,
            } => {
                tracing::debug!(%from, %action, %to, "fired transition");
                *self.fired.entry(action.to_string()).or_insert(0) += 1;
                let record = StateTransition {
                    from,
                    action,
                    to: to.clone(),
                    transition,
                    timestamp: Utc::now(),
                    step: self.history.len() + 1,
                };
                self.history = self.history.record(record);
                self.current = to;
            }
            StepResult::Halted { state } => {
                tracing::debug!(%state, "halted in sink state");
            }
        }
    }

    /// Fire the transition labelled `action` from the current state (pure
    /// selection, immediate update).
    pub fn fire<S: SignalSource + ?Sized>(
        &mut self,
        action: &str,
        signals: &S,
    ) -> Result<StepResult, ExecutionError> {
        let t = select(&self.fts, &self.current, signals, self.policy, |t| {
            t.action.as_str() == action
        })
        .map_err(|e| match e {
            ExecutionError::Blocked { state } => ExecutionError::ActionNotEnabled {
                state,
                action: action.to_string(),
            },
            other => other,
        })?;

        let result = StepResult::Fired {
            transition: t.id,
            from: self.current.clone(),
            action: t.action.clone(),
            to: t.target.clone(),
        };
        self.apply_result(result.clone());
        Ok(result)
    }

    /// Run until a sink is reached or `max_steps` transitions have fired.
    /// Returns the number of transitions fired.
    pub async fn run<Env>(&mut self, env: &Env, max_steps: usize) -> Result<usize, ExecutionError>
    where
        Env: SignalSource + Clone + Send + Sync + 'static,
    {
        let mut fired = 0;
        while fired < max_steps {
            let result = self.step::<Env>().run(env).await?;
            let halted = matches!(result, StepResult::Halted { .. });
            self.apply_result(result);
            if halted {
                break;
            }
            fired += 1;
        }
        tracing::info!(fired, state = %self.current, "run finished");
        Ok(fired)
    }

    /// Return to the start state with an empty history.
    pub fn reset(&mut self) {
        self.current = self.fts.start().clone();
        self.history = StateHistory::new();
        self.fired.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fexpr::Configuration;
    use crate::fts;
    use std::collections::BTreeMap;

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

    fn config(mapping: bool, lidar: bool, camera: bool) -> Configuration {
        Configuration::new()
            .with("mapping", mapping)
            .with("lidar", lidar)
            .with("camera", camera)
    }

    #[tokio::test]
    async fn single_step_fires_enabled_transition() {
        let mut executor = Executor::new(robot());
        let env = config(true, false, false);

        let result = executor.step::<Configuration>().run(&env).await.unwrap();
        assert_eq!(
            result,
            StepResult::Fired {
                transition: TransitionId::new(0, 0),
                from: StateId::from("state0"),
                action: Action::from("map"),
                to: StateId::from("state1"),
            }
        );

        executor.apply_result(result);
        assert_eq!(executor.current_state(), "state1");
        assert_eq!(executor.history().len(), 1);
        assert_eq!(executor.history().transitions()[0].step, 1);
    }

    #[tokio::test]
    async fn ambiguity_is_rejected_by_default() {
        let executor = Executor::new(robot());
        let env = config(false, true, false);

        let err = executor.step::<Configuration>().run(&env).await.unwrap_err();
        assert!(matches!(err, ExecutionError::Ambiguous { ref candidates, .. } if candidates.len() == 2));
        assert_eq!(executor.current_state(), "state0");
    }

    #[tokio::test]
    async fn first_match_resolves_ambiguity() {
        let mut executor = Executor::new(robot()).with_policy(ResolutionPolicy::FirstMatch);
        let env = config(false, true, true);

        let fired = executor.run(&env, 100).await.unwrap();
        assert_eq!(fired, 4);
        assert_eq!(executor.history().actions(), vec!["liDet", "goAround", "clean", "charge"]);
        assert!(executor.is_sink());
    }

    #[tokio::test]
    async fn mapping_run_reaches_the_charger() {
        let mut executor = Executor::new(robot());
        let env = config(true, false, false);

        let fired = executor.run(&env, 100).await.unwrap();
        assert_eq!(fired, 4);

        let path: Vec<&str> = executor.history().get_path().into_iter().map(|s| s.as_str()).collect();
        assert_eq!(path, vec!["state0", "state1", "state3", "state5", "state4"]);
        assert_eq!(executor.fired_counts().get("clean"), Some(&1));
    }

    #[tokio::test]
    async fn run_respects_step_budget() {
        let mut executor = Executor::new(robot());
        let env = config(true, false, false);

        let fired = executor.run(&env, 2).await.unwrap();
        assert_eq!(fired, 2);
        assert_eq!(executor.current_state(), "state3");
    }

    #[tokio::test]
    async fn sink_step_halts() {
        let mut executor = Executor::new(robot());
        executor.run(&config(true, false, false), 100).await.unwrap();

        let result = executor.step::<Configuration>().run(&Configuration::new()).await.unwrap();
        assert_eq!(
            result,
            StepResult::Halted {
                state: StateId::from("state4")
            }
        );
    }

    #[tokio::test]
    async fn signals_come_from_any_source() {
        let mut executor = Executor::new(robot());
        let mut env: BTreeMap<String, bool> = BTreeMap::new();
        env.insert("mapping".to_string(), false);
        env.insert("lidar".to_string(), false);
        env.insert("camera".to_string(), false);

        let result = executor.step::<BTreeMap<String, bool>>().run(&env).await.unwrap();
        executor.apply_result(result);
        assert_eq!(executor.current_state(), "state3");
    }

    #[tokio::test]
    async fn missing_signal_fails_the_step() {
        let executor = Executor::new(robot());
        let env = Configuration::new().with("mapping", false);

        let err = executor.step::<Configuration>().run(&env).await.unwrap_err();
        assert_eq!(err, ExecutionError::Unassigned("lidar".to_string()));
    }

    #[test]
    fn fire_selects_by_action() {
        let mut executor = Executor::new(robot());
        let env = config(false, true, true);

        executor.fire("caDet", &env).unwrap();
        assert_eq!(executor.current_state(), "state2");

        let err = executor.fire("clean", &env).unwrap_err();
        assert_eq!(
            err,
            ExecutionError::ActionNotEnabled {
                state: "state2".to_string(),
                action: "clean".to_string(),
            }
        );
    }

    #[test]
    fn reset_returns_to_start() {
        let mut executor = Executor::new(robot());
        executor.fire("map", &config(true, false, false)).unwrap();
        executor.reset();
        assert_eq!(executor.current_state(), "state0");
        assert!(executor.history().is_empty());
    }
}
