//! Ftsmind: featured transition systems
//!
//! A featured transition system is a state machine whose transitions carry
//! an action label and a guard, a boolean formula over named signals
//! (features). A transition may fire only when its guard holds under the
//! current signal values.
//!
//! Ftsmind follows a "pure core, imperative shell" layout. Models, guards
//! and analyses are plain values and pure functions; reading signals during
//! execution happens inside Stillwater effects.
//!
//! # Core Concepts
//!
//! - **Guards**: feature expressions parsed from text (`!mapping && lidar`)
//! - **Validation**: every structural problem of a model reported at once
//! - **Analysis**: ambiguity, blocking and dead-transition detection over
//!   all configurations, reachability and model statistics
//! - **Execution**: an executor stepping through the system, with history,
//!   coverage and checkpoints
//!
//! # Example
//!
//! ```rust
//! use ftsmind::fts;
//! use ftsmind::analysis::{analyze, AnalysisOptions};
//! use ftsmind::fexpr::Configuration;
//!
//! let system = fts! {
//!     start: idle;
//!     idle => [scan -> busy if "lidar", wait -> idle if "!lidar"];
//!     busy => [done -> idle];
//! }
//! .unwrap();
//!
//! let report = analyze(&system, &AnalysisOptions::default()).unwrap();
//! assert!(report.is_deterministic());
//!
//! let on = Configuration::new().with("lidar", true);
//! let enabled = system.enabled("idle", &on).unwrap();
//! assert_eq!(enabled[0].action, "scan");
//! ```

pub mod analysis;
pub mod builder;
pub mod checkpoint;
pub mod config;
pub mod core;
pub mod coverage;
pub mod effects;
pub mod fexpr;
pub mod io;
pub mod logging;
pub mod validation;

// Re-export commonly used types
pub use builder::{BuildError, FtsBuilder};
pub use crate::core::{Action, FeaturedTransitionSystem, Guard, StateHistory, StateId, Transition, TransitionId};
pub use effects::{ExecutionError, Executor, ResolutionPolicy};
pub use fexpr::{Configuration, FExpr};
pub use io::LoadError;
