//! Static analyses over featured transition systems.
//!
//! - [`determinism`]: overlapping, missing and unsatisfiable guards
//! - [`reachability`]: guard-agnostic and per-product reachability
//! - [`statistics`]: size and shape metrics

pub mod determinism;
pub mod error;
pub mod reachability;
pub mod statistics;

pub use determinism::{analyze, AnalysisOptions, Ambiguity, Blocking, DeadTransition, DeterminismReport};
pub use error::AnalysisError;
pub use reachability::{reachable, reachable_under, unreachable};
pub use statistics::ModelStatistics;
