//! Effectful execution of featured transition systems using Stillwater 0.11.0.
//!
//! This module provides the "imperative shell" around the pure core:
//! reading signal values from an environment, selecting the transition to
//! fire and recording the execution history.
//!
//! # Key Concepts
//!
//! - **Selection**: pure choice of the enabled transition under a
//!   [`ResolutionPolicy`]
//! - **Executor**: steps through the system and tracks history
//! - **Scenario**: replays a fixed action sequence
//!
//! Following Stillwater 0.11.0 conventions, [`Executor::step`] returns
//! `impl Effect` and its result is applied with [`Executor::apply_result`].

mod executor;
mod scenario;
mod selection;

pub use executor::{Executor, StepResult};
pub use scenario::Scenario;
pub use selection::{select, ExecutionError, ResolutionPolicy};
