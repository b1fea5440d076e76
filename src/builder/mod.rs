//! Builder API for ergonomic transition system construction.
//!
//! This module provides the raw [`Document`] model, fluent builders and the
//! [`fts!`](crate::fts) macro. Every path into a
//! [`FeaturedTransitionSystem`] goes through [`Document::build`], which runs
//! the validation rules.

pub mod document;
pub mod error;
pub mod macros;
pub mod system;
pub mod transition;

pub use document::{Document, StateDecl, TransitionDecl};
pub use error::BuildError;
pub use system::FtsBuilder;
pub use transition::{TransitionBuilder, TransitionSpec};

use crate::core::{Action, FeaturedTransitionSystem, Guard, StateId};

/// Create an unconditional transition.
///
/// # Example
///
/// ```
/// use ftsmind::builder::unguarded;
///
/// let spec = unguarded("state3", "clean", "state5");
/// assert!(spec.guard.is_trivial());
/// ```
pub fn unguarded(
    from: impl Into<StateId>,
    action: impl Into<Action>,
    to: impl Into<StateId>,
) -> TransitionSpec {
    TransitionSpec {
        source: from.into(),
        action: action.into(),
        target: to.into(),
        guard: Guard::always(),
    }
}

/// Create a transition guarded by an expression in textual form.
///
/// # Example
///
/// ```
/// use ftsmind::builder::guarded;
/// use ftsmind::fexpr::Configuration;
///
/// let spec = guarded("state0", "map", "state1", "mapping").unwrap();
/// let config = Configuration::new().with("mapping", true);
/// assert_eq!(spec.guard.check(&config), Ok(true));
/// ```
pub fn guarded(
    from: impl Into<StateId>,
    action: impl Into<Action>,
    to: impl Into<StateId>,
    guard: &str,
) -> Result<TransitionSpec, BuildError> {
    TransitionBuilder::new()
        .from(from)
        .action(action)
        .to(to)
        .when(guard)
        .build()
}

/// Build a system from pre-built transitions.
///
/// Sources are declared in order of appearance; `extra_states` declares
/// states that only occur as targets.
pub fn from_specs<I>(
    start: impl Into<StateId>,
    specs: I,
    extra_states: &[&str],
) -> Result<FeaturedTransitionSystem, BuildError>
where
    I: IntoIterator<Item = TransitionSpec>,
{
    let builder = specs
        .into_iter()
        .fold(FtsBuilder::new().start(start), FtsBuilder::add_spec);
    extra_states
        .iter()
        .fold(builder, |b, s| b.state(*s))
        .build()
}
