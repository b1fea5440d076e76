//! Core featured transition system types.
//!
//! This module contains the pure model:
//! - State and action identifiers
//! - Guards over feature expressions
//! - Transitions and the transition system itself
//! - Immutable execution history
//!
//! Nothing in this module performs I/O or logging.

mod guard;
mod history;
mod state;
mod system;
mod transition;

pub use guard::Guard;
pub use history::{StateHistory, StateTransition};
pub use state::{Action, State, StateId};
pub use system::FeaturedTransitionSystem;
pub use transition::{Transition, TransitionId};
