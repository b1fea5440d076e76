//! State and action identifiers, and the state node of a transition system.

use super::transition::Transition;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

/// Identifier of a state, unique within a transition system.
///
/// Dereferences to `str`, so any `&StateId` can be passed where a
/// `&str` is expected.
///
/// # Example
///
/// ```rust
/// use ftsmind::core::StateId;
///
/// let id = StateId::from("state0");
/// assert_eq!(id.as_str(), "state0");
/// assert_eq!(id.to_string(), "state0");
/// assert!(id.starts_with("state"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateId(String);

/// Label of a transition. Actions are opaque: two transitions with the
/// same label denote the same observable action.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Action(String);

macro_rules! string_newtype {
    ($name:ident) => {
        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Deref for $name {
            type Target = str;

            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

string_newtype!(StateId);
string_newtype!(Action);

/// A state together with its outgoing transitions, in declaration order.
#[derive(Clone, Debug, PartialEq)]
pub struct State {
    pub(crate) id: StateId,
    pub(crate) transitions: Vec<Transition>,
}

impl State {
    pub fn id(&self) -> &StateId {
        &self.id
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// A sink has no outgoing transitions.
    pub fn is_sink(&self) -> bool {
        self.transitions.is_empty()
    }
}
