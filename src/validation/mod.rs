//! Validation-based structural checks for transition system documents.
//!
//! Checks use Stillwater's `Validation` type to accumulate ALL violations
//! instead of stopping at the first one, so a malformed document is
//! reported in a single pass.
//!
//! # Example
//!
//! ```rust
//! use ftsmind::builder::{Document, StateDecl, TransitionDecl};
//! use ftsmind::validation::{RulesBuilder, ViolationStrategy};
//!
//! let rules = RulesBuilder::new()
//!     .signals(["mapping", "lidar", "camera"])
//!     .on_violation(ViolationStrategy::Reject)
//!     .build();
//!
//! let doc = Document {
//!     start: Some("state0".to_string()),
//!     states: vec![StateDecl {
//!         id: "state0".to_string(),
//!         transitions: vec![TransitionDecl {
//!             action: "map".to_string(),
//!             target: "state1".to_string(),
//!             fexpression: "sonar".to_string(),
//!         }],
//!     }],
//! };
//!
//! // Both the dangling target and the unknown signal are reported.
//! assert_eq!(rules.violations(&doc).len(), 2);
//! ```

pub mod builder;
pub mod rules;
pub mod violations;

pub use builder::RulesBuilder;
pub use rules::{DocumentCheck, ValidationRules};
pub use violations::{Violation, ViolationStrategy};
