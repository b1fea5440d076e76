//! Guards: feature expressions gating transitions.
//!
//! A guard is a pure predicate over signal values. It keeps the text it was
//! parsed from for diagnostics, while equality and printing go through the
//! parsed expression.

use crate::fexpr::{self, Configuration, FExpr, FExprError, ParseError, SignalSource};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Boolean guard of a transition.
///
/// # Example
///
/// ```rust
/// use ftsmind::core::Guard;
/// use ftsmind::fexpr::Configuration;
///
/// let guard = Guard::parse("(!mapping && camera)").unwrap();
///
/// let config = Configuration::new().with("mapping", false).with("camera", true);
/// assert_eq!(guard.check(&config), Ok(true));
///
/// let config = config.with("mapping", true);
/// assert_eq!(guard.check(&config), Ok(false));
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Guard {
    expr: FExpr,
    source: String,
}

impl Guard {
    /// Parse a guard from its textual form.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        Ok(Self {
            expr: fexpr::parse(text)?,
            source: text.trim().to_string(),
        })
    }

    /// The guard that always holds.
    pub fn always() -> Self {
        Self::from_expr(FExpr::true_value())
    }

    pub fn from_expr(expr: FExpr) -> Self {
        let source = expr.to_string();
        Self { expr, source }
    }

    pub fn expr(&self) -> &FExpr {
        &self.expr
    }

    /// The text the guard was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate the guard (pure).
    pub fn check<S: SignalSource + ?Sized>(&self, signals: &S) -> Result<bool, FExprError> {
        self.expr.evaluate(signals)
    }

    /// Whether the guard is the literal `true`.
    pub fn is_trivial(&self) -> bool {
        self.expr.is_true()
    }

    pub fn features(&self) -> BTreeSet<String> {
        self.expr.features()
    }

    /// Partially evaluate the guard under a configuration.
    pub fn assign(&self, config: &Configuration) -> Guard {
        Guard::from_expr(self.expr.assign(config))
    }
}

impl PartialEq for Guard {
    fn eq(&self, other: &Self) -> bool {
        self.expr == other.expr
    }
}

impl fmt::Display for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)
    }
}

impl TryFrom<String> for Guard {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Guard::parse(&value)
    }
}

impl From<Guard> for String {
    fn from(guard: Guard) -> Self {
        guard.expr.to_string()
    }
}

impl From<FExpr> for Guard {
    fn from(expr: FExpr) -> Self {
        Guard::from_expr(expr)
    }
}
