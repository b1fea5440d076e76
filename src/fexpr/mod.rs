//! Feature expressions: the boolean guards of a featured transition system.
//!
//! A feature expression is a propositional formula over free boolean
//! signals (features). Guards are parsed from their textual form, evaluated
//! under a [`Configuration`], partially assigned and printed back in a
//! canonical form that the parser accepts again.

mod configuration;
mod error;
mod parser;

pub use configuration::{
    Configuration, ConfigurationSpace, SignalSource, DEFAULT_FEATURE_LIMIT, MAX_ENUMERATED_FEATURES,
};
pub use error::{FExprError, ParseError};
pub use parser::{parse, MAX_DEPTH};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A boolean formula over named features.
///
/// `And` and `Or` are n-ary. Combinators flatten nested operators of the
/// same kind so that `a.and(b).and(c)` is a single three-operand `And`.
///
/// Serialized as its canonical text.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FExpr {
    Const(bool),
    Feature(String),
    Not(Box<FExpr>),
    And(Vec<FExpr>),
    Or(Vec<FExpr>),
}

impl FExpr {
    /// The constant `true`.
    pub fn true_value() -> Self {
        FExpr::Const(true)
    }

    /// The constant `false`.
    pub fn false_value() -> Self {
        FExpr::Const(false)
    }

    /// A single feature reference.
    pub fn feature(name: impl Into<String>) -> Self {
        FExpr::Feature(name.into())
    }

    /// Conjunction, flattening nested conjunctions.
    pub fn and(self, other: FExpr) -> Self {
        let mut operands = match self {
            FExpr::And(ops) => ops,
            e => vec![e],
        };
        match other {
            FExpr::And(ops) => operands.extend(ops),
            e => operands.push(e),
        }
        FExpr::And(operands)
    }

    /// Disjunction, flattening nested disjunctions.
    pub fn or(self, other: FExpr) -> Self {
        let mut operands = match self {
            FExpr::Or(ops) => ops,
            e => vec![e],
        };
        match other {
            FExpr::Or(ops) => operands.extend(ops),
            e => operands.push(e),
        }
        FExpr::Or(operands)
    }

    /// Negation.
    pub fn negate(self) -> Self {
        FExpr::Not(Box::new(self))
    }

    pub fn is_true(&self) -> bool {
        matches!(self, FExpr::Const(true))
    }

    pub fn is_false(&self) -> bool {
        matches!(self, FExpr::Const(false))
    }

    /// All feature names referenced by the expression, sorted.
    pub fn features(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_features(&mut out);
        out
    }

    fn collect_features(&self, out: &mut BTreeSet<String>) {
        match self {
            FExpr::Const(_) => {}
            FExpr::Feature(name) => {
                out.insert(name.clone());
            }
            FExpr::Not(inner) => inner.collect_features(out),
            FExpr::And(ops) | FExpr::Or(ops) => {
                for op in ops {
                    op.collect_features(out);
                }
            }
        }
    }

    /// Evaluate the expression.
    ///
    /// Every referenced feature must have a value, even when the result
    /// could be decided without it, so a missing signal is reported the
    /// same way regardless of operand order.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ftsmind::fexpr::{parse, Configuration, FExprError};
    ///
    /// let guard = parse("!mapping && lidar").unwrap();
    /// let config = Configuration::new().with("mapping", false).with("lidar", true);
    /// assert_eq!(guard.evaluate(&config), Ok(true));
    ///
    /// let partial = Configuration::new().with("mapping", true);
    /// assert_eq!(
    ///     guard.evaluate(&partial),
    ///     Err(FExprError::UnassignedFeature("lidar".to_string()))
    /// );
    /// ```
    pub fn evaluate<S: SignalSource + ?Sized>(&self, signals: &S) -> Result<bool, FExprError> {
        match self {
            FExpr::Const(value) => Ok(*value),
            FExpr::Feature(name) => signals
                .signal(name)
                .ok_or_else(|| FExprError::UnassignedFeature(name.clone())),
            FExpr::Not(inner) => Ok(!inner.evaluate(signals)?),
            FExpr::And(ops) => {
                let mut acc = true;
                for op in ops {
                    acc &= op.evaluate(signals)?;
                }
                Ok(acc)
            }
            FExpr::Or(ops) => {
                let mut acc = false;
                for op in ops {
                    acc |= op.evaluate(signals)?;
                }
                Ok(acc)
            }
        }
    }

    /// Substitute the features the source knows about and simplify.
    ///
    /// Unknown features stay symbolic, so the result may still mention
    /// features.
    pub fn assign<S: SignalSource + ?Sized>(&self, signals: &S) -> FExpr {
        self.substitute(signals).simplify()
    }

    fn substitute<S: SignalSource + ?Sized>(&self, signals: &S) -> FExpr {
        match self {
            FExpr::Const(_) => self.clone(),
            FExpr::Feature(name) => match signals.signal(name) {
                Some(value) => FExpr::Const(value),
                None => self.clone(),
            },
            FExpr::Not(inner) => FExpr::Not(Box::new(inner.substitute(signals))),
            FExpr::And(ops) => FExpr::And(ops.iter().map(|op| op.substitute(signals)).collect()),
            FExpr::Or(ops) => FExpr::Or(ops.iter().map(|op| op.substitute(signals)).collect()),
        }
    }

    /// Constant folding and flattening.
    ///
    /// Removes neutral operands, short-circuits absorbing constants,
    /// collapses double negation and drops duplicate operands.
    pub fn simplify(&self) -> FExpr {
        match self {
            FExpr::Const(_) | FExpr::Feature(_) => self.clone(),
            FExpr::Not(inner) => match inner.simplify() {
                FExpr::Const(value) => FExpr::Const(!value),
                FExpr::Not(e) => *e,
                e => FExpr::Not(Box::new(e)),
            },
            FExpr::And(ops) => {
                let mut out: Vec<FExpr> = Vec::with_capacity(ops.len());
                for op in ops {
                    match op.simplify() {
                        FExpr::Const(true) => {}
                        FExpr::Const(false) => return FExpr::Const(false),
                        FExpr::And(inner) => push_unique_all(&mut out, inner),
                        e => push_unique(&mut out, e),
                    }
                }
                collapse(out, true, FExpr::And)
            }
            FExpr::Or(ops) => {
                let mut out: Vec<FExpr> = Vec::with_capacity(ops.len());
                for op in ops {
                    match op.simplify() {
                        FExpr::Const(false) => {}
                        FExpr::Const(true) => return FExpr::Const(true),
                        FExpr::Or(inner) => push_unique_all(&mut out, inner),
                        e => push_unique(&mut out, e),
                    }
                }
                collapse(out, false, FExpr::Or)
            }
        }
    }
}

fn push_unique(out: &mut Vec<FExpr>, e: FExpr) {
    if !out.contains(&e) {
        out.push(e);
    }
}

fn push_unique_all(out: &mut Vec<FExpr>, items: Vec<FExpr>) {
    for e in items {
        push_unique(out, e);
    }
}

fn collapse(mut ops: Vec<FExpr>, neutral: bool, build: fn(Vec<FExpr>) -> FExpr) -> FExpr {
    match ops.len() {
        0 => FExpr::Const(neutral),
        1 => ops.remove(0),
        _ => build(ops),
    }
}

impl fmt::Display for FExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FExpr::Const(true) => f.write_str("true"),
            FExpr::Const(false) => f.write_str("false"),
            FExpr::Feature(name) => f.write_str(name),
            FExpr::Not(inner) => write!(f, "!{inner}"),
            FExpr::And(ops) => write_joined(f, ops, " && ", "true"),
            FExpr::Or(ops) => write_joined(f, ops, " || ", "false"),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, ops: &[FExpr], sep: &str, empty: &str) -> fmt::Result {
    if ops.is_empty() {
        return f.write_str(empty);
    }
    f.write_str("(")?;
    for (i, op) in ops.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{op}")?;
    }
    f.write_str(")")
}

impl FromStr for FExpr {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

impl TryFrom<String> for FExpr {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse(&value)
    }
}

impl From<FExpr> for String {
    fn from(expr: FExpr) -> Self {
        expr.to_string()
    }
}
