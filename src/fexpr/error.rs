//! Feature expression error types.

use thiserror::Error;

/// Errors produced while parsing a guard expression.
///
/// Offsets are byte offsets into the parsed text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("expression is empty")]
    Empty,

    #[error("unexpected character '{found}' at byte {offset}")]
    UnexpectedChar { found: char, offset: usize },

    #[error("expected {expected} at byte {offset}, found '{found}'")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
        offset: usize,
    },

    #[error("unexpected end of expression, expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    #[error("trailing input '{rest}' at byte {offset}")]
    TrailingInput { rest: String, offset: usize },

    #[error("expression nesting exceeds {max} levels")]
    TooDeep { max: usize },
}

/// Errors produced while evaluating expressions or enumerating configurations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FExprError {
    #[error("feature '{0}' has no value in the configuration")]
    UnassignedFeature(String),

    #[error("invalid assignment '{0}', expected name=true|false")]
    InvalidAssignment(String),

    #[error("{count} features exceed the enumeration limit of {limit}")]
    TooManyFeatures { count: usize, limit: usize },

    #[error(transparent)]
    Parse(#[from] ParseError),
}
