//! Analysis errors.

use crate::fexpr::FExprError;
use thiserror::Error;

/// Errors that can occur when analysing a transition system.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("State '{state}' depends on {count} features, more than the limit of {limit}")]
    TooManyFeatures {
        state: String,
        count: usize,
        limit: usize,
    },

    #[error("Guard evaluation failed: {0}")]
    Evaluation(#[from] FExprError),
}
