//! Engine configuration.
//!
//! Read from a JSON file; every field is optional and falls back to its
//! default. The command line overrides individual fields.
//!
//! ```json
//! {
//!     "policy": "first-match",
//!     "signals": ["mapping", "lidar", "camera"],
//!     "on_violation": "reject",
//!     "feature_limit": 12,
//!     "constraint": "!(lidar && camera)",
//!     "max_steps": 500
//! }
//! ```

use crate::analysis::AnalysisOptions;
use crate::effects::ResolutionPolicy;
use crate::fexpr::{self, ParseError, DEFAULT_FEATURE_LIMIT};
use crate::validation::{RulesBuilder, ValidationRules, ViolationStrategy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Upper bound accepted for `feature_limit`.
pub const MAX_FEATURE_LIMIT: usize = 24;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid analysis constraint '{text}': {source}")]
    Constraint {
        text: String,
        #[source]
        source: ParseError,
    },

    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How the executor handles several enabled transitions.
    pub policy: ResolutionPolicy,

    /// Allowed signal vocabulary. Unset means any signal is accepted.
    pub signals: Option<Vec<String>>,

    pub on_violation: ViolationStrategy,

    /// Cap on the features enumerated per state during analysis.
    pub feature_limit: usize,

    /// Formula restricting the configurations analysis considers.
    pub constraint: Option<String>,

    /// Step budget for `run`.
    pub max_steps: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            policy: ResolutionPolicy::default(),
            signals: None,
            on_violation: ViolationStrategy::default(),
            feature_limit: DEFAULT_FEATURE_LIMIT,
            constraint: None,
            max_steps: 1000,
        }
    }
}

impl EngineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), ?config, "loaded configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feature_limit == 0 || self.feature_limit > MAX_FEATURE_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "feature_limit must be between 1 and {MAX_FEATURE_LIMIT}, got {}",
                self.feature_limit
            )));
        }
        if self.max_steps == 0 {
            return Err(ConfigError::Invalid(
                "max_steps must be greater than 0".to_string(),
            ));
        }
        if let Some(signals) = &self.signals {
            if let Some(blank) = signals.iter().find(|s| s.trim().is_empty()) {
                return Err(ConfigError::Invalid(format!(
                    "signal names must not be blank, got '{blank}'"
                )));
            }
        }
        self.analysis_options().map(|_| ())
    }

    /// Apply command-line overrides for analysis and validate the result.
    pub fn with_analysis_overrides(
        self,
        constraint: Option<String>,
        limit: Option<usize>,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            constraint: constraint.or(self.constraint),
            feature_limit: limit.unwrap_or(self.feature_limit),
            ..self
        };
        config.validate()?;
        Ok(config)
    }

    /// Validation rules described by this configuration.
    pub fn rules(&self) -> ValidationRules {
        let mut builder = RulesBuilder::new().on_violation(self.on_violation);
        if let Some(signals) = &self.signals {
            builder = builder.signals(signals.iter().cloned());
        }
        builder.build()
    }

    pub fn analysis_options(&self) -> Result<AnalysisOptions, ConfigError> {
        let mut options = AnalysisOptions::new().with_limit(self.feature_limit);
        if let Some(text) = &self.constraint {
            let constraint = fexpr::parse(text).map_err(|source| ConfigError::Constraint {
                text: text.clone(),
                source,
            })?;
            options = options.constrained_by(constraint);
        }
        Ok(options)
    }
}
