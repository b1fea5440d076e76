//! Checkpoint and resume functionality for executors.
//!
//! A checkpoint captures where an [`Executor`] stands in a system: its
//! current state, the history that led there and its bookkeeping. The
//! system itself is not stored; it is supplied again on resume and the
//! checkpoint is checked against it.

use crate::core::{FeaturedTransitionSystem, StateHistory, StateId};
use crate::effects::{Executor, ResolutionPolicy};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Bookkeeping carried across checkpoints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExecutorMetadata {
    /// When the executor was created
    pub created_at: DateTime<Utc>,

    /// When the checkpoint was taken
    pub updated_at: DateTime<Utc>,

    /// Number of transitions fired
    pub steps: usize,

    /// Times each action fired (action -> count)
    pub fired: HashMap<String, usize>,
}

impl Default for ExecutorMetadata {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            updated_at: now,
            steps: 0,
            fired: HashMap::new(),
        }
    }
}

/// Serializable snapshot of an executor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: String,

    /// When checkpoint was created
    pub timestamp: DateTime<Utc>,

    /// Start state of the system the executor ran on
    pub start: StateId,

    /// Current state of the executor
    pub current: StateId,

    /// Complete transition history
    pub history: StateHistory,

    pub policy: ResolutionPolicy,

    pub metadata: ExecutorMetadata,
}

impl Checkpoint {
    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let checkpoint: Self = serde_json::from_str(json)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.check_version()?;
        Ok(checkpoint)
    }

    pub fn to_binary(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_binary(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let checkpoint: Self = bincode::deserialize(bytes)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.check_version()?;
        Ok(checkpoint)
    }

    /// Write the checkpoint as JSON. The file is written to a temporary
    /// sibling first and renamed into place.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CheckpointError> {
        let path = path.as_ref();
        let json = self.to_json()?;
        let tmp = temp_path(path);
        std::fs::write(&tmp, json).map_err(|e| CheckpointError::io(&tmp, e))?;
        std::fs::rename(&tmp, path).map_err(|e| CheckpointError::io(path, e))?;
        tracing::debug!(id = %self.id, path = %path.display(), "saved checkpoint");
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CheckpointError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| CheckpointError::io(path, e))?;
        Self::from_json(&json)
    }

    fn check_version(&self) -> Result<(), CheckpointError> {
        if self.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            });
        }
        Ok(())
    }

    /// Check that this checkpoint can have been produced by an executor
    /// running on `fts`.
    pub fn validate_against(&self, fts: &FeaturedTransitionSystem) -> Result<(), CheckpointError> {
        self.check_version()?;

        if &self.start != fts.start() {
            return Err(CheckpointError::ValidationFailed(format!(
                "checkpoint starts in '{}' but the system starts in '{}'",
                self.start,
                fts.start()
            )));
        }
        if !fts.contains(&self.current) {
            return Err(CheckpointError::ValidationFailed(format!(
                "unknown current state '{}'",
                self.current
            )));
        }

        let mut at = &self.start;
        for (i, step) in self.history.transitions().iter().enumerate() {
            let t = fts.transition(step.transition).ok_or_else(|| {
                CheckpointError::ValidationFailed(format!(
                    "step {} refers to unknown transition {}",
                    i + 1,
                    step.transition
                ))
            })?;
            if &step.from != at || t.source != step.from || t.action != step.action || t.target != step.to {
                return Err(CheckpointError::ValidationFailed(format!(
                    "step {} ({} --{}--> {}) does not follow from '{}'",
                    i + 1,
                    step.from,
                    step.action,
                    step.to,
                    at
                )));
            }
            at = &step.to;
        }
        if at != &self.current {
            return Err(CheckpointError::ValidationFailed(format!(
                "history ends in '{}' but current state is '{}'",
                at, self.current
            )));
        }
        Ok(())
    }
}

/// `run.json` becomes `run.json.tmp`.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

impl Executor {
    /// Snapshot the executor.
    pub fn checkpoint(&self) -> Checkpoint {
        let now = Utc::now();
        Checkpoint {
            version: CHECKPOINT_VERSION,
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: now,
            start: self.fts.start().clone(),
            current: self.current.clone(),
            history: self.history.clone(),
            policy: self.policy,
            metadata: ExecutorMetadata {
                created_at: self.created_at,
                updated_at: now,
                steps: self.history.len(),
                fired: self.fired.clone(),
            },
        }
    }

    /// Rebuild an executor from a checkpoint taken on `fts`.
    pub fn resume(
        fts: Arc<FeaturedTransitionSystem>,
        checkpoint: Checkpoint,
    ) -> Result<Self, CheckpointError> {
        checkpoint.validate_against(&fts)?;
        tracing::info!(
            id = %checkpoint.id,
            state = %checkpoint.current,
            steps = checkpoint.history.len(),
            "resuming from checkpoint"
        );
        Ok(Self {
            fts,
            current: checkpoint.current,
            history: checkpoint.history,
            policy: checkpoint.policy,
            created_at: checkpoint.metadata.created_at,
            fired: checkpoint.metadata.fired,
        })
    }

    /// Like [`Executor::resume`], but `policy` replaces the stored
    /// resolution policy when given.
    pub fn resume_with_policy(
        fts: Arc<FeaturedTransitionSystem>,
        checkpoint: Checkpoint,
        policy: Option<ResolutionPolicy>,
    ) -> Result<Self, CheckpointError> {
        let executor = Self::resume(fts, checkpoint)?;
        Ok(match policy {
            Some(policy) => executor.with_policy(policy),
            None => executor,
        })
    }
}
