//! Checkpoint and resume for running machines.
//!
//! A checkpoint captures where a machine is, never what it does: handlers
//! live in the [`Definition`] and are not serialized. Resuming pairs a
//! checkpoint with a definition of the same name and a fresh context.

use crate::core::{Event, State, TransitionLog};
use crate::engine::{Definition, Machine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Serializable snapshot of a machine's position.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Checkpoint<S: State, E: Event> {
    /// Checkpoint format version
    pub version: u32,

    /// Id of the machine the checkpoint was taken from
    pub id: String,

    /// Name of the definition the machine was running
    pub definition: String,

    /// When checkpoint was created
    pub timestamp: DateTime<Utc>,

    /// Active leaf at checkpoint time
    pub current: S,

    /// Last event dispatched before the checkpoint
    pub last_event: Option<E>,

    /// Recorded transitions
    pub history: TransitionLog<S, E>,
}

impl<S: State, E: Event> Checkpoint<S, E> {
    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        serde_json::from_str(json).map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))
    }

    /// Compact binary encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CheckpointError> {
        bincode::deserialize(bytes)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))
    }
}

impl<S: State, E: Event, C, P> Machine<S, E, C, P> {
    /// Snapshot the machine's position and history.
    pub fn checkpoint(&self) -> Checkpoint<S, E> {
        Checkpoint {
            version: CHECKPOINT_VERSION,
            id: self.id.to_string(),
            definition: self.definition().name().to_string(),
            timestamp: Utc::now(),
            current: self.current,
            last_event: self.last_event,
            history: self.history.clone(),
        }
    }

    /// Rebuild a machine from a checkpoint.
    ///
    /// No entry, exit or initial handler runs: the machine is placed on the
    /// checkpointed leaf with `current` and `source` both pointing at it.
    /// History is re-bounded by the definition's configured capacity.
    pub fn resume(
        definition: Arc<Definition<S, E, C, P>>,
        context: C,
        checkpoint: Checkpoint<S, E>,
    ) -> Result<Self, CheckpointError> {
        if checkpoint.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: checkpoint.version,
                supported: CHECKPOINT_VERSION,
            });
        }
        if checkpoint.definition != definition.name() {
            return Err(CheckpointError::DefinitionMismatch {
                expected: definition.name().to_string(),
                found: checkpoint.definition,
            });
        }
        if !definition.hierarchy().contains(&checkpoint.current) {
            return Err(CheckpointError::ValidationFailed(format!(
                "state '{}' is not registered in '{}'",
                checkpoint.current.name(),
                definition.name()
            )));
        }
        let id = Uuid::parse_str(&checkpoint.id)
            .map_err(|e| CheckpointError::ValidationFailed(format!("bad machine id: {}", e)))?;

        let mut machine = Machine::at(definition, context, checkpoint.current);
        machine.id = id;
        machine.last_event = checkpoint.last_event;
        for record in checkpoint.history.iter() {
            machine.history.record(record.clone());
        }

        debug!(
            machine = %machine.id,
            state = machine.current.name(),
            "resumed from checkpoint"
        );
        Ok(machine)
    }
}
