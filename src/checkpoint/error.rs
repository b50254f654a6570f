//! Errors raised while saving or resuming a machine.

use thiserror::Error;

/// Why a checkpoint could not be encoded, decoded or resumed from.
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// The JSON or bincode encoder rejected the checkpoint
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Input was not a well-formed JSON or bincode checkpoint
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    /// Checkpoint was written with a different format version
    #[error("Unsupported checkpoint version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Checkpoint was taken from a machine of another kind
    #[error("Checkpoint belongs to definition '{found}', not '{expected}'")]
    DefinitionMismatch { expected: String, found: String },

    /// Saved leaf is not registered in the definition, or the machine id
    /// is not a valid UUID
    #[error("Cannot resume from checkpoint: {0}")]
    ValidationFailed(String),
}
