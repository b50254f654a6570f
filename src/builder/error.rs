//! Build errors for machine definitions.

use crate::core::HierarchyError;
use thiserror::Error;

/// Errors that can occur when building a [`Definition`](crate::Definition).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("Invalid state hierarchy: {}", summarize(.0))]
    InvalidHierarchy(Vec<HierarchyError>),

    #[error("{registration} registered for unknown state '{state}'. Call .state(..) for it first")]
    UnknownHandlerState {
        state: String,
        registration: &'static str,
    },

    #[error("Initial transition of '{state}' targets '{target}', which is not one of its descendants")]
    InvalidInitialTarget { state: String, target: String },
}

fn summarize(errors: &[HierarchyError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
