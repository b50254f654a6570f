//! Runtime errors raised by the engine.
//!
//! Only structural problems are errors. An event that no state claims is a
//! normal result ([`Outcome::NotHandled`](crate::core::Outcome)), never an `Err`.

use thiserror::Error;

/// Errors that can occur while initializing, dispatching or transitioning.
///
/// Once one of these is returned from inside a dispatch, `current` and
/// `source` may no longer describe a consistent configuration. Callers
/// should treat the instance as failed rather than retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HsmError {
    #[error("State '{state}' is not registered in the hierarchy")]
    UnknownState { state: String },

    #[error("Parent chain of '{state}' does not terminate at the root")]
    CyclicHierarchy { state: String },

    #[error("'{ancestor}' is not an ancestor of '{state}'")]
    NotAnAncestor { state: String, ancestor: String },

    #[error("Initial transition of '{state}' did not report the event as handled")]
    InitialNotHandled { state: String },

    #[error("Initial transitions settled in composite state '{state}'")]
    UnsettledComposite { state: String },

    #[error("Event '{event}' dispatched while another dispatch is in progress")]
    ReentrantDispatch { event: String },

    #[error("Handler in state '{state}' failed: {message}")]
    HandlerFailed { state: String, message: String },
}

impl HsmError {
    /// Build a [`HsmError::HandlerFailed`] from inside a handler.
    pub fn handler(state: &str, message: impl Into<String>) -> Self {
        Self::HandlerFailed {
            state: state.to_string(),
            message: message.into(),
        }
    }
}
