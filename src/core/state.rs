//! Identifier traits for states and events.
//!
//! States and events are opaque tokens. The engine only compares, hashes and
//! copies them; everything they mean lives in the handlers a host registers.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// Trait for state identifiers in a hierarchy.
///
/// One value, returned by [`State::root`], is reserved as the top of the tree.
/// It is its own parent and an ancestor of every state, itself included.
///
/// # Example
///
/// ```rust
/// use lineage::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
/// enum Player {
///     Root,
///     Stopped,
///     Playing,
///     Paused,
/// }
///
/// impl State for Player {
///     fn name(&self) -> &str {
///         match self {
///             Self::Root => "Root",
///             Self::Stopped => "Stopped",
///             Self::Playing => "Playing",
///             Self::Paused => "Paused",
///         }
///     }
///
///     fn root() -> Self {
///         Self::Root
///     }
/// }
///
/// assert!(Player::Root.is_root());
/// assert!(!Player::Paused.is_root());
/// ```
pub trait State:
    Copy + Eq + Hash + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync + 'static
{
    /// Get the state's name for display/logging.
    fn name(&self) -> &str;

    /// The reserved top-level state.
    fn root() -> Self;

    /// Check if this is the reserved top-level state.
    fn is_root(&self) -> bool {
        *self == Self::root()
    }
}

/// Trait for event identifiers.
///
/// Event payloads travel separately, so an event is just a name the
/// handler table can be keyed on.
pub trait Event:
    Copy + Eq + Hash + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync + 'static
{
    /// Get the event's name for display/logging.
    fn name(&self) -> &str;
}

/// What a handler reports back to the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The handler claimed the event; propagation stops.
    Handled,
    /// The handler declined; the event moves on to the parent state.
    NotHandled,
}

impl Outcome {
    pub fn is_handled(self) -> bool {
        matches!(self, Self::Handled)
    }
}

impl From<bool> for Outcome {
    fn from(handled: bool) -> Self {
        if handled {
            Self::Handled
        } else {
            Self::NotHandled
        }
    }
}
