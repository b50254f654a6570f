//! Core hierarchy types and pure queries.
//!
//! This module contains everything that does not need a running machine:
//! - State and event identifier traits
//! - The parent-of relation and its validation
//! - Ancestor and least-common-ancestor queries
//! - Transition history records
//!
//! Nothing here has side effects; the engine builds on top of it.

mod ancestry;
mod hierarchy;
mod history;
mod state;

pub use ancestry::{find_lca, is_ancestor_of};
pub use hierarchy::{Hierarchy, HierarchyError};
pub use history::{TransitionLog, TransitionRecord};
pub use state::{Event, Outcome, State};
