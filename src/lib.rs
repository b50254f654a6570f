//! Lineage: a hierarchical state machine runtime
//!
//! States form a tree under a reserved root. Events go to the active leaf
//! first and bubble up to each ancestor until one claims them. Transitions
//! exit up to the least common ancestor, run an optional action, enter down
//! to the target and then follow initial transitions until they settle.
//!
//! # Core Concepts
//!
//! - **Hierarchy**: parent-of relation over states, validated as a rooted tree
//! - **Definition**: hierarchy plus handlers, built once and shared by `Arc`
//! - **Machine**: one live instance with its own context and active leaf
//! - **Tracer**: hooks observing every dispatch, exit, action and entry
//! - **Checkpoint**: serializable snapshot a machine can be resumed from
//!
//! # Example
//!
//! ```rust
//! use lineage::{event_enum, state_enum, DefinitionBuilder, Machine, Outcome};
//!
//! state_enum! {
//!     enum Oven { Root, Door, Closed, Open, Heating }
//!     root: Root
//! }
//!
//! event_enum! {
//!     enum Action { OpenDoor, CloseDoor, Bake }
//! }
//!
//! let definition = DefinitionBuilder::<Oven, Action, Vec<String>>::new("oven")
//!     .state(Oven::Door, Oven::Root)
//!     .state(Oven::Closed, Oven::Door)
//!     .state(Oven::Open, Oven::Door)
//!     .state(Oven::Heating, Oven::Closed)
//!     .initial_transition(Oven::Root, Oven::Door)
//!     .initial_transition(Oven::Door, Oven::Closed)
//!     .on_entry(Oven::Heating, |_, log: &mut Vec<String>| log.push("heat on".into()))
//!     .on_exit(Oven::Heating, |_, log: &mut Vec<String>| log.push("heat off".into()))
//!     .on_event(Oven::Closed, Action::Bake, |m, _| m.transition(Oven::Heating))
//!     .on_event(Oven::Closed, Action::OpenDoor, |m, _| m.transition(Oven::Open))
//!     .on_event(Oven::Open, Action::CloseDoor, |m, _| m.transition(Oven::Closed))
//!     .build()
//!     .unwrap();
//!
//! let mut oven = Machine::new(definition, Vec::new()).unwrap();
//! assert_eq!(oven.current(), Oven::Closed);
//!
//! oven.send(Action::Bake).unwrap();
//! assert_eq!(oven.current(), Oven::Heating);
//!
//! // Heating has no handler for OpenDoor; its parent Closed does.
//! oven.send(Action::OpenDoor).unwrap();
//! assert_eq!(oven.current(), Oven::Open);
//! assert_eq!(oven.context(), &vec!["heat on".to_string(), "heat off".to_string()]);
//!
//! // Nobody handles Bake while the door is open.
//! assert_eq!(oven.send(Action::Bake).unwrap(), Outcome::NotHandled);
//! ```

pub mod builder;
pub mod checkpoint;
pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod trace;

// Re-export commonly used types
pub use crate::builder::{BuildError, DefinitionBuilder};
pub use crate::checkpoint::{Checkpoint, CheckpointError};
pub use crate::config::MachineConfig;
pub use crate::core::{find_lca, is_ancestor_of, Event, Hierarchy, Outcome, State};
pub use crate::engine::{Definition, Machine};
pub use crate::error::HsmError;
pub use crate::trace::{NoopTracer, TraceLog, Tracer};
