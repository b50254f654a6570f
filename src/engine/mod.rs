//! The running side: shared definitions and live machines.
//!
//! A [`Definition`] is immutable once built and is shared by `Arc`. Each
//! [`Machine`] holds one, plus its own context and active state.

mod definition;
mod machine;
mod transition;

pub use definition::Definition;
pub use machine::Machine;
