//! Builder API for assembling machine definitions.
//!
//! [`DefinitionBuilder`] collects the hierarchy and handlers fluently and
//! validates everything at once in `build()`. The `state_enum!` and
//! `event_enum!` macros remove the boilerplate of the identifier traits.

mod definition;
pub mod error;
pub mod macros;

pub use definition::DefinitionBuilder;
pub use error::BuildError;
