//! Immutable description of one machine kind.

use crate::builder::DefinitionBuilder;
use crate::config::MachineConfig;
use crate::core::{Event, Hierarchy, Outcome, State};
use crate::engine::Machine;
use crate::error::HsmError;
use crate::handlers::HandlerTable;
use crate::trace::Tracer;
use std::sync::Arc;

/// Hierarchy, handler table, tracer and configuration for one machine kind.
///
/// Built once with [`DefinitionBuilder`] and shared as `Arc<Definition>` by
/// every [`Machine`] of that kind.
pub struct Definition<S: State, E: Event, C, P = ()> {
    name: String,
    hierarchy: Hierarchy<S>,
    handlers: HandlerTable<S, E, C, P>,
    base: Option<Arc<Definition<S, E, C, P>>>,
    tracer: Arc<dyn Tracer<S, E>>,
    config: MachineConfig,
}

impl<S: State, E: Event, C: 'static, P: 'static> Definition<S, E, C, P> {
    /// Start a new definition.
    pub fn builder(name: impl Into<String>) -> DefinitionBuilder<S, E, C, P> {
        DefinitionBuilder::new(name)
    }
}

impl<S: State, E: Event, C, P> Definition<S, E, C, P> {
    pub(crate) fn from_parts(
        name: String,
        hierarchy: Hierarchy<S>,
        handlers: HandlerTable<S, E, C, P>,
        base: Option<Arc<Definition<S, E, C, P>>>,
        tracer: Arc<dyn Tracer<S, E>>,
        config: MachineConfig,
    ) -> Self {
        Self {
            name,
            hierarchy,
            handlers,
            base,
            tracer,
            config,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hierarchy(&self) -> &Hierarchy<S> {
        &self.hierarchy
    }

    pub fn handlers(&self) -> &HandlerTable<S, E, C, P> {
        &self.handlers
    }

    /// The definition this one was extended from, if any.
    pub fn base(&self) -> Option<&Arc<Definition<S, E, C, P>>> {
        self.base.as_ref()
    }

    pub fn tracer(&self) -> &dyn Tracer<S, E> {
        self.tracer.as_ref()
    }

    pub(crate) fn tracer_handle(&self) -> Arc<dyn Tracer<S, E>> {
        Arc::clone(&self.tracer)
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Run this definition's handler for `(state, event)` against `machine`.
    ///
    /// Lookup uses this table only, never the base's base: this is how a
    /// derived handler reuses its immediate base explicitly. Clone the base
    /// `Arc` out of the machine before calling, since `machine` is borrowed
    /// mutably.
    ///
    /// Returns `NotHandled` when the table has no matching handler.
    pub fn handle_event(
        &self,
        machine: &mut Machine<S, E, C, P>,
        state: &S,
        event: &E,
        payload: &P,
    ) -> Result<Outcome, HsmError> {
        match self.handlers.event_for(state, event) {
            Some(handler) => handler(machine, payload),
            None => Ok(Outcome::NotHandled),
        }
    }
}
