//! Fluent builder for machine definitions.

use crate::builder::error::BuildError;
use crate::config::MachineConfig;
use crate::core::{is_ancestor_of, Event, Hierarchy, HierarchyError, Outcome, State};
use crate::engine::{Definition, Machine};
use crate::error::HsmError;
use crate::handlers::HandlerTable;
use crate::trace::{NoopTracer, Tracer};
use std::sync::Arc;
use stillwater::validation::Validation;
use tracing::debug;

/// Builder for a [`Definition`].
///
/// Registration order does not matter: a handler may name a state that is
/// only declared further down the chain. Everything is checked in
/// [`DefinitionBuilder::build`].
pub struct DefinitionBuilder<S: State, E: Event, C, P = ()> {
    name: String,
    hierarchy: Hierarchy<S>,
    conflicts: Vec<HierarchyError>,
    handlers: HandlerTable<S, E, C, P>,
    initial_targets: Vec<(S, S)>,
    base: Option<Arc<Definition<S, E, C, P>>>,
    tracer: Option<Arc<dyn Tracer<S, E>>>,
    config: MachineConfig,
}

impl<S: State, E: Event, C: 'static, P: 'static> DefinitionBuilder<S, E, C, P> {
    /// Create an empty builder. Only the root is registered.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hierarchy: Hierarchy::new(),
            conflicts: Vec::new(),
            handlers: HandlerTable::new(),
            initial_targets: Vec::new(),
            base: None,
            tracer: None,
            config: MachineConfig::default(),
        }
    }

    /// Start a derived definition from a copy of `base`.
    ///
    /// The copy includes the hierarchy, every handler, the tracer and the
    /// config. Registrations on the derived builder replace the copied ones
    /// for the same key. The base stays reachable through
    /// [`Definition::base`] so derived handlers can delegate to it with
    /// [`Definition::handle_event`].
    pub fn extend(name: impl Into<String>, base: &Arc<Definition<S, E, C, P>>) -> Self {
        Self {
            name: name.into(),
            hierarchy: base.hierarchy().clone(),
            conflicts: Vec::new(),
            handlers: base.handlers().clone(),
            initial_targets: Vec::new(),
            base: Some(Arc::clone(base)),
            tracer: Some(base.tracer_handle()),
            config: base.config().clone(),
        }
    }

    /// Declare `state` as a child of `parent`.
    pub fn state(mut self, state: S, parent: S) -> Self {
        if state.is_root() {
            if !parent.is_root() {
                self.conflicts.push(HierarchyError::RootReparented {
                    parent: parent.name().to_string(),
                });
            }
            return self;
        }

        match self.hierarchy.parent(&state) {
            Ok(existing) if existing != parent => {
                self.conflicts.push(HierarchyError::ConflictingParent {
                    state: state.name().to_string(),
                    existing: existing.name().to_string(),
                    requested: parent.name().to_string(),
                });
            }
            Ok(_) => {}
            Err(_) => {
                self.hierarchy.insert(state, parent);
            }
        }
        self
    }

    /// Declare several `(state, parent)` pairs at once.
    pub fn states(self, pairs: impl IntoIterator<Item = (S, S)>) -> Self {
        pairs
            .into_iter()
            .fold(self, |builder, (state, parent)| builder.state(state, parent))
    }

    pub fn on_entry<F>(mut self, state: S, hook: F) -> Self
    where
        F: Fn(&S, &mut C) + Send + Sync + 'static,
    {
        self.handlers.set_entry(state, Arc::new(hook));
        self
    }

    pub fn on_exit<F>(mut self, state: S, hook: F) -> Self
    where
        F: Fn(&S, &mut C) + Send + Sync + 'static,
    {
        self.handlers.set_exit(state, Arc::new(hook));
        self
    }

    /// Entry hook for every state without one of its own.
    pub fn on_any_entry<F>(mut self, hook: F) -> Self
    where
        F: Fn(&S, &mut C) + Send + Sync + 'static,
    {
        self.handlers.set_any_entry(Arc::new(hook));
        self
    }

    /// Exit hook for every state without one of its own.
    pub fn on_any_exit<F>(mut self, hook: F) -> Self
    where
        F: Fn(&S, &mut C) + Send + Sync + 'static,
    {
        self.handlers.set_any_exit(Arc::new(hook));
        self
    }

    /// Initial handler for a composite `state`.
    ///
    /// It must return `Handled`, normally by calling [`Machine::transition`]
    /// to one of the state's descendants.
    pub fn on_initial<F>(mut self, state: S, handler: F) -> Self
    where
        F: Fn(&mut Machine<S, E, C, P>) -> Result<Outcome, HsmError> + Send + Sync + 'static,
    {
        self.handlers.set_initial(state, Arc::new(handler));
        self
    }

    /// Shorthand for an initial handler that transitions straight to `target`.
    ///
    /// Unlike [`DefinitionBuilder::on_initial`], the target is checked at
    /// build time to be a proper descendant of `state`.
    pub fn initial_transition(mut self, state: S, target: S) -> Self {
        self.initial_targets.retain(|(s, _)| *s != state);
        self.initial_targets.push((state, target));
        self.on_initial(state, move |m| m.transition(target))
    }

    pub fn on_event<F>(mut self, state: S, event: E, handler: F) -> Self
    where
        F: Fn(&mut Machine<S, E, C, P>, &P) -> Result<Outcome, HsmError> + Send + Sync + 'static,
    {
        self.handlers.set_event(state, event, Arc::new(handler));
        self
    }

    /// Handler for every event `state` has no specific handler for.
    pub fn on_any_event<F>(mut self, state: S, handler: F) -> Self
    where
        F: Fn(&mut Machine<S, E, C, P>, &P) -> Result<Outcome, HsmError> + Send + Sync + 'static,
    {
        self.handlers.set_any_event(state, Arc::new(handler));
        self
    }

    pub fn tracer<T>(mut self, tracer: Arc<T>) -> Self
    where
        T: Tracer<S, E> + 'static,
    {
        self.tracer = Some(tracer);
        self
    }

    pub fn config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate and freeze the definition.
    ///
    /// Fails if the hierarchy is not a tree rooted at [`State::root`], if a
    /// handler names an undeclared state, or if an initial transition does
    /// not target a descendant.
    pub fn build(self) -> Result<Arc<Definition<S, E, C, P>>, BuildError> {
        let mut problems = self.conflicts;
        if let Validation::Failure(errors) = self.hierarchy.validate() {
            problems.extend(errors.iter().cloned());
        }
        if !problems.is_empty() {
            return Err(BuildError::InvalidHierarchy(problems));
        }

        for (state, registration) in self.handlers.registrations() {
            if !self.hierarchy.contains(&state) {
                return Err(BuildError::UnknownHandlerState {
                    state: state.name().to_string(),
                    registration,
                });
            }
        }

        for (state, target) in &self.initial_targets {
            let descends = state != target
                && self.hierarchy.contains(target)
                && matches!(is_ancestor_of(&self.hierarchy, state, target), Ok(true));
            if !descends {
                return Err(BuildError::InvalidInitialTarget {
                    state: state.name().to_string(),
                    target: target.name().to_string(),
                });
            }
        }

        debug!(
            definition = %self.name,
            states = self.hierarchy.len(),
            derived = self.base.is_some(),
            "definition built"
        );

        let tracer = self.tracer.unwrap_or_else(|| Arc::new(NoopTracer));
        Ok(Arc::new(Definition::from_parts(
            self.name,
            self.hierarchy,
            self.handlers,
            self.base,
            tracer,
            self.config,
        )))
    }
}
