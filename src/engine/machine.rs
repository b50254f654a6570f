//! A running machine instance and its event dispatcher.

use crate::core::{is_ancestor_of, Event, Outcome, State, TransitionLog};
use crate::engine::Definition;
use crate::error::HsmError;
use std::sync::Arc;
use tracing::{debug, trace};
use uuid::Uuid;

/// One live state machine.
///
/// Owns the user context and the two bookkeeping pointers:
/// - `current`: the active leaf
/// - `source`: the state whose handler is running; during propagation this is
///   the ancestor currently being offered the event
///
/// Not reentrant: handlers may call [`Machine::transition`] but not
/// [`Machine::dispatch`] on the same instance. Any dispatch started while
/// the machine is initializing, dispatching or transitioning fails with
/// [`HsmError::ReentrantDispatch`].
pub struct Machine<S: State, E: Event, C, P = ()> {
    pub(crate) id: Uuid,
    definition: Arc<Definition<S, E, C, P>>,
    pub(crate) current: S,
    pub(crate) source: S,
    pub(crate) last_event: Option<E>,
    pub(crate) context: C,
    pub(crate) history: TransitionLog<S, E>,
    pub(crate) busy: bool,
}

impl<S: State, E: Event, C, P> Machine<S, E, C, P> {
    /// Create a machine and settle it by running the root's initial chain.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lineage::{event_enum, state_enum, DefinitionBuilder, Machine, Outcome};
    ///
    /// state_enum! {
    ///     enum Light { Root, Off, On }
    ///     root: Root
    /// }
    ///
    /// event_enum! {
    ///     enum Switch { Flip }
    /// }
    ///
    /// let definition = DefinitionBuilder::<Light, Switch, u32>::new("light")
    ///     .state(Light::Off, Light::Root)
    ///     .state(Light::On, Light::Root)
    ///     .initial_transition(Light::Root, Light::Off)
    ///     .on_entry(Light::On, |_, flips: &mut u32| *flips += 1)
    ///     .on_event(Light::Off, Switch::Flip, |m, _| m.transition(Light::On))
    ///     .on_event(Light::On, Switch::Flip, |m, _| m.transition(Light::Off))
    ///     .build()
    ///     .unwrap();
    ///
    /// let mut light = Machine::new(definition, 0).unwrap();
    /// assert_eq!(light.current(), Light::Off);
    ///
    /// assert_eq!(light.send(Switch::Flip).unwrap(), Outcome::Handled);
    /// assert_eq!(light.current(), Light::On);
    /// assert_eq!(*light.context(), 1);
    /// ```
    pub fn new(definition: Arc<Definition<S, E, C, P>>, context: C) -> Result<Self, HsmError> {
        let mut machine = Self::at(definition, context, S::root());
        debug!(
            machine = %machine.id,
            definition = machine.definition.name(),
            "initializing machine"
        );
        machine.busy = true;
        let settled = machine.run_initial(S::root());
        machine.busy = false;
        settled?;
        Ok(machine)
    }

    /// Machine parked on `state` without running any callbacks.
    pub(crate) fn at(definition: Arc<Definition<S, E, C, P>>, context: C, state: S) -> Self {
        let capacity = definition.config().history_capacity;
        Self {
            id: Uuid::new_v4(),
            definition,
            current: state,
            source: state,
            last_event: None,
            context,
            history: TransitionLog::with_capacity(capacity),
            busy: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn definition(&self) -> &Arc<Definition<S, E, C, P>> {
        &self.definition
    }

    /// The active leaf.
    pub fn current(&self) -> S {
        self.current
    }

    /// The state whose handler is running, or ran last.
    pub fn source(&self) -> S {
        self.source
    }

    /// The event being dispatched, or the last one dispatched.
    pub fn last_event(&self) -> Option<E> {
        self.last_event
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    pub fn into_context(self) -> C {
        self.context
    }

    pub fn history(&self) -> &TransitionLog<S, E> {
        &self.history
    }

    /// Is the active leaf `state` or one of its descendants?
    pub fn is_in(&self, state: &S) -> Result<bool, HsmError> {
        if self.current == *state {
            return Ok(true);
        }
        is_ancestor_of(self.definition.hierarchy(), state, &self.current)
    }

    /// Offer `event` to the active leaf, then to each ancestor in turn.
    ///
    /// Stops at the first state whose handler reports `Handled`. If the root
    /// declines too, the result is `Ok(Outcome::NotHandled)`.
    pub fn dispatch(&mut self, event: E, payload: &P) -> Result<Outcome, HsmError> {
        if self.busy {
            return Err(HsmError::ReentrantDispatch {
                event: event.name().to_string(),
            });
        }
        self.busy = true;
        self.last_event = Some(event);
        let result = self.propagate(event, payload);
        self.busy = false;
        result
    }

    fn propagate(&mut self, event: E, payload: &P) -> Result<Outcome, HsmError> {
        let definition = Arc::clone(&self.definition);
        let tracer = definition.tracer();
        let mut state = self.current;

        loop {
            self.source = state;
            tracer.before_dispatch(&state, &event);
            let outcome = match definition.handlers().event_for(&state, &event) {
                Some(handler) => handler(self, payload)?,
                None => Outcome::NotHandled,
            };
            tracer.after_dispatch(&state, &event, outcome);
            trace!(
                state = state.name(),
                event = event.name(),
                handled = outcome.is_handled(),
                "event offered"
            );

            if outcome.is_handled() {
                return Ok(Outcome::Handled);
            }
            if state.is_root() {
                debug!(machine = %self.id, event = event.name(), "event not handled");
                return Ok(Outcome::NotHandled);
            }
            state = definition.hierarchy().parent(&state)?;
        }
    }
}

impl<S: State, E: Event, C> Machine<S, E, C, ()> {
    /// Dispatch an event that carries no payload.
    pub fn send(&mut self, event: E) -> Result<Outcome, HsmError> {
        self.dispatch(event, &())
    }
}
