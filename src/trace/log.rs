//! In-memory tracer that records every hook call.

use crate::core::{Event, Outcome, State};
use crate::trace::Tracer;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};

/// One observed hook call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub enum TraceEvent<S: State, E: Event> {
    DispatchBegin { state: S, event: E },
    DispatchEnd { state: S, event: E, outcome: Outcome },
    TransitionBegin { source: S, target: S },
    ExitsDone { source: S, target: S },
    ActionBegin { source: S, target: S },
    ActionEnd { source: S, target: S },
    EntriesBegin { source: S, target: S },
    TransitionEnd { source: S, target: S },
    Entry(S),
    Exit(S),
    Initial(S),
}

/// Tracer that keeps every event in order.
///
/// Share it between the definition and the test or diagnostic code that
/// inspects it:
///
/// ```rust
/// use std::sync::Arc;
/// use lineage::trace::{TraceEvent, TraceLog};
/// use lineage::{event_enum, state_enum, DefinitionBuilder, Machine};
///
/// state_enum! {
///     enum Lamp { Root, Off }
///     root: Root
/// }
///
/// event_enum! {
///     enum Switch { Toggle }
/// }
///
/// let log: Arc<TraceLog<Lamp, Switch>> = Arc::new(TraceLog::new());
/// let definition = DefinitionBuilder::<Lamp, Switch, ()>::new("lamp")
///     .state(Lamp::Off, Lamp::Root)
///     .initial_transition(Lamp::Root, Lamp::Off)
///     .tracer(log.clone())
///     .build()
///     .unwrap();
///
/// let _machine = Machine::new(definition, ()).unwrap();
/// assert!(log.events().contains(&TraceEvent::Entry(Lamp::Off)));
/// ```
#[derive(Debug)]
pub struct TraceLog<S: State, E: Event> {
    events: Mutex<Vec<TraceEvent<S, E>>>,
}

impl<S: State, E: Event> Default for TraceLog<S, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State, E: Event> TraceLog<S, E> {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of everything recorded so far.
    pub fn events(&self) -> Vec<TraceEvent<S, E>> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drain the recorded events.
    pub fn take(&self) -> Vec<TraceEvent<S, E>> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn push(&self, event: TraceEvent<S, E>) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl<S: State, E: Event> Tracer<S, E> for TraceLog<S, E> {
    fn before_dispatch(&self, state: &S, event: &E) {
        self.push(TraceEvent::DispatchBegin {
            state: *state,
            event: *event,
        });
    }

    fn after_dispatch(&self, state: &S, event: &E, outcome: Outcome) {
        self.push(TraceEvent::DispatchEnd {
            state: *state,
            event: *event,
            outcome,
        });
    }

    fn before_transition_begin(&self, source: &S, target: &S) {
        self.push(TraceEvent::TransitionBegin {
            source: *source,
            target: *target,
        });
    }

    fn after_transition_begin(&self, source: &S, target: &S) {
        self.push(TraceEvent::ExitsDone {
            source: *source,
            target: *target,
        });
    }

    fn before_transition_action(&self, source: &S, target: &S) {
        self.push(TraceEvent::ActionBegin {
            source: *source,
            target: *target,
        });
    }

    fn after_transition_action(&self, source: &S, target: &S) {
        self.push(TraceEvent::ActionEnd {
            source: *source,
            target: *target,
        });
    }

    fn before_transition_end(&self, source: &S, target: &S) {
        self.push(TraceEvent::EntriesBegin {
            source: *source,
            target: *target,
        });
    }

    fn after_transition_end(&self, source: &S, target: &S) {
        self.push(TraceEvent::TransitionEnd {
            source: *source,
            target: *target,
        });
    }

    fn before_entry(&self, state: &S) {
        self.push(TraceEvent::Entry(*state));
    }

    fn before_exit(&self, state: &S) {
        self.push(TraceEvent::Exit(*state));
    }

    fn before_initial(&self, state: &S) {
        self.push(TraceEvent::Initial(*state));
    }
}
