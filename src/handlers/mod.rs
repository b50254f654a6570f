//! Handler signatures and the per-definition handler table.
//!
//! Each state can have four kinds of handler: entry, exit, initial and event.
//! Lookups are two-tier, specific before generic:
//!
//! | kind          | first            | then                  | otherwise     |
//! |---------------|------------------|-----------------------|---------------|
//! | entry / exit  | hook for `state` | machine-wide any hook | nothing runs  |
//! | initial       | hook for `state` |                       | `Handled`     |
//! | event         | `(state, event)` | `(state, any event)`  | `NotHandled`  |

use crate::core::{Event, Outcome, State};
use crate::engine::Machine;
use crate::error::HsmError;
use std::collections::HashMap;
use std::sync::Arc;

/// Entry or exit callback. Receives the state being entered or exited.
pub type StateHook<S, C> = Arc<dyn Fn(&S, &mut C) + Send + Sync>;

/// Initial handler. Either returns `Handled` directly (a leaf) or calls
/// [`Machine::transition`] to a child and returns its result.
pub type InitialHandler<S, E, C, P> =
    Arc<dyn Fn(&mut Machine<S, E, C, P>) -> Result<Outcome, HsmError> + Send + Sync>;

/// Event handler. The event itself is available as [`Machine::last_event`].
pub type EventHandler<S, E, C, P> =
    Arc<dyn Fn(&mut Machine<S, E, C, P>, &P) -> Result<Outcome, HsmError> + Send + Sync>;

/// Complete handler set for one machine kind.
pub struct HandlerTable<S: State, E: Event, C, P> {
    entry: HashMap<S, StateHook<S, C>>,
    exit: HashMap<S, StateHook<S, C>>,
    any_entry: Option<StateHook<S, C>>,
    any_exit: Option<StateHook<S, C>>,
    initial: HashMap<S, InitialHandler<S, E, C, P>>,
    events: HashMap<(S, E), EventHandler<S, E, C, P>>,
    any_event: HashMap<S, EventHandler<S, E, C, P>>,
}

impl<S: State, E: Event, C, P> Default for HandlerTable<S, E, C, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State, E: Event, C, P> Clone for HandlerTable<S, E, C, P> {
    fn clone(&self) -> Self {
        Self {
            entry: self.entry.clone(),
            exit: self.exit.clone(),
            any_entry: self.any_entry.clone(),
            any_exit: self.any_exit.clone(),
            initial: self.initial.clone(),
            events: self.events.clone(),
            any_event: self.any_event.clone(),
        }
    }
}

impl<S: State, E: Event, C, P> HandlerTable<S, E, C, P> {
    pub fn new() -> Self {
        Self {
            entry: HashMap::new(),
            exit: HashMap::new(),
            any_entry: None,
            any_exit: None,
            initial: HashMap::new(),
            events: HashMap::new(),
            any_event: HashMap::new(),
        }
    }

    pub(crate) fn set_entry(&mut self, state: S, hook: StateHook<S, C>) {
        self.entry.insert(state, hook);
    }

    pub(crate) fn set_exit(&mut self, state: S, hook: StateHook<S, C>) {
        self.exit.insert(state, hook);
    }

    pub(crate) fn set_any_entry(&mut self, hook: StateHook<S, C>) {
        self.any_entry = Some(hook);
    }

    pub(crate) fn set_any_exit(&mut self, hook: StateHook<S, C>) {
        self.any_exit = Some(hook);
    }

    pub(crate) fn set_initial(&mut self, state: S, handler: InitialHandler<S, E, C, P>) {
        self.initial.insert(state, handler);
    }

    pub(crate) fn set_event(&mut self, state: S, event: E, handler: EventHandler<S, E, C, P>) {
        self.events.insert((state, event), handler);
    }

    pub(crate) fn set_any_event(&mut self, state: S, handler: EventHandler<S, E, C, P>) {
        self.any_event.insert(state, handler);
    }

    pub fn entry_for(&self, state: &S) -> Option<&StateHook<S, C>> {
        self.entry.get(state).or(self.any_entry.as_ref())
    }

    pub fn exit_for(&self, state: &S) -> Option<&StateHook<S, C>> {
        self.exit.get(state).or(self.any_exit.as_ref())
    }

    pub fn initial_for(&self, state: &S) -> Option<&InitialHandler<S, E, C, P>> {
        self.initial.get(state)
    }

    pub fn event_for(&self, state: &S, event: &E) -> Option<&EventHandler<S, E, C, P>> {
        self.events
            .get(&(*state, *event))
            .or_else(|| self.any_event.get(state))
    }

    /// Every state named by a per-state registration, with the kind of registration.
    pub(crate) fn registrations(&self) -> Vec<(S, &'static str)> {
        let mut found: Vec<(S, &'static str)> = Vec::new();
        found.extend(self.entry.keys().map(|s| (*s, "on_entry")));
        found.extend(self.exit.keys().map(|s| (*s, "on_exit")));
        found.extend(self.initial.keys().map(|s| (*s, "on_initial")));
        found.extend(self.events.keys().map(|(s, _)| (*s, "on_event")));
        found.extend(self.any_event.keys().map(|s| (*s, "on_any_event")));
        found
    }
}
