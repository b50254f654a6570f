//! Exit/entry chains, transitions and initial chaining.

use crate::core::{find_lca, is_ancestor_of, Event, Outcome, State, TransitionRecord};
use crate::engine::Machine;
use crate::error::HsmError;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, trace};

impl<S: State, E: Event, C, P> Machine<S, E, C, P> {
    /// Move to `target`, running exits, then entries, then initial chaining.
    ///
    /// Meant to be called from handlers: the exit chain starts at the active
    /// leaf, and the LCA is computed from the state whose handler is running.
    /// Always returns `Handled` on success.
    pub fn transition(&mut self, target: S) -> Result<Outcome, HsmError> {
        self.transition_with(target, |_| {})
    }

    /// Like [`Machine::transition`], running `action` once every exit has
    /// completed and before any entry starts.
    ///
    /// Called from outside a dispatch, the machine counts as busy until the
    /// transition settles, so handlers it runs cannot start a dispatch.
    pub fn transition_with<F>(&mut self, target: S, action: F) -> Result<Outcome, HsmError>
    where
        F: FnOnce(&mut C),
    {
        if self.busy {
            return self.run_transition(target, action);
        }
        self.busy = true;
        let result = self.run_transition(target, action);
        self.busy = false;
        result
    }

    fn run_transition<F>(&mut self, target: S, action: F) -> Result<Outcome, HsmError>
    where
        F: FnOnce(&mut C),
    {
        let definition = Arc::clone(self.definition());
        let tracer = definition.tracer();
        let leaf = self.current;
        let handling = self.source;

        tracer.before_transition_begin(&handling, &target);
        let lca = find_lca(definition.hierarchy(), &handling, &target)?;
        debug!(
            from = leaf.name(),
            source = handling.name(),
            to = target.name(),
            lca = lca.name(),
            "transition"
        );
        self.exit_up_to(leaf, lca)?;
        tracer.after_transition_begin(&handling, &target);

        tracer.before_transition_action(&handling, &target);
        action(&mut self.context);
        tracer.after_transition_action(&handling, &target);

        tracer.before_transition_end(&handling, &target);
        self.enter_down_to(lca, target)?;
        self.current = target;
        self.source = target;
        if definition.config().record_history {
            self.history.record(TransitionRecord {
                from: leaf,
                source: handling,
                to: target,
                lca,
                event: self.last_event(),
                timestamp: Utc::now(),
            });
        }
        self.run_initial(target)?;
        tracer.after_transition_end(&handling, &target);

        Ok(Outcome::Handled)
    }

    /// Run the initial handler of `state`, which `current` and `source` point at.
    ///
    /// Anything but `Handled` means the default descendant was never resolved.
    pub(crate) fn run_initial(&mut self, state: S) -> Result<Outcome, HsmError> {
        let definition = Arc::clone(self.definition());
        definition.tracer().before_initial(&state);
        trace!(state = state.name(), "initial");

        let outcome = match definition.handlers().initial_for(&state) {
            Some(handler) => handler(self)?,
            None => Outcome::Handled,
        };
        if !outcome.is_handled() {
            return Err(HsmError::InitialNotHandled {
                state: state.name().to_string(),
            });
        }

        if definition.config().strict_initial && !definition.hierarchy().is_leaf(&self.current) {
            return Err(HsmError::UnsettledComposite {
                state: self.current.name().to_string(),
            });
        }
        Ok(Outcome::Handled)
    }

    /// Exit `from`, then its parent, and so on, stopping before `up_to`.
    pub(crate) fn exit_up_to(&mut self, from: S, up_to: S) -> Result<(), HsmError> {
        let definition = Arc::clone(self.definition());
        let hierarchy = definition.hierarchy();
        if from != up_to && !is_ancestor_of(hierarchy, &up_to, &from)? {
            return Err(HsmError::NotAnAncestor {
                state: from.name().to_string(),
                ancestor: up_to.name().to_string(),
            });
        }

        let mut state = from;
        while state != up_to {
            definition.tracer().before_exit(&state);
            trace!(state = state.name(), "exit");
            if let Some(hook) = definition.handlers().exit_for(&state) {
                hook(&state, &mut self.context);
            }
            state = hierarchy.parent(&state)?;
        }
        Ok(())
    }

    /// Enter every state strictly below `from` down to and including `to`,
    /// outermost first.
    pub(crate) fn enter_down_to(&mut self, from: S, to: S) -> Result<(), HsmError> {
        let definition = Arc::clone(self.definition());
        let hierarchy = definition.hierarchy();

        let mut path = Vec::new();
        let mut state = to;
        while state != from {
            if state.is_root() {
                return Err(HsmError::NotAnAncestor {
                    state: to.name().to_string(),
                    ancestor: from.name().to_string(),
                });
            }
            path.push(state);
            state = hierarchy.parent(&state)?;
        }

        for state in path.into_iter().rev() {
            definition.tracer().before_entry(&state);
            trace!(state = state.name(), "entry");
            if let Some(hook) = definition.handlers().entry_for(&state) {
                hook(&state, &mut self.context);
            }
        }
        Ok(())
    }
}
