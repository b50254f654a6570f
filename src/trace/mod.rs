//! Observation hooks.
//!
//! A [`Tracer`] is told about each step the engine takes. Every method has an
//! empty default body, so an implementation only overrides what it cares
//! about and [`NoopTracer`] costs nothing but a virtual call.
//!
//! Tracers observe; they cannot veto or redirect anything. Structured log
//! output goes through `tracing` independently of these hooks.

mod log;

pub use log::{TraceEvent, TraceLog};

use crate::core::{Event, Outcome, State};

/// Hook points called by the engine, in order, during dispatch and transitions.
///
/// A transition has three phases: `begin` brackets the exit chain, `action`
/// brackets the user action (fired even when no action was given), and `end`
/// brackets the entry chain plus initial chaining.
pub trait Tracer<S: State, E: Event>: Send + Sync {
    /// Before `event` is offered to `state`.
    fn before_dispatch(&self, _state: &S, _event: &E) {}

    /// After `state` answered `event`.
    fn after_dispatch(&self, _state: &S, _event: &E, _outcome: Outcome) {}

    fn before_transition_begin(&self, _source: &S, _target: &S) {}

    fn after_transition_begin(&self, _source: &S, _target: &S) {}

    fn before_transition_action(&self, _source: &S, _target: &S) {}

    fn after_transition_action(&self, _source: &S, _target: &S) {}

    fn before_transition_end(&self, _source: &S, _target: &S) {}

    fn after_transition_end(&self, _source: &S, _target: &S) {}

    fn before_entry(&self, _state: &S) {}

    fn before_exit(&self, _state: &S) {}

    fn before_initial(&self, _state: &S) {}
}

/// Tracer that ignores everything. Used when none is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopTracer;

impl<S: State, E: Event> Tracer<S, E> for NoopTracer {}
