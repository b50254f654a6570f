//! Transition history tracking.
//!
//! Every completed transition leaves a [`TransitionRecord`] behind, including
//! the ones chained by initial handlers. The log can be bounded so
//! long-running machines do not grow without limit.

use crate::core::state::{Event, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Record of a single completed transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TransitionRecord<S: State, E: Event> {
    /// Leaf that was active when the transition started
    pub from: S,
    /// State whose handler initiated the transition
    pub source: S,
    /// Target of the transition
    pub to: S,
    /// Common ancestor the exit chain stopped at
    pub lca: S,
    /// Event being dispatched, if any
    pub event: Option<E>,
    /// When the transition completed its entry chain
    pub timestamp: DateTime<Utc>,
}

/// Ordered, optionally bounded log of transitions.
///
/// # Example
///
/// ```rust
/// use chrono::Utc;
/// use lineage::core::{TransitionLog, TransitionRecord};
/// use lineage::{event_enum, state_enum};
///
/// state_enum! {
///     enum Phase { Root, One, Two }
///     root: Root
/// }
///
/// event_enum! {
///     enum Signal { Next }
/// }
///
/// let mut log: TransitionLog<Phase, Signal> = TransitionLog::new();
/// log.record(TransitionRecord {
///     from: Phase::One,
///     source: Phase::One,
///     to: Phase::Two,
///     lca: Phase::Root,
///     event: Some(Signal::Next),
///     timestamp: Utc::now(),
/// });
///
/// assert_eq!(log.path(), vec![Phase::One, Phase::Two]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TransitionLog<S: State, E: Event> {
    records: VecDeque<TransitionRecord<S, E>>,
    capacity: usize,
}

impl<S: State, E: Event> Default for TransitionLog<S, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State, E: Event> TransitionLog<S, E> {
    /// Create an unbounded log.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a log keeping at most `capacity` records; `0` means unbounded.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: VecDeque::new(),
            capacity,
        }
    }

    /// Append a record, evicting the oldest ones until it fits.
    ///
    /// A deserialized log may hold more records than its capacity; the
    /// excess is dropped on the next append.
    pub fn record(&mut self, record: TransitionRecord<S, E>) {
        while self.capacity > 0 && self.records.len() >= self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn last(&self) -> Option<&TransitionRecord<S, E>> {
        self.records.back()
    }

    /// Records, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &TransitionRecord<S, E>> {
        self.records.iter()
    }

    /// Targets traversed: the first record's leaf, then each record's target.
    pub fn path(&self) -> Vec<S> {
        let mut path = Vec::with_capacity(self.records.len() + 1);
        if let Some(first) = self.records.front() {
            path.push(first.from);
        }
        path.extend(self.records.iter().map(|r| r.to));
        path
    }

    /// Time between the first and last retained record.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.records.front()?, self.records.back()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
