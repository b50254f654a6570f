//! The parent-of relation over states.
//!
//! A [`Hierarchy`] is a rooted tree given only as `state -> parent` pairs.
//! The root is its own parent. Lookups of unregistered states fail loudly
//! instead of defaulting to the root, since a silent default would corrupt
//! every ancestor and LCA computation built on top of it.

use crate::core::state::State;
use crate::error::HsmError;
use std::collections::HashMap;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// Structural problems found while assembling or validating a hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HierarchyError {
    #[error("State '{state}' registered under '{existing}' and again under '{requested}'")]
    ConflictingParent {
        state: String,
        existing: String,
        requested: String,
    },

    #[error("The root state cannot be given parent '{parent}'")]
    RootReparented { parent: String },

    #[error("State '{state}' names unregistered parent '{parent}'")]
    UnknownParent { state: String, parent: String },

    #[error("Parent chain of '{state}' loops without reaching the root")]
    Cycle { state: String },
}

/// Parent-of relation for a tree of states rooted at [`State::root`].
///
/// # Example
///
/// ```rust
/// use lineage::core::{Hierarchy, State};
/// use lineage::state_enum;
///
/// state_enum! {
///     enum Door { Root, Closed, Locked, Open }
///     root: Root
/// }
///
/// let mut hierarchy = Hierarchy::new();
/// hierarchy.insert(Door::Closed, Door::Root);
/// hierarchy.insert(Door::Locked, Door::Closed);
/// hierarchy.insert(Door::Open, Door::Root);
///
/// assert_eq!(hierarchy.parent(&Door::Locked).unwrap(), Door::Closed);
/// assert_eq!(hierarchy.parent(&Door::Root).unwrap(), Door::Root);
/// assert!(hierarchy.validate().is_success());
/// ```
#[derive(Clone, Debug)]
pub struct Hierarchy<S: State> {
    parents: HashMap<S, S>,
}

impl<S: State> Default for Hierarchy<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> Hierarchy<S> {
    /// Create a hierarchy holding only the root.
    pub fn new() -> Self {
        let mut parents = HashMap::new();
        parents.insert(S::root(), S::root());
        Self { parents }
    }

    /// Register `state` as a child of `parent`, returning the previous parent if any.
    ///
    /// Consistency is checked by [`Hierarchy::validate`], not here.
    pub fn insert(&mut self, state: S, parent: S) -> Option<S> {
        self.parents.insert(state, parent)
    }

    /// Parent of `state`. The root is its own parent.
    pub fn parent(&self, state: &S) -> Result<S, HsmError> {
        self.parents
            .get(state)
            .copied()
            .ok_or_else(|| HsmError::UnknownState {
                state: state.name().to_string(),
            })
    }

    pub fn contains(&self, state: &S) -> bool {
        self.parents.contains_key(state)
    }

    /// Number of registered states, root included.
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    /// Always false: the root is always registered.
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// All registered states in no particular order.
    pub fn states(&self) -> impl Iterator<Item = &S> {
        self.parents.keys()
    }

    /// All `(state, parent)` pairs, the root's self-loop included.
    pub fn pairs(&self) -> impl Iterator<Item = (&S, &S)> {
        self.parents.iter()
    }

    /// Direct children of `state`. The root is not its own child.
    pub fn children(&self, state: &S) -> Vec<S> {
        self.parents
            .iter()
            .filter(|(child, parent)| *parent == state && !child.is_root())
            .map(|(child, _)| *child)
            .collect()
    }

    pub fn is_leaf(&self, state: &S) -> bool {
        !self
            .parents
            .iter()
            .any(|(child, parent)| parent == state && !child.is_root())
    }

    /// Strict ancestors of `state`, nearest first, ending with the root.
    ///
    /// The root itself has no strict ancestors.
    pub fn ancestors(&self, state: &S) -> Result<Vec<S>, HsmError> {
        let mut chain = Vec::new();
        let mut current = *state;
        while !current.is_root() {
            current = self.parent(&current)?;
            chain.push(current);
            if chain.len() > self.step_limit() {
                return Err(HsmError::CyclicHierarchy {
                    state: state.name().to_string(),
                });
            }
        }
        Ok(chain)
    }

    /// Number of parent steps from `state` to the root.
    pub fn depth(&self, state: &S) -> Result<usize, HsmError> {
        self.ancestors(state).map(|chain| chain.len())
    }

    /// Upper bound on the length of any acyclic parent walk.
    pub(crate) fn step_limit(&self) -> usize {
        self.parents.len()
    }

    /// Check the tree shape, accumulating every problem found.
    ///
    /// Each non-root state must name a registered parent and reach the
    /// root in finitely many steps.
    pub fn validate(&self) -> Validation<(), NonEmptyVec<HierarchyError>> {
        let mut checks: Vec<Validation<(), NonEmptyVec<HierarchyError>>> = Vec::new();

        let root = S::root();
        if let Some(parent) = self.parents.get(&root) {
            if !parent.is_root() {
                checks.push(Validation::fail(HierarchyError::RootReparented {
                    parent: parent.name().to_string(),
                }));
            }
        }

        for (state, parent) in &self.parents {
            if state.is_root() {
                continue;
            }
            if !self.parents.contains_key(parent) {
                checks.push(Validation::fail(HierarchyError::UnknownParent {
                    state: state.name().to_string(),
                    parent: parent.name().to_string(),
                }));
                continue;
            }
            checks.push(self.check_terminates(state));
        }

        Validation::all_vec(checks).map(|_| ())
    }

    fn check_terminates(&self, state: &S) -> Validation<(), NonEmptyVec<HierarchyError>> {
        let mut current = *state;
        for _ in 0..=self.step_limit() {
            if current.is_root() {
                return Validation::success(());
            }
            match self.parents.get(&current) {
                Some(parent) => current = *parent,
                // Reported against the state whose direct parent is missing.
                None => return Validation::success(()),
            }
        }
        Validation::fail(HierarchyError::Cycle {
            state: state.name().to_string(),
        })
    }
}
