//! Ancestor and least-common-ancestor queries.
//!
//! Both functions work purely through [`Hierarchy::parent`], so any
//! configuration error in the hierarchy surfaces here as an `Err`.

use crate::core::hierarchy::Hierarchy;
use crate::core::state::State;
use crate::error::HsmError;

/// Is `a` an ancestor of `b`?
///
/// The root is an ancestor of everything, itself included. Any other
/// state is never its own ancestor: only the parents of `b` are compared.
///
/// # Example
///
/// ```rust
/// use lineage::core::{is_ancestor_of, Hierarchy};
/// use lineage::state_enum;
///
/// state_enum! {
///     enum Mode { Root, Active, Running }
///     root: Root
/// }
///
/// let mut hierarchy = Hierarchy::new();
/// hierarchy.insert(Mode::Active, Mode::Root);
/// hierarchy.insert(Mode::Running, Mode::Active);
///
/// assert!(is_ancestor_of(&hierarchy, &Mode::Active, &Mode::Running).unwrap());
/// assert!(!is_ancestor_of(&hierarchy, &Mode::Running, &Mode::Running).unwrap());
/// assert!(is_ancestor_of(&hierarchy, &Mode::Root, &Mode::Root).unwrap());
/// ```
pub fn is_ancestor_of<S: State>(hierarchy: &Hierarchy<S>, a: &S, b: &S) -> Result<bool, HsmError> {
    if a.is_root() {
        return Ok(true);
    }
    let mut current = *b;
    for _ in 0..=hierarchy.step_limit() {
        if current.is_root() {
            return Ok(false);
        }
        current = hierarchy.parent(&current)?;
        if current == *a {
            return Ok(true);
        }
    }
    Err(HsmError::CyclicHierarchy {
        state: b.name().to_string(),
    })
}

/// Lowest state that is an ancestor-or-self of both `s` and `t`.
///
/// When `s == t` the answer is `parent(s)`: a self-transition exits and
/// re-enters its state instead of being a no-op.
///
/// Walks `s` upward one step at a time and, for each position, walks `t`
/// upward from its original value looking for a match. Quadratic in depth,
/// which is fine for the shallow trees state machines have.
///
/// # Example
///
/// ```rust
/// use lineage::core::{find_lca, Hierarchy};
/// use lineage::state_enum;
///
/// state_enum! {
///     enum Mode { Root, A, A1, B, B1 }
///     root: Root
/// }
///
/// let mut hierarchy = Hierarchy::new();
/// hierarchy.insert(Mode::A, Mode::Root);
/// hierarchy.insert(Mode::A1, Mode::A);
/// hierarchy.insert(Mode::B, Mode::Root);
/// hierarchy.insert(Mode::B1, Mode::B);
///
/// assert_eq!(find_lca(&hierarchy, &Mode::A1, &Mode::B1).unwrap(), Mode::Root);
/// assert_eq!(find_lca(&hierarchy, &Mode::A, &Mode::A1).unwrap(), Mode::A);
/// assert_eq!(find_lca(&hierarchy, &Mode::A1, &Mode::A1).unwrap(), Mode::A);
/// ```
pub fn find_lca<S: State>(hierarchy: &Hierarchy<S>, s: &S, t: &S) -> Result<S, HsmError> {
    if s == t {
        return hierarchy.parent(s);
    }

    let limit = hierarchy.step_limit();
    let mut s_cur = *s;
    for _ in 0..=limit {
        let mut t_cur = *t;
        for _ in 0..=limit {
            if t_cur == s_cur {
                return Ok(s_cur);
            }
            if t_cur.is_root() {
                break;
            }
            t_cur = hierarchy.parent(&t_cur)?;
        }
        if s_cur.is_root() {
            return Ok(S::root());
        }
        s_cur = hierarchy.parent(&s_cur)?;
    }

    Err(HsmError::CyclicHierarchy {
        state: s.name().to_string(),
    })
}
