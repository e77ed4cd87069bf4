//! Structural signals of partially built expression trees.
//!
//! A batch of pre-order token prefixes fully determines the shape of each
//! partial tree. These routines derive, for the node about to be sampled, its
//! parent, its left sibling, the number of open argument slots, and whether a
//! given token is among its ancestors. They are pure functions of the batch.

use ndarray::{Array1, ArrayView2};

use crate::library::Library;

/// Mark rows whose next node has any of `ancestor_tokens` as an ancestor.
///
/// Walks each prefix tracking the open-slot balance. Seeing an ancestor token
/// switches the row "on" until the branch rooted at that token is closed.
pub fn ancestors(
    actions: ArrayView2<'_, usize>,
    arities: &[usize],
    ancestor_tokens: &[usize],
) -> Array1<bool> {
    let mut mask = Array1::from_elem(actions.nrows(), false);
    for (row, on) in actions.rows().into_iter().zip(mask.iter_mut()) {
        let mut dangling: isize = 0;
        // Balance at which the open ancestor branch closes.
        let mut threshold: Option<isize> = None;
        for &token in row.iter() {
            dangling += arities[token] as isize - 1;
            match threshold {
                None if ancestor_tokens.contains(&token) => threshold = Some(dangling - 1),
                Some(level) if dangling == level => threshold = None,
                _ => {}
            }
        }
        *on = threshold.is_some();
    }
    mask
}

/// Parent code and left sibling of the next node for every row.
///
/// Parents are expressed as [`Library::parent_adjust`] codes and default to
/// [`Library::empty_parent`]; siblings are token ids defaulting to
/// [`Library::empty_sibling`].
pub fn parents_siblings(
    actions: ArrayView2<'_, usize>,
    library: &Library,
) -> (Array1<usize>, Array1<usize>) {
    let arities = library.arities();
    let mut parents = Array1::from_elem(actions.nrows(), library.empty_parent());
    let mut siblings = Array1::from_elem(actions.nrows(), library.empty_sibling());

    for (r, row) in actions.rows().into_iter().enumerate() {
        let Some(&last) = row.iter().last() else {
            continue;
        };
        // Parent is the previous token; no sibling yet.
        if arities[last] > 0 {
            parents[r] = library.parent_adjust(last).unwrap_or(library.empty_parent());
            continue;
        }
        let mut dangling: isize = 0;
        for c in (0..row.len()).rev() {
            dangling += arities[row[c]] as isize - 1;
            if dangling == 0 {
                parents[r] = library
                    .parent_adjust(row[c])
                    .unwrap_or(library.empty_parent());
                siblings[r] = row[c + 1];
                break;
            }
        }
    }

    (parents, siblings)
}

/// Open argument slots after each prefix.
///
/// An empty prefix has one slot (the root). A finished expression has zero.
pub fn dangling(actions: ArrayView2<'_, usize>, arities: &[usize]) -> Array1<usize> {
    actions
        .rows()
        .into_iter()
        .map(|row| {
            let open = row
                .iter()
                .fold(1isize, |acc, &token| acc + arities[token] as isize - 1);
            open.max(0) as usize
        })
        .collect()
}

/// The per-step arrays a prior consumes alongside the action batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralSignals {
    pub parent: Array1<usize>,
    pub sibling: Array1<usize>,
    pub dangling: Array1<usize>,
}

impl StructuralSignals {
    /// Derive all signals for the next node of each prefix.
    pub fn from_actions(actions: ArrayView2<'_, usize>, library: &Library) -> Self {
        let (parent, sibling) = parents_siblings(actions, library);
        Self {
            parent,
            sibling,
            dangling: dangling(actions, library.arities()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    // x1 x2 add mul sin cos exp log const
    fn library() -> Library {
        Library::with_functions(
            2,
            &["add", "mul", "sin", "cos", "exp", "log", "const"],
        )
        .unwrap()
    }

    const X1: usize = 0;
    const ADD: usize = 2;
    const MUL: usize = 3;
    const SIN: usize = 4;
    const COS: usize = 5;
    const CONST: usize = 8;

    #[test]
    fn test_ancestors_open_branch() {
        let lib = library();
        let trig = lib.trig_tokens();
        // sin(mul(x1, ·)) : next node is under sin
        let actions = array![[SIN, MUL, X1]];
        assert_eq!(ancestors(actions.view(), lib.arities(), trig), array![true]);
    }

    #[test]
    fn test_ancestors_closed_branch() {
        let lib = library();
        let trig = lib.trig_tokens();
        // add(sin(x1), ·) : next node is the second argument of add
        let actions = array![[ADD, SIN, X1]];
        assert_eq!(ancestors(actions.view(), lib.arities(), trig), array![false]);
    }

    #[test]
    fn test_ancestors_batch() {
        let lib = library();
        let actions = array![[COS, ADD, X1], [ADD, X1, X1], [MUL, COS, CONST]];
        assert_eq!(
            ancestors(actions.view(), lib.arities(), lib.trig_tokens()),
            array![true, false, false]
        );
    }

    #[test]
    fn test_parents_siblings() {
        let lib = library();
        let actions = array![[ADD, SIN, X1], [MUL, X1, X1], [ADD, MUL, SIN]];
        let (parents, siblings) = parents_siblings(actions.view(), &lib);

        // add(sin(x1), ·): parent add, sibling sin
        assert_eq!(parents[0], lib.parent_adjust(ADD).unwrap());
        assert_eq!(siblings[0], SIN);
        // mul(x1, x1) is complete
        assert_eq!(parents[1], lib.empty_parent());
        assert_eq!(siblings[1], lib.empty_sibling());
        // add(mul(sin(·)...)): parent sin, no sibling
        assert_eq!(parents[2], lib.parent_adjust(SIN).unwrap());
        assert_eq!(siblings[2], lib.empty_sibling());
    }

    #[test]
    fn test_parents_siblings_empty_prefix() {
        let lib = library();
        let actions = Array2::<usize>::zeros((3, 0));
        let (parents, siblings) = parents_siblings(actions.view(), &lib);
        assert!(parents.iter().all(|&p| p == lib.empty_parent()));
        assert!(siblings.iter().all(|&s| s == lib.empty_sibling()));
    }

    #[test]
    fn test_dangling() {
        let lib = library();
        let actions = array![[ADD, SIN, X1], [MUL, X1, X1], [ADD, MUL, SIN]];
        assert_eq!(dangling(actions.view(), lib.arities()), array![1, 0, 3]);
    }

    #[test]
    fn test_signals_from_actions() {
        let lib = library();
        let actions = array![[ADD, X1]];
        let signals = StructuralSignals::from_actions(actions.view(), &lib);
        assert_eq!(signals.parent, array![lib.parent_adjust(ADD).unwrap()]);
        assert_eq!(signals.sibling, array![X1]);
        assert_eq!(signals.dangling, array![1]);
    }
}
