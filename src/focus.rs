//! Focus paths over the widget tree (§4.4, §4.7).

use crate::widget::{CompositeMultiple, Widget};

/// A sequence of child indices, one per [`CompositeMultiple`] level
/// descended into, from root to a leaf.
pub type FocusPath = Vec<usize>;

/// The outcome of applying a focus path: full success, or the level at
/// which descent could not proceed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetFocusOutcome {
    /// Every index in the path was applied.
    Success,
    /// Descent stopped at this (0-based) depth: either the node at that
    /// depth wasn't composite-multiple, or the index was out of range.
    StoppedAt(usize),
}

/// Compute the focus path for `w`: repeatedly read the focus index of
/// each [`CompositeMultiple`] node encountered while descending.
pub fn focus_path(mut w: &dyn Widget) -> FocusPath {
    let mut path = Vec::new();
    while let Some(multi) = w.as_composite_multiple() {
        let Some(idx) = multi.focus_index() else {
            break;
        };
        let Some(child) = multi.children().get(idx) else {
            break;
        };
        path.push(idx);
        w = child.widget.as_ref();
    }
    path
}

/// Apply `path` to `w`, descending one [`CompositeMultiple`] level per
/// index. Returns `Success` if the whole path applied, or the depth at
/// which it could not.
pub fn set_focus_path(mut w: &mut dyn Widget, path: &FocusPath) -> SetFocusOutcome {
    for (depth, &idx) in path.iter().enumerate() {
        let Some(multi) = w.as_composite_multiple_mut() else {
            return SetFocusOutcome::StoppedAt(depth);
        };
        if idx >= multi.children().len() {
            return SetFocusOutcome::StoppedAt(depth);
        }
        multi.set_focus_index(Some(idx));
        w = multi.children_mut()[idx].widget.as_mut();
    }
    SetFocusOutcome::Success
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::{CompositeMultiple, Pile};

    #[test]
    fn empty_tree_has_empty_path() {
        let w = Pile::new(Vec::new());
        let path = focus_path(&w);
        assert!(path.is_empty());
    }

    #[test]
    fn set_focus_path_is_noop_when_reapplied() {
        let mut w = Pile::from_texts(&["a", "b", "c"]);
        w.set_focus_index(Some(1));
        let path = focus_path(&w);
        let outcome = set_focus_path(&mut w, &path);
        assert_eq!(outcome, SetFocusOutcome::Success);
        assert_eq!(focus_path(&w), path);
    }
}
