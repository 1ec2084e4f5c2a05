//! The widget protocol and composition capabilities (§4.4).

mod columns;
mod fill;
mod pile;
mod text;

pub use columns::Columns;
pub use fill::Fill;
pub use pile::Pile;
pub use text::{Align, Text, Wrap};

use crate::canvas::Canvas;
use crate::dimension::{Dimension, RenderSize};
use crate::event::{AppHandle, Event};

/// Whether a widget is in the focus path, and whether a parent has
/// additionally marked it "selected" (a container may select a child
/// independently of the focus path, e.g. to render it highlighted while
/// the container itself is unfocused).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Selector {
    /// This widget is on the path from the root to the focused leaf.
    pub focus: bool,
    /// A parent has selected this child for rendering purposes.
    pub selected: bool,
}

impl Selector {
    /// Neither focused nor selected.
    pub fn none() -> Self {
        Self::default()
    }

    /// Both focused and selected — the common case for the focus leaf
    /// itself.
    pub fn focused() -> Self {
        Self {
            focus: true,
            selected: true,
        }
    }
}

/// Every widget implements render / render_size / user_input /
/// selectable.
pub trait Widget {
    /// Render at `size` with the given focus selector.
    fn render(&self, size: RenderSize, focus: Selector, app: &AppHandle) -> Canvas;

    /// The box size this widget would render at for `size`.
    fn render_size(&self, size: RenderSize, focus: Selector, app: &AppHandle) -> (usize, usize) {
        let canvas = self.render(size, focus, app);
        (canvas.width(), canvas.height())
    }

    /// Handle an input event. Returns true if handled (consumed).
    fn user_input(&mut self, _event: &Event, _size: RenderSize, _focus: Selector, _app: &AppHandle) -> bool {
        false
    }

    /// Whether this widget can receive focus.
    fn selectable(&self) -> bool {
        false
    }

    /// Downcast support, used by a few call sites (e.g. click
    /// correlation) that need concrete-type equality.
    fn as_any(&self) -> &dyn std::any::Any;

    /// Mutable downcast support.
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;

    /// Expose the [`CompositeMultiple`] capability, if this widget has
    /// it. Default: no. Per §9, capabilities are orthogonal interfaces a
    /// concrete widget opts into rather than inherits; this is the seam
    /// that lets focus-path code reach the capability from a `&dyn
    /// Widget` without a supertrait link.
    fn as_composite_multiple(&self) -> Option<&dyn CompositeMultiple> {
        None
    }

    /// Mutable counterpart of [`Widget::as_composite_multiple`].
    fn as_composite_multiple_mut(&mut self) -> Option<&mut dyn CompositeMultiple> {
        None
    }

    /// Expose the [`Identity`] capability, if this widget has it.
    fn as_identity(&self) -> Option<&dyn Identity> {
        None
    }

    /// Expose the [`Clickable`] capability, if this widget has it.
    fn as_clickable_mut(&mut self) -> Option<&mut dyn Clickable> {
        None
    }

    /// Expose the [`ClickTracker`] capability, if this widget has it.
    fn as_click_tracker_mut(&mut self) -> Option<&mut dyn ClickTracker> {
        None
    }

    /// Expose the [`Composite`] capability, if this widget has it.
    fn as_composite(&self) -> Option<&dyn Composite> {
        None
    }

    /// Mutable counterpart of [`Widget::as_composite`].
    fn as_composite_mut(&mut self) -> Option<&mut dyn Composite> {
        None
    }

    /// Expose the [`crate::copymode::CopyCapable`] capability, if this
    /// widget has it.
    fn as_copy_capable(&self) -> Option<&dyn crate::copymode::CopyCapable> {
        None
    }

    /// Mutable counterpart of [`Widget::as_copy_capable`].
    fn as_copy_capable_mut(&mut self) -> Option<&mut dyn crate::copymode::CopyCapable> {
        None
    }
}

/// A single-child composition capability: get/set the inner widget.
pub trait Composite {
    /// Borrow the inner widget.
    fn inner(&self) -> &dyn Widget;
    /// Mutably borrow the inner widget.
    fn inner_mut(&mut self) -> &mut dyn Widget;
    /// Replace the inner widget.
    fn set_inner(&mut self, widget: Box<dyn Widget>);
}

/// A per-child layout descriptor paired with a child widget, as stored
/// by [`CompositeMultiple`] widgets.
pub struct ChildSlot {
    /// The child widget.
    pub widget: Box<dyn Widget>,
    /// Its layout dimension within the parent.
    pub dimension: Dimension,
}

/// An ordered-children composition capability with a current focus
/// index.
pub trait CompositeMultiple {
    /// Borrow the children in order.
    fn children(&self) -> &[ChildSlot];
    /// Mutably borrow the children in order.
    fn children_mut(&mut self) -> &mut Vec<ChildSlot>;
    /// The index of the currently focused child, if any.
    fn focus_index(&self) -> Option<usize>;
    /// Set the focus index. Implementations should clamp/validate.
    fn set_focus_index(&mut self, index: Option<usize>);
}

/// A stable identity value used for click correlation across rebuilds
/// (§3 "Widget tree" identity, §4.7).
pub trait Identity {
    /// The widget's stable identity.
    fn identity(&self) -> u64;
}

/// A widget that reacts to being clicked.
pub trait Clickable {
    /// Invoked when a tracked click-down/click-up pair resolves on this
    /// widget.
    fn click(&mut self, app: &AppHandle);
}

/// A widget that reacts to key presses directly (as opposed to through
/// the generic `user_input`).
pub trait KeyPress {
    /// Handle a key press, returning true if consumed.
    fn key_press(&mut self, key: &crate::event::KeyEvent, app: &AppHandle) -> bool;
}

/// A widget that tracks a "click pending" flag for visual affordance
/// (e.g. a button rendering pressed while the mouse is down over it).
pub trait ClickTracker {
    /// Whether a click is currently pending on this widget.
    fn click_pending(&self) -> bool;
    /// Set the pending flag.
    fn set_click_pending(&mut self, pending: bool);
}

/// A widget that remembers a preferred column or row, used for vertical
/// or horizontal navigation across children of varying width/height.
pub trait PreferredPosition {
    /// The preferred position, if one has been recorded.
    fn preferred_position(&self) -> Option<usize>;
    /// Record a preferred position.
    fn set_preferred_position(&mut self, pos: Option<usize>);
}

/// Find the first selectable child starting at `from`, scanning in
/// `direction` (+1 or -1), optionally wrapping (§4.4).
pub fn find_next_selectable(children: &[ChildSlot], from: isize, direction: isize, wrap: bool) -> Option<usize> {
    let len = children.len() as isize;
    if len == 0 {
        return None;
    }
    let mut i = from + direction;
    let mut steps = 0;
    loop {
        if i < 0 || i >= len {
            if !wrap {
                return None;
            }
            i = i.rem_euclid(len);
        }
        if children[i as usize].widget.selectable() {
            return Some(i as usize);
        }
        steps += 1;
        if steps >= len {
            return None;
        }
        i += direction;
    }
}
