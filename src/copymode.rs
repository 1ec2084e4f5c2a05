//! Copy-mode: a capability widgets opt into so a key binding can drop
//! into a read-only selection overlay without the widget tree knowing
//! anything about selection or clipboards itself (§4.9).

use std::any::Any;

use crate::canvas::Canvas;
use crate::cell::Attr;
use crate::dimension::RenderSize;
use crate::event::{AppHandle, Event};
use crate::widget::{Composite, Identity, Selector, Widget};

/// Requests that a widget enter or update copy mode. `level` counts how
/// many `CopyCapable` ancestors have already claimed the event on its
/// way down the tree; the deepest claimant wins (§4.9).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CopyModeEvent {
    /// How many `CopyCapable` widgets have already seen this event.
    pub level: u32,
}

/// One piece of text collected out of a copy-mode selection, tagged
/// with the name of the widget (or region) it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CopyResult {
    /// The originating widget's name, for multi-pane disambiguation.
    pub name: String,
    /// The selected text.
    pub value: String,
}

/// A widget that can enter a read-only selection overlay. Orthogonal to
/// [`crate::widget::Widget`], reached the same way the other
/// capabilities are: via `Widget::as_*` accessors a concrete widget
/// opts into.
pub trait CopyCapable {
    /// Attempt to claim `event`. Returns true if this widget (or a
    /// descendant it delegates to) takes over copy mode; a widget that
    /// has no copyable content of its own should still delegate to
    /// children before declining.
    fn claim_copy(&mut self, event: CopyModeEvent) -> bool;

    /// Render the current copy-mode overlay (selection highlight, any
    /// scroll position) at `size`.
    fn render_copy(&self, size: RenderSize, focus: Selector, app: &AppHandle) -> Canvas;

    /// Collect the text currently selected, if any.
    fn collect_clips(&self) -> Vec<CopyResult>;

    /// Give up a previously granted claim. Called on every
    /// `CopyCapable` widget in the tree when copy mode exits or is
    /// about to be re-entered, so a stale claim doesn't linger.
    fn release(&mut self) {}
}

/// A single-child wrapper that makes its inner widget copy-capable,
/// grounded on the same `Composite` shape the widget protocol already
/// defines for single-child composition.
///
/// Delegates a [`CopyModeEvent`] to its inner widget first (so a nested
/// `CopyPane` claims over its own content), and only claims itself if
/// nothing deeper did. Once claimed, `render` switches to
/// `render_copy`'s reverse-video presentation instead of the inner
/// widget's normal rendering — the same "widget consults its own
/// state to change how it renders" shape [`crate::widget::ClickTracker`]
/// uses for `click_pending`.
pub struct CopyPane {
    name: String,
    id: u64,
    inner: Box<dyn Widget>,
    claimed: bool,
}

impl CopyPane {
    /// Wrap `inner` as a copy-capable pane named `name`, identified by
    /// `id` for claim resolution (§4.9 "deepest claimant wins" is
    /// resolved by identity, matching [`crate::click`]'s use of
    /// `Identity` for click correlation).
    pub fn new(name: impl Into<String>, id: u64, inner: Box<dyn Widget>) -> Self {
        Self {
            name: name.into(),
            id,
            inner,
            claimed: false,
        }
    }

    fn selection_text(&self) -> String {
        self.inner
            .as_any()
            .downcast_ref::<crate::widget::Text>()
            .map(|t| t.content().to_string())
            .unwrap_or_default()
    }
}

impl Widget for CopyPane {
    fn render(&self, size: RenderSize, focus: Selector, app: &AppHandle) -> Canvas {
        if self.claimed {
            self.render_copy(size, focus, app)
        } else {
            self.inner.render(size, focus, app)
        }
    }

    fn user_input(&mut self, event: &Event, size: RenderSize, focus: Selector, app: &AppHandle) -> bool {
        self.inner.user_input(event, size, focus, app)
    }

    fn selectable(&self) -> bool {
        self.inner.selectable()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn as_identity(&self) -> Option<&dyn Identity> {
        Some(self)
    }

    fn as_composite(&self) -> Option<&dyn Composite> {
        Some(self)
    }

    fn as_composite_mut(&mut self) -> Option<&mut dyn Composite> {
        Some(self)
    }

    fn as_copy_capable(&self) -> Option<&dyn CopyCapable> {
        Some(self)
    }

    fn as_copy_capable_mut(&mut self) -> Option<&mut dyn CopyCapable> {
        Some(self)
    }
}

impl Composite for CopyPane {
    fn inner(&self) -> &dyn Widget {
        self.inner.as_ref()
    }

    fn inner_mut(&mut self) -> &mut dyn Widget {
        self.inner.as_mut()
    }

    fn set_inner(&mut self, widget: Box<dyn Widget>) {
        self.inner = widget;
        self.claimed = false;
    }
}

impl Identity for CopyPane {
    fn identity(&self) -> u64 {
        self.id
    }
}

impl CopyCapable for CopyPane {
    fn claim_copy(&mut self, _event: CopyModeEvent) -> bool {
        self.claimed = true;
        true
    }

    fn render_copy(&self, size: RenderSize, focus: Selector, app: &AppHandle) -> Canvas {
        let mut canvas = self.inner.render(size, focus, app);
        for y in 0..canvas.height() {
            for x in 0..canvas.width() {
                let mut cell = canvas.cell(x, y).clone();
                cell.style = cell.style.with(Attr::Reverse, true);
                canvas.set_cell(x, y, cell);
            }
        }
        canvas
    }

    fn collect_clips(&self) -> Vec<CopyResult> {
        if self.claimed {
            vec![CopyResult {
                name: self.name.clone(),
                value: self.selection_text(),
            }]
        } else {
            Vec::new()
        }
    }

    fn release(&mut self) {
        self.claimed = false;
    }
}

/// Drives the claim/render/collect protocol over a widget tree (§4.9).
/// Owns nothing about the tree itself — every widget it touches is
/// reached fresh through `Widget`'s capability accessors, the same way
/// [`crate::focus::focus_path`] walks `CompositeMultiple` without owning
/// the tree.
#[derive(Default)]
pub struct CopyModeController {
    claimed_by: Option<u64>,
}

impl CopyModeController {
    /// A controller with no active claim.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether some widget currently holds the copy-mode claim.
    pub fn active(&self) -> bool {
        self.claimed_by.is_some()
    }

    /// Enter (or re-enter) copy mode: release any previous claim, then
    /// descend `root` depth-first, offering every `CopyCapable` widget
    /// the event in order from the root down, but only after its
    /// descendants have had a chance to claim a deeper level first — so
    /// the deepest successful claimant wins. Returns whether anything
    /// claimed.
    pub fn enter(&mut self, root: &mut dyn Widget) -> bool {
        release_all(root);
        self.claimed_by = claim_deepest(root, 0);
        self.active()
    }

    /// Leave copy mode, releasing whichever widget held the claim.
    pub fn exit(&mut self, root: &mut dyn Widget) {
        release_all(root);
        self.claimed_by = None;
    }

    /// Collect clips from the claiming widget only, if any.
    pub fn collect(&self, root: &dyn Widget) -> Vec<CopyResult> {
        match self.claimed_by {
            Some(id) => find_copy_capable(root, id).map(|w| w.collect_clips()).unwrap_or_default(),
            None => Vec::new(),
        }
    }
}

fn release_all(widget: &mut dyn Widget) {
    if let Some(composite) = widget.as_composite_mut() {
        release_all(composite.inner_mut());
    }
    if let Some(multi) = widget.as_composite_multiple_mut() {
        for slot in multi.children_mut() {
            release_all(slot.widget.as_mut());
        }
    }
    if let Some(copy) = widget.as_copy_capable_mut() {
        copy.release();
    }
}

fn claim_deepest(widget: &mut dyn Widget, level: u32) -> Option<u64> {
    if let Some(composite) = widget.as_composite_mut() {
        if let Some(id) = claim_deepest(composite.inner_mut(), level + 1) {
            return Some(id);
        }
    }
    if let Some(multi) = widget.as_composite_multiple_mut() {
        for slot in multi.children_mut() {
            if let Some(id) = claim_deepest(slot.widget.as_mut(), level + 1) {
                return Some(id);
            }
        }
    }
    let claimed = widget.as_copy_capable_mut().map(|c| c.claim_copy(CopyModeEvent { level })).unwrap_or(false);
    if claimed {
        widget.as_identity().map(|i| i.identity())
    } else {
        None
    }
}

fn find_copy_capable(widget: &dyn Widget, id: u64) -> Option<&dyn CopyCapable> {
    if widget.as_identity().map(|i| i.identity()) == Some(id) {
        if let Some(copy) = widget.as_copy_capable() {
            return Some(copy);
        }
    }
    if let Some(composite) = widget.as_composite() {
        if let Some(found) = find_copy_capable(composite.inner(), id) {
            return Some(found);
        }
    }
    if let Some(multi) = widget.as_composite_multiple() {
        for slot in multi.children() {
            if let Some(found) = find_copy_capable(slot.widget.as_ref(), id) {
                return Some(found);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::Text;

    struct Pane {
        claimed: bool,
        text: String,
    }

    impl CopyCapable for Pane {
        fn claim_copy(&mut self, _event: CopyModeEvent) -> bool {
            self.claimed = true;
            true
        }

        fn render_copy(&self, size: RenderSize, _focus: Selector, _app: &AppHandle) -> Canvas {
            Canvas::blank(size.cols().unwrap_or(1), size.rows().unwrap_or(1))
        }

        fn collect_clips(&self) -> Vec<CopyResult> {
            vec![CopyResult {
                name: "pane".to_string(),
                value: self.text.clone(),
            }]
        }
    }

    #[test]
    fn claim_copy_marks_the_widget_claimed() {
        let mut pane = Pane { claimed: false, text: "hi".to_string() };
        assert!(pane.claim_copy(CopyModeEvent { level: 0 }));
        assert!(pane.claimed);
    }

    #[test]
    fn collect_clips_returns_the_selected_text() {
        let pane = Pane { claimed: true, text: "selected text".to_string() };
        let clips = pane.collect_clips();
        assert_eq!(clips, vec![CopyResult { name: "pane".to_string(), value: "selected text".to_string() }]);
    }

    #[test]
    fn copy_pane_claims_and_renders_in_reverse_video() {
        let mut pane = CopyPane::new("solo", 1, Box::new(Text::new("hi")));
        let mut controller = CopyModeController::new();
        assert!(controller.enter(&mut pane));
        let canvas = pane.render(RenderSize::Box(2, 1), Selector::none(), &crate::event::test_handle());
        assert!(canvas.cell(0, 0).style.is_on(Attr::Reverse));
    }

    #[test]
    fn collect_after_claim_returns_the_pane_text() {
        let mut pane = CopyPane::new("solo", 1, Box::new(Text::new("selected text")));
        let mut controller = CopyModeController::new();
        controller.enter(&mut pane);
        let clips = controller.collect(&pane);
        assert_eq!(clips, vec![CopyResult { name: "solo".to_string(), value: "selected text".to_string() }]);
    }

    /// Scenario §8.4: two nested copy-capable widgets, A (outer) wrapping
    /// B (inner). Entering copy mode claims B, the deeper widget;
    /// collecting returns only B's clip.
    #[test]
    fn nested_panes_claim_travels_to_the_deepest_widget() {
        let b = CopyPane::new("b", 2, Box::new(Text::new("inner text")));
        let mut a = CopyPane::new("a", 1, Box::new(b));
        let mut controller = CopyModeController::new();

        assert!(controller.enter(&mut a));
        let clips = controller.collect(&a);
        assert_eq!(clips, vec![CopyResult { name: "b".to_string(), value: "inner text".to_string() }]);

        assert!(!a.claimed, "the outer pane must not also claim when the inner one did");
    }

    /// Scenario §8.4 continued: when B is removed (replaced by a plain,
    /// non-copy-capable widget), the claim travels to A.
    #[test]
    fn claim_travels_to_the_outer_pane_once_the_inner_one_is_removed() {
        let mut a = CopyPane::new("a", 1, Box::new(Text::new("outer text")));
        a.set_inner(Box::new(Text::new("replacement, not copy-capable")));

        let mut controller = CopyModeController::new();
        assert!(controller.enter(&mut a));
        let clips = controller.collect(&a);
        assert_eq!(clips, vec![CopyResult { name: "a".to_string(), value: "replacement, not copy-capable".to_string() }]);
    }

    #[test]
    fn exiting_copy_mode_releases_the_claim_and_clears_reverse_video() {
        let mut pane = CopyPane::new("solo", 1, Box::new(Text::new("hi")));
        let mut controller = CopyModeController::new();
        controller.enter(&mut pane);
        controller.exit(&mut pane);
        assert!(controller.collect(&pane).is_empty());
        let canvas = pane.render(RenderSize::Box(2, 1), Selector::none(), &crate::event::test_handle());
        assert!(!canvas.cell(0, 0).style.is_on(Attr::Reverse));
    }
}
