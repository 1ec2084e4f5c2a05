//! Click/mouse tracking with identity-based correlation across widget
//! rebuilds (§4.7).

use std::collections::HashMap;

use crate::event::MouseButton;

/// An opaque stable identity for a widget, captured at press time and
/// compared against identities found by re-walking the tree at release
/// time. Backed by [`crate::widget::Identity`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IdentityValue(pub u64);

/// Per-button mouse-down state: the identity that was under the
/// pointer when the button went down, and where.
#[derive(Clone, Copy, Debug)]
struct PendingClick {
    identity: IdentityValue,
    at: (usize, usize),
}

/// Tracks in-flight mouse-down/mouse-up pairs per button and resolves
/// them to a click when the same identity is found at release time.
#[derive(Default)]
pub struct ClickTargets {
    pending: HashMap<MouseButton, PendingClick>,
}

impl ClickTargets {
    /// No buttons currently down.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a mouse-down on `identity` at `(x, y)` for `button`.
    pub fn press(&mut self, button: MouseButton, identity: IdentityValue, at: (usize, usize)) {
        self.pending.insert(button, PendingClick { identity, at });
    }

    /// Resolve a mouse-up for `button`. If `identity` at release time
    /// matches the identity captured at press time, this is a click and
    /// `Some(identity)` is returned; the pending state for `button` is
    /// cleared either way.
    pub fn release(&mut self, button: MouseButton, identity: Option<IdentityValue>) -> Option<IdentityValue> {
        let pending = self.pending.remove(&button)?;
        let released_on = identity?;
        if pending.identity == released_on {
            Some(released_on)
        } else {
            None
        }
    }

    /// Whether `button` currently has a pending mouse-down.
    pub fn is_pending(&self, button: MouseButton) -> bool {
        self.pending.contains_key(&button)
    }

    /// The position a pending click on `button` started at, if any.
    pub fn pending_at(&self, button: MouseButton) -> Option<(usize, usize)> {
        self.pending.get(&button).map(|p| p.at)
    }

    /// Clear all pending clicks, e.g. on focus loss or window resize.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_then_matching_release_is_a_click() {
        let mut targets = ClickTargets::new();
        targets.press(MouseButton::Left, IdentityValue(1), (2, 3));
        let result = targets.release(MouseButton::Left, Some(IdentityValue(1)));
        assert_eq!(result, Some(IdentityValue(1)));
        assert!(!targets.is_pending(MouseButton::Left));
    }

    #[test]
    fn release_over_different_identity_is_not_a_click() {
        let mut targets = ClickTargets::new();
        targets.press(MouseButton::Left, IdentityValue(1), (0, 0));
        let result = targets.release(MouseButton::Left, Some(IdentityValue(2)));
        assert_eq!(result, None);
    }

    #[test]
    fn release_with_no_pending_press_is_none() {
        let mut targets = ClickTargets::new();
        assert_eq!(targets.release(MouseButton::Right, Some(IdentityValue(9))), None);
    }

    #[test]
    fn buttons_tracked_independently() {
        let mut targets = ClickTargets::new();
        targets.press(MouseButton::Left, IdentityValue(1), (0, 0));
        targets.press(MouseButton::Right, IdentityValue(2), (0, 0));
        assert!(targets.is_pending(MouseButton::Left));
        assert!(targets.is_pending(MouseButton::Right));
        targets.release(MouseButton::Left, Some(IdentityValue(1)));
        assert!(!targets.is_pending(MouseButton::Left));
        assert!(targets.is_pending(MouseButton::Right));
    }
}
