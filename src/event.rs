//! The event model (§3) and the handle widgets use to talk back to the
//! running [`crate::app::App`].

use std::sync::Arc;

use crossbeam_channel::Sender;

/// A key code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A character key.
    Char(char),
    /// Function key `Fn`.
    Function(u8),
    Enter,
    Tab,
    Backspace,
    Delete,
    Insert,
    Escape,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

/// Keyboard modifier flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    bits: u8,
}

impl Modifiers {
    /// No modifiers.
    pub const NONE: Modifiers = Modifiers { bits: 0 };
    /// Shift.
    pub const SHIFT: Modifiers = Modifiers { bits: 0b001 };
    /// Ctrl.
    pub const CTRL: Modifiers = Modifiers { bits: 0b010 };
    /// Alt/Meta.
    pub const ALT: Modifiers = Modifiers { bits: 0b100 };

    /// Bitwise-or two modifier sets.
    pub fn union(self, other: Modifiers) -> Modifiers {
        Modifiers { bits: self.bits | other.bits }
    }

    /// True if `other`'s bits are all set in `self`.
    pub fn contains(self, other: Modifiers) -> bool {
        self.bits & other.bits == other.bits
    }
}

/// A keyboard event. Keys compare by equality on (code, modifiers).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    /// The key code.
    pub code: KeyCode,
    /// Active modifiers.
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// A plain key press with no modifiers.
    pub fn plain(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
        }
    }
}

/// A mouse button.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left button.
    Left,
    /// Middle button.
    Middle,
    /// Right button.
    Right,
}

/// One of: a terminal-observed event, a PTY title/bell/exit
/// notification fed back as an after-render task result, or an
/// application interrupt.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A key was pressed.
    KeyPress(KeyEvent),
    /// A mouse button went down at `(x, y)`.
    MousePress(usize, usize, MouseButton, Modifiers),
    /// A mouse button was released at `(x, y)`.
    MouseRelease(usize, usize, MouseButton, Modifiers),
    /// The terminal was resized.
    Resize(usize, usize),
    /// Text was pasted (bracketed paste).
    Paste(String),
    /// Requests the loop to stop waiting and re-check shutdown state.
    Interrupt,
}

/// A task scheduled to run after the next render, on the main thread
/// (§4.6).
pub type AfterRenderTask = Box<dyn FnOnce(&AppHandle) + Send>;

/// The handle widgets and callbacks use to talk back to the running
/// app: schedule after-render work, or request a quit. Cheaply
/// cloneable; all state is behind `Arc`.
#[derive(Clone)]
pub struct AppHandle {
    pub(crate) after_render_tx: Sender<AfterRenderTask>,
    pub(crate) closing: Arc<std::sync::Mutex<bool>>,
}

impl AppHandle {
    /// Schedule `task` to run after the next render, on the main
    /// thread. Returns `AppClosing` if the app has already been told to
    /// quit.
    pub fn run(&self, task: AfterRenderTask) -> Result<(), crate::error::LoomwidError> {
        let closing = self.closing.lock().unwrap_or_else(|e| e.into_inner());
        if *closing {
            return Err(crate::error::LoomwidError::AppClosing);
        }
        drop(closing);
        self.after_render_tx
            .send(task)
            .map_err(|_| crate::error::LoomwidError::AppClosing)
    }

    /// Request the event loop to stop after the current iteration.
    pub fn quit(&self) {
        let mut closing = self.closing.lock().unwrap_or_else(|e| e.into_inner());
        *closing = true;
    }

    /// Whether `quit()` has been called.
    pub fn is_closing(&self) -> bool {
        *self.closing.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Build an [`AppHandle`] with a channel nobody drains, for use in
/// widget unit tests that need to pass a handle through but never
/// schedule after-render work.
#[cfg(any(test, feature = "test-util"))]
pub fn test_handle() -> AppHandle {
    let (tx, _rx) = crossbeam_channel::unbounded();
    AppHandle {
        after_render_tx: tx,
        closing: Arc::new(std::sync::Mutex::new(false)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_equality_on_code_and_modifiers() {
        let a = KeyEvent {
            code: KeyCode::Char('a'),
            modifiers: Modifiers::CTRL,
        };
        let b = KeyEvent {
            code: KeyCode::Char('a'),
            modifiers: Modifiers::CTRL,
        };
        let c = KeyEvent {
            code: KeyCode::Char('a'),
            modifiers: Modifiers::NONE,
        };
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn modifiers_contains() {
        let m = Modifiers::CTRL.union(Modifiers::SHIFT);
        assert!(m.contains(Modifiers::CTRL));
        assert!(!m.contains(Modifiers::ALT));
    }
}
