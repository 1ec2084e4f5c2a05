//! Mouse-reporting encoders: classic (`ESC [ M`) and SGR (`ESC [ <`)
//! forms, mode-filtered by which mouse-tracking mode the child program
//! requested (§4.8).

use crate::event::{Event, Modifiers, MouseButton};

/// Which mouse-tracking mode, if any, the child has requested via
/// private DEC modes 1000/1002/1003.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MouseMode {
    /// No mouse reporting.
    #[default]
    Off,
    /// Report button press/release only (mode 1000).
    Normal,
    /// Also report motion while a button is held (mode 1002).
    ButtonEvent,
    /// Report all motion, even with no buttons held (mode 1003).
    AnyEvent,
}

/// Whether SGR extended coordinates (mode 1006) are in effect; if not,
/// the classic single-byte encoding is used (capping coordinates at
/// 223 per the `0x20` offset scheme).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MouseEncoding {
    /// Mouse tracking mode.
    pub mode: MouseMode,
    /// SGR extended coordinate mode (1006).
    pub sgr: bool,
}

fn button_bits(button: MouseButton, modifiers: Modifiers) -> u8 {
    let mut bits = match button {
        MouseButton::Left => 0,
        MouseButton::Middle => 1,
        MouseButton::Right => 2,
    };
    if modifiers.contains(Modifiers::SHIFT) {
        bits |= 0x04;
    }
    if modifiers.contains(Modifiers::ALT) {
        bits |= 0x08;
    }
    if modifiers.contains(Modifiers::CTRL) {
        bits |= 0x10;
    }
    bits
}

/// Encode a mouse `event` as the byte sequence to write to the PTY,
/// given the active `encoding`. Returns `None` when the current mode
/// suppresses this event (e.g. `Off`).
pub fn encode(event: &Event, encoding: MouseEncoding) -> Option<Vec<u8>> {
    if encoding.mode == MouseMode::Off {
        return None;
    }
    let (x, y, button, modifiers, press) = match *event {
        Event::MousePress(x, y, b, m) => (x, y, b, m, true),
        Event::MouseRelease(x, y, b, m) => (x, y, b, m, false),
        _ => return None,
    };
    let bits = button_bits(button, modifiers);
    if encoding.sgr {
        let suffix = if press { 'M' } else { 'm' };
        Some(format!("\x1b[<{};{};{}{}", bits, x + 1, y + 1, suffix).into_bytes())
    } else {
        let code = if press { bits } else { 3 };
        let cx = ((x + 1).min(223) as u8) + 0x20;
        let cy = ((y + 1).min(223) as u8) + 0x20;
        Some(vec![0x1b, b'[', b'M', code + 0x20, cx, cy])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn off_mode_suppresses_everything() {
        let encoding = MouseEncoding::default();
        let event = Event::MousePress(1, 1, MouseButton::Left, Modifiers::NONE);
        assert_eq!(encode(&event, encoding), None);
    }

    #[test]
    fn sgr_press_and_release_differ_in_trailer() {
        let encoding = MouseEncoding { mode: MouseMode::Normal, sgr: true };
        let press = encode(&Event::MousePress(0, 0, MouseButton::Left, Modifiers::NONE), encoding).unwrap();
        let release = encode(&Event::MouseRelease(0, 0, MouseButton::Left, Modifiers::NONE), encoding).unwrap();
        assert!(press.ends_with(b"M"));
        assert!(release.ends_with(b"m"));
    }

    #[test]
    fn classic_encoding_offsets_coordinates() {
        let encoding = MouseEncoding { mode: MouseMode::Normal, sgr: false };
        let bytes = encode(&Event::MousePress(0, 0, MouseButton::Left, Modifiers::NONE), encoding).unwrap();
        assert_eq!(bytes[4], 1 + 0x20);
        assert_eq!(bytes[5], 1 + 0x20);
    }
}
