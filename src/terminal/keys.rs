//! Key → escape-sequence encoding for bytes written to the child PTY
//! (§4.8). DECCKM-aware for the cursor keys; xterm-compatible tables
//! for function keys.

use crate::event::{KeyCode, KeyEvent, Modifiers};

/// Whether DECCKM (cursor key application mode, `ESC[?1h`) is active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyEncodingState {
    /// Application cursor-key mode.
    pub application_cursor_keys: bool,
}

fn modifier_param(modifiers: Modifiers) -> Option<u8> {
    let mut param = 1u8;
    if modifiers.contains(Modifiers::SHIFT) {
        param += 1;
    }
    if modifiers.contains(Modifiers::ALT) {
        param += 2;
    }
    if modifiers.contains(Modifiers::CTRL) {
        param += 4;
    }
    if param == 1 {
        None
    } else {
        Some(param)
    }
}

/// Encode a key event as the bytes to write to the PTY.
pub fn encode(key: &KeyEvent, state: KeyEncodingState) -> Vec<u8> {
    match key.code {
        KeyCode::Char(c) => encode_char(c, key.modifiers),
        KeyCode::Enter => b"\r".to_vec(),
        KeyCode::Tab => b"\t".to_vec(),
        KeyCode::Backspace => vec![0x7f],
        KeyCode::Escape => vec![0x1b],
        KeyCode::Delete => b"\x1b[3~".to_vec(),
        KeyCode::Insert => b"\x1b[2~".to_vec(),
        KeyCode::Up => cursor_key('A', state, key.modifiers),
        KeyCode::Down => cursor_key('B', state, key.modifiers),
        KeyCode::Right => cursor_key('C', state, key.modifiers),
        KeyCode::Left => cursor_key('D', state, key.modifiers),
        KeyCode::Home => cursor_key('H', state, key.modifiers),
        KeyCode::End => cursor_key('F', state, key.modifiers),
        KeyCode::PageUp => b"\x1b[5~".to_vec(),
        KeyCode::PageDown => b"\x1b[6~".to_vec(),
        KeyCode::Function(n) => function_key(n, key.modifiers),
    }
}

fn encode_char(c: char, modifiers: Modifiers) -> Vec<u8> {
    if modifiers.contains(Modifiers::CTRL) {
        if let Some(code) = ctrl_code(c) {
            return vec![code];
        }
    }
    let mut buf = [0u8; 4];
    let s = c.encode_utf8(&mut buf);
    if modifiers.contains(Modifiers::ALT) {
        let mut out = vec![0x1b];
        out.extend_from_slice(s.as_bytes());
        out
    } else {
        s.as_bytes().to_vec()
    }
}

fn ctrl_code(c: char) -> Option<u8> {
    let upper = c.to_ascii_uppercase();
    if upper.is_ascii_uppercase() {
        Some((upper as u8) - b'A' + 1)
    } else {
        None
    }
}

fn cursor_key(letter: char, state: KeyEncodingState, modifiers: Modifiers) -> Vec<u8> {
    match modifier_param(modifiers) {
        Some(param) => format!("\x1b[1;{param}{letter}").into_bytes(),
        None if state.application_cursor_keys => format!("\x1bO{letter}").into_bytes(),
        None => format!("\x1b[{letter}").into_bytes(),
    }
}

fn function_key(n: u8, modifiers: Modifiers) -> Vec<u8> {
    if (1..=4).contains(&n) {
        let letter = (b'P' + (n - 1)) as char;
        return match modifier_param(modifiers) {
            Some(param) => format!("\x1b[1;{param}{letter}").into_bytes(),
            None => format!("\x1bO{letter}").into_bytes(),
        };
    }
    let code = match n {
        5 => 15,
        6 => 17,
        7 => 18,
        8 => 19,
        9 => 20,
        10 => 21,
        11 => 23,
        12 => 24,
        13 => 25,
        14 => 26,
        15 => 28,
        16 => 29,
        17 => 31,
        18 => 32,
        19 => 33,
        20 => 34,
        _ => return Vec::new(),
    };
    match modifier_param(modifiers) {
        Some(param) => format!("\x1b[{code};{param}~").into_bytes(),
        None => format!("\x1b[{code}~").into_bytes(),
    }
}

/// Wrap `text` in bracketed-paste markers when the child has enabled
/// mode 2004 and the caller opted into bracketed paste; otherwise
/// return it unwrapped.
pub fn encode_paste(text: &str, bracketed: bool) -> Vec<u8> {
    if bracketed {
        let mut out = b"\x1b[200~".to_vec();
        out.extend_from_slice(text.as_bytes());
        out.extend_from_slice(b"\x1b[201~");
        out
    } else {
        text.as_bytes().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::KeyEvent;

    #[test]
    fn plain_arrow_uses_normal_mode_sequence() {
        let key = KeyEvent::plain(KeyCode::Up);
        let bytes = encode(&key, KeyEncodingState::default());
        assert_eq!(bytes, b"\x1b[A");
    }

    #[test]
    fn application_mode_arrow_uses_ss3() {
        let key = KeyEvent::plain(KeyCode::Up);
        let state = KeyEncodingState { application_cursor_keys: true };
        let bytes = encode(&key, state);
        assert_eq!(bytes, b"\x1bOA");
    }

    #[test]
    fn ctrl_char_maps_to_control_code() {
        let key = KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: Modifiers::CTRL,
        };
        let bytes = encode(&key, KeyEncodingState::default());
        assert_eq!(bytes, vec![3]);
    }

    #[test]
    fn backspace_sends_del() {
        let key = KeyEvent::plain(KeyCode::Backspace);
        assert_eq!(encode(&key, KeyEncodingState::default()), vec![0x7f]);
    }

    #[test]
    fn f1_plain_uses_ss3() {
        let key = KeyEvent::plain(KeyCode::Function(1));
        assert_eq!(encode(&key, KeyEncodingState::default()), b"\x1bOP");
    }

    #[test]
    fn f1_with_shift_uses_csi_modifier_form() {
        let key = KeyEvent {
            code: KeyCode::Function(1),
            modifiers: Modifiers::SHIFT,
        };
        assert_eq!(encode(&key, KeyEncodingState::default()), b"\x1b[1;2P");
    }

    #[test]
    fn bracketed_paste_wraps_text() {
        let bytes = encode_paste("hi", true);
        assert_eq!(bytes, b"\x1b[200~hi\x1b[201~");
    }

    #[test]
    fn unbracketed_paste_is_literal() {
        let bytes = encode_paste("hi", false);
        assert_eq!(bytes, b"hi");
    }
}
