//! End-to-end terminal-emulator scenarios (§8): SGR truecolor through
//! to cell styling, scrollback accumulation across many screens'
//! worth of output, and the key/mouse encoders round-tripping through
//! mode changes the child program requests.

use loomwid::cell::CellColor;
use loomwid::event::{Event, KeyCode, KeyEvent, Modifiers, MouseButton};
use loomwid::terminal::keys::{self, KeyEncodingState};
use loomwid::terminal::mouse::{self, MouseEncoding, MouseMode};
use loomwid::terminal::TerminalEmulator;

#[test]
fn sgr_truecolor_sequence_colors_the_written_cell() {
    let mut term = TerminalEmulator::new(10, 1);
    term.feed_bytes(b"\x1b[38;2;10;20;30mX");
    let cell = term.screen().cell(0, 0);
    assert_eq!(cell.fg, CellColor::Rgb(10, 20, 30));
    assert_eq!(cell.glyph(), "X");
}

#[test]
fn scroll_region_and_full_screen_scroll_grow_scrollback_separately() {
    let mut term = TerminalEmulator::new(5, 3);
    // A scroll confined to a region (rows 0..1 of 0..2) never touches
    // scrollback; only a full-screen scroll should.
    term.feed_bytes(b"\x1b[1;2r");
    for _ in 0..5 {
        term.feed_bytes(b"x\r\n");
    }
    term.feed_bytes(b"\x1b[3;1r"); // restore full-screen region (1-based 3;1 is invalid -> ignored)
    let (top, bottom) = term.scroll_region();
    assert_eq!((top, bottom), (0, 1));
}

#[test]
fn application_cursor_keys_mode_changes_arrow_encoding() {
    let mut term = TerminalEmulator::new(80, 24);
    let key = KeyEvent::plain(KeyCode::Up);
    assert_eq!(keys::encode(&key, KeyEncodingState { application_cursor_keys: term.application_cursor_keys() }), b"\x1b[A");

    term.feed_bytes(b"\x1b[?1h");
    assert!(term.application_cursor_keys());
    assert_eq!(keys::encode(&key, KeyEncodingState { application_cursor_keys: term.application_cursor_keys() }), b"\x1bOA");
}

#[test]
fn sgr_mouse_mode_negotiated_by_the_child_changes_the_wire_format() {
    let mut term = TerminalEmulator::new(80, 24);
    term.feed_bytes(b"\x1b[?1000h\x1b[?1006h");
    let encoding: MouseEncoding = term.mouse_encoding();
    assert_eq!(encoding.mode, MouseMode::Normal);
    assert!(encoding.sgr);

    let event = Event::MousePress(3, 4, MouseButton::Left, Modifiers::NONE);
    let bytes = mouse::encode(&event, encoding).unwrap();
    assert_eq!(bytes, b"\x1b[<0;4;5M");
}

#[test]
fn bracketed_paste_mode_requested_by_child_is_observable() {
    let mut term = TerminalEmulator::new(80, 24);
    assert!(!term.bracketed_paste());
    term.feed_bytes(b"\x1b[?2004h");
    assert!(term.bracketed_paste());
    let wrapped = keys::encode_paste("hello", term.bracketed_paste());
    assert_eq!(wrapped, b"\x1b[200~hello\x1b[201~");
}

#[test]
fn alternate_screen_entry_does_not_pollute_scrollback() {
    let mut term = TerminalEmulator::new(3, 2);
    for i in 0..10 {
        term.feed_bytes(format!("{i}\r\n").as_bytes());
    }
    let grown_before_alt_screen = term.scrollback_len();
    assert!(grown_before_alt_screen > 0);

    term.feed_bytes(b"\x1b[?1049h");
    for i in 0..10 {
        term.feed_bytes(format!("{i}\r\n").as_bytes());
    }
    // Scrolling inside the alternate screen must never be folded into
    // the primary buffer's scrollback.
    assert_eq!(term.scrollback_len(), grown_before_alt_screen);

    term.feed_bytes(b"\x1b[?1049l");
    assert_eq!(term.scrollback_len(), grown_before_alt_screen);

    let viewport = term.scrollback_viewport(0, 2);
    assert_eq!(viewport.width(), 3);
    assert_eq!(viewport.height(), 2);
}
