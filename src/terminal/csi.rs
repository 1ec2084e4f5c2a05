//! The CSI dispatch table (§4.8): cursor motion, erase, scroll
//! regions, mode set/reset, and device status queries.

use crate::terminal::mouse::MouseMode;
use crate::terminal::TerminalEmulator;

/// Dispatch one parsed CSI sequence against `term`.
pub fn dispatch(term: &mut TerminalEmulator, private: bool, params: &[u16], intermediates: &[u8], final_byte: u8) {
    let p = |i: usize, default: u16| -> u16 {
        let v = params.get(i).copied().unwrap_or(0);
        if v == 0 {
            default
        } else {
            v
        }
    };

    if private {
        match final_byte {
            b'h' => set_private_modes(term, params, true),
            b'l' => set_private_modes(term, params, false),
            _ => {}
        }
        return;
    }

    match final_byte {
        b'@' => term.insert_blank_chars(p(0, 1) as usize),
        b'A' => term.move_cursor(0, -(p(0, 1) as i64)),
        b'B' => term.move_cursor(0, p(0, 1) as i64),
        b'C' => term.move_cursor(p(0, 1) as i64, 0),
        b'D' => term.move_cursor(-(p(0, 1) as i64), 0),
        b'E' => {
            term.move_cursor(0, p(0, 1) as i64);
            term.set_cursor_col(0);
        }
        b'F' => {
            term.move_cursor(0, -(p(0, 1) as i64));
            term.set_cursor_col(0);
        }
        b'G' => term.set_cursor_col(p(0, 1) as usize - 1),
        b'H' | b'f' => term.set_cursor_pos(p(1, 1) as usize - 1, p(0, 1) as usize - 1),
        b'J' => term.erase_in_display(p(0, 0)),
        b'K' => term.erase_in_line(p(0, 0)),
        b'L' => term.insert_blank_lines(p(0, 1) as usize),
        b'M' => term.delete_lines(p(0, 1) as usize),
        b'P' => term.delete_chars(p(0, 1) as usize),
        b'X' => term.erase_chars(p(0, 1) as usize),
        b'S' => term.scroll_up(p(0, 1) as usize),
        b'T' => term.scroll_down(p(0, 1) as usize),
        b'c' if intermediates.is_empty() => term.queue_reply(b"\x1b[?6c".to_vec()),
        b'd' => term.set_cursor_row(p(0, 1) as usize - 1),
        b'g' => term.clear_tabstop(p(0, 0)),
        b'h' => set_ansi_modes(term, params, true),
        b'l' => set_ansi_modes(term, params, false),
        b'm' => term.apply_sgr(params),
        b'n' => match p(0, 0) {
            5 => term.queue_reply(b"\x1b[0n".to_vec()),
            6 => {
                let (col, row) = term.cursor_pos();
                term.queue_reply(format!("\x1b[{};{}R", row + 1, col + 1).into_bytes());
            }
            _ => {}
        },
        b'q' if intermediates.is_empty() => term.set_keyboard_leds(params),
        b'r' => {
            let top = p(0, 1) as usize - 1;
            let bottom = params.get(1).copied().filter(|&v| v != 0).map(|v| v as usize - 1);
            term.set_scroll_region(top, bottom);
        }
        b's' => term.save_cursor(),
        b'u' => term.restore_cursor(),
        _ => {}
    }
}

fn set_ansi_modes(term: &mut TerminalEmulator, params: &[u16], on: bool) {
    for &param in params {
        match param {
            4 => term.set_insert_mode(on),
            20 => term.set_newline_mode(on),
            _ => {}
        }
    }
}

fn set_private_modes(term: &mut TerminalEmulator, params: &[u16], on: bool) {
    for &param in params {
        match param {
            1 => term.set_application_cursor_keys(on),
            3 => term.resize_columns(if on { 132 } else { 80 }),
            5 => term.set_reverse_video(on),
            6 => term.set_origin_mode(on),
            7 => term.set_autowrap(on),
            25 => term.set_cursor_visible(on),
            1000 => term.set_mouse_mode(if on { MouseMode::Normal } else { MouseMode::Off }),
            1002 => term.set_mouse_mode(if on { MouseMode::ButtonEvent } else { MouseMode::Off }),
            1003 => term.set_mouse_mode(if on { MouseMode::AnyEvent } else { MouseMode::Off }),
            1006 => term.set_mouse_sgr(on),
            2004 => term.set_bracketed_paste(on),
            1049 => term.set_alternate_screen(on),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::TerminalEmulator;

    #[test]
    fn cup_moves_cursor_to_1_based_position() {
        let mut term = TerminalEmulator::new(80, 24);
        term.feed_bytes(b"\x1b[5;10H");
        assert_eq!(term.cursor_pos(), (9, 4));
    }

    #[test]
    fn ed_2_clears_entire_screen() {
        let mut term = TerminalEmulator::new(3, 1);
        term.feed_bytes(b"ABC");
        term.feed_bytes(b"\x1b[2J");
        assert_eq!(term.screen().cell(0, 0).glyph(), " ");
    }

    #[test]
    fn alternate_screen_save_and_restore() {
        let mut term = TerminalEmulator::new(3, 1);
        term.feed_bytes(b"ABC");
        term.feed_bytes(b"\x1b[?1049h");
        term.feed_bytes(b"XYZ");
        assert_eq!(term.screen().cell(0, 0).glyph(), "X");
        term.feed_bytes(b"\x1b[?1049l");
        assert_eq!(term.screen().cell(0, 0).glyph(), "A");
    }

    #[test]
    fn scroll_region_confines_scroll_up() {
        let mut term = TerminalEmulator::new(3, 4);
        term.feed_bytes(b"\x1b[1;3r");
        assert_eq!(term.scroll_region(), (0, 2));
    }

    #[test]
    fn device_attributes_reply_is_the_literal_vt220_string() {
        let mut term = TerminalEmulator::new(10, 3);
        term.feed_bytes(b"\x1b[c");
        assert_eq!(term.drain_replies(), vec![b"\x1b[?6c".to_vec()]);
    }

    #[test]
    fn status_report_5_replies_device_ok() {
        let mut term = TerminalEmulator::new(10, 3);
        term.feed_bytes(b"\x1b[5n");
        assert_eq!(term.drain_replies(), vec![b"\x1b[0n".to_vec()]);
    }

    #[test]
    fn decll_lights_the_requested_leds() {
        let mut term = TerminalEmulator::new(10, 3);
        term.feed_bytes(b"\x1b[1;2q");
        let leds = term.keyboard_leds();
        assert!(leds.num && leds.caps && !leds.scroll);
    }

    #[test]
    fn decll_zero_clears_all_leds() {
        let mut term = TerminalEmulator::new(10, 3);
        term.feed_bytes(b"\x1b[1;2q");
        term.feed_bytes(b"\x1b[0q");
        let leds = term.keyboard_leds();
        assert!(leds.clear && !leds.num && !leds.caps && !leds.scroll);
    }
}
