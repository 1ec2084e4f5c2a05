//! The embedded vt102/vt220 terminal emulator (§4.8): a byte-level
//! parser feeding a screen model with scroll regions, an alternate
//! screen, charset translation, and mouse/key encoding for the other
//! direction (host → child).

pub mod charset;
pub mod csi;
pub mod keys;
pub mod mouse;
pub mod parser;
pub mod sgr;

use crate::canvas::Canvas;
use crate::cell::{Cell, CellColor, StyleAttrs};
use charset::{Charset, CharsetState};
use mouse::{MouseEncoding, MouseMode};
use parser::{Action, Parser};
use sgr::Pen;

/// A notification the emulator raised while processing the last
/// `feed_bytes` call, for the caller (typically [`crate::pty::PtyBridge`])
/// to turn into a process-lifecycle callback (§4.10, §6).
#[derive(Clone, Debug, PartialEq)]
pub enum TerminalEvent {
    /// BEL (0x07) was received.
    Bell,
    /// The window title changed via OSC 0 or OSC 2.
    TitleChanged(String),
    /// Keyboard LED state changed via `CSI Ps q` (DECLL).
    KeyboardLeds(KeyboardLeds),
}

/// Keyboard LED state as reported by DECLL (`CSI Ps q`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyboardLeds {
    /// The last update was "clear all" (`CSI 0 q` or no parameters).
    pub clear: bool,
    /// Scroll Lock is lit.
    pub scroll: bool,
    /// Num Lock is lit.
    pub num: bool,
    /// Caps Lock is lit.
    pub caps: bool,
}

/// Boolean terminal modes not otherwise tracked as dedicated fields.
#[derive(Clone, Copy, Debug, Default)]
struct Modes {
    insert: bool,
    newline: bool,
    origin: bool,
    autowrap: bool,
    cursor_visible: bool,
    reverse_video: bool,
    bracketed_paste: bool,
}

/// A vt102/vt220-compatible terminal screen: primary and alternate
/// buffers, cursor, scroll region, charset state, and the byte parser
/// that feeds it. Owns no I/O; [`TerminalEmulator::feed_bytes`] is fed
/// raw bytes read from a PTY master, [`TerminalEmulator::drain_replies`]
/// returns bytes the emulator itself generated (device status reports,
/// cursor position reports) that the caller must write back, and
/// [`TerminalEmulator::drain_events`] returns process-lifecycle
/// notifications (bell, title changes, keyboard LEDs) for the caller to
/// dispatch as callbacks.
pub struct TerminalEmulator {
    primary: Canvas,
    alternate: Canvas,
    using_alternate: bool,
    saved_primary_cell_under_alt: Option<(Canvas, (usize, usize))>,
    cols: usize,
    rows: usize,
    cursor_col: usize,
    cursor_row: usize,
    pending_wrap: bool,
    saved_cursor: Option<(usize, usize)>,
    scroll_top: usize,
    scroll_bottom: usize,
    pen: Pen,
    charset: CharsetState,
    tabstops: Vec<bool>,
    modes: Modes,
    application_cursor_keys: bool,
    mouse: MouseEncoding,
    parser: Parser,
    scrollback: Vec<Vec<Cell>>,
    scrollback_limit: usize,
    pending_replies: Vec<Vec<u8>>,
    pending_events: Vec<TerminalEvent>,
    keyboard_leds: KeyboardLeds,
}

const DEFAULT_TAB_WIDTH: usize = 8;
const DEFAULT_SCROLLBACK_LIMIT: usize = 2000;

impl TerminalEmulator {
    /// A fresh emulator with a blank `cols` x `rows` screen.
    pub fn new(cols: usize, rows: usize) -> Self {
        let mut tabstops = vec![false; cols];
        let mut i = DEFAULT_TAB_WIDTH;
        while i < cols {
            tabstops[i] = true;
            i += DEFAULT_TAB_WIDTH;
        }
        Self {
            primary: Canvas::blank(cols, rows),
            alternate: Canvas::blank(cols, rows),
            using_alternate: false,
            saved_primary_cell_under_alt: None,
            cols,
            rows,
            cursor_col: 0,
            cursor_row: 0,
            pending_wrap: false,
            saved_cursor: None,
            scroll_top: 0,
            scroll_bottom: rows.saturating_sub(1),
            pen: Pen::default(),
            charset: CharsetState::default(),
            tabstops,
            modes: Modes {
                autowrap: true,
                cursor_visible: true,
                ..Modes::default()
            },
            application_cursor_keys: false,
            mouse: MouseEncoding::default(),
            parser: Parser::new(),
            scrollback: Vec::new(),
            scrollback_limit: DEFAULT_SCROLLBACK_LIMIT,
            pending_replies: Vec::new(),
            pending_events: Vec::new(),
            keyboard_leds: KeyboardLeds::default(),
        }
    }

    /// Override the scrollback line cap (default 2000), e.g. from
    /// [`crate::pty::EmulatorOptions::scrollback`].
    pub fn with_scrollback_limit(mut self, limit: usize) -> Self {
        self.scrollback_limit = limit;
        self
    }

    /// Feed raw PTY output bytes through the parser, applying each
    /// resulting action to the screen.
    pub fn feed_bytes(&mut self, bytes: &[u8]) {
        let mut actions = Vec::new();
        self.parser.advance_all(bytes, &mut actions);
        for action in actions {
            self.apply(action);
        }
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Print(c) => self.print_char(c),
            Action::Execute(byte) => self.execute(byte),
            Action::EscDispatch { intermediates, final_byte } => self.esc_dispatch(&intermediates, final_byte),
            Action::CsiDispatch { private, params, intermediates, final_byte } => {
                csi::dispatch(self, private, &params, &intermediates, final_byte)
            }
            Action::OscDispatch { data } => self.osc_dispatch(&data),
        }
    }

    fn active(&self) -> &Canvas {
        if self.using_alternate {
            &self.alternate
        } else {
            &self.primary
        }
    }

    fn active_mut(&mut self) -> &mut Canvas {
        if self.using_alternate {
            &mut self.alternate
        } else {
            &mut self.primary
        }
    }

    /// The currently displayed screen buffer.
    pub fn screen(&self) -> &Canvas {
        self.active()
    }

    /// The number of rows currently held in the primary buffer's
    /// scrollback history.
    pub fn scrollback_len(&self) -> usize {
        self.scrollback.len()
    }

    /// A read-only window into the primary buffer's scrollback plus the
    /// visible screen: `height` rows ending `offset` rows above the
    /// bottom. `offset == 0` shows the live screen's bottom `height`
    /// rows; larger offsets scroll back into history.
    pub fn scrollback_viewport(&self, offset: usize, height: usize) -> Canvas {
        let total_rows = self.scrollback.len() + self.primary.height();
        let end = total_rows.saturating_sub(offset);
        let start = end.saturating_sub(height);
        let blank_row = || vec![Cell::blank(CellColor::None, CellColor::None, StyleAttrs::default()); self.cols];

        let mut rows = Vec::with_capacity(height);
        for _ in 0..height.saturating_sub(end - start) {
            rows.push(blank_row());
        }
        for i in start..end {
            if i < self.scrollback.len() {
                rows.push(self.scrollback[i].clone());
            } else {
                rows.push(self.primary.row(i - self.scrollback.len()).to_vec());
            }
        }
        Canvas::from_rows(rows)
    }

    /// Current cursor position as `(col, row)`, zero-based.
    pub fn cursor_pos(&self) -> (usize, usize) {
        (self.cursor_col, self.cursor_row)
    }

    fn clamp_cursor(&mut self) {
        self.cursor_col = self.cursor_col.min(self.cols.saturating_sub(1));
        self.cursor_row = self.cursor_row.min(self.rows.saturating_sub(1));
    }

    fn print_char(&mut self, c: char) {
        if self.pending_wrap {
            self.pending_wrap = false;
            self.newline();
            self.cursor_col = 0;
        }

        let translated = if c.is_ascii() {
            self.charset.translate(c as u8)
        } else {
            c
        };
        let width = unicode_width::UnicodeWidthChar::width(translated).unwrap_or(1).max(1).min(2);

        if self.cursor_col + width > self.cols {
            if self.modes.autowrap {
                self.newline();
                self.cursor_col = 0;
            } else {
                self.cursor_col = self.cols.saturating_sub(width);
            }
        }

        let cell = Cell::new(translated.to_string(), self.pen.fg, self.pen.bg, self.pen.style);
        let (col, row) = (self.cursor_col, self.cursor_row);
        self.active_mut().set_cell(col, row, cell);
        if width == 2 && col + 1 < self.cols {
            self.active_mut().set_cell(col + 1, row, Cell::continuation());
        }
        self.cursor_col += width;
        if self.cursor_col >= self.cols {
            self.pending_wrap = self.modes.autowrap;
            self.cursor_col = self.cols.saturating_sub(1);
        }
    }

    /// Parse an OSC payload of the form `"<code>;<text>"`. Codes 0
    /// (icon name + window title) and 2 (window title only) queue a
    /// [`TerminalEvent::TitleChanged`]; other codes are accepted and
    /// ignored.
    fn osc_dispatch(&mut self, data: &str) {
        let Some((code, text)) = data.split_once(';') else {
            return;
        };
        match code.parse::<u32>() {
            Ok(0) | Ok(2) => self.queue_event(TerminalEvent::TitleChanged(text.to_string())),
            _ => {}
        }
    }

    /// Set keyboard LED state from DECLL (`CSI Ps q`) parameters. `0` or
    /// no parameters clears all LEDs; otherwise each of `1`/`2`/`3` lights
    /// Num/Caps/Scroll Lock respectively.
    pub(crate) fn set_keyboard_leds(&mut self, params: &[u16]) {
        let mut leds = if params.is_empty() || params.contains(&0) {
            KeyboardLeds { clear: true, ..KeyboardLeds::default() }
        } else {
            KeyboardLeds { clear: false, ..self.keyboard_leds }
        };
        for &p in params {
            match p {
                1 => leds.num = true,
                2 => leds.caps = true,
                3 => leds.scroll = true,
                _ => {}
            }
        }
        self.keyboard_leds = leds;
        self.queue_event(TerminalEvent::KeyboardLeds(leds));
    }

    /// The current keyboard LED state.
    pub fn keyboard_leds(&self) -> KeyboardLeds {
        self.keyboard_leds
    }

    fn queue_event(&mut self, event: TerminalEvent) {
        self.pending_events.push(event);
    }

    /// Take any queued process-lifecycle events (bell, title changes,
    /// keyboard LED changes) generated while processing the last
    /// `feed_bytes` call. The caller is responsible for turning these
    /// into callbacks.
    pub fn drain_events(&mut self) -> Vec<TerminalEvent> {
        std::mem::take(&mut self.pending_events)
    }

    fn execute(&mut self, byte: u8) {
        self.pending_wrap = false;
        match byte {
            0x07 => self.queue_event(TerminalEvent::Bell),
            0x08 => self.cursor_col = self.cursor_col.saturating_sub(1),
            0x09 => self.advance_tab(),
            0x0a | 0x0b | 0x0c => self.newline(),
            0x0d => self.cursor_col = 0,
            0x0e => self.charset.shift_out(),
            0x0f => self.charset.shift_in(),
            _ => {}
        }
    }

    fn advance_tab(&mut self) {
        let mut col = self.cursor_col + 1;
        while col < self.cols && !self.tabstops.get(col).copied().unwrap_or(false) {
            col += 1;
        }
        self.cursor_col = col.min(self.cols.saturating_sub(1));
    }

    fn esc_dispatch(&mut self, intermediates: &[u8], final_byte: u8) {
        match (intermediates, final_byte) {
            (b"(", b'0') => self.charset.designate(false, Charset::DecSpecialGraphics),
            (b"(", b'U') => self.charset.designate(false, Charset::Ibmpc),
            (b"(", b'B') => self.charset.designate(false, Charset::Default),
            (b")", b'0') => self.charset.designate(true, Charset::DecSpecialGraphics),
            (b")", b'B') => self.charset.designate(true, Charset::Default),
            (b"#", b'8') => self.dec_align_test(),
            // Both select "no translation": this emulator's charset
            // model has a single untranslated state shared by ISO
            // 8859-1 and UTF-8 (§4.8 escape-dispatch table).
            (b"%", b'@') => self.charset.designate(false, Charset::Default),
            (b"%", b'G') => self.charset.designate(false, Charset::Default),
            ([], b'7') => self.save_cursor(),
            ([], b'8') => self.restore_cursor(),
            ([], b'D') => self.newline(),
            ([], b'H') => self.set_tabstop(),
            ([], b'M') => self.reverse_index(),
            ([], b'E') => {
                self.newline();
                self.cursor_col = 0;
            }
            ([], b'Z') => self.queue_reply(b"\x1b[?6c".to_vec()),
            ([], b'c') => *self = TerminalEmulator::new(self.cols, self.rows),
            _ => {}
        }
    }

    fn dec_align_test(&mut self) {
        let cell = Cell::new("E", self.pen.fg, self.pen.bg, self.pen.style);
        for y in 0..self.rows {
            for x in 0..self.cols {
                self.active_mut().set_cell(x, y, cell.clone());
            }
        }
    }

    fn newline(&mut self) {
        if self.cursor_row == self.scroll_bottom {
            self.scroll_up(1);
        } else if self.cursor_row + 1 < self.rows {
            self.cursor_row += 1;
        }
        if self.modes.newline {
            self.cursor_col = 0;
        }
    }

    fn reverse_index(&mut self) {
        if self.cursor_row == self.scroll_top {
            self.scroll_down(1);
        } else if self.cursor_row > 0 {
            self.cursor_row -= 1;
        }
    }

    pub(crate) fn move_cursor(&mut self, dx: i64, dy: i64) {
        let col = (self.cursor_col as i64 + dx).max(0) as usize;
        let row = (self.cursor_row as i64 + dy).max(0) as usize;
        self.cursor_col = col;
        self.cursor_row = row;
        self.clamp_cursor();
    }

    pub(crate) fn set_cursor_col(&mut self, col: usize) {
        self.cursor_col = col;
        self.clamp_cursor();
    }

    pub(crate) fn set_cursor_row(&mut self, row: usize) {
        self.cursor_row = row;
        self.clamp_cursor();
    }

    pub(crate) fn set_cursor_pos(&mut self, col: usize, row: usize) {
        let row_offset = if self.modes.origin { self.scroll_top } else { 0 };
        self.cursor_col = col;
        self.cursor_row = row + row_offset;
        self.clamp_cursor();
    }

    pub(crate) fn erase_in_display(&mut self, mode: u16) {
        let (cols, rows) = (self.cols, self.rows);
        let (col, row) = (self.cursor_col, self.cursor_row);
        match mode {
            0 => {
                self.clear_row_from(row, col);
                for y in (row + 1)..rows {
                    self.clear_row_from(y, 0);
                }
            }
            1 => {
                for y in 0..row {
                    self.clear_row_from(y, 0);
                }
                self.clear_row_range(row, 0, col + 1);
            }
            2 | 3 => {
                for y in 0..rows {
                    self.clear_row_from(y, 0);
                }
            }
            _ => {}
        }
        let _ = cols;
    }

    pub(crate) fn erase_in_line(&mut self, mode: u16) {
        let (col, row) = (self.cursor_col, self.cursor_row);
        match mode {
            0 => self.clear_row_from(row, col),
            1 => self.clear_row_range(row, 0, col + 1),
            2 => self.clear_row_from(row, 0),
            _ => {}
        }
    }

    fn clear_row_from(&mut self, row: usize, from_col: usize) {
        let cols = self.cols;
        self.clear_row_range(row, from_col, cols);
    }

    fn clear_row_range(&mut self, row: usize, from_col: usize, to_col: usize) {
        if row >= self.rows {
            return;
        }
        let (fg, bg, style) = (self.pen.fg, self.pen.bg, self.pen.style);
        for x in from_col..to_col.min(self.cols) {
            self.active_mut().set_cell(x, row, Cell::blank(fg, bg, style));
        }
    }

    pub(crate) fn insert_blank_chars(&mut self, n: usize) {
        let row = self.cursor_row;
        let cols = self.cols;
        for x in (self.cursor_col..cols).rev() {
            let src = x.checked_sub(n);
            let cell = src.map(|s| self.active().cell(s, row).clone()).unwrap_or_else(|| Cell::blank(self.pen.fg, self.pen.bg, self.pen.style));
            self.active_mut().set_cell(x, row, cell);
        }
    }

    pub(crate) fn delete_chars(&mut self, n: usize) {
        let row = self.cursor_row;
        let cols = self.cols;
        for x in self.cursor_col..cols {
            let src = x + n;
            let cell = if src < cols {
                self.active().cell(src, row).clone()
            } else {
                Cell::blank(self.pen.fg, self.pen.bg, self.pen.style)
            };
            self.active_mut().set_cell(x, row, cell);
        }
    }

    pub(crate) fn erase_chars(&mut self, n: usize) {
        let row = self.cursor_row;
        let cols = self.cols;
        let end = (self.cursor_col + n).min(cols);
        self.clear_row_range(row, self.cursor_col, end);
    }

    pub(crate) fn insert_blank_lines(&mut self, n: usize) {
        if self.cursor_row < self.scroll_top || self.cursor_row > self.scroll_bottom {
            return;
        }
        let saved_top = self.scroll_top;
        self.scroll_top = self.cursor_row;
        self.scroll_down(n);
        self.scroll_top = saved_top;
    }

    pub(crate) fn delete_lines(&mut self, n: usize) {
        if self.cursor_row < self.scroll_top || self.cursor_row > self.scroll_bottom {
            return;
        }
        let saved_top = self.scroll_top;
        self.scroll_top = self.cursor_row;
        self.scroll_up(n);
        self.scroll_top = saved_top;
    }

    pub(crate) fn scroll_up(&mut self, n: usize) {
        let (top, bottom) = (self.scroll_top, self.scroll_bottom);
        let full_screen = top == 0 && bottom == self.rows.saturating_sub(1);
        for _ in 0..n {
            if full_screen && !self.using_alternate {
                let row: Vec<Cell> = (0..self.cols).map(|x| self.active().cell(x, top).clone()).collect();
                self.scrollback.push(row);
                if self.scrollback.len() > self.scrollback_limit {
                    self.scrollback.remove(0);
                }
            }
            for y in top..bottom {
                for x in 0..self.cols {
                    let cell = self.active().cell(x, y + 1).clone();
                    self.active_mut().set_cell(x, y, cell);
                }
            }
            self.clear_row_from(bottom, 0);
        }
    }

    pub(crate) fn scroll_down(&mut self, n: usize) {
        let (top, bottom) = (self.scroll_top, self.scroll_bottom);
        for _ in 0..n {
            for y in (top + 1..=bottom).rev() {
                for x in 0..self.cols {
                    let cell = self.active().cell(x, y - 1).clone();
                    self.active_mut().set_cell(x, y, cell);
                }
            }
            self.clear_row_from(top, 0);
        }
    }

    pub(crate) fn set_scroll_region(&mut self, top: usize, bottom: Option<usize>) {
        let bottom = bottom.unwrap_or(self.rows.saturating_sub(1)).min(self.rows.saturating_sub(1));
        if top < bottom {
            self.scroll_top = top;
            self.scroll_bottom = bottom;
        }
        self.set_cursor_pos(0, 0);
    }

    /// The current scroll region as `(top, bottom)`, both zero-based
    /// and inclusive.
    pub fn scroll_region(&self) -> (usize, usize) {
        (self.scroll_top, self.scroll_bottom)
    }

    pub(crate) fn save_cursor(&mut self) {
        self.saved_cursor = Some((self.cursor_col, self.cursor_row));
    }

    pub(crate) fn restore_cursor(&mut self) {
        if let Some((col, row)) = self.saved_cursor {
            self.cursor_col = col;
            self.cursor_row = row;
            self.clamp_cursor();
        }
    }

    pub(crate) fn clear_tabstop(&mut self, mode: u16) {
        match mode {
            0 => {
                if self.cursor_col < self.tabstops.len() {
                    self.tabstops[self.cursor_col] = false;
                }
            }
            3 => self.tabstops.iter_mut().for_each(|t| *t = false),
            _ => {}
        }
    }

    /// HTS (`ESC H`): set a horizontal tabstop at the current column.
    fn set_tabstop(&mut self) {
        if self.cursor_col < self.tabstops.len() {
            self.tabstops[self.cursor_col] = true;
        }
    }

    pub(crate) fn apply_sgr(&mut self, params: &[u16]) {
        if params.is_empty() {
            self.pen.reset();
        } else {
            self.pen.apply(params);
        }
    }

    pub(crate) fn set_insert_mode(&mut self, on: bool) {
        self.modes.insert = on;
    }

    pub(crate) fn set_newline_mode(&mut self, on: bool) {
        self.modes.newline = on;
    }

    pub(crate) fn set_origin_mode(&mut self, on: bool) {
        self.modes.origin = on;
    }

    pub(crate) fn set_autowrap(&mut self, on: bool) {
        self.modes.autowrap = on;
    }

    pub(crate) fn set_cursor_visible(&mut self, on: bool) {
        self.modes.cursor_visible = on;
        if on {
            let pos = (self.cursor_col as i64, self.cursor_row as i64);
            self.active_mut().set_cursor(pos);
        } else {
            self.active_mut().hide_cursor();
        }
    }

    pub(crate) fn set_reverse_video(&mut self, on: bool) {
        self.modes.reverse_video = on;
    }

    pub(crate) fn set_application_cursor_keys(&mut self, on: bool) {
        self.application_cursor_keys = on;
    }

    /// Whether application cursor-key mode (DECCKM) is active, for
    /// encoding key presses the other direction.
    pub fn application_cursor_keys(&self) -> bool {
        self.application_cursor_keys
    }

    pub(crate) fn set_mouse_mode(&mut self, mode: MouseMode) {
        self.mouse.mode = mode;
    }

    pub(crate) fn set_mouse_sgr(&mut self, on: bool) {
        self.mouse.sgr = on;
    }

    /// The mouse-reporting mode currently requested by the child, for
    /// encoding mouse events the other direction.
    pub fn mouse_encoding(&self) -> MouseEncoding {
        self.mouse
    }

    pub(crate) fn set_bracketed_paste(&mut self, on: bool) {
        self.modes.bracketed_paste = on;
    }

    /// Whether bracketed paste mode (2004) is active.
    pub fn bracketed_paste(&self) -> bool {
        self.modes.bracketed_paste
    }

    pub(crate) fn set_alternate_screen(&mut self, on: bool) {
        if on == self.using_alternate {
            return;
        }
        if on {
            self.saved_primary_cell_under_alt = Some((self.primary.clone(), (self.cursor_col, self.cursor_row)));
            self.alternate = Canvas::blank(self.cols, self.rows);
            self.using_alternate = true;
        } else if let Some((saved, (col, row))) = self.saved_primary_cell_under_alt.take() {
            self.primary = saved;
            self.cursor_col = col;
            self.cursor_row = row;
            self.using_alternate = false;
        } else {
            self.using_alternate = false;
        }
    }

    pub(crate) fn resize_columns(&mut self, cols: usize) {
        self.resize(cols, self.rows);
    }

    /// Resize the screen, e.g. on `SIGWINCH`. Existing content is
    /// clipped or padded rather than reflowed.
    pub fn resize(&mut self, cols: usize, rows: usize) {
        self.primary = resize_canvas(&self.primary, cols, rows);
        self.alternate = resize_canvas(&self.alternate, cols, rows);
        self.cols = cols;
        self.rows = rows;
        self.scroll_bottom = rows.saturating_sub(1);
        self.scroll_top = 0;
        self.clamp_cursor();
    }

    pub(crate) fn queue_reply(&mut self, bytes: Vec<u8>) {
        self.pending_replies.push(bytes);
    }

    /// Take any queued replies (device status reports, cursor position
    /// reports) generated while processing the last `feed_bytes` call.
    /// The caller is responsible for writing these back to the PTY.
    pub fn drain_replies(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.pending_replies)
    }
}

fn resize_canvas(old: &Canvas, cols: usize, rows: usize) -> Canvas {
    let mut next = Canvas::blank(cols, rows);
    for y in 0..rows.min(old.height()) {
        for x in 0..cols.min(old.width()) {
            next.set_cell(x, y, old.cell(x, y).clone());
        }
    }
    next
}
