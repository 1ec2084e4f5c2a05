//! Default `crossterm`-backed implementations of [`crate::app::TerminalSource`]
//! and [`crate::app::ScreenSink`] (§6, NEW). Neither the core widget
//! protocol nor `App` depends on this module; it exists purely as a
//! convenience for callers who want a real terminal without writing
//! their own adapter.

use std::io::Write;
use std::time::Duration;

use crossterm::event::{self, KeyCode as CKeyCode, KeyModifiers as CKeyModifiers};
use crossterm::{cursor, queue, style as cstyle, terminal};

use crate::app::{ScreenSink, TerminalSource};
use crate::cell::CellColor;
use crate::error::LoomwidError;
use crate::event::{Event, KeyCode, KeyEvent, Modifiers, MouseButton};
use crate::canvas::Canvas;

/// Polls `crossterm::event::read` on a blocking loop and translates
/// terminal events into [`Event`]s.
pub struct CrosstermSource {
    poll_interval: Duration,
}

impl CrosstermSource {
    /// A source that polls at the given interval, letting `next_event`
    /// return `None` promptly once the caller drops the other end.
    pub fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }
}

impl Default for CrosstermSource {
    fn default() -> Self {
        Self::new(Duration::from_millis(50))
    }
}

impl TerminalSource for CrosstermSource {
    fn next_event(&mut self) -> Option<Event> {
        loop {
            match event::poll(self.poll_interval) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(_) => return None,
            }
            match event::read() {
                Ok(event::Event::Key(key)) => {
                    if let Some(mapped) = map_key(key) {
                        return Some(Event::KeyPress(mapped));
                    }
                }
                Ok(event::Event::Mouse(mouse)) => {
                    if let Some(mapped) = map_mouse(mouse) {
                        return Some(mapped);
                    }
                }
                Ok(event::Event::Resize(cols, rows)) => {
                    return Some(Event::Resize(cols as usize, rows as usize));
                }
                Ok(event::Event::Paste(text)) => return Some(Event::Paste(text)),
                Ok(_) => continue,
                Err(_) => return None,
            }
        }
    }
}

fn map_key(key: event::KeyEvent) -> Option<KeyEvent> {
    let code = match key.code {
        CKeyCode::Char(c) => KeyCode::Char(c),
        CKeyCode::F(n) => KeyCode::Function(n),
        CKeyCode::Enter => KeyCode::Enter,
        CKeyCode::Tab => KeyCode::Tab,
        CKeyCode::Backspace => KeyCode::Backspace,
        CKeyCode::Delete => KeyCode::Delete,
        CKeyCode::Insert => KeyCode::Insert,
        CKeyCode::Esc => KeyCode::Escape,
        CKeyCode::Up => KeyCode::Up,
        CKeyCode::Down => KeyCode::Down,
        CKeyCode::Left => KeyCode::Left,
        CKeyCode::Right => KeyCode::Right,
        CKeyCode::Home => KeyCode::Home,
        CKeyCode::End => KeyCode::End,
        CKeyCode::PageUp => KeyCode::PageUp,
        CKeyCode::PageDown => KeyCode::PageDown,
        _ => return None,
    };
    let mut modifiers = Modifiers::NONE;
    if key.modifiers.contains(CKeyModifiers::SHIFT) {
        modifiers = modifiers.union(Modifiers::SHIFT);
    }
    if key.modifiers.contains(CKeyModifiers::CONTROL) {
        modifiers = modifiers.union(Modifiers::CTRL);
    }
    if key.modifiers.contains(CKeyModifiers::ALT) {
        modifiers = modifiers.union(Modifiers::ALT);
    }
    Some(KeyEvent { code, modifiers })
}

fn map_mouse(mouse: event::MouseEvent) -> Option<Event> {
    let x = mouse.column as usize;
    let y = mouse.row as usize;
    let mut modifiers = Modifiers::NONE;
    if mouse.modifiers.contains(CKeyModifiers::SHIFT) {
        modifiers = modifiers.union(Modifiers::SHIFT);
    }
    if mouse.modifiers.contains(CKeyModifiers::CONTROL) {
        modifiers = modifiers.union(Modifiers::CTRL);
    }
    if mouse.modifiers.contains(CKeyModifiers::ALT) {
        modifiers = modifiers.union(Modifiers::ALT);
    }
    match mouse.kind {
        event::MouseEventKind::Down(button) => Some(Event::MousePress(x, y, map_button(button), modifiers)),
        event::MouseEventKind::Up(button) => Some(Event::MouseRelease(x, y, map_button(button), modifiers)),
        _ => None,
    }
}

fn map_button(button: event::MouseButton) -> MouseButton {
    match button {
        event::MouseButton::Left => MouseButton::Left,
        event::MouseButton::Right => MouseButton::Right,
        event::MouseButton::Middle => MouseButton::Middle,
    }
}

/// Presents canvases to a real terminal via `crossterm`, writing only
/// the cells that changed since the last frame.
pub struct CrosstermSink<W: Write> {
    out: W,
    previous: Option<Canvas>,
}

impl<W: Write> CrosstermSink<W> {
    /// Build a sink writing to `out`. The caller is responsible for
    /// entering/leaving raw mode and the alternate screen.
    pub fn new(out: W) -> Self {
        Self { out, previous: None }
    }
}

impl<W: Write> ScreenSink for CrosstermSink<W> {
    fn present(&mut self, canvas: &Canvas) -> Result<(), LoomwidError> {
        for y in 0..canvas.height() {
            for x in 0..canvas.width() {
                let cell = canvas.cell(x, y);
                let unchanged = self
                    .previous
                    .as_ref()
                    .map(|prev| x < prev.width() && y < prev.height() && prev.cell(x, y) == cell)
                    .unwrap_or(false);
                if unchanged {
                    continue;
                }
                queue!(self.out, cursor::MoveTo(x as u16, y as u16)).map_err(LoomwidError::Pty)?;
                if let Some(color) = to_crossterm_color(cell.fg) {
                    queue!(self.out, cstyle::SetForegroundColor(color)).map_err(LoomwidError::Pty)?;
                }
                if let Some(color) = to_crossterm_color(cell.bg) {
                    queue!(self.out, cstyle::SetBackgroundColor(color)).map_err(LoomwidError::Pty)?;
                }
                let glyph = if cell.is_continuation() { "" } else { cell.glyph() };
                queue!(self.out, cstyle::Print(glyph)).map_err(LoomwidError::Pty)?;
            }
        }
        if let Some((cx, cy)) = canvas.cursor() {
            if cx >= 0 && cy >= 0 {
                queue!(self.out, cursor::MoveTo(cx as u16, cy as u16), cursor::Show).map_err(LoomwidError::Pty)?;
            }
        } else {
            queue!(self.out, cursor::Hide).map_err(LoomwidError::Pty)?;
        }
        self.out.flush().map_err(LoomwidError::Pty)?;
        self.previous = Some(canvas.clone());
        Ok(())
    }

    fn size(&self) -> (usize, usize) {
        terminal::size()
            .map(|(c, r)| (c as usize, r as usize))
            .unwrap_or((80, 24))
    }
}

fn to_crossterm_color(color: CellColor) -> Option<cstyle::Color> {
    match color {
        CellColor::None => None,
        CellColor::Default => Some(cstyle::Color::Reset),
        CellColor::Indexed(i) => Some(cstyle::Color::AnsiValue(i)),
        CellColor::Rgb(r, g, b) => Some(cstyle::Color::Rgb { r, g, b }),
    }
}
