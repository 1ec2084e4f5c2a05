//! A flow-rendering text widget: wraps and optionally aligns plain text.

use std::any::Any;

use crate::canvas::Canvas;
use crate::cell::{Cell, CellColor, StyleAttrs};
use crate::dimension::RenderSize;
use crate::event::{AppHandle, Event};
use crate::widget::{Selector, Widget};

/// Horizontal text alignment within the rendered width.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    /// Flush left (default).
    Left,
    /// Flush right.
    Right,
    /// Centered, extra space on the right when odd.
    Center,
}

/// How text wraps when it does not fit the available width.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wrap {
    /// Break strictly at the column boundary, mid-word if needed.
    Clip,
    /// Break on word (space) boundaries, falling back to a clip break
    /// only when a single word exceeds the width.
    Word,
}

/// A widget that renders a fixed string of plain text, flowed to a
/// given width.
pub struct Text {
    content: String,
    align: Align,
    wrap: Wrap,
}

impl Text {
    /// A left-aligned, clip-wrapped text widget.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            align: Align::Left,
            wrap: Wrap::Clip,
        }
    }

    /// Set the alignment.
    #[must_use]
    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    /// Set the wrap mode.
    #[must_use]
    pub fn wrap(mut self, wrap: Wrap) -> Self {
        self.wrap = wrap;
        self
    }

    fn lines(&self, width: usize) -> Vec<String> {
        if width == 0 {
            return vec![String::new()];
        }
        match self.wrap {
            Wrap::Clip => clip_wrap(&self.content, width),
            Wrap::Word => word_wrap(&self.content, width),
        }
    }

    /// The raw, unwrapped content string.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Render to plain rows of text (no styling), used internally and
    /// exposed for tests that only care about the character grid.
    pub fn render_rows(&self, width: usize) -> Vec<String> {
        let lines = self.lines(width);
        lines
            .into_iter()
            .map(|line| pad_and_align(&line, width, self.align))
            .collect()
    }
}

fn clip_wrap(text: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }
    chars.chunks(width).map(|c| c.iter().collect()).collect()
}

fn word_wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split(' ') {
        if current.is_empty() {
            if word.chars().count() > width {
                let mut remaining = word;
                while remaining.chars().count() > width {
                    let (head, tail) = remaining.split_at(
                        remaining
                            .char_indices()
                            .nth(width)
                            .map(|(i, _)| i)
                            .unwrap_or(remaining.len()),
                    );
                    lines.push(head.to_string());
                    remaining = tail;
                }
                current = remaining.to_string();
            } else {
                current = word.to_string();
            }
            continue;
        }
        let candidate_len = current.chars().count() + 1 + word.chars().count();
        if candidate_len <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    lines.push(current);
    lines
}

fn pad_and_align(line: &str, width: usize, align: Align) -> String {
    let len = line.chars().count();
    if len >= width {
        return line.chars().take(width).collect();
    }
    let pad = width - len;
    match align {
        Align::Left => format!("{line}{}", " ".repeat(pad)),
        Align::Right => format!("{}{line}", " ".repeat(pad)),
        Align::Center => {
            let left = pad / 2;
            let right = pad - left;
            format!("{}{line}{}", " ".repeat(left), " ".repeat(right))
        }
    }
}

impl Widget for Text {
    fn render(&self, size: RenderSize, _focus: Selector, _app: &AppHandle) -> Canvas {
        let width = size.cols().unwrap_or_else(|| self.content.chars().count());
        let rows = self.render_rows(width);
        let height = size.rows().unwrap_or(rows.len());
        let mut canvas = Canvas::blank(width.max(1), height.max(1));
        let style = Cell::new("", CellColor::None, CellColor::None, StyleAttrs::new());
        for (y, row_text) in rows.into_iter().take(height.max(1)).enumerate() {
            canvas.write(&row_text, 0, y, &style);
        }
        canvas
    }

    fn render_size(&self, size: RenderSize, _focus: Selector, _app: &AppHandle) -> (usize, usize) {
        let width = size.cols().unwrap_or_else(|| self.content.chars().count());
        let rows = self.lines(width.max(1));
        (width.max(1), size.rows().unwrap_or(rows.len()).max(1))
    }

    fn user_input(&mut self, _event: &Event, _size: RenderSize, _focus: Selector, _app: &AppHandle) -> bool {
        false
    }

    fn selectable(&self) -> bool {
        false
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
