//! A box-rendering widget that fills its area with a single repeated
//! cell.

use std::any::Any;

use crate::canvas::Canvas;
use crate::cell::{Cell, CellColor, StyleAttrs};
use crate::dimension::RenderSize;
use crate::event::{AppHandle, Event};
use crate::widget::{Selector, Widget};

/// Fills the space it's given with one glyph, repeated. Used as
/// background padding or a divider.
pub struct Fill {
    glyph: String,
    fg: CellColor,
    bg: CellColor,
    style: StyleAttrs,
}

impl Fill {
    /// A fill of blank space.
    pub fn blank() -> Self {
        Self {
            glyph: " ".to_string(),
            fg: CellColor::None,
            bg: CellColor::None,
            style: StyleAttrs::new(),
        }
    }

    /// A fill of a specific glyph.
    pub fn new(glyph: impl Into<String>) -> Self {
        Self {
            glyph: glyph.into(),
            fg: CellColor::None,
            bg: CellColor::None,
            style: StyleAttrs::new(),
        }
    }

    /// Set the foreground color.
    #[must_use]
    pub fn fg(mut self, fg: CellColor) -> Self {
        self.fg = fg;
        self
    }

    /// Set the background color.
    #[must_use]
    pub fn bg(mut self, bg: CellColor) -> Self {
        self.bg = bg;
        self
    }
}

impl Widget for Fill {
    fn render(&self, size: RenderSize, _focus: Selector, _app: &AppHandle) -> Canvas {
        let cols = size.cols().unwrap_or(1).max(1);
        let rows = size.rows().unwrap_or(1).max(1);
        let cell = Cell::new(self.glyph.as_str(), self.fg, self.bg, self.style);
        let mut canvas = Canvas::blank(cols, rows);
        for y in 0..rows {
            for x in 0..cols {
                canvas.set_cell(x, y, cell.clone());
            }
        }
        canvas
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_covers_every_cell() {
        let f = Fill::new("x");
        let canvas = f.render(RenderSize::Box(3, 2), Selector::none(), &crate::event::test_handle());
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(canvas.cell(x, y).glyph(), "x");
            }
        }
    }
}
