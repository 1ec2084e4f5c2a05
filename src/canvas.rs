//! The grid canvas and its compositing operations (§4.1).

use std::collections::HashMap;

use crate::cell::Cell;

/// An ordered grid of styled cells, all rows of equal width, plus a
/// mark map (named (col, row) positions; the "cursor" mark is special).
#[derive(Clone, Debug, Default)]
pub struct Canvas {
    rows: Vec<Vec<Cell>>,
    marks: HashMap<String, (i64, i64)>,
}

const CURSOR_MARK: &str = "cursor";

impl Canvas {
    /// A blank canvas of the given size.
    pub fn blank(cols: usize, rows: usize) -> Self {
        Self {
            rows: vec![vec![Cell::transparent(); cols]; rows],
            marks: HashMap::new(),
        }
    }

    /// Build a canvas from rows of cells. Panics (debug builds only) if
    /// the rows are not all the same width.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Self {
        if let Some(first) = rows.first() {
            debug_assert!(rows.iter().all(|r| r.len() == first.len()));
        }
        Self {
            rows,
            marks: HashMap::new(),
        }
    }

    /// Width in columns.
    pub fn width(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    /// Height in rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Borrow a row.
    pub fn row(&self, y: usize) -> &[Cell] {
        &self.rows[y]
    }

    /// Borrow all rows.
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Borrow a cell.
    pub fn cell(&self, x: usize, y: usize) -> &Cell {
        &self.rows[y][x]
    }

    /// Set a cell.
    pub fn set_cell(&mut self, x: usize, y: usize, cell: Cell) {
        self.rows[y][x] = cell;
    }

    /// Get a named mark's position, if set.
    pub fn mark(&self, name: &str) -> Option<(i64, i64)> {
        self.marks.get(name).copied()
    }

    /// Set a named mark.
    pub fn set_mark(&mut self, name: impl Into<String>, pos: (i64, i64)) {
        self.marks.insert(name.into(), pos);
    }

    /// Clear a named mark.
    pub fn clear_mark(&mut self, name: &str) {
        self.marks.remove(name);
    }

    /// The cursor position, if visible.
    pub fn cursor(&self) -> Option<(i64, i64)> {
        self.mark(CURSOR_MARK)
    }

    /// Set the cursor position.
    pub fn set_cursor(&mut self, pos: (i64, i64)) {
        self.set_mark(CURSOR_MARK, pos);
    }

    /// Hide the cursor.
    pub fn hide_cursor(&mut self) {
        self.clear_mark(CURSOR_MARK);
    }

    fn translate_marks(&mut self, dx: i64, dy: i64) {
        for pos in self.marks.values_mut() {
            pos.0 += dx;
            pos.1 += dy;
        }
    }

    /// Append `other` below `self`, widening both to the max width.
    /// Translates `other`'s marks by the vertical offset (the height of
    /// `self` before the append). If `include_cursor` is false, `other`'s
    /// cursor mark is dropped.
    pub fn append_below(&mut self, mut other: Canvas, include_cursor: bool) {
        let max_width = self.width().max(other.width());
        self.align_right_to(max_width);
        other.align_right_to(max_width);

        let offset = self.height() as i64;
        if !include_cursor {
            other.clear_mark(CURSOR_MARK);
        }
        other.translate_marks(0, offset);
        for (name, pos) in other.marks {
            self.marks.insert(name, pos);
        }
        self.rows.extend(other.rows);
    }

    /// Append `other` to the right of `self`. Both must have equal
    /// height. Translates `other`'s marks by the horizontal offset.
    pub fn append_right(&mut self, mut other: Canvas, include_cursor: bool) {
        assert_eq!(self.height(), other.height(), "append_right requires equal heights");
        let offset = self.width() as i64;
        if !include_cursor {
            other.clear_mark(CURSOR_MARK);
        }
        other.translate_marks(offset, 0);
        for (name, pos) in other.marks {
            self.marks.insert(name, pos);
        }
        for (row, other_row) in self.rows.iter_mut().zip(other.rows) {
            row.extend(other_row);
        }
    }

    /// Grow every row by `n` blank cells on the left, shifting marks.
    pub fn extend_left(&mut self, n: usize) {
        for row in &mut self.rows {
            let mut new_row = vec![Cell::transparent(); n];
            new_row.append(row);
            *row = new_row;
        }
        self.translate_marks(n as i64, 0);
    }

    /// Grow every row by `n` blank cells on the right.
    pub fn extend_right(&mut self, n: usize) {
        for row in &mut self.rows {
            row.extend(std::iter::repeat(Cell::transparent()).take(n));
        }
    }

    /// Shrink to `new_width` columns, dropping from the left and shifting
    /// marks.
    pub fn trim_left(&mut self, new_width: usize) {
        let old_width = self.width();
        if new_width >= old_width {
            return;
        }
        let drop = old_width - new_width;
        for row in &mut self.rows {
            row.drain(0..drop);
        }
        self.translate_marks(-(drop as i64), 0);
    }

    /// Shrink to `new_width` columns, dropping from the right.
    pub fn trim_right(&mut self, new_width: usize) {
        let old_width = self.width();
        if new_width >= old_width {
            return;
        }
        for row in &mut self.rows {
            row.truncate(new_width);
        }
    }

    /// Drop `above` rows from the top and `below` rows from the bottom.
    /// Marks are shifted to account for the dropped top rows.
    pub fn truncate(&mut self, above: usize, below: usize) {
        let height = self.height();
        let end = height.saturating_sub(below);
        let start = above.min(end);
        self.rows.drain(end..);
        self.rows.drain(0..start);
        self.translate_marks(0, -(start as i64));
    }

    /// Merge `other` under `self`'s existing content within the overlap
    /// starting at `(left_off, top_off)`. `other`'s cursor mark is
    /// dropped when `bottom_gets_cursor` is true (meaning `self` should
    /// keep its own cursor, if any).
    pub fn merge_under(&mut self, other: &Canvas, left_off: i64, top_off: i64, bottom_gets_cursor: bool) {
        for y in 0..other.height() {
            let ty = top_off + y as i64;
            if ty < 0 || ty as usize >= self.height() {
                continue;
            }
            for x in 0..other.width() {
                let tx = left_off + x as i64;
                if tx < 0 || tx as usize >= self.width() {
                    continue;
                }
                let lower = self.cell(tx as usize, ty as usize).clone();
                let upper = other.cell(x, y);
                self.set_cell(tx as usize, ty as usize, lower.merge_under(upper));
            }
        }
        if !bottom_gets_cursor {
            if let Some((cx, cy)) = other.cursor() {
                self.set_cursor((cx + left_off, cy + top_off));
            }
        }
    }

    fn align_right_to(&mut self, width: usize) {
        let cur = self.width();
        if width > cur {
            self.extend_right(width - cur);
        }
    }

    /// Pad each row to `fill_to` columns using `fill` (no mark shift, the
    /// new cells are appended on the right).
    pub fn align_right(&mut self, fill_to: usize, fill: Cell) {
        let cur = self.width();
        if fill_to <= cur {
            return;
        }
        for row in &mut self.rows {
            row.extend(std::iter::repeat(fill.clone()).take(fill_to - cur));
        }
    }

    /// Interpret `text` as UTF-8 and write it starting at `(x, y)` using
    /// `style_cell` as the template for glyph cells. Newlines clear the
    /// remainder of the row and advance to the next row's start column.
    /// Writing wraps within the canvas's current width/height and never
    /// grows the canvas. Returns the final cursor position.
    pub fn write(&mut self, text: &str, x: usize, y: usize, style: &Cell) -> (usize, usize) {
        use unicode_segmentation::UnicodeSegmentation;
        use unicode_width::UnicodeWidthStr;

        let width = self.width();
        let height = self.height();
        let (mut cx, mut cy) = (x, y);
        if height == 0 || width == 0 {
            return (cx, cy);
        }

        for grapheme in text.graphemes(true) {
            if grapheme == "\n" {
                if cy < height {
                    for col in cx..width {
                        self.set_cell(col, cy, blank_like(style));
                    }
                }
                cx = 0;
                cy += 1;
                if cy >= height {
                    break;
                }
                continue;
            }
            let w = UnicodeWidthStr::width(grapheme).max(1).min(2);
            if cx + w > width {
                cx = 0;
                cy += 1;
                if cy >= height {
                    break;
                }
            }
            if cy >= height {
                break;
            }
            let mut cell = style.clone();
            cell = Cell::new(grapheme, cell.fg, cell.bg, cell.style);
            self.set_cell(cx, cy, cell);
            if w == 2 && cx + 1 < width {
                self.set_cell(cx + 1, cy, Cell::continuation());
            }
            cx += w;
        }
        (cx.min(width), cy.min(height.saturating_sub(1)))
    }
}

/// A window onto a [`Canvas`]: `height` rows starting at `offset`. Used
/// by the terminal emulator to implement scrollback (§4.8).
pub struct ViewportCanvas<'a> {
    inner: &'a Canvas,
    offset: usize,
    height: usize,
}

impl<'a> ViewportCanvas<'a> {
    /// Build a viewport over `inner` showing `height` rows starting at
    /// `offset`.
    pub fn new(inner: &'a Canvas, offset: usize, height: usize) -> Self {
        Self { inner, offset, height }
    }

    /// The viewport's row count (always `height`, regardless of how
    /// close `offset` is to the bottom).
    pub fn box_rows(&self) -> usize {
        self.height
    }

    /// Width, forwarded from the underlying canvas.
    pub fn width(&self) -> usize {
        self.inner.width()
    }

    /// The row at viewport-local index `y`, translated by `offset`.
    pub fn row(&self, y: usize) -> &[Cell] {
        self.inner.row(self.offset + y)
    }

    /// The cell at viewport-local `(x, y)`.
    pub fn cell(&self, x: usize, y: usize) -> &Cell {
        self.inner.cell(x, self.offset + y)
    }

    /// The offset this viewport is rooted at.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

fn blank_like(style: &Cell) -> Cell {
    Cell::new(" ", style.fg, style.bg, style.style)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellColor;

    #[test]
    fn blank_canvas_dims() {
        let c = Canvas::blank(4, 3);
        assert_eq!(c.width(), 4);
        assert_eq!(c.height(), 3);
    }

    #[test]
    fn append_below_widens_to_max() {
        let mut a = Canvas::blank(2, 1);
        let b = Canvas::blank(4, 1);
        a.append_below(b, true);
        assert_eq!(a.width(), 4);
        assert_eq!(a.height(), 2);
    }

    #[test]
    fn append_below_translates_marks() {
        let mut a = Canvas::blank(2, 2);
        let mut b = Canvas::blank(2, 2);
        b.set_mark("x", (1, 0));
        a.append_below(b, true);
        assert_eq!(a.mark("x"), Some((1, 2)));
    }

    #[test]
    fn append_below_drops_cursor_when_not_included() {
        let mut a = Canvas::blank(2, 1);
        let mut b = Canvas::blank(2, 1);
        b.set_cursor((0, 0));
        a.append_below(b, false);
        assert_eq!(a.cursor(), None);
    }

    #[test]
    fn extend_then_trim_right_is_identity() {
        let mut c = Canvas::blank(3, 2);
        c.set_cursor((1, 1));
        let before = c.clone();
        c.extend_right(4);
        c.trim_right(3);
        assert_eq!(c.width(), before.width());
        assert_eq!(c.cursor(), before.cursor());
    }

    #[test]
    fn extend_left_shifts_marks() {
        let mut c = Canvas::blank(2, 1);
        c.set_mark("m", (0, 0));
        c.extend_left(3);
        assert_eq!(c.mark("m"), Some((3, 0)));
        assert_eq!(c.width(), 5);
    }

    #[test]
    fn write_wraps_at_width() {
        let mut c = Canvas::blank(3, 3);
        let style = Cell::new("", CellColor::None, CellColor::None, Default::default());
        c.write("ABCDEF", 0, 0, &style);
        assert_eq!(c.cell(0, 0).glyph(), "A");
        assert_eq!(c.cell(2, 0).glyph(), "C");
        assert_eq!(c.cell(0, 1).glyph(), "D");
    }

    #[test]
    fn write_newline_advances_and_clears_rest() {
        let mut c = Canvas::blank(3, 2);
        let style = Cell::new("", CellColor::None, CellColor::None, Default::default());
        c.write("A\nB", 0, 0, &style);
        assert_eq!(c.cell(0, 0).glyph(), "A");
        assert_eq!(c.cell(0, 1).glyph(), "B");
    }

    #[test]
    fn merge_under_overlapping_region() {
        let mut base = Canvas::blank(2, 2);
        let mut overlay = Canvas::blank(1, 1);
        overlay.set_cell(0, 0, Cell::new("Z", CellColor::None, CellColor::None, Default::default()));
        base.merge_under(&overlay, 1, 1, true);
        assert_eq!(base.cell(1, 1).glyph(), "Z");
        assert_eq!(base.cell(0, 0).glyph(), "");
    }
}
