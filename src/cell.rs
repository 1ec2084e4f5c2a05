//! The grid cell: a glyph plus a three-channel styling triple.

use unicode_width::UnicodeWidthStr;

/// A color channel value with three-valued semantics: no preference, the
/// terminal's own default, or a concrete color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellColor {
    /// No preference — a layered-under cell shows through.
    None,
    /// Explicit terminal default (distinct from "no preference").
    Default,
    /// A concrete indexed color, 0..=255.
    Indexed(u8),
    /// A concrete 24-bit color.
    Rgb(u8, u8, u8),
}

impl Default for CellColor {
    fn default() -> Self {
        CellColor::None
    }
}

impl CellColor {
    /// True for anything other than `None`.
    pub fn is_preference(&self) -> bool {
        !matches!(self, CellColor::None)
    }
}

/// One style attribute flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Attr {
    /// Bold / increased intensity.
    Bold = 0,
    /// Blinking.
    Blink = 1,
    /// Dim / decreased intensity.
    Dim = 2,
    /// Reverse video.
    Reverse = 3,
    /// Underline.
    Underline = 4,
}

const ATTR_COUNT: usize = 5;
const ALL_ATTRS: [Attr; ATTR_COUNT] = [
    Attr::Bold,
    Attr::Blink,
    Attr::Dim,
    Attr::Reverse,
    Attr::Underline,
];

/// Style attributes as two bitmasks: which attributes are *declared* by
/// this layer, and for the declared ones, whether they are on or off.
/// Layering two `StyleAttrs` is well-defined because an undeclared
/// attribute never overrides a declared one underneath it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct StyleAttrs {
    declared: u8,
    on_off: u8,
}

impl StyleAttrs {
    /// The empty mask: nothing declared.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `attr` as on or off.
    #[must_use]
    pub fn with(mut self, attr: Attr, on: bool) -> Self {
        let bit = 1 << (attr as u8);
        self.declared |= bit;
        if on {
            self.on_off |= bit;
        } else {
            self.on_off &= !bit;
        }
        self
    }

    /// Whether `attr` is declared by this mask.
    pub fn is_declared(&self, attr: Attr) -> bool {
        self.declared & (1 << (attr as u8)) != 0
    }

    /// The on/off value of `attr`. Meaningless if not declared.
    pub fn is_on(&self, attr: Attr) -> bool {
        self.on_off & (1 << (attr as u8)) != 0
    }

    /// Layer `self` under `upper`: for each attribute declared in `upper`,
    /// take upper's value; otherwise retain `self`'s.
    #[must_use]
    pub fn merge_under(&self, upper: &StyleAttrs) -> StyleAttrs {
        let mut out = *self;
        for attr in ALL_ATTRS {
            if upper.is_declared(attr) {
                out = out.with(attr, upper.is_on(attr));
            }
        }
        out
    }
}

/// A single grid cell: glyph plus styling triple.
///
/// A default-constructed cell is "transparent": no glyph, no color
/// preference, no style preference.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Cell {
    /// The glyph text. Empty means "no glyph declared" (transparent).
    /// A continuation cell (the trailing half of a double-width glyph)
    /// is represented as an empty glyph with `width == 0`.
    glyph: String,
    /// Screen-column width of the glyph: 0, 1, or 2.
    width: u8,
    /// Foreground color.
    pub fg: CellColor,
    /// Background color.
    pub bg: CellColor,
    /// Style attribute mask.
    pub style: StyleAttrs,
}

impl Cell {
    /// Build a cell from a glyph string and triple. Width is computed
    /// from the glyph via `unicode-width`.
    pub fn new(glyph: impl Into<String>, fg: CellColor, bg: CellColor, style: StyleAttrs) -> Self {
        let glyph = glyph.into();
        let width = UnicodeWidthStr::width(glyph.as_str()).min(2) as u8;
        Self {
            glyph,
            width,
            fg,
            bg,
            style,
        }
    }

    /// The transparent cell (no glyph, no preference).
    pub fn transparent() -> Self {
        Self::default()
    }

    /// A single blank space cell with the given triple.
    pub fn blank(fg: CellColor, bg: CellColor, style: StyleAttrs) -> Self {
        Self::new(" ", fg, bg, style)
    }

    /// The trailing half of a double-width glyph.
    pub fn continuation() -> Self {
        Self {
            glyph: String::new(),
            width: 0,
            ..Self::default()
        }
    }

    /// True when a glyph is declared (width nonzero).
    pub fn has_glyph(&self) -> bool {
        self.width > 0
    }

    /// The glyph text, empty if undeclared.
    pub fn glyph(&self) -> &str {
        &self.glyph
    }

    /// Display width: 0 (continuation), 1, or 2.
    pub fn width(&self) -> u8 {
        self.width
    }

    /// True if this cell is a continuation of a wide glyph to its left.
    pub fn is_continuation(&self) -> bool {
        self.width == 0
    }

    /// Layer `self` under `upper`, per §4.1: glyph is upper's if declared
    /// (a cell declares a glyph when its width is nonzero), colors are
    /// upper's where not `None`, style is merged.
    #[must_use]
    pub fn merge_under(&self, upper: &Cell) -> Cell {
        let (glyph, width) = if upper.width > 0 {
            (upper.glyph.clone(), upper.width)
        } else {
            (self.glyph.clone(), self.width)
        };
        let fg = if upper.fg.is_preference() {
            upper.fg
        } else {
            self.fg
        };
        let bg = if upper.bg.is_preference() {
            upper.bg
        } else {
            self.bg
        };
        let style = self.style.merge_under(&upper.style);
        Cell {
            glyph,
            width,
            fg,
            bg,
            style,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transparent_has_no_glyph_or_preference() {
        let c = Cell::transparent();
        assert_eq!(c.glyph(), "");
        assert_eq!(c.fg, CellColor::None);
        assert_eq!(c.bg, CellColor::None);
    }

    #[test]
    fn wide_glyph_width_two() {
        let c = Cell::new("\u{4e16}", CellColor::None, CellColor::None, StyleAttrs::new());
        assert_eq!(c.width(), 2);
    }

    #[test]
    fn merge_under_takes_upper_glyph() {
        let lower = Cell::new("x", CellColor::None, CellColor::None, StyleAttrs::new());
        let upper = Cell::new("y", CellColor::None, CellColor::None, StyleAttrs::new());
        let merged = lower.merge_under(&upper);
        assert_eq!(merged.glyph(), "y");
    }

    #[test]
    fn merge_under_keeps_lower_glyph_when_upper_transparent() {
        let lower = Cell::new("x", CellColor::None, CellColor::None, StyleAttrs::new());
        let upper = Cell::transparent();
        let merged = lower.merge_under(&upper);
        assert_eq!(merged.glyph(), "x");
    }

    #[test]
    fn merge_under_color_none_shows_through() {
        let lower = Cell::new("x", CellColor::Indexed(1), CellColor::None, StyleAttrs::new());
        let upper = Cell::new("y", CellColor::None, CellColor::None, StyleAttrs::new());
        let merged = lower.merge_under(&upper);
        assert_eq!(merged.fg, CellColor::Indexed(1));
    }

    #[test]
    fn merge_under_color_concrete_overrides() {
        let lower = Cell::new("x", CellColor::Indexed(1), CellColor::None, StyleAttrs::new());
        let upper = Cell::new("y", CellColor::Indexed(2), CellColor::None, StyleAttrs::new());
        let merged = lower.merge_under(&upper);
        assert_eq!(merged.fg, CellColor::Indexed(2));
    }

    #[test]
    fn style_merge_under_declared_wins() {
        let lower = StyleAttrs::new().with(Attr::Bold, true);
        let upper = StyleAttrs::new().with(Attr::Bold, false);
        let merged = lower.merge_under(&upper);
        assert!(merged.is_declared(Attr::Bold));
        assert!(!merged.is_on(Attr::Bold));
    }

    #[test]
    fn style_merge_under_undeclared_keeps_lower() {
        let lower = StyleAttrs::new().with(Attr::Underline, true);
        let upper = StyleAttrs::new();
        let merged = lower.merge_under(&upper);
        assert!(merged.is_declared(Attr::Underline));
        assert!(merged.is_on(Attr::Underline));
    }

    #[test]
    fn merge_under_is_associative_on_declared_channels() {
        let a = Cell::new("a", CellColor::Indexed(3), CellColor::None, StyleAttrs::new().with(Attr::Bold, true));
        let b = Cell::transparent();
        let c = Cell::new("c", CellColor::None, CellColor::Indexed(9), StyleAttrs::new());
        let left = (a.merge_under(&b)).merge_under(&c);
        let right = a.merge_under(&b.merge_under(&c));
        assert_eq!(left.fg, right.fg);
        assert_eq!(left.bg, right.bg);
        assert_eq!(left.style, right.style);
    }
}
