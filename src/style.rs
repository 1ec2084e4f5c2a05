//! Cell stylers and the palette (§4.2).

use std::collections::HashMap;

use crate::cell::{Cell, CellColor, StyleAttrs};
use crate::color::{Color, ColorMode};

/// Everything a [`CellStyler`] needs to resolve itself: the active
/// palette and color mode.
pub struct RenderContext<'a> {
    /// The application's palette.
    pub palette: &'a Palette,
    /// The active color mode.
    pub mode: ColorMode,
    /// Whether 256-color nearest match should exclude indices 0..=21.
    pub ignore_base16: bool,
}

/// The resolved (fg, bg, style) triple a [`CellStyler`] produces.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StyleTriple {
    /// Foreground color.
    pub fg: CellColor,
    /// Background color.
    pub bg: CellColor,
    /// Style attribute mask.
    pub style: StyleAttrs,
}

impl StyleTriple {
    /// Apply this triple to a cell, producing a fully styled cell with
    /// the same glyph.
    pub fn apply(&self, glyph: &str) -> Cell {
        Cell::new(glyph, self.fg, self.bg, self.style)
    }
}

/// A cell styler: given a render context, produces a (fg, bg, style)
/// triple. Concrete variants per §4.2.
#[derive(Clone)]
pub enum CellStyler {
    /// A static triple.
    Entry(Color, Color, StyleAttrs),
    /// Looks up `name` in the palette and delegates.
    Ref(String),
    /// Sets only the foreground; no preference elsewhere.
    Foreground(Color),
    /// Sets only the background; no preference elsewhere.
    Background(Color),
    /// Style only; no color preference.
    StyledAs(StyleAttrs),
    /// Swaps fg/bg of the inner styler.
    Inverter(Box<CellStyler>),
    /// Layers `over` on top of `base`.
    Mod(Box<CellStyler>, Box<CellStyler>),
    /// No preference for anything.
    Empty,
}

impl CellStyler {
    /// Resolve this styler to a concrete triple.
    pub fn resolve(&self, ctx: &RenderContext) -> StyleTriple {
        match self {
            CellStyler::Entry(fg, bg, style) => StyleTriple {
                fg: fg.to_terminal(ctx.mode, ctx.ignore_base16),
                bg: bg.to_terminal(ctx.mode, ctx.ignore_base16),
                style: *style,
            },
            CellStyler::Ref(name) => ctx
                .palette
                .get(name)
                .map(|styler| styler.resolve(ctx))
                .unwrap_or_default(),
            CellStyler::Foreground(c) => StyleTriple {
                fg: c.to_terminal(ctx.mode, ctx.ignore_base16),
                bg: CellColor::None,
                style: StyleAttrs::new(),
            },
            CellStyler::Background(c) => StyleTriple {
                fg: CellColor::None,
                bg: c.to_terminal(ctx.mode, ctx.ignore_base16),
                style: StyleAttrs::new(),
            },
            CellStyler::StyledAs(style) => StyleTriple {
                fg: CellColor::None,
                bg: CellColor::None,
                style: *style,
            },
            CellStyler::Inverter(inner) => {
                let t = inner.resolve(ctx);
                StyleTriple {
                    fg: t.bg,
                    bg: t.fg,
                    style: t.style,
                }
            }
            CellStyler::Mod(base, over) => {
                let base_t = base.resolve(ctx);
                let over_t = over.resolve(ctx);
                StyleTriple {
                    fg: if over_t.fg.is_preference() { over_t.fg } else { base_t.fg },
                    bg: if over_t.bg.is_preference() { over_t.bg } else { base_t.bg },
                    style: base_t.style.merge_under(&over_t.style),
                }
            }
            CellStyler::Empty => StyleTriple::default(),
        }
    }
}

/// A mapping from name to cell styler. Lookup is by exact name;
/// iteration order is unspecified. The application owns the palette for
/// its lifetime.
#[derive(Clone, Default)]
pub struct Palette {
    entries: HashMap<String, CellStyler>,
}

impl Palette {
    /// An empty palette.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a styler under `name`.
    pub fn insert(&mut self, name: impl Into<String>, styler: CellStyler) {
        self.entries.insert(name.into(), styler);
    }

    /// Look up a styler by exact name.
    pub fn get(&self, name: &str) -> Option<&CellStyler> {
        self.entries.get(name)
    }

    /// The "default" entry the event loop uses for the base style layer
    /// (§4.6 `render_root`).
    pub fn default_entry(&self) -> Option<&CellStyler> {
        self.get("default")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(palette: &'a Palette) -> RenderContext<'a> {
        RenderContext {
            palette,
            mode: ColorMode::TrueColor,
            ignore_base16: false,
        }
    }

    #[test]
    fn entry_resolves_static_triple() {
        let p = Palette::new();
        let s = CellStyler::Entry(Color::Rgb(1, 2, 3), Color::NoPreference, StyleAttrs::new());
        let t = s.resolve(&ctx(&p));
        assert_eq!(t.fg, CellColor::Rgb(1, 2, 3));
        assert_eq!(t.bg, CellColor::None);
    }

    #[test]
    fn ref_delegates_to_palette() {
        let mut p = Palette::new();
        p.insert("warn", CellStyler::Foreground(Color::Indexed(3)));
        let s = CellStyler::Ref("warn".into());
        let t = s.resolve(&ctx(&p));
        assert_eq!(t.fg, CellColor::Indexed(3));
    }

    #[test]
    fn ref_missing_name_is_empty() {
        let p = Palette::new();
        let s = CellStyler::Ref("missing".into());
        let t = s.resolve(&ctx(&p));
        assert_eq!(t, StyleTriple::default());
    }

    #[test]
    fn inverter_swaps_fg_bg() {
        let p = Palette::new();
        let inner = CellStyler::Entry(Color::Indexed(1), Color::Indexed(2), StyleAttrs::new());
        let s = CellStyler::Inverter(Box::new(inner));
        let t = s.resolve(&ctx(&p));
        assert_eq!(t.fg, CellColor::Indexed(2));
        assert_eq!(t.bg, CellColor::Indexed(1));
    }

    #[test]
    fn mod_uses_over_when_concrete() {
        let p = Palette::new();
        let base = CellStyler::Entry(Color::Indexed(1), Color::Indexed(1), StyleAttrs::new());
        let over = CellStyler::Foreground(Color::Indexed(9));
        let s = CellStyler::Mod(Box::new(base), Box::new(over));
        let t = s.resolve(&ctx(&p));
        assert_eq!(t.fg, CellColor::Indexed(9));
        assert_eq!(t.bg, CellColor::Indexed(1));
    }

    #[test]
    fn empty_has_no_preference() {
        let p = Palette::new();
        let t = CellStyler::Empty.resolve(&ctx(&p));
        assert_eq!(t, StyleTriple::default());
    }
}
