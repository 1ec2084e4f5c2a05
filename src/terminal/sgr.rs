//! SGR (Select Graphic Rendition) code processing (§4.8).

use crate::cell::{Attr, CellColor, StyleAttrs};

/// The current SGR-selected rendition state: fg/bg color and style
/// attributes. Distinct from [`crate::cell::Cell`]'s per-cell triple —
/// this is the terminal's *pen*, copied onto each cell as it's
/// written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pen {
    /// Foreground color.
    pub fg: CellColor,
    /// Background color.
    pub bg: CellColor,
    /// Style attribute mask.
    pub style: StyleAttrs,
}

impl Pen {
    /// Reset to the default pen (SGR 0).
    pub fn reset(&mut self) {
        *self = Pen::default();
    }

    /// Apply one SGR parameter, consuming further parameters from
    /// `params` for the extended-color forms (`38;5;n`, `38;2;r;g;b`,
    /// and their background counterparts). Returns the number of extra
    /// parameters consumed beyond the one at `params[0]`.
    pub fn apply(&mut self, params: &[u16]) {
        let mut i = 0;
        while i < params.len() {
            let code = params[i];
            match code {
                0 => self.reset(),
                1 => self.style = self.style.with(Attr::Bold, true),
                2 => self.style = self.style.with(Attr::Dim, true),
                4 => self.style = self.style.with(Attr::Underline, true),
                5 => self.style = self.style.with(Attr::Blink, true),
                7 => self.style = self.style.with(Attr::Reverse, true),
                22 => {
                    self.style = self.style.with(Attr::Bold, false);
                    self.style = self.style.with(Attr::Dim, false);
                }
                24 => self.style = self.style.with(Attr::Underline, false),
                25 => self.style = self.style.with(Attr::Blink, false),
                27 => self.style = self.style.with(Attr::Reverse, false),
                30..=37 => self.fg = CellColor::Indexed((code - 30) as u8),
                39 => self.fg = CellColor::Default,
                40..=47 => self.bg = CellColor::Indexed((code - 40) as u8),
                49 => self.bg = CellColor::Default,
                90..=97 => self.fg = CellColor::Indexed((code - 90 + 8) as u8),
                100..=107 => self.bg = CellColor::Indexed((code - 100 + 8) as u8),
                38 | 48 => {
                    let (color, consumed) = parse_extended_color(&params[i + 1..]);
                    if code == 38 {
                        self.fg = color;
                    } else {
                        self.bg = color;
                    }
                    i += consumed;
                }
                _ => {}
            }
            i += 1;
        }
    }
}

/// Parse the parameters following `38`/`48`: either `5;n` (indexed) or
/// `2;r;g;b` (truecolor). Returns the color and how many parameters
/// (beyond the selector code itself) were consumed.
fn parse_extended_color(rest: &[u16]) -> (CellColor, usize) {
    match rest.first() {
        Some(5) => {
            let idx = rest.get(1).copied().unwrap_or(0) as u8;
            (CellColor::Indexed(idx), 2)
        }
        Some(2) => {
            let r = rest.get(1).copied().unwrap_or(0) as u8;
            let g = rest.get(2).copied().unwrap_or(0) as u8;
            let b = rest.get(3).copied().unwrap_or(0) as u8;
            (CellColor::Rgb(r, g, b), 4)
        }
        _ => (CellColor::None, 0),
    }
}
