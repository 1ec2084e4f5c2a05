//! G0/G1 character set selection and the DEC special graphics
//! translation table (§4.8).

/// Which of the four designatable character sets is active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Charset {
    /// US-ASCII / UTF-8, no translation.
    #[default]
    Default,
    /// VT100 line-drawing alternate set (`ESC ( 0`).
    DecSpecialGraphics,
    /// IBM PC code page 437-ish approximation used by some legacy
    /// programs (`ESC ( U`).
    Ibmpc,
    /// User-defined set (`ESC ( <` DEC user-preferred supplemental);
    /// not translated, kept distinct for completeness.
    User,
}

/// Which slot (G0 or G1) is currently mapped onto the active character
/// set via shift-in/shift-out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GSlot {
    /// Shifted-in (default).
    #[default]
    G0,
    /// Shifted-out (`SO`, 0x0e).
    G1,
}

/// The charset designation state: two slots (G0, G1) and which is
/// active.
#[derive(Clone, Copy, Debug, Default)]
pub struct CharsetState {
    g0: Charset,
    g1: Charset,
    active: GSlot,
}

impl CharsetState {
    /// Designate `charset` into slot `g1_slot` (`false` = G0, `true` =
    /// G1).
    pub fn designate(&mut self, g1_slot: bool, charset: Charset) {
        if g1_slot {
            self.g1 = charset;
        } else {
            self.g0 = charset;
        }
    }

    /// Shift in (select G0).
    pub fn shift_in(&mut self) {
        self.active = GSlot::G0;
    }

    /// Shift out (select G1).
    pub fn shift_out(&mut self) {
        self.active = GSlot::G1;
    }

    /// The currently active charset.
    pub fn active(&self) -> Charset {
        match self.active {
            GSlot::G0 => self.g0,
            GSlot::G1 => self.g1,
        }
    }

    /// Translate a single ASCII byte through the active charset. Bytes
    /// outside the translatable range (and anything when the active
    /// charset doesn't translate) pass through unchanged.
    pub fn translate(&self, byte: u8) -> char {
        match self.active() {
            Charset::DecSpecialGraphics => dec_special_graphics(byte),
            _ => byte as char,
        }
    }
}

/// DEC special graphics maps `0x60..=0x7e` to line-drawing glyphs; all
/// other bytes pass through.
fn dec_special_graphics(byte: u8) -> char {
    match byte {
        0x60 => '\u{25c6}', // ◆
        0x61 => '\u{2592}', // ▒
        0x62 => '\u{2409}', // HT symbol
        0x63 => '\u{240c}', // FF symbol
        0x64 => '\u{240d}', // CR symbol
        0x65 => '\u{240a}', // LF symbol
        0x66 => '\u{00b0}', // °
        0x67 => '\u{00b1}', // ±
        0x68 => '\u{2424}', // NL symbol
        0x69 => '\u{240b}', // VT symbol
        0x6a => '\u{2518}', // ┘
        0x6b => '\u{2510}', // ┐
        0x6c => '\u{250c}', // ┌
        0x6d => '\u{2514}', // └
        0x6e => '\u{253c}', // ┼
        0x6f => '\u{23ba}', // scan line 1
        0x70 => '\u{23bb}', // scan line 3
        0x71 => '\u{2500}', // ─
        0x72 => '\u{23bc}', // scan line 7
        0x73 => '\u{23bd}', // scan line 9
        0x74 => '\u{251c}', // ├
        0x75 => '\u{2524}', // ┤
        0x76 => '\u{2534}', // ┴
        0x77 => '\u{252c}', // ┬
        0x78 => '\u{2502}', // │
        0x79 => '\u{2264}', // ≤
        0x7a => '\u{2265}', // ≥
        0x7b => '\u{03c0}', // π
        0x7c => '\u{2260}', // ≠
        0x7d => '\u{00a3}', // £
        0x7e => '\u{00b7}', // ·
        other => other as char,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_out_then_in_toggles_active_slot() {
        let mut s = CharsetState::default();
        s.designate(true, Charset::DecSpecialGraphics);
        s.shift_out();
        assert_eq!(s.active(), Charset::DecSpecialGraphics);
        s.shift_in();
        assert_eq!(s.active(), Charset::Default);
    }

    #[test]
    fn dec_special_graphics_translates_q_to_horizontal_line() {
        let mut s = CharsetState::default();
        s.designate(false, Charset::DecSpecialGraphics);
        assert_eq!(s.translate(b'q'), '\u{2500}');
    }

    #[test]
    fn default_charset_passes_through() {
        let s = CharsetState::default();
        assert_eq!(s.translate(b'q'), 'q');
    }
}
