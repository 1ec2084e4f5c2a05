//! Property-based tests for RGB-to-terminal color reduction.
//!
//! Uses proptest to generate random RGB triples and verify the
//! reducer never panics and always lands on a representable color.

use loomwid::cell::CellColor;
use loomwid::color::{Color, ColorMode};
use proptest::prelude::*;

proptest! {
    #[test]
    fn random_rgb_reduces_to_a_valid_256_index(r in 0u8..=255, g in 0u8..=255, b in 0u8..=255) {
        let color = Color::rgb(r, g, b);
        let reduced = color.to_terminal(ColorMode::Palette256, false);
        prop_assert!(matches!(reduced, CellColor::Indexed(_)));
    }
}

proptest! {
    #[test]
    fn random_rgb_reduces_to_a_valid_16_index(r in 0u8..=255, g in 0u8..=255, b in 0u8..=255) {
        let color = Color::rgb(r, g, b);
        let reduced = color.to_terminal(ColorMode::Palette16, false);
        match reduced {
            CellColor::Indexed(i) => prop_assert!(i < 16),
            other => prop_assert!(false, "expected an indexed color, got {other:?}"),
        }
    }
}

proptest! {
    #[test]
    fn reduction_is_deterministic_for_repeated_lookups(r in 0u8..=255, g in 0u8..=255, b in 0u8..=255) {
        let color = Color::rgb(r, g, b);
        let first = color.to_terminal(ColorMode::Palette256, false);
        let second = color.to_terminal(ColorMode::Palette256, false);
        prop_assert_eq!(first, second);
    }
}

proptest! {
    #[test]
    fn truecolor_mode_never_reduces(r in 0u8..=255, g in 0u8..=255, b in 0u8..=255) {
        let color = Color::rgb(r, g, b);
        let rendered = color.to_terminal(ColorMode::TrueColor, false);
        prop_assert_eq!(rendered, CellColor::Rgb(r, g, b));
    }
}
