//! Stable terminal colors for target paths

use colored::Color;

/// Label colors, chosen to stay clear of the red/yellow/green used for status
const PALETTE: [Color; 6] = [
    Color::TrueColor {
        r: 147,
        g: 112,
        b: 219,
    },
    Color::TrueColor {
        r: 64,
        g: 224,
        b: 208,
    },
    Color::TrueColor {
        r: 255,
        g: 140,
        b: 0,
    },
    Color::TrueColor {
        r: 199,
        g: 21,
        b: 133,
    },
    Color::TrueColor {
        r: 72,
        g: 209,
        b: 204,
    },
    Color::TrueColor {
        r: 138,
        g: 43,
        b: 226,
    },
];

/// Get a consistent color for a target path
pub fn target_color(path: &str) -> Color {
    let hash = path
        .bytes()
        .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));

    PALETTE[(hash % PALETTE.len() as u64) as usize]
}
