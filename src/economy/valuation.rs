//! One-time base valuation for freshly generated artifacts.
//!
//! The base value is a uniform draw from the rarity's range scaled by how much text the void
//! produced:
//!
//! ```text
//! art      = min(1.5, chars(ascii_art) / 500)
//! desc     = min(1.5, chars(description) / 1000)
//! modifier = (art + desc) / 2                    // 0.0 ..= 1.5
//! base     = max(1, floor(draw * modifier))
//! ```
//!
//! A sparse legendary can therefore be worth less than a richly described common. Market
//! state plays no part here; see [`crate::economy::ArtifactMarket::value_of`] for current value.

use super::types::Rarity;
use rand::Rng;

const ART_CHARS_PER_POINT: f64 = 500.0;
const DESC_CHARS_PER_POINT: f64 = 1000.0;
const MAX_COMPONENT: f64 = 1.5;

/// Uniform draw from the rarity's inclusive value range, before any modifier.
pub fn draw_base<R: Rng + ?Sized>(rarity: Rarity, rng: &mut R) -> u32 {
    rng.gen_range(rarity.value_range())
}

pub fn complexity_modifier(ascii_art: &str, description: &str) -> f64 {
    let art = (ascii_art.chars().count() as f64 / ART_CHARS_PER_POINT).min(MAX_COMPONENT);
    let desc = (description.chars().count() as f64 / DESC_CHARS_PER_POINT).min(MAX_COMPONENT);
    (art + desc) / 2.0
}

/// Scale a raw draw by the modifier, flooring, with a minimum of 1.
pub fn apply_modifier(draw: u32, modifier: f64) -> u32 {
    let scaled = (draw as f64 * modifier).floor();
    if scaled < 1.0 {
        1
    } else {
        scaled as u32
    }
}

pub fn base_value(rarity: Rarity, ascii_art: &str, description: &str) -> u32 {
    base_value_with(&mut rand::thread_rng(), rarity, ascii_art, description)
}

pub fn base_value_with<R: Rng + ?Sized>(
    rng: &mut R,
    rarity: Rarity,
    ascii_art: &str,
    description: &str,
) -> u32 {
    let draw = draw_base(rarity, rng);
    apply_modifier(draw, complexity_modifier(ascii_art, description))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_caps_each_component() {
        let art = "#".repeat(5_000);
        let desc = "x".repeat(50_000);
        assert!((complexity_modifier(&art, &desc) - 1.5).abs() < 1e-12);
        assert_eq!(complexity_modifier("", ""), 0.0);
        // 250 art chars -> 0.5, 500 desc chars -> 0.5
        let m = complexity_modifier(&"#".repeat(250), &"x".repeat(500));
        assert!((m - 0.5).abs() < 1e-12);
    }

    #[test]
    fn modifier_counts_characters_not_bytes() {
        let art = "▓".repeat(500);
        assert!((complexity_modifier(&art, "") - 0.5).abs() < 1e-12);
    }

    #[test]
    fn apply_modifier_floors_and_clamps() {
        assert_eq!(apply_modifier(15, 0.5), 7);
        assert_eq!(apply_modifier(1000, 0.0), 1);
        assert_eq!(apply_modifier(5, 0.1), 1);
        assert_eq!(apply_modifier(200, 1.5), 300);
    }
}
