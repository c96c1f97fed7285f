//! Colors used by the landing page and its rain layers.

use std::fmt;

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// An sRGB color, serialized as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color {0:?}, expected #RRGGBB")]
pub struct ParseColorError(pub String);

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Result<Self, ParseColorError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(ParseColorError(hex.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| ParseColorError(hex.to_string()))
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Linear blend from `self` towards `other`; `t` is clamped to `[0, 1]`.
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Rgb {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgb::from_hex(&value)
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

impl From<Rgb> for Color {
    fn from(value: Rgb) -> Self {
        Color::Rgb(value.r, value.g, value.b)
    }
}

/// Page color scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Page background.
    pub background: Rgb,
    /// Body text.
    pub text: Rgb,
    /// Normal glyphs, common particles and the splash flash.
    pub rain: Rgb,
    /// Highlighted glyphs.
    pub highlight: Rgb,
    /// Rare particles and the progress bar tail.
    pub accent: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Rgb::new(0x0B, 0x0A, 0x09),
            text: Rgb::new(0xF2, 0xE8, 0xD4),
            rain: Rgb::new(0x23, 0x7A, 0x6D),
            highlight: Rgb::new(0x3A, 0xD6, 0xC4),
            accent: Rgb::new(0xB0, 0x79, 0x3E),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_parse() {
        assert_eq!(Rgb::from_hex("#237A6D"), Ok(Rgb::new(0x23, 0x7A, 0x6D)));
        assert_eq!(Rgb::from_hex("b0793e"), Ok(Rgb::new(0xB0, 0x79, 0x3E)));
        assert!(Rgb::from_hex("#12345").is_err());
        assert!(Rgb::from_hex("#GGGGGG").is_err());
    }

    #[test]
    fn test_display_matches_parse() {
        let color = Rgb::new(0x3A, 0xD6, 0xC4);
        assert_eq!(color.to_string(), "#3AD6C4");
    }

    #[test]
    fn test_lerp() {
        let black = Rgb::new(0, 0, 0);
        let white = Rgb::new(255, 255, 255);
        assert_eq!(black.lerp(white, 0.0), black);
        assert_eq!(black.lerp(white, 1.0), white);
        assert_eq!(black.lerp(white, 0.5), Rgb::new(128, 128, 128));
        assert_eq!(black.lerp(white, 3.0), white);
    }

    #[test]
    fn test_into_ratatui_color() {
        let color: Color = Rgb::new(1, 2, 3).into();
        assert_eq!(color, Color::Rgb(1, 2, 3));
    }
}
