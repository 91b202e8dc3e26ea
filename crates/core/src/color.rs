//! sRGB color type and CSS color parsing.
//!
//! The accent color arrives from a CSS custom property, so values may carry
//! surrounding whitespace and may use any CSS color syntax: hex with or
//! without alpha, named colors, `rgb()`, `hsl()`, `hwb()` and friends.

use crate::error::BackdropError;
use log::warn;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Accent used when the custom property is unset or unparsable (crimson).
pub const DEFAULT_ACCENT: Srgb = Srgb {
    r: 220.0 / 255.0,
    g: 20.0 / 255.0,
    b: 60.0 / 255.0,
};

/// sRGB color with components in [0, 1].
///
/// Serializes as a `"#rrggbb"` hex string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Srgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Srgb {
    /// Builds a color from 8-bit channels.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
        }
    }

    /// Parses `"#ff00aa"`, `"ff00aa"` or the shorthand `"#f0a"`.
    pub fn from_hex(hex: &str) -> Result<Srgb, BackdropError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !digits.is_ascii() {
            return Err(BackdropError::InvalidColor(hex.to_string()));
        }
        let channel = |s: &str| {
            u8::from_str_radix(s, 16).map_err(|e| BackdropError::InvalidColor(format!("{hex}: {e}")))
        };
        match digits.len() {
            6 => Ok(Self::from_rgb8(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            3 => {
                let r = channel(&digits[0..1])?;
                let g = channel(&digits[1..2])?;
                let b = channel(&digits[2..3])?;
                Ok(Self::from_rgb8(r * 17, g * 17, b * 17))
            }
            n => Err(BackdropError::InvalidColor(format!(
                "{hex}: expected 3 or 6 hex digits, got {n}"
            ))),
        }
    }

    /// Parses a CSS color value as returned by `getPropertyValue`.
    ///
    /// Alpha is dropped; the accent is always painted with the particle's
    /// own opacity.
    pub fn from_css(value: &str) -> Result<Srgb, BackdropError> {
        let value = value.trim();
        let color = csscolorparser::parse(value)
            .map_err(|e| BackdropError::InvalidColor(format!("{value}: {e}")))?;
        let [r, g, b, _] = color.to_rgba8();
        Ok(Self::from_rgb8(r, g, b))
    }

    /// Resolves a possibly-missing CSS value to a color.
    ///
    /// Absent and blank values mean "use the default". A value the parser
    /// does not understand also resolves to [`DEFAULT_ACCENT`], with a warning.
    pub fn resolve_accent(raw: Option<&str>) -> Srgb {
        let Some(value) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
            return DEFAULT_ACCENT;
        };
        Self::from_css(value).unwrap_or_else(|e| {
            warn!("accent {value:?} unusable, using default: {e}");
            DEFAULT_ACCENT
        })
    }

    /// Returns the 8-bit channels, clamped and rounded.
    pub fn to_rgb8(self) -> [u8; 3] {
        let q = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    /// Converts the color to a hex string like `"#rrggbb"`.
    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_rgb8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// Formats the color as a CSS `rgb(r, g, b)` string.
    pub fn to_css(self) -> String {
        let [r, g, b] = self.to_rgb8();
        format!("rgb({r}, {g}, {b})")
    }
}

impl Serialize for Srgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Srgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Srgb::from_css(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_hex_parses_six_digits_with_and_without_hash() {
        let a = Srgb::from_hex("#DC143C").unwrap();
        let b = Srgb::from_hex("dc143c").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_rgb8(), [220, 20, 60]);
    }

    #[test]
    fn from_hex_expands_shorthand() {
        let c = Srgb::from_hex("#f0a").unwrap();
        assert_eq!(c.to_rgb8(), [255, 0, 170]);
    }

    #[test]
    fn from_hex_rejects_wrong_length() {
        assert!(matches!(
            Srgb::from_hex("#abcd"),
            Err(BackdropError::InvalidColor(_))
        ));
    }

    #[test]
    fn from_hex_rejects_non_hex_digits() {
        assert!(Srgb::from_hex("#zzzzzz").is_err());
    }

    #[test]
    fn from_hex_rejects_multibyte_input_without_panicking() {
        assert!(Srgb::from_hex("#ππ").is_err());
    }

    #[test]
    fn from_css_trims_custom_property_whitespace() {
        // getPropertyValue keeps the space after the colon in the stylesheet.
        let c = Srgb::from_css("  #DC143C").unwrap();
        assert_eq!(c, DEFAULT_ACCENT);
    }

    #[test]
    fn from_css_parses_rgb_and_rgba() {
        assert_eq!(Srgb::from_css("rgb(1, 2, 3)").unwrap().to_rgb8(), [1, 2, 3]);
        assert_eq!(
            Srgb::from_css("rgba(10,20,30,0.5)").unwrap().to_rgb8(),
            [10, 20, 30]
        );
    }

    #[test]
    fn from_css_parses_modern_syntax() {
        assert_eq!(Srgb::from_css("rgb(0 128 255)").unwrap().to_rgb8(), [0, 128, 255]);
        assert_eq!(Srgb::from_css("#0080ffff").unwrap().to_rgb8(), [0, 128, 255]);
        assert_eq!(Srgb::from_css("#0080ff80").unwrap().to_rgb8(), [0, 128, 255]);
    }

    #[test]
    fn from_css_parses_named_colors() {
        assert_eq!(Srgb::from_css("royalblue").unwrap().to_rgb8(), [65, 105, 225]);
        assert_eq!(Srgb::from_css("crimson").unwrap(), DEFAULT_ACCENT);
    }

    #[test]
    fn from_css_parses_hsl_and_percent_channels() {
        for value in ["hsl(210, 100%, 50%)", "rgb(0, 50%, 100%)"] {
            let [r, _, b] = Srgb::from_css(value).unwrap().to_rgb8();
            assert_eq!((r, b), (0, 255), "{value}");
        }
    }

    #[test]
    fn from_css_rejects_garbage() {
        assert!(matches!(
            Srgb::from_css("not-a-color"),
            Err(BackdropError::InvalidColor(_))
        ));
        assert!(Srgb::from_css("#12345").is_err());
    }

    #[test]
    fn resolve_accent_keeps_every_css_form() {
        for value in ["royalblue", "hsl(210, 100%, 50%)", "rgb(0 128 255)", "#0080ffff"] {
            assert_ne!(Srgb::resolve_accent(Some(value)), DEFAULT_ACCENT, "{value}");
        }
    }

    #[test]
    fn resolve_accent_falls_back_when_missing_blank_or_bad() {
        assert_eq!(Srgb::resolve_accent(None), DEFAULT_ACCENT);
        assert_eq!(Srgb::resolve_accent(Some("   ")), DEFAULT_ACCENT);
        assert_eq!(Srgb::resolve_accent(Some("not-a-color")), DEFAULT_ACCENT);
    }

    #[test]
    fn resolve_accent_uses_valid_value() {
        let c = Srgb::resolve_accent(Some(" #00ff00 "));
        assert_eq!(c.to_rgb8(), [0, 255, 0]);
    }

    #[test]
    fn to_css_formats_integer_channels() {
        assert_eq!(DEFAULT_ACCENT.to_css(), "rgb(220, 20, 60)");
    }

    #[test]
    fn serde_uses_hex_string() {
        let json = serde_json::to_string(&DEFAULT_ACCENT).unwrap();
        assert_eq!(json, "\"#dc143c\"");
        let back: Srgb = serde_json::from_str(&json).unwrap();
        assert_eq!(back.to_rgb8(), DEFAULT_ACCENT.to_rgb8());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn hex_formatting_preserves_8bit_channels(r: u8, g: u8, b: u8) {
                let c = Srgb::from_rgb8(r, g, b);
                let parsed = Srgb::from_hex(&c.to_hex()).unwrap();
                prop_assert_eq!(parsed.to_rgb8(), [r, g, b]);
            }
        }
    }
}
