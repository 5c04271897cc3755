//! Color value parsing.
//!
//! Brand documents write colors as text. The formats accepted here are the
//! ones a stylesheet would accept:
//!
//! - Hex: `"#0085c3"`, `"#fff"`, and the alpha forms `"#0085c380"`, `"#fff8`
//! - Functional: `rgb(0, 133, 195)`, `rgba(0, 133, 195, 0.5)`,
//!   `rgb(0 133 195 / 50%)`
//! - CSS named colors: `rebeccapurple`, `tomato`, `transparent`, ...
//!
//! Every format normalizes to a [`Color`], which always displays as lowercase
//! hex so that equal colors print identically.
//!
//! ```rust
//! use brand_yml::Color;
//!
//! let blue: Color = "#0085c3".parse().unwrap();
//! assert_eq!(blue, Color::rgb(0, 133, 195));
//! assert_eq!("rgb(0, 133, 195)".parse::<Color>().unwrap(), blue);
//! assert_eq!(blue.to_string(), "#0085c3");
//! ```

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

static FUNCTIONAL_NOTATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(rgba?)\(\s*([^()]*?)\s*\)$").expect("functional color pattern is valid")
});

static COMPONENT_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s,/]+").expect("component separator pattern is valid"));

/// Error returned when a string is not a recognizable color.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorParseError {
    /// `#` followed by the wrong number of digits or non-hex characters.
    #[error("invalid hex color '{0}' (expected 3, 4, 6 or 8 hex digits)")]
    InvalidHex(String),

    /// `rgb(...)`/`rgba(...)` with malformed components.
    #[error("invalid color function '{value}': {reason}")]
    InvalidFunction { value: String, reason: String },

    /// A bare word that is not a CSS color keyword.
    #[error("unknown color name '{0}'")]
    UnknownName(String),

    /// Empty input.
    #[error("empty color value")]
    Empty,
}

/// An sRGB color with an alpha channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Opaque color from its channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color with an explicit alpha channel.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// Parses any supported color notation.
    pub fn parse(value: &str) -> Result<Self, ColorParseError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(ColorParseError::Empty);
        }
        if let Some(hex) = value.strip_prefix('#') {
            return Self::parse_hex(hex).ok_or_else(|| ColorParseError::InvalidHex(value.into()));
        }
        if let Some(caps) = FUNCTIONAL_NOTATION.captures(value) {
            return Self::parse_functional(value, &caps[2]);
        }
        named_color(value).ok_or_else(|| ColorParseError::UnknownName(value.to_string()))
    }

    /// Returns true when `value` is written in a literal notation (hex or a
    /// color function), as opposed to a bare word that may be a name.
    pub fn looks_like_literal(value: &str) -> bool {
        let value = value.trim();
        value.starts_with('#') || value.contains('(')
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|n| n * 17);
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            3 => Some(Color::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
            4 => Some(Color::rgba(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?)),
            6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Color::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    fn parse_functional(value: &str, inner: &str) -> Result<Self, ColorParseError> {
        let invalid = |reason: String| ColorParseError::InvalidFunction {
            value: value.to_string(),
            reason,
        };

        let parts: Vec<&str> = COMPONENT_SEPARATOR
            .split(inner)
            .filter(|p| !p.is_empty())
            .collect();
        if parts.len() != 3 && parts.len() != 4 {
            return Err(invalid(format!(
                "expected 3 or 4 components, got {}",
                parts.len()
            )));
        }

        let mut channels = [0u8; 3];
        for (i, part) in parts.iter().take(3).enumerate() {
            channels[i] = parse_channel(part).map_err(&invalid)?;
        }
        let alpha = match parts.get(3) {
            Some(part) => parse_alpha(part).map_err(&invalid)?,
            None => 255,
        };

        Ok(Color::rgba(channels[0], channels[1], channels[2], alpha))
    }

    /// Returns the color as lowercase hex, including alpha only when the
    /// color is not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// WCAG relative luminance in `0.0..=1.0`. Alpha is ignored.
    pub fn relative_luminance(&self) -> f64 {
        fn linear(channel: u8) -> f64 {
            let c = f64::from(channel) / 255.0;
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        0.2126 * linear(self.r) + 0.7152 * linear(self.g) + 0.0722 * linear(self.b)
    }

    /// WCAG contrast ratio between two colors, in `1.0..=21.0`.
    pub fn contrast_ratio(&self, other: &Color) -> f64 {
        let a = self.relative_luminance();
        let b = other.relative_luminance();
        let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
        (hi + 0.05) / (lo + 0.05)
    }
}

fn parse_channel(part: &str) -> Result<u8, String> {
    if let Some(pct) = part.strip_suffix('%') {
        let pct: f64 = pct
            .parse()
            .map_err(|_| format!("'{}' is not a percentage", part))?;
        if !(0.0..=100.0).contains(&pct) {
            return Err(format!("'{}' is out of range (0%-100%)", part));
        }
        return Ok((pct * 2.55).round() as u8);
    }
    let n: f64 = part
        .parse()
        .map_err(|_| format!("'{}' is not a number", part))?;
    if !(0.0..=255.0).contains(&n) {
        return Err(format!("'{}' is out of range (0-255)", part));
    }
    Ok(n.round() as u8)
}

fn parse_alpha(part: &str) -> Result<u8, String> {
    let fraction = if let Some(pct) = part.strip_suffix('%') {
        pct.parse::<f64>()
            .map_err(|_| format!("alpha '{}' is not a percentage", part))?
            / 100.0
    } else {
        part.parse::<f64>()
            .map_err(|_| format!("alpha '{}' is not a number", part))?
    };
    if !(0.0..=1.0).contains(&fraction) {
        return Err(format!("alpha '{}' is out of range (0-1)", part));
    }
    Ok((fraction * 255.0).round() as u8)
}

/// Looks up a CSS color keyword, case-insensitively.
pub fn named_color(name: &str) -> Option<Color> {
    let lower = name.trim().to_ascii_lowercase();
    if lower == "transparent" {
        return Some(Color::rgba(0, 0, 0, 0));
    }
    CSS_NAMED_COLORS
        .iter()
        .find(|(n, _)| *n == lower)
        .map(|(_, rgb)| Color::rgb((rgb >> 16) as u8, (rgb >> 8) as u8, *rgb as u8))
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::parse(&s).map_err(serde::de::Error::custom)
    }
}

const CSS_NAMED_COLORS: &[(&str, u32)] = &[
    ("aliceblue", 0xF0F8FF),
    ("antiquewhite", 0xFAEBD7),
    ("aqua", 0x00FFFF),
    ("aquamarine", 0x7FFFD4),
    ("azure", 0xF0FFFF),
    ("beige", 0xF5F5DC),
    ("bisque", 0xFFE4C4),
    ("black", 0x000000),
    ("blanchedalmond", 0xFFEBCD),
    ("blue", 0x0000FF),
    ("blueviolet", 0x8A2BE2),
    ("brown", 0xA52A2A),
    ("burlywood", 0xDEB887),
    ("cadetblue", 0x5F9EA0),
    ("chartreuse", 0x7FFF00),
    ("chocolate", 0xD2691E),
    ("coral", 0xFF7F50),
    ("cornflowerblue", 0x6495ED),
    ("cornsilk", 0xFFF8DC),
    ("crimson", 0xDC143C),
    ("cyan", 0x00FFFF),
    ("darkblue", 0x00008B),
    ("darkcyan", 0x008B8B),
    ("darkgoldenrod", 0xB8860B),
    ("darkgray", 0xA9A9A9),
    ("darkgreen", 0x006400),
    ("darkgrey", 0xA9A9A9),
    ("darkkhaki", 0xBDB76B),
    ("darkmagenta", 0x8B008B),
    ("darkolivegreen", 0x556B2F),
    ("darkorange", 0xFF8C00),
    ("darkorchid", 0x9932CC),
    ("darkred", 0x8B0000),
    ("darksalmon", 0xE9967A),
    ("darkseagreen", 0x8FBC8F),
    ("darkslateblue", 0x483D8B),
    ("darkslategray", 0x2F4F4F),
    ("darkslategrey", 0x2F4F4F),
    ("darkturquoise", 0x00CED1),
    ("darkviolet", 0x9400D3),
    ("deeppink", 0xFF1493),
    ("deepskyblue", 0x00BFFF),
    ("dimgray", 0x696969),
    ("dimgrey", 0x696969),
    ("dodgerblue", 0x1E90FF),
    ("firebrick", 0xB22222),
    ("floralwhite", 0xFFFAF0),
    ("forestgreen", 0x228B22),
    ("fuchsia", 0xFF00FF),
    ("gainsboro", 0xDCDCDC),
    ("ghostwhite", 0xF8F8FF),
    ("gold", 0xFFD700),
    ("goldenrod", 0xDAA520),
    ("gray", 0x808080),
    ("green", 0x008000),
    ("greenyellow", 0xADFF2F),
    ("grey", 0x808080),
    ("honeydew", 0xF0FFF0),
    ("hotpink", 0xFF69B4),
    ("indianred", 0xCD5C5C),
    ("indigo", 0x4B0082),
    ("ivory", 0xFFFFF0),
    ("khaki", 0xF0E68C),
    ("lavender", 0xE6E6FA),
    ("lavenderblush", 0xFFF0F5),
    ("lawngreen", 0x7CFC00),
    ("lemonchiffon", 0xFFFACD),
    ("lightblue", 0xADD8E6),
    ("lightcoral", 0xF08080),
    ("lightcyan", 0xE0FFFF),
    ("lightgoldenrodyellow", 0xFAFAD2),
    ("lightgray", 0xD3D3D3),
    ("lightgreen", 0x90EE90),
    ("lightgrey", 0xD3D3D3),
    ("lightpink", 0xFFB6C1),
    ("lightsalmon", 0xFFA07A),
    ("lightseagreen", 0x20B2AA),
    ("lightskyblue", 0x87CEFA),
    ("lightslategray", 0x778899),
    ("lightslategrey", 0x778899),
    ("lightsteelblue", 0xB0C4DE),
    ("lightyellow", 0xFFFFE0),
    ("lime", 0x00FF00),
    ("limegreen", 0x32CD32),
    ("linen", 0xFAF0E6),
    ("magenta", 0xFF00FF),
    ("maroon", 0x800000),
    ("mediumaquamarine", 0x66CDAA),
    ("mediumblue", 0x0000CD),
    ("mediumorchid", 0xBA55D3),
    ("mediumpurple", 0x9370DB),
    ("mediumseagreen", 0x3CB371),
    ("mediumslateblue", 0x7B68EE),
    ("mediumspringgreen", 0x00FA9A),
    ("mediumturquoise", 0x48D1CC),
    ("mediumvioletred", 0xC71585),
    ("midnightblue", 0x191970),
    ("mintcream", 0xF5FFFA),
    ("mistyrose", 0xFFE4E1),
    ("moccasin", 0xFFE4B5),
    ("navajowhite", 0xFFDEAD),
    ("navy", 0x000080),
    ("oldlace", 0xFDF5E6),
    ("olive", 0x808000),
    ("olivedrab", 0x6B8E23),
    ("orange", 0xFFA500),
    ("orangered", 0xFF4500),
    ("orchid", 0xDA70D6),
    ("palegoldenrod", 0xEEE8AA),
    ("palegreen", 0x98FB98),
    ("paleturquoise", 0xAFEEEE),
    ("palevioletred", 0xDB7093),
    ("papayawhip", 0xFFEFD5),
    ("peachpuff", 0xFFDAB9),
    ("peru", 0xCD853F),
    ("pink", 0xFFC0CB),
    ("plum", 0xDDA0DD),
    ("powderblue", 0xB0E0E6),
    ("purple", 0x800080),
    ("rebeccapurple", 0x663399),
    ("red", 0xFF0000),
    ("rosybrown", 0xBC8F8F),
    ("royalblue", 0x4169E1),
    ("saddlebrown", 0x8B4513),
    ("salmon", 0xFA8072),
    ("sandybrown", 0xF4A460),
    ("seagreen", 0x2E8B57),
    ("seashell", 0xFFF5EE),
    ("sienna", 0xA0522D),
    ("silver", 0xC0C0C0),
    ("skyblue", 0x87CEEB),
    ("slateblue", 0x6A5ACD),
    ("slategray", 0x708090),
    ("slategrey", 0x708090),
    ("snow", 0xFFFAFA),
    ("springgreen", 0x00FF7F),
    ("steelblue", 0x4682B4),
    ("tan", 0xD2B48C),
    ("teal", 0x008080),
    ("thistle", 0xD8BFD8),
    ("tomato", 0xFF6347),
    ("turquoise", 0x40E0D0),
    ("violet", 0xEE82EE),
    ("wheat", 0xF5DEB3),
    ("white", 0xFFFFFF),
    ("whitesmoke", 0xF5F5F5),
    ("yellow", 0xFFFF00),
    ("yellowgreen", 0x9ACD32),
];
