use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Half-open containment: the left and top edges belong to the rect,
    /// the right and bottom edges belong to its neighbours.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }
}

/// The drawing area a view is laid out into, in renderer units
/// (pixels for SVG, cells for the terminal).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("invalid hex colour {0:?} (expected #rrggbb)")]
    InvalidHex(String),
    #[error("unknown colour name {0:?}")]
    UnknownName(String),
}

/// An opaque sRGB colour.
///
/// Parses from `#rrggbb` or from one of the named colours in [`NAMED_COLORS`]
/// (case-insensitive). Serializes as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// X11/Tk colour names accepted in configuration.
pub const NAMED_COLORS: &[(&str, Color)] = &[
    ("white", Color::rgb(0xff, 0xff, 0xff)),
    ("black", Color::rgb(0x00, 0x00, 0x00)),
    ("yellow", Color::rgb(0xff, 0xff, 0x00)),
    ("spring green", Color::rgb(0x00, 0xff, 0x7f)),
    ("orange", Color::rgb(0xff, 0xa5, 0x00)),
    ("gray", Color::rgb(0xbe, 0xbe, 0xbe)),
    ("grey", Color::rgb(0xbe, 0xbe, 0xbe)),
    ("red", Color::rgb(0xff, 0x00, 0x00)),
    ("green", Color::rgb(0x00, 0xff, 0x00)),
    ("blue", Color::rgb(0x00, 0x00, 0xff)),
    ("cyan", Color::rgb(0x00, 0xff, 0xff)),
    ("magenta", Color::rgb(0xff, 0x00, 0xff)),
    ("pink", Color::rgb(0xff, 0xc0, 0xcb)),
    ("light blue", Color::rgb(0xad, 0xd8, 0xe6)),
    ("tan", Color::rgb(0xd2, 0xb4, 0x8c)),
];

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Perceived brightness in `0.0..=1.0` (Rec. 601 luma).
    pub fn luma(&self) -> f64 {
        (0.299 * f64::from(self.r) + 0.587 * f64::from(self.g) + 0.114 * f64::from(self.b))
            / 255.0
    }

    fn from_hex(s: &str) -> Result<Self, ColorParseError> {
        let invalid = || ColorParseError::InvalidHex(s.to_string());
        let digits = s.strip_prefix('#').ok_or_else(invalid)?;
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with('#') {
            return Self::from_hex(s);
        }
        NAMED_COLORS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(s))
            .map(|(_, color)| *color)
            .ok_or_else(|| ColorParseError::UnknownName(s.to_string()))
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
