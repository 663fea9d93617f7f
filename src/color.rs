//! RGBA colors and their string forms.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

static HEX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 128, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const TRANSPARENT: Color = Color::new(0, 0, 0, 0);

    pub fn is_opaque(self) -> bool {
        self.a == 255
    }

    pub fn alpha(self) -> f64 {
        f64::from(self.a) / 255.0
    }

    /// Channels scaled to `0.0..=1.0`, as PostScript and PDF expect them.
    pub fn unit_rgb(self) -> (f64, f64, f64) {
        (
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
        )
    }

    /// `#rrggbb`, ignoring alpha.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Parses `#rgb`, `#rrggbb`, `#rrggbbaa`, single-letter plot codes
    /// (`b g r c m y k w`) and a handful of CSS names.
    pub fn parse(input: &str) -> Result<Self> {
        let value = input.trim();
        if let Some(caps) = HEX_RE.captures(value) {
            return Ok(parse_hex(&caps[1]));
        }
        let lower = value.to_ascii_lowercase();
        let named = match lower.as_str() {
            "b" | "blue" => Color::BLUE,
            "g" | "green" => Color::GREEN,
            "r" | "red" => Color::RED,
            "c" | "cyan" => Color::rgb(0, 191, 191),
            "m" | "magenta" => Color::rgb(191, 0, 191),
            "y" | "yellow" => Color::rgb(191, 191, 0),
            "k" | "black" => Color::BLACK,
            "w" | "white" => Color::WHITE,
            "gray" | "grey" => Color::rgb(128, 128, 128),
            "orange" => Color::rgb(255, 165, 0),
            "purple" => Color::rgb(128, 0, 128),
            "brown" => Color::rgb(165, 42, 42),
            "pink" => Color::rgb(255, 192, 203),
            "navy" => Color::rgb(0, 0, 128),
            "teal" => Color::rgb(0, 128, 128),
            "none" | "transparent" => Color::TRANSPARENT,
            _ => return Err(Error::InvalidColor(input.to_string())),
        };
        Ok(named)
    }
}

fn parse_hex(digits: &str) -> Color {
    // The regex guarantees ASCII hex digits of length 3, 6 or 8.
    let channel = |s: &str| u8::from_str_radix(s, 16).unwrap_or(0);
    match digits.len() {
        3 => {
            let expand = |idx: usize| channel(&digits[idx..idx + 1].repeat(2));
            Color::rgb(expand(0), expand(1), expand(2))
        }
        6 => Color::rgb(channel(&digits[0..2]), channel(&digits[2..4]), channel(&digits[4..6])),
        _ => Color::new(
            channel(&digits[0..2]),
            channel(&digits[2..4]),
            channel(&digits[4..6]),
            channel(&digits[6..8]),
        ),
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Color::parse(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_opaque() {
            f.write_str(&self.to_hex())
        } else {
            write!(f, "{}{:02x}", self.to_hex(), self.a)
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Color::parse(&raw).map_err(serde::de::Error::custom)
    }
}
