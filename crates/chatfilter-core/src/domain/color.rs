use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// ARGB color as carried by a chat author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub alpha: u8,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::argb(0, 0, 0, 0);

    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::argb(0xff, red, green, blue)
    }

    pub const fn argb(alpha: u8, red: u8, green: u8, blue: u8) -> Self {
        Self {
            alpha,
            red,
            green,
            blue,
        }
    }

    /// Parses `#rgb`, `#rrggbb` or `#aarrggbb` (case-insensitive).
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let invalid = || CoreError::InvalidColor(raw.to_string());
        let hex = raw.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let byte = |start: usize| u8::from_str_radix(&hex[start..start + 2], 16);
        let color = match hex.len() {
            3 => {
                let mut channels = [0u8; 3];
                for (slot, ch) in channels.iter_mut().zip(hex.chars()) {
                    let nibble = ch.to_digit(16).ok_or_else(invalid)? as u8;
                    *slot = nibble * 0x11;
                }
                Color::rgb(channels[0], channels[1], channels[2])
            }
            6 => Color::rgb(
                byte(0).map_err(|_| invalid())?,
                byte(2).map_err(|_| invalid())?,
                byte(4).map_err(|_| invalid())?,
            ),
            8 => Color::argb(
                byte(0).map_err(|_| invalid())?,
                byte(2).map_err(|_| invalid())?,
                byte(4).map_err(|_| invalid())?,
                byte(6).map_err(|_| invalid())?,
            ),
            _ => return Err(invalid()),
        };
        Ok(color)
    }

    pub fn is_opaque(&self) -> bool {
        self.alpha == 0xff
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_opaque() {
            write!(f, "#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
        } else {
            write!(
                f,
                "#{:02x}{:02x}{:02x}{:02x}",
                self.alpha, self.red, self.green, self.blue
            )
        }
    }
}

impl FromStr for Color {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s)
    }
}

impl TryFrom<String> for Color {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::parse(&value)
    }
}

impl From<Color> for String {
    fn from(value: Color) -> Self {
        value.to_string()
    }
}
