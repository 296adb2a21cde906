//! 24-bit RGB colors decoded from `#RRGGBB` strings, plus the cheap L1
//! distance used to judge whether two theme colors are visually distinct.
//!
//! The metric is deliberately non-perceptual: a sum of absolute per-channel
//! differences in `[0, 765]`.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Largest possible [`distance`] between two colors.
pub const MAX_DISTANCE: u32 = 3 * 255;

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    #[must_use]
    pub const fn gray(v: u8) -> Self {
        Self::new(v, v, v)
    }

    #[must_use]
    pub const fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Apply `f` to each channel independently.
    #[must_use]
    pub fn map_channels(self, mut f: impl FnMut(u8) -> u8) -> Self {
        Self::new(f(self.r), f(self.g), f(self.b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseColorError {
    #[error("expected 6 hex digits, found {len}")]
    WrongLength { len: usize },

    #[error("invalid hex digit {digit:?} at offset {offset}")]
    InvalidDigit { digit: char, offset: usize },
}

impl FromStr for Rgb {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s)
    }
}

/// Decode `#RRGGBB` (the leading `#` is optional) into an [`Rgb`].
pub fn decode(hex: &str) -> Result<Rgb, ParseColorError> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    let len = digits.chars().count();
    if len != 6 {
        return Err(ParseColorError::WrongLength { len });
    }

    let mut channels = [0u8; 3];
    for (index, pair) in digits.as_bytes().chunks_exact(2).take(3).enumerate() {
        let offset = index * 2;
        let hi = hex_digit(pair[0], digits, offset)?;
        let lo = hex_digit(pair[1], digits, offset + 1)?;
        channels[index] = (hi << 4) | lo;
    }

    Ok(Rgb::new(channels[0], channels[1], channels[2]))
}

fn hex_digit(byte: u8, digits: &str, offset: usize) -> Result<u8, ParseColorError> {
    match byte {
        b'0'..=b'9' => Ok(byte - b'0'),
        b'a'..=b'f' => Ok(byte - b'a' + 10),
        b'A'..=b'F' => Ok(byte - b'A' + 10),
        _ => Err(ParseColorError::InvalidDigit {
            digit: digits[offset..].chars().next().unwrap_or('?'),
            offset,
        }),
    }
}

/// Manhattan distance between two colors in RGB space.
#[must_use]
pub fn distance(a: Rgb, b: Rgb) -> u32 {
    a.channels()
        .into_iter()
        .zip(b.channels())
        .map(|(x, y)| u32::from(x.abs_diff(y)))
        .sum()
}
