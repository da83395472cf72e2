//! Pixel and color model
//!
//! A [`Pixel`] is four 8-bit channels. Buffers store pixels as packed 32-bit
//! words; the byte order of that word is described by [`PixelFormat`], which
//! every buffer carries as a runtime value.

use std::fmt;
use std::str::FromStr;

// ==============================================================================
// Pixel
// ==============================================================================

/// RGBA pixel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Pixel {
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Build a pixel from arbitrary integers, clamping each into `0..=255`.
    pub fn clamped(r: i32, g: i32, b: i32, a: i32) -> Self {
        Self::new(clamp_channel(r), clamp_channel(g), clamp_channel(b), clamp_channel(a))
    }

    /// Opaque variant of [`Pixel::clamped`].
    pub fn clamped_rgb(r: i32, g: i32, b: i32) -> Self {
        Self::clamped(r, g, b, 255)
    }

    /// Same pixel with a different alpha channel.
    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    pub const fn is_opaque(self) -> bool {
        self.a == 255
    }

    /// Channels in r, g, b, a order.
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<[u8; 4]> for Pixel {
    fn from(rgba: [u8; 4]) -> Self {
        Self::new(rgba[0], rgba[1], rgba[2], rgba[3])
    }
}

#[inline]
fn clamp_channel(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}

// ==============================================================================
// Pixel Format
// ==============================================================================

/// Single color channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Red,
    Green,
    Blue,
    Alpha,
}

/// Byte order of a packed 32-bit pixel.
///
/// The variant name spells the channel order in memory, first byte first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PixelFormat {
    #[default]
    Bgra,
    Rgba,
    Argb,
    Abgr,
}

impl PixelFormat {
    pub const ALL: [PixelFormat; 4] = [
        PixelFormat::Bgra,
        PixelFormat::Rgba,
        PixelFormat::Argb,
        PixelFormat::Abgr,
    ];

    /// Channel stored at each byte, first byte first.
    pub const fn channel_order(self) -> [Channel; 4] {
        use Channel::*;
        match self {
            PixelFormat::Bgra => [Blue, Green, Red, Alpha],
            PixelFormat::Rgba => [Red, Green, Blue, Alpha],
            PixelFormat::Argb => [Alpha, Red, Green, Blue],
            PixelFormat::Abgr => [Alpha, Blue, Green, Red],
        }
    }

    /// Reorder a pixel into this format's four bytes.
    #[inline]
    pub const fn to_bytes(self, p: Pixel) -> [u8; 4] {
        match self {
            PixelFormat::Bgra => [p.b, p.g, p.r, p.a],
            PixelFormat::Rgba => [p.r, p.g, p.b, p.a],
            PixelFormat::Argb => [p.a, p.r, p.g, p.b],
            PixelFormat::Abgr => [p.a, p.b, p.g, p.r],
        }
    }

    /// Read a pixel from four bytes laid out in this format.
    #[inline]
    pub const fn from_bytes(self, bytes: [u8; 4]) -> Pixel {
        let [b0, b1, b2, b3] = bytes;
        match self {
            PixelFormat::Bgra => Pixel::new(b2, b1, b0, b3),
            PixelFormat::Rgba => Pixel::new(b0, b1, b2, b3),
            PixelFormat::Argb => Pixel::new(b1, b2, b3, b0),
            PixelFormat::Abgr => Pixel::new(b3, b2, b1, b0),
        }
    }

    /// Pack into a machine word whose in-memory bytes follow this format.
    #[inline]
    pub const fn pack(self, p: Pixel) -> u32 {
        u32::from_le_bytes(self.to_bytes(p))
    }

    #[inline]
    pub const fn unpack(self, word: u32) -> Pixel {
        self.from_bytes(word.to_le_bytes())
    }

    pub const fn name(self) -> &'static str {
        match self {
            PixelFormat::Bgra => "bgra",
            PixelFormat::Rgba => "rgba",
            PixelFormat::Argb => "argb",
            PixelFormat::Abgr => "abgr",
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown pixel format: {0}. Valid options: bgra, rgba, argb, abgr")]
pub struct ParsePixelFormatError(pub String);

impl FromStr for PixelFormat {
    type Err = ParsePixelFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bgra" => Ok(PixelFormat::Bgra),
            "rgba" => Ok(PixelFormat::Rgba),
            "argb" => Ok(PixelFormat::Argb),
            "abgr" => Ok(PixelFormat::Abgr),
            _ => Err(ParsePixelFormatError(s.to_string())),
        }
    }
}
