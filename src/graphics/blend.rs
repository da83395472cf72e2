//! Draw mode state and the compositing engine
//!
//! Every pixel write in the crate ends in [`blend_pixel`]. It combines the
//! incoming source color with the stored destination color according to the
//! buffer's [`DrawMode`]:
//!
//! 1. The effective alpha is the mode alpha scaled by the source alpha.
//! 2. The blend mode produces a per-channel target value.
//! 3. The destination moves toward that target by the effective alpha.
//!
//! All math is integer over `0..=255`. The destination alpha channel is never
//! touched by compositing.

use std::fmt;
use std::str::FromStr;

use crate::graphics::pixel::Pixel;

/// Per-channel compositing function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum BlendMode {
    /// Plain source-over using the source color.
    #[default]
    Alpha = 0,
    /// Source-over using the draw mode color; the source only supplies alpha.
    Color = 1,
    Add = 2,
    Subtract = 3,
    Multiply = 4,
    Lighten = 5,
    Darken = 6,
    Screen = 7,
    Difference = 8,
}

impl BlendMode {
    pub const ALL: [BlendMode; 9] = [
        BlendMode::Alpha,
        BlendMode::Color,
        BlendMode::Add,
        BlendMode::Subtract,
        BlendMode::Multiply,
        BlendMode::Lighten,
        BlendMode::Darken,
        BlendMode::Screen,
        BlendMode::Difference,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            BlendMode::Alpha => "alpha",
            BlendMode::Color => "color",
            BlendMode::Add => "add",
            BlendMode::Subtract => "subtract",
            BlendMode::Multiply => "multiply",
            BlendMode::Lighten => "lighten",
            BlendMode::Darken => "darken",
            BlendMode::Screen => "screen",
            BlendMode::Difference => "difference",
        }
    }

    /// Target value for one channel before alpha is applied.
    #[inline]
    fn channel(self, d: i32, s: i32) -> i32 {
        match self {
            BlendMode::Alpha | BlendMode::Color => s,
            BlendMode::Add => (d + s).min(255),
            BlendMode::Subtract => (d - s).max(0),
            BlendMode::Multiply => d * s / 255,
            BlendMode::Lighten => d.max(s),
            BlendMode::Darken => d.min(s),
            BlendMode::Screen => 255 - (255 - d) * (255 - s) / 255,
            BlendMode::Difference => (d - s).abs(),
        }
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown blend mode: {0}")]
pub struct ParseBlendModeError(pub String);

impl FromStr for BlendMode {
    type Err = ParseBlendModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        BlendMode::ALL
            .into_iter()
            .find(|mode| mode.name() == lower)
            .ok_or_else(|| ParseBlendModeError(s.to_string()))
    }
}

/// Active color, global alpha and blend mode of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DrawMode {
    pub color: Pixel,
    pub alpha: u8,
    pub blend: BlendMode,
}

impl DrawMode {
    pub const fn new(color: Pixel, alpha: u8, blend: BlendMode) -> Self {
        Self { color, alpha, blend }
    }

    /// True when a fully opaque source replaces the destination outright.
    #[inline]
    pub const fn is_replace(&self) -> bool {
        self.alpha == 255 && matches!(self.blend, BlendMode::Alpha)
    }
}

impl Default for DrawMode {
    fn default() -> Self {
        Self::new(Pixel::WHITE, 255, BlendMode::Alpha)
    }
}

#[inline]
fn lerp(d: i32, t: i32, alpha: i32) -> u8 {
    (d + (t - d) * alpha / 255) as u8
}

/// Composite `src` over `dst` using `mode`.
#[inline]
pub fn blend_pixel(mode: &DrawMode, dst: Pixel, src: Pixel) -> Pixel {
    let alpha = mode.alpha as i32 * src.a as i32 / 255;
    if alpha == 0 {
        return dst;
    }
    if alpha == 255 && mode.blend == BlendMode::Alpha {
        return Pixel::new(src.r, src.g, src.b, dst.a);
    }

    let s = match mode.blend {
        BlendMode::Color => mode.color,
        _ => src,
    };
    let blend = mode.blend;
    let (dr, dg, db) = (dst.r as i32, dst.g as i32, dst.b as i32);
    Pixel {
        r: lerp(dr, blend.channel(dr, s.r as i32), alpha),
        g: lerp(dg, blend.channel(dg, s.g as i32), alpha),
        b: lerp(db, blend.channel(db, s.b as i32), alpha),
        a: dst.a,
    }
}
