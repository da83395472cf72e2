//! Software rasterizer core
//!
//! Pixel formats and compositing, the clipped pixel writer, shape
//! rasterizers, seeded noise and buffer-to-buffer blits.

pub mod blend;
pub mod blit;
pub mod buffer;
pub mod draw;
pub mod geometry;
pub mod noise;
pub mod pixel;

pub use blend::{blend_pixel, BlendMode, DrawMode, ParseBlendModeError};
pub use buffer::{Buffer, BufferError};
pub use geometry::{Rect, Transform};
pub use noise::RandState;
pub use pixel::{Channel, ParsePixelFormatError, Pixel, PixelFormat};
