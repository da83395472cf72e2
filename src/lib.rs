//! sera: a small software renderer over 32-bit pixel buffers.

pub mod cli;
pub mod config;
pub mod demo;
pub mod graphics;
pub mod logging;

pub use cli::Cli;
pub use config::{Options, RenderConfig};
pub use graphics::{BlendMode, Buffer, BufferError, DrawMode, Pixel, PixelFormat, Rect, Transform};
pub use logging::LogLevel;
