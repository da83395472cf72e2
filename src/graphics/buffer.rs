//! Pixel buffer
//!
//! A [`Buffer`] owns a row-major array of packed pixels together with the
//! draw state (color, alpha, blend mode and clip rectangle) consulted by every
//! drawing call. Shape rasterizers live in `draw`, blits in `blit` and noise
//! in `noise`; they all write through [`Buffer::draw_pixel`].

use crate::config::RenderConfig;
use crate::graphics::blend::{blend_pixel, BlendMode, DrawMode};
use crate::graphics::geometry::Rect;
use crate::graphics::pixel::{Pixel, PixelFormat};

/// Errors raised while creating or loading a buffer.
///
/// Drawing itself never fails; out-of-range geometry just draws less.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BufferError {
    #[error("Invalid buffer dimensions: {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("Source data too short: expected {expected} bytes, got {actual}")]
    SourceTooShort { expected: usize, actual: usize },

    #[error("Palette index {index} out of range for palette of {len} entries")]
    PaletteIndexOutOfRange { index: u8, len: usize },
}

/// In-memory 32-bit pixel buffer with its own draw state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    pub(crate) mode: DrawMode,
    pub(crate) clip: Rect,
    pub(crate) pixels: Vec<u32>,
    pub(crate) width: i32,
    pub(crate) height: i32,
    pub(crate) format: PixelFormat,
}

impl Buffer {
    /// Create an opaque black buffer in the default format.
    pub fn new(width: i32, height: i32) -> Result<Self, BufferError> {
        Self::with_format(width, height, PixelFormat::default())
    }

    /// Create an opaque black buffer whose words use `format`.
    pub fn with_format(width: i32, height: i32, format: PixelFormat) -> Result<Self, BufferError> {
        if width <= 0 || height <= 0 {
            return Err(BufferError::InvalidDimensions { width, height });
        }
        let len = (width as usize)
            .checked_mul(height as usize)
            .ok_or(BufferError::InvalidDimensions { width, height })?;

        log::debug!("Creating {}x{} {} buffer", width, height, format);
        Ok(Self {
            mode: DrawMode::default(),
            clip: Rect::from_size(width, height),
            pixels: vec![format.pack(Pixel::BLACK); len],
            width,
            height,
            format,
        })
    }

    /// Create a buffer from a render configuration and clear it.
    pub fn from_config(config: &RenderConfig) -> Result<Self, BufferError> {
        let mut buffer = Self::with_format(config.width, config.height, config.format)?;
        buffer.clear(config.clear_color);
        Ok(buffer)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn mode(&self) -> DrawMode {
        self.mode
    }

    pub fn clip(&self) -> Rect {
        self.clip
    }

    /// Full extent of the buffer.
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    /// Raw packed words, row-major, in this buffer's format.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Raw packed words for direct manipulation by the embedder.
    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    /// Pixel data as tightly packed RGBA bytes, regardless of format.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|&word| self.format.unpack(word).to_array())
            .collect()
    }

    // ==========================================================================
    // Draw state
    // ==========================================================================

    /// Set the global alpha, clamped into `0..=255`.
    pub fn set_alpha(&mut self, alpha: i32) {
        self.mode.alpha = alpha.clamp(0, 255) as u8;
    }

    pub fn set_blend(&mut self, blend: BlendMode) {
        self.mode.blend = blend;
    }

    pub fn set_color(&mut self, color: Pixel) {
        self.mode.color = color;
    }

    /// Restrict drawing to `rect`, intersected with the buffer extent.
    pub fn set_clip(&mut self, rect: Rect) {
        self.clip = rect.intersect(&self.bounds());
    }

    /// Restore the default draw mode and a full-extent clip.
    pub fn reset(&mut self) {
        self.mode = DrawMode::default();
        self.clip = self.bounds();
    }

    // ==========================================================================
    // Pixel access
    // ==========================================================================

    #[inline]
    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Read a stored pixel, ignoring the clip rect.
    ///
    /// Coordinates outside the buffer read as transparent black.
    pub fn get_pixel(&self, x: i32, y: i32) -> Pixel {
        match self.index(x as i64, y as i64) {
            Some(i) => self.format.unpack(self.pixels[i]),
            None => Pixel::TRANSPARENT,
        }
    }

    /// Write one pixel through the clipped writer; same as [`Buffer::draw_pixel`].
    pub fn set_pixel(&mut self, color: Pixel, x: i32, y: i32) {
        self.draw_pixel(color, x, y);
    }

    /// Composite `color` at `(x, y)` if it lies inside the buffer and clip.
    pub fn draw_pixel(&mut self, color: Pixel, x: i32, y: i32) {
        self.write_pixel(color, x as i64, y as i64);
    }

    /// The clipped pixel writer. Every drawing operation ends here.
    #[inline]
    pub(crate) fn write_pixel(&mut self, color: Pixel, x: i64, y: i64) {
        if !self.clip.contains(x, y) {
            return;
        }
        if let Some(i) = self.index(x, y) {
            self.blend_at(i, color);
        }
    }

    /// Clipped span writer for the half-open region `[x0, x1) x [y0, y1)`.
    ///
    /// Equivalent to calling [`Buffer::write_pixel`] for every point, but only
    /// visits the part inside the clip rect.
    pub(crate) fn fill_region(&mut self, color: Pixel, x0: i64, y0: i64, x1: i64, y1: i64) {
        let x0 = x0.max(self.clip.x as i64);
        let y0 = y0.max(self.clip.y as i64);
        let x1 = x1.min(self.clip.right());
        let y1 = y1.min(self.clip.bottom());
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let stride = self.width as usize;
        let replace = color.is_opaque() && self.mode.is_replace();
        for y in y0..y1 {
            let row = y as usize * stride;
            let span = row + x0 as usize..row + x1 as usize;
            if replace {
                // Opaque source-over keeps only the destination alpha.
                let format = self.format;
                for word in &mut self.pixels[span] {
                    let a = format.unpack(*word).a;
                    *word = format.pack(color.with_alpha(a));
                }
            } else {
                for i in span {
                    self.blend_at(i, color);
                }
            }
        }
    }

    /// Composite into an index already known to be inside bounds and clip.
    #[inline]
    pub(crate) fn blend_at(&mut self, i: usize, color: Pixel) {
        let dst = self.format.unpack(self.pixels[i]);
        let out = blend_pixel(&self.mode, dst, color);
        self.pixels[i] = self.format.pack(out);
    }

    /// Fill the whole buffer with `color`, bypassing blend mode and clip.
    pub fn clear(&mut self, color: Pixel) {
        let word = self.format.pack(color);
        self.pixels.fill(word);
    }

    // ==========================================================================
    // Pixel ingestion
    // ==========================================================================

    /// Load `width * height` pixels from bytes laid out in `src_format`.
    ///
    /// The data is re-packed into this buffer's own format; no blending.
    pub fn load_pixels(&mut self, src: &[u8], src_format: PixelFormat) -> Result<(), BufferError> {
        let expected = self.pixels.len() * 4;
        if src.len() < expected {
            log::warn!("load_pixels: expected {} bytes, got {}", expected, src.len());
            return Err(BufferError::SourceTooShort {
                expected,
                actual: src.len(),
            });
        }

        let format = self.format;
        for (word, chunk) in self.pixels.iter_mut().zip(src.chunks_exact(4)) {
            let bytes = [chunk[0], chunk[1], chunk[2], chunk[3]];
            *word = format.pack(src_format.from_bytes(bytes));
        }
        Ok(())
    }

    /// Load 8-bit indexed pixels.
    ///
    /// With a palette each index selects a palette entry. Without one the
    /// index becomes the alpha of a white pixel, which suits glyph masks.
    pub fn load_pixels8(&mut self, src: &[u8], palette: Option<&[Pixel]>) -> Result<(), BufferError> {
        let expected = self.pixels.len();
        if src.len() < expected {
            log::warn!("load_pixels8: expected {} bytes, got {}", expected, src.len());
            return Err(BufferError::SourceTooShort {
                expected,
                actual: src.len(),
            });
        }
        if let Some(palette) = palette {
            if let Some(&index) = src[..expected]
                .iter()
                .find(|&&index| index as usize >= palette.len())
            {
                return Err(BufferError::PaletteIndexOutOfRange {
                    index,
                    len: palette.len(),
                });
            }
        }

        let format = self.format;
        for (word, &index) in self.pixels.iter_mut().zip(src) {
            let pixel = match palette {
                Some(palette) => palette[index as usize],
                None => Pixel::WHITE.with_alpha(index),
            };
            *word = format.pack(pixel);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_creation() {
        let buffer = Buffer::new(16, 8).unwrap();
        assert_eq!(buffer.width(), 16);
        assert_eq!(buffer.height(), 8);
        assert_eq!(buffer.format(), PixelFormat::Bgra);
        assert_eq!(buffer.pixels().len(), 128);
        assert_eq!(buffer.clip(), Rect::new(0, 0, 16, 8));
        assert_eq!(buffer.get_pixel(3, 3), Pixel::BLACK);
    }

    #[test]
    fn test_invalid_dimensions() {
        assert_eq!(
            Buffer::new(0, 5),
            Err(BufferError::InvalidDimensions { width: 0, height: 5 })
        );
        assert!(Buffer::new(5, -1).is_err());
    }

    #[test]
    fn test_clone_is_deep() {
        let mut a = Buffer::new(4, 4).unwrap();
        a.set_alpha(100);
        a.set_clip(Rect::new(1, 1, 2, 2));
        let mut b = a.clone();
        b.clear(Pixel::WHITE);
        assert_eq!(a.get_pixel(0, 0), Pixel::BLACK);
        assert_eq!(b.get_pixel(0, 0), Pixel::WHITE);
        assert_eq!(b.mode().alpha, 100);
        assert_eq!(b.clip(), Rect::new(1, 1, 2, 2));
    }

    #[test]
    fn test_set_clip_is_clamped() {
        let mut buffer = Buffer::new(10, 10).unwrap();
        buffer.set_clip(Rect::new(-5, 5, 100, 100));
        assert_eq!(buffer.clip(), Rect::new(0, 5, 10, 5));
        buffer.set_clip(Rect::new(20, 20, 5, 5));
        assert!(buffer.clip().is_empty());
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut buffer = Buffer::new(10, 10).unwrap();
        buffer.set_alpha(300);
        assert_eq!(buffer.mode().alpha, 255);
        buffer.set_alpha(-3);
        assert_eq!(buffer.mode().alpha, 0);
        buffer.set_blend(BlendMode::Screen);
        buffer.set_color(Pixel::rgb(1, 2, 3));
        buffer.set_clip(Rect::new(2, 2, 2, 2));
        buffer.reset();
        assert_eq!(buffer.mode(), DrawMode::default());
        assert_eq!(buffer.clip(), buffer.bounds());
    }

    #[test]
    fn test_draw_pixel_respects_bounds_and_clip() {
        let mut buffer = Buffer::new(4, 4).unwrap();
        buffer.set_clip(Rect::new(1, 1, 2, 2));
        buffer.draw_pixel(Pixel::WHITE, 0, 0);
        buffer.draw_pixel(Pixel::WHITE, 1, 1);
        buffer.draw_pixel(Pixel::WHITE, -1, 2);
        buffer.draw_pixel(Pixel::WHITE, i32::MAX, i32::MIN);
        assert_eq!(buffer.get_pixel(0, 0), Pixel::BLACK);
        assert_eq!(buffer.get_pixel(1, 1), Pixel::WHITE);
    }

    #[test]
    fn test_set_pixel_blends() {
        let mut buffer = Buffer::new(2, 2).unwrap();
        buffer.set_blend(BlendMode::Add);
        buffer.set_pixel(Pixel::rgb(10, 20, 30), 0, 0);
        buffer.set_pixel(Pixel::rgb(10, 20, 30), 0, 0);
        assert_eq!(buffer.get_pixel(0, 0), Pixel::rgb(20, 40, 60));
    }

    #[test]
    fn test_get_pixel_out_of_bounds() {
        let buffer = Buffer::new(2, 2).unwrap();
        assert_eq!(buffer.get_pixel(2, 0), Pixel::TRANSPARENT);
        assert_eq!(buffer.get_pixel(0, -1), Pixel::TRANSPARENT);
    }

    #[test]
    fn test_clear_ignores_clip_and_mode() {
        let mut buffer = Buffer::new(3, 3).unwrap();
        buffer.set_clip(Rect::new(0, 0, 0, 0));
        buffer.set_alpha(0);
        buffer.clear(Pixel::new(9, 8, 7, 6));
        assert!(buffer.pixels().iter().all(|&w| w == PixelFormat::Bgra.pack(Pixel::new(9, 8, 7, 6))));
    }

    #[test]
    fn test_load_pixels_converts_format() {
        let mut buffer = Buffer::with_format(2, 1, PixelFormat::Rgba).unwrap();
        // ARGB bytes for red and half-transparent blue.
        let src = [255, 255, 0, 0, 128, 0, 0, 255];
        buffer.load_pixels(&src, PixelFormat::Argb).unwrap();
        assert_eq!(buffer.get_pixel(0, 0), Pixel::rgb(255, 0, 0));
        assert_eq!(buffer.get_pixel(1, 0), Pixel::new(0, 0, 255, 128));
        assert_eq!(buffer.pixels()[0].to_le_bytes(), [255, 0, 0, 255]);
    }

    #[test]
    fn test_pixels_mut_writes_raw_words() {
        let mut buffer = Buffer::with_format(3, 2, PixelFormat::Abgr).unwrap();
        buffer.set_clip(Rect::new(0, 0, 0, 0));
        let word = buffer.format().pack(Pixel::new(1, 2, 3, 4));
        buffer.pixels_mut()[4] = word;
        assert_eq!(buffer.get_pixel(1, 1), Pixel::new(1, 2, 3, 4));
        assert_eq!(buffer.get_pixel(0, 1), Pixel::BLACK);
        assert_eq!(buffer.pixels()[4], word);
    }

    #[test]
    fn test_load_pixels_short_source() {
        let mut buffer = Buffer::new(2, 2).unwrap();
        let err = buffer.load_pixels(&[0; 15], PixelFormat::Bgra).unwrap_err();
        assert_eq!(err, BufferError::SourceTooShort { expected: 16, actual: 15 });
    }

    #[test]
    fn test_load_pixels8_with_palette() {
        let mut buffer = Buffer::new(3, 1).unwrap();
        let palette = [Pixel::BLACK, Pixel::rgb(255, 0, 0), Pixel::rgb(0, 0, 255)];
        buffer.load_pixels8(&[2, 1, 0], Some(&palette)).unwrap();
        assert_eq!(buffer.get_pixel(0, 0), Pixel::rgb(0, 0, 255));
        assert_eq!(buffer.get_pixel(1, 0), Pixel::rgb(255, 0, 0));
        assert_eq!(buffer.get_pixel(2, 0), Pixel::BLACK);

        let err = buffer.load_pixels8(&[0, 3, 0], Some(&palette)).unwrap_err();
        assert_eq!(err, BufferError::PaletteIndexOutOfRange { index: 3, len: 3 });
    }

    #[test]
    fn test_load_pixels8_without_palette_is_alpha_mask() {
        let mut buffer = Buffer::new(2, 1).unwrap();
        buffer.load_pixels8(&[0, 200], None).unwrap();
        assert_eq!(buffer.get_pixel(0, 0), Pixel::new(255, 255, 255, 0));
        assert_eq!(buffer.get_pixel(1, 0), Pixel::new(255, 255, 255, 200));
    }

    #[test]
    fn test_from_config() {
        let config = RenderConfig {
            width: 3,
            height: 2,
            format: PixelFormat::Abgr,
            clear_color: Pixel::rgb(1, 2, 3),
        };
        let buffer = Buffer::from_config(&config).unwrap();
        assert_eq!(buffer.format(), PixelFormat::Abgr);
        assert_eq!(buffer.get_pixel(2, 1), Pixel::rgb(1, 2, 3));
        assert_eq!(buffer.to_rgba_bytes()[..4], [1, 2, 3, 255]);
    }
}
