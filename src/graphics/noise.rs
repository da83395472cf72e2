//! Seeded noise fill
//!
//! Noise is driven by a xorshift128 generator. The stream is consumed in
//! row-major order over the whole buffer, so the value at a pixel depends only
//! on the seed and the pixel's coordinates.

use crate::graphics::buffer::Buffer;
use crate::graphics::pixel::Pixel;

/// xorshift128 pseudo-random generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandState {
    x: u32,
    y: u32,
    z: u32,
    w: u32,
}

impl RandState {
    pub fn new(seed: u32) -> Self {
        // Spread the seed bytes over the state words; x must stay non-zero.
        Self {
            x: (seed & 0xff00_0000) | 1,
            y: seed & 0x00ff_0000,
            z: seed & 0x0000_ff00,
            w: seed & 0x0000_00ff,
        }
    }

    pub fn next_u32(&mut self) -> u32 {
        let t = self.x ^ (self.x << 11);
        self.x = self.y;
        self.y = self.z;
        self.z = self.w;
        self.w = self.w ^ (self.w >> 19) ^ t ^ (t >> 8);
        self.w
    }

    /// Uniform-ish value in `low..high` (exclusive); `low` when the range is empty.
    pub fn range(&mut self, low: i32, high: i32) -> i32 {
        if high <= low {
            return low;
        }
        let span = (high as i64 - low as i64) as u64;
        (low as i64 + (self.next_u32() as u64 % span) as i64) as i32
    }
}

impl Buffer {
    /// Fill the buffer with noise whose channels lie in `low..=high`.
    ///
    /// `low` is clamped to `0..=255` and `high` to `low..=255`. With `grey` the
    /// same value is used for red, green and blue. Pixels are written through
    /// the clipped writer with alpha 255.
    pub fn noise(&mut self, seed: u32, low: i32, high: i32, grey: bool) {
        let low = low.clamp(0, 255);
        let high = high.clamp(low, 255);
        let span = (high - low + 1) as u32;
        let mut rng = RandState::new(seed);
        let mut sample = move || (low as u32 + rng.next_u32() % span) as u8;

        for y in 0..self.height as i64 {
            for x in 0..self.width as i64 {
                let pixel = if grey {
                    let v = sample();
                    Pixel::rgb(v, v, v)
                } else {
                    let r = sample();
                    let g = sample();
                    let b = sample();
                    Pixel::rgb(r, g, b)
                };
                self.write_pixel(pixel, x, y);
            }
        }
    }
}
