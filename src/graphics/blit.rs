//! Buffer-to-buffer blits
//!
//! Two entry points copy pixels from a source buffer into a destination:
//!
//! - [`Buffer::copy_pixels`]: axis-aligned, optionally scaled.
//! - [`Buffer::draw_buffer`]: general affine placement (pivot, rotation,
//!   non-uniform scale).
//!
//! Both walk the destination pixels that can be affected (footprint clipped
//! to the clip rect), map each one back to a source pixel with
//! nearest-neighbour sampling at pixel centres, and composite the source
//! pixel through the destination's draw mode. The source pixel's own alpha
//! takes part in compositing.
//!
//! Sampling rule: a destination pixel `i` covers `[i, i + 1)`; its centre
//! `i + 0.5` is mapped into source space and the sample is `floor` of the
//! result. Exact half-pixel ties therefore round toward +infinity.

use crate::graphics::buffer::Buffer;
use crate::graphics::geometry::{Rect, Transform};

/// Resolve an optional sub-rectangle against the source extent.
fn source_region(src: &Buffer, sub: Option<Rect>) -> Rect {
    match sub {
        Some(rect) => rect.intersect(&src.bounds()),
        None => src.bounds(),
    }
}

/// Source offset sampled by output pixel `i` when `extent` source pixels
/// are stretched over `out` output pixels: `floor((i + 0.5) * extent / out)`.
///
/// Footprints can reach `i64::MAX` for huge scales, so the products are
/// formed in `i128`. For `0 <= i < out` the result lies in `0..extent`.
#[inline]
fn centre_sample(i: i64, extent: i64, out: i64) -> i64 {
    ((2 * i as i128 + 1) * extent as i128 / (2 * out as i128)) as i64
}

impl Buffer {
    /// Copy `sub` of `src` (all of it when `None`) to `(x, y)`, scaled by
    /// `(scale_x, scale_y)`.
    ///
    /// The destination footprint is `round(w * scale_x) x round(h * scale_y)`,
    /// at least one pixel each way. Non-positive or non-finite scales draw
    /// nothing.
    pub fn copy_pixels(
        &mut self,
        src: &Buffer,
        x: i32,
        y: i32,
        sub: Option<Rect>,
        scale_x: f32,
        scale_y: f32,
    ) {
        if !(scale_x.is_finite() && scale_y.is_finite() && scale_x > 0.0 && scale_y > 0.0) {
            log::trace!("copy_pixels: ignoring scale {}x{}", scale_x, scale_y);
            return;
        }
        let region = source_region(src, sub);
        if region.is_empty() {
            log::trace!("copy_pixels: empty source region {:?}", sub);
            return;
        }

        let out_w = ((region.w as f64 * scale_x as f64).round() as i64).max(1);
        let out_h = ((region.h as f64 * scale_y as f64).round() as i64).max(1);
        let (x, y) = (x as i64, y as i64);

        // Footprint columns/rows that fall inside the clip rect.
        let clip = self.clip;
        let col0 = (clip.x as i64 - x).max(0);
        let col1 = (clip.right() - x).min(out_w);
        let row0 = (clip.y as i64 - y).max(0);
        let row1 = (clip.bottom() - y).min(out_h);
        if col0 >= col1 || row0 >= row1 {
            return;
        }

        let (rw, rh) = (region.w as i64, region.h as i64);
        let dst_stride = self.width as usize;
        let src_stride = src.width as usize;
        for row in row0..row1 {
            let src_y = region.y as i64 + centre_sample(row, rh, out_h);
            let src_row = src_y as usize * src_stride;
            let dst_row = (y + row) as usize * dst_stride;
            for col in col0..col1 {
                let src_x = region.x as i64 + centre_sample(col, rw, out_w);
                let color = src.format.unpack(src.pixels[src_row + src_x as usize]);
                self.blend_at(dst_row + (x + col) as usize, color);
            }
        }
    }

    /// Draw `sub` of `src` (all of it when `None`) under transform `t`.
    ///
    /// The transform pivot lands on `(x, y)`. Without a transform the
    /// region's top-left corner lands on `(x, y)` unscaled, which matches
    /// [`Buffer::copy_pixels`] at scale 1 pixel for pixel.
    pub fn draw_buffer(
        &mut self,
        src: &Buffer,
        x: i32,
        y: i32,
        sub: Option<Rect>,
        t: Option<Transform>,
    ) {
        let t = t.unwrap_or_default();
        if !t.is_finite() || t.sx == 0.0 || t.sy == 0.0 {
            log::trace!("draw_buffer: ignoring degenerate transform {:?}", t);
            return;
        }
        let region = source_region(src, sub);
        if region.is_empty() {
            log::trace!("draw_buffer: empty source region {:?}", sub);
            return;
        }

        let map = AffineMap::new(&t, x as f64, y as f64);
        let (rw, rh) = (region.w as f64, region.h as f64);

        // Destination bounding box of the mapped region, clipped.
        let corners = [(0.0, 0.0), (rw, 0.0), (rw, rh), (0.0, rh)].map(|(px, py)| map.forward(px, py));
        let min_x = corners.iter().map(|c| c.0).fold(f64::INFINITY, f64::min);
        let max_x = corners.iter().map(|c| c.0).fold(f64::NEG_INFINITY, f64::max);
        let min_y = corners.iter().map(|c| c.1).fold(f64::INFINITY, f64::min);
        let max_y = corners.iter().map(|c| c.1).fold(f64::NEG_INFINITY, f64::max);

        let clip = self.clip;
        let x0 = (min_x.floor() as i64).max(clip.x as i64);
        let x1 = (max_x.ceil() as i64).min(clip.right());
        let y0 = (min_y.floor() as i64).max(clip.y as i64);
        let y1 = (max_y.ceil() as i64).min(clip.bottom());
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let dst_stride = self.width as usize;
        let src_stride = src.width as usize;
        let (step_x, step_y) = map.column_step();
        for dy in y0..y1 {
            let (row_x, row_y) = map.inverse(x0 as f64 + 0.5, dy as f64 + 0.5);
            let dst_row = dy as usize * dst_stride;
            for dx in x0..x1 {
                let n = (dx - x0) as f64;
                let sx = (row_x + n * step_x).floor();
                let sy = (row_y + n * step_y).floor();
                if sx < 0.0 || sy < 0.0 || sx >= rw || sy >= rh {
                    continue;
                }
                let src_index = (region.y as usize + sy as usize) * src_stride + region.x as usize + sx as usize;
                let color = src.format.unpack(src.pixels[src_index]);
                self.blend_at(dst_row + dx as usize, color);
            }
        }
    }
}

/// Forward and inverse mapping between region-local source coordinates and
/// destination coordinates.
///
/// `dst = anchor + R * S * (p - pivot)` where `R` turns counter-clockwise as
/// seen on a y-down raster.
struct AffineMap {
    cos: f64,
    sin: f64,
    sx: f64,
    sy: f64,
    ox: f64,
    oy: f64,
    ax: f64,
    ay: f64,
}

impl AffineMap {
    fn new(t: &Transform, ax: f64, ay: f64) -> Self {
        let r = t.r as f64;
        Self {
            cos: r.cos(),
            sin: r.sin(),
            sx: t.sx as f64,
            sy: t.sy as f64,
            ox: t.ox as f64,
            oy: t.oy as f64,
            ax,
            ay,
        }
    }

    fn forward(&self, px: f64, py: f64) -> (f64, f64) {
        let u = (px - self.ox) * self.sx;
        let v = (py - self.oy) * self.sy;
        (
            self.ax + self.cos * u + self.sin * v,
            self.ay - self.sin * u + self.cos * v,
        )
    }

    fn inverse(&self, dx: f64, dy: f64) -> (f64, f64) {
        let ex = dx - self.ax;
        let ey = dy - self.ay;
        let u = self.cos * ex - self.sin * ey;
        let v = self.sin * ex + self.cos * ey;
        (u / self.sx + self.ox, v / self.sy + self.oy)
    }

    /// Change in source coordinates per destination column.
    fn column_step(&self) -> (f64, f64) {
        (self.cos / self.sx, self.sin / self.sy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::blend::BlendMode;
    use crate::graphics::pixel::{Pixel, PixelFormat};
    use std::f32::consts::{FRAC_PI_2, PI};

    const RED: Pixel = Pixel::rgb(255, 0, 0);

    fn solid(w: i32, h: i32, color: Pixel) -> Buffer {
        let mut buffer = Buffer::new(w, h).unwrap();
        buffer.clear(color);
        buffer
    }

    /// Source whose pixel at (x, y) encodes its coordinates.
    fn gradient(w: i32, h: i32) -> Buffer {
        let mut buffer = Buffer::new(w, h).unwrap();
        for y in 0..h {
            for x in 0..w {
                buffer.set_pixel(Pixel::rgb(x as u8 * 10, y as u8 * 10, 77), x, y);
            }
        }
        buffer
    }

    #[test]
    fn test_copy_pixels_scaled_block() {
        let src = solid(2, 2, RED);
        let mut dst = Buffer::new(4, 4).unwrap();
        dst.copy_pixels(&src, 1, 1, None, 2.0, 2.0);
        for y in 0..4 {
            for x in 0..4 {
                let expected = if x >= 1 && y >= 1 { RED } else { Pixel::BLACK };
                assert_eq!(dst.get_pixel(x, y), expected, "({x}, {y})");
            }
        }
    }

    #[test]
    fn test_copy_pixels_unscaled_sub_rect() {
        let src = gradient(5, 5);
        let mut dst = Buffer::new(6, 6).unwrap();
        dst.copy_pixels(&src, 2, 3, Some(Rect::new(1, 2, 3, 2)), 1.0, 1.0);
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(dst.get_pixel(2 + x, 3 + y), src.get_pixel(1 + x, 2 + y));
            }
        }
        assert_eq!(dst.get_pixel(1, 3), Pixel::BLACK);
        assert_eq!(dst.get_pixel(5, 3), Pixel::BLACK);
    }

    #[test]
    fn test_copy_pixels_nearest_neighbour_upscale() {
        let src = gradient(2, 1);
        let mut dst = Buffer::new(6, 1).unwrap();
        dst.copy_pixels(&src, 0, 0, None, 3.0, 1.0);
        let row: Vec<u8> = (0..6).map(|x| dst.get_pixel(x, 0).r).collect();
        assert_eq!(row, vec![0, 0, 0, 10, 10, 10]);
    }

    #[test]
    fn test_copy_pixels_downscale_samples_centres() {
        let src = gradient(4, 1);
        let mut dst = Buffer::new(2, 1).unwrap();
        dst.copy_pixels(&src, 0, 0, None, 0.5, 1.0);
        // Destination centres 0.5 and 1.5 land on source columns 1 and 3.
        assert_eq!(dst.get_pixel(0, 0).r, 10);
        assert_eq!(dst.get_pixel(1, 0).r, 30);
    }

    #[test]
    fn test_copy_pixels_minimum_footprint() {
        let src = solid(3, 3, RED);
        let mut dst = Buffer::new(4, 4).unwrap();
        dst.copy_pixels(&src, 2, 2, None, 0.01, 0.01);
        assert_eq!(dst.get_pixel(2, 2), RED);
        assert_eq!(dst.get_pixel(3, 2), Pixel::BLACK);
    }

    #[test]
    fn test_copy_pixels_rejects_bad_scale() {
        let src = solid(2, 2, RED);
        let mut dst = Buffer::new(4, 4).unwrap();
        let before = dst.clone();
        dst.copy_pixels(&src, 0, 0, None, 0.0, 1.0);
        dst.copy_pixels(&src, 0, 0, None, 1.0, -2.0);
        dst.copy_pixels(&src, 0, 0, None, f32::NAN, 1.0);
        dst.copy_pixels(&src, 0, 0, None, f32::INFINITY, 1.0);
        assert_eq!(dst, before);
    }

    #[test]
    fn test_copy_pixels_huge_finite_scale() {
        let src = gradient(2, 2);
        let mut dst = Buffer::new(4, 4).unwrap();
        dst.copy_pixels(&src, 0, 0, None, 1e30, 1e30);
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(dst.get_pixel(x, y), src.get_pixel(0, 0), "({x}, {y})");
            }
        }

        let dot = solid(1, 1, RED);
        let mut dst = Buffer::new(4, 4).unwrap();
        dst.copy_pixels(&dot, -3, 1, None, 5e18, 1.0);
        assert_eq!(lit_count(&dst, RED), 4);
        assert_eq!(dst.get_pixel(3, 1), RED);
        assert_eq!(dst.get_pixel(0, 2), Pixel::BLACK);

        let mut dst = Buffer::new(4, 4).unwrap();
        dst.copy_pixels(&dot, 0, 0, None, f32::MAX, f32::MAX);
        assert_eq!(lit_count(&dst, RED), 16);
    }

    fn lit_count(buffer: &Buffer, color: Pixel) -> usize {
        buffer.pixels().iter().filter(|&&w| buffer.format().unpack(w) == color).count()
    }

    #[test]
    fn test_copy_pixels_sub_rect_clamped_to_source() {
        let src = gradient(3, 3);
        let mut dst = Buffer::new(4, 4).unwrap();
        dst.copy_pixels(&src, 0, 0, Some(Rect::new(2, -5, 10, 7)), 1.0, 1.0);
        // Clamped to (2, 0, 1, 2).
        assert_eq!(dst.get_pixel(0, 0), src.get_pixel(2, 0));
        assert_eq!(dst.get_pixel(0, 1), src.get_pixel(2, 1));
        assert_eq!(dst.get_pixel(1, 0), Pixel::BLACK);
        assert_eq!(dst.get_pixel(0, 2), Pixel::BLACK);

        let before = dst.clone();
        dst.copy_pixels(&src, 0, 0, Some(Rect::new(5, 5, 2, 2)), 1.0, 1.0);
        dst.copy_pixels(&src, 0, 0, Some(Rect::new(0, 0, -1, 2)), 1.0, 1.0);
        assert_eq!(dst, before);
    }

    #[test]
    fn test_copy_pixels_uses_source_alpha_and_mode() {
        let src = solid(1, 1, Pixel::new(255, 255, 255, 51));
        let mut dst = Buffer::new(1, 1).unwrap();
        dst.copy_pixels(&src, 0, 0, None, 1.0, 1.0);
        assert_eq!(dst.get_pixel(0, 0), Pixel::rgb(51, 51, 51));

        let mut dst = solid(1, 1, Pixel::rgb(100, 100, 100));
        dst.set_blend(BlendMode::Subtract);
        dst.copy_pixels(&solid(1, 1, Pixel::rgb(30, 40, 200)), 0, 0, None, 1.0, 1.0);
        assert_eq!(dst.get_pixel(0, 0), Pixel::rgb(70, 60, 0));
    }

    #[test]
    fn test_copy_pixels_across_formats() {
        let mut src = Buffer::with_format(2, 1, PixelFormat::Argb).unwrap();
        src.set_pixel(Pixel::rgb(1, 2, 3), 0, 0);
        let mut dst = Buffer::with_format(2, 1, PixelFormat::Abgr).unwrap();
        dst.copy_pixels(&src, 0, 0, None, 1.0, 1.0);
        assert_eq!(dst.get_pixel(0, 0), Pixel::rgb(1, 2, 3));
    }

    #[test]
    fn test_copy_pixels_respects_clip() {
        let src = solid(4, 4, RED);
        let mut dst = Buffer::new(4, 4).unwrap();
        dst.set_clip(Rect::new(1, 1, 2, 2));
        dst.copy_pixels(&src, -10, -10, None, 10.0, 10.0);
        let red = dst.pixels().iter().filter(|&&w| dst.format().unpack(w) == RED).count();
        assert_eq!(red, 4);
        assert_eq!(dst.get_pixel(0, 0), Pixel::BLACK);
    }

    #[test]
    fn test_draw_buffer_identity_matches_copy() {
        let src = gradient(7, 5);
        let sub = Some(Rect::new(1, 1, 4, 3));
        for (x, y) in [(0, 0), (3, 2), (-2, -1), (6, 7)] {
            let mut a = Buffer::new(9, 9).unwrap();
            let mut b = Buffer::new(9, 9).unwrap();
            a.copy_pixels(&src, x, y, sub, 1.0, 1.0);
            b.draw_buffer(&src, x, y, sub, Some(Transform::IDENTITY));
            assert_eq!(a, b, "anchor ({x}, {y})");
            let mut c = Buffer::new(9, 9).unwrap();
            c.draw_buffer(&src, x, y, sub, None);
            assert_eq!(a, c);
        }
    }

    #[test]
    fn test_draw_buffer_integer_scale_matches_copy() {
        let src = gradient(3, 2);
        let mut a = Buffer::new(10, 10).unwrap();
        let mut b = Buffer::new(10, 10).unwrap();
        a.copy_pixels(&src, 1, 2, None, 3.0, 2.0);
        b.draw_buffer(&src, 1, 2, None, Some(Transform::scaled(3.0, 2.0)));
        assert_eq!(a, b);
    }

    #[test]
    fn test_draw_buffer_pivot() {
        let src = gradient(4, 4);
        let mut dst = Buffer::new(10, 10).unwrap();
        dst.draw_buffer(&src, 5, 5, None, Some(Transform::new(2.0, 2.0, 0.0, 1.0, 1.0)));
        assert_eq!(dst.get_pixel(5, 5), src.get_pixel(2, 2));
        assert_eq!(dst.get_pixel(3, 3), src.get_pixel(0, 0));
        assert_eq!(dst.get_pixel(2, 3), Pixel::BLACK);
    }

    #[test]
    fn test_draw_buffer_rotates_counter_clockwise() {
        // A horizontal strip pointing right from the pivot ends up pointing up.
        let src = solid(4, 1, RED);
        let mut dst = Buffer::new(9, 9).unwrap();
        dst.draw_buffer(&src, 4, 5, None, Some(Transform::new(0.0, 0.0, FRAC_PI_2, 1.0, 1.0)));
        for y in 1..5 {
            assert_eq!(dst.get_pixel(4, y), RED, "row {y}");
        }
        assert_eq!(dst.get_pixel(5, 4), Pixel::BLACK);
        assert_eq!(dst.get_pixel(4, 5), Pixel::BLACK);
        assert_eq!(dst.pixels().iter().filter(|&&w| dst.format().unpack(w) == RED).count(), 4);
    }

    #[test]
    fn test_draw_buffer_half_turn_about_centre() {
        let src = gradient(4, 4);
        let mut dst = Buffer::new(4, 4).unwrap();
        dst.draw_buffer(&src, 2, 2, None, Some(Transform::new(2.0, 2.0, PI, 1.0, 1.0)));
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(dst.get_pixel(x, y), src.get_pixel(3 - x, 3 - y), "({x}, {y})");
            }
        }
    }

    #[test]
    fn test_draw_buffer_full_turn_wraps() {
        let src = gradient(4, 3);
        let mut a = Buffer::new(8, 8).unwrap();
        let mut b = Buffer::new(8, 8).unwrap();
        a.draw_buffer(&src, 2, 2, None, Some(Transform::new(1.0, 1.0, 0.0, 1.0, 1.0)));
        b.draw_buffer(&src, 2, 2, None, Some(Transform::new(1.0, 1.0, 4.0 * PI, 1.0, 1.0)));
        assert_eq!(a, b);
    }

    #[test]
    fn test_draw_buffer_negative_scale_mirrors() {
        let src = gradient(3, 1);
        let mut dst = Buffer::new(3, 1).unwrap();
        dst.draw_buffer(&src, 3, 0, None, Some(Transform::scaled(-1.0, 1.0)));
        for x in 0..3 {
            assert_eq!(dst.get_pixel(x, 0), src.get_pixel(2 - x, 0));
        }
    }

    #[test]
    fn test_draw_buffer_degenerate_inputs() {
        let src = solid(3, 3, RED);
        let mut dst = Buffer::new(5, 5).unwrap();
        let before = dst.clone();
        dst.draw_buffer(&src, 1, 1, None, Some(Transform::scaled(0.0, 1.0)));
        dst.draw_buffer(&src, 1, 1, None, Some(Transform::new(0.0, 0.0, f32::NAN, 1.0, 1.0)));
        dst.draw_buffer(&src, 1, 1, Some(Rect::new(0, 0, 0, 3)), None);
        dst.draw_buffer(&src, i32::MAX, i32::MIN, None, Some(Transform::scaled(1e30, 1e30)));
        assert_eq!(dst, before);
    }

    #[test]
    fn test_draw_buffer_respects_clip() {
        let src = solid(8, 8, RED);
        let mut dst = Buffer::new(8, 8).unwrap();
        dst.set_clip(Rect::new(2, 2, 3, 1));
        dst.draw_buffer(&src, 4, 4, None, Some(Transform::new(4.0, 4.0, 0.7, 2.0, 2.0)));
        let red = dst.pixels().iter().filter(|&&w| dst.format().unpack(w) == RED).count();
        assert_eq!(red, 3);
    }
}
