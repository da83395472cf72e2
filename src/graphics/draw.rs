//! Shape rasterizers
//!
//! Lines, rectangles, circles and flood fill. Each shape enumerates candidate
//! pixels and hands them to the buffer's clipped writer, so no input geometry
//! can reach memory outside the buffer. Coordinates are widened to `i64`
//! before any arithmetic.

use crate::graphics::buffer::Buffer;
use crate::graphics::pixel::Pixel;

/// Integer square root: the largest `x` with `x * x <= n`; 0 for `n <= 0`.
fn isqrt(n: i64) -> i64 {
    if n <= 0 {
        return 0;
    }
    let mut x = (n as f64).sqrt() as i64;
    while x * x > n {
        x -= 1;
    }
    while (x + 1) * (x + 1) <= n {
        x += 1;
    }
    x
}

impl Buffer {
    /// Draw a line between two points (inclusive) with Bresenham's algorithm.
    pub fn draw_line(&mut self, color: Pixel, x0: i32, y0: i32, x1: i32, y1: i32) {
        let (mut x0, mut y0, mut x1, mut y1) = (x0 as i64, y0 as i64, x1 as i64, y1 as i64);
        let steep = (y1 - y0).abs() > (x1 - x0).abs();
        if steep {
            std::mem::swap(&mut x0, &mut y0);
            std::mem::swap(&mut x1, &mut y1);
        }
        if x0 > x1 {
            std::mem::swap(&mut x0, &mut x1);
            std::mem::swap(&mut y0, &mut y1);
        }

        let dx = x1 - x0;
        let dy = (y1 - y0).abs();
        let ystep = if y0 < y1 { 1 } else { -1 };
        let e0 = dx / 2;

        // Only walk the part of the major axis that can land inside the clip.
        let clip = self.clip;
        let (lo, hi) = if steep {
            (clip.y as i64, clip.bottom() - 1)
        } else {
            (clip.x as i64, clip.right() - 1)
        };
        let start = x0.max(lo);
        let end = x1.min(hi);
        if start > end {
            return;
        }

        // Fast-forward the error term to `start`: after k steps the minor axis
        // has advanced the least m for which the error is non-negative again.
        let k = (start - x0) as i128;
        let lag = k * dy as i128 - e0 as i128;
        let m = if lag > 0 {
            (lag + dx as i128 - 1) / dx as i128
        } else {
            0
        };
        let mut y = y0 + m as i64 * ystep;
        let mut error = (e0 as i128 - k * dy as i128 + m * dx as i128) as i64;

        for x in start..=end {
            if steep {
                self.write_pixel(color, y, x);
            } else {
                self.write_pixel(color, x, y);
            }
            error -= dy;
            if error < 0 {
                y += ystep;
                error += dx;
            }
        }
    }

    /// Fill the rectangle `(x, y, w, h)`; empty extents draw nothing.
    pub fn draw_rect(&mut self, color: Pixel, x: i32, y: i32, w: i32, h: i32) {
        if w <= 0 || h <= 0 {
            return;
        }
        let (x, y) = (x as i64, y as i64);
        self.fill_region(color, x, y, x + w as i64, y + h as i64);
    }

    /// Draw a one pixel rectangle outline.
    ///
    /// Edges do not overlap, so every border pixel is blended exactly once.
    pub fn draw_box(&mut self, color: Pixel, x: i32, y: i32, w: i32, h: i32) {
        if w <= 0 || h <= 0 {
            return;
        }
        if w == 1 || h == 1 {
            self.draw_rect(color, x, y, w, h);
            return;
        }
        let (x, y, w, h) = (x as i64, y as i64, w as i64, h as i64);
        self.fill_region(color, x, y, x + w, y + 1);
        self.fill_region(color, x, y + h - 1, x + w, y + h);
        self.fill_region(color, x, y + 1, x + 1, y + h - 1);
        self.fill_region(color, x + w - 1, y + 1, x + w, y + h - 1);
    }

    /// Returns false when a circle of radius `r` at `(cx, cy)` misses the clip.
    fn circle_visible(&self, cx: i64, cy: i64, r: i64) -> bool {
        let clip = self.clip;
        !clip.is_empty()
            && cx + r >= clip.x as i64
            && cx - r < clip.right()
            && cy + r >= clip.y as i64
            && cy - r < clip.bottom()
    }

    /// Draw a filled circle.
    ///
    /// A pixel belongs to the disc when its offset `(dx, dy)` from the centre
    /// satisfies `dx² + dy² <= r² + r`, the integer form of lying inside a
    /// circle of radius `r + ½` that the midpoint algorithm traces. Only the
    /// rows inside the clip are visited and each is filled once as a single
    /// span.
    pub fn draw_circle(&mut self, color: Pixel, x: i32, y: i32, r: i32) {
        let (cx, cy) = (x as i64, y as i64);
        let r = (r as i64).abs();
        if !self.circle_visible(cx, cy, r) {
            return;
        }

        let limit = r * r + r;
        let y0 = (cy - r).max(self.clip.y as i64);
        let y1 = (cy + r).min(self.clip.bottom() - 1);
        for row in y0..=y1 {
            let dy = row - cy;
            let half = isqrt(limit - dy * dy);
            self.fill_region(color, cx - half, row, cx + half + 1, row + 1);
        }
    }

    /// Draw a circle outline.
    ///
    /// Walks one octant (`dy <= dx`) of the disc boundary used by
    /// [`Buffer::draw_circle`] and mirrors each point eight ways. Only the
    /// octant steps whose mirrored rows or columns cross the clip are
    /// visited.
    pub fn draw_ring(&mut self, color: Pixel, x: i32, y: i32, r: i32) {
        let (cx, cy) = (x as i64, y as i64);
        let r = (r as i64).abs();
        if !self.circle_visible(cx, cy, r) {
            return;
        }

        let limit = r * r + r;
        // Last step of the octant: dy <= isqrt(limit - dy²) <=> 2dy² <= limit.
        let last = isqrt(limit / 2);
        let clip = self.clip;
        let (left, top) = (clip.x as i64, clip.y as i64);
        let (right, bottom) = (clip.right() - 1, clip.bottom() - 1);

        // A mirrored point is offset by the step either vertically or
        // horizontally, so these are the only steps that can land in the clip.
        let mut spans = [
            (top - cy, bottom - cy),
            (cy - bottom, cy - top),
            (left - cx, right - cx),
            (cx - right, cx - left),
        ]
        .map(|(lo, hi)| (lo.max(0), hi.min(last)));
        spans.sort_unstable();

        let mut next = 0;
        for (lo, hi) in spans {
            for dy in lo.max(next)..=hi {
                let dx = isqrt(limit - dy * dy);
                self.plot_octants(color, cx, cy, dx, dy);
            }
            next = next.max(hi + 1);
        }
    }

    /// Write the eight mirror images of `(dx, dy)` around the centre, once
    /// each when they coincide on an axis or diagonal.
    fn plot_octants(&mut self, color: Pixel, cx: i64, cy: i64, dx: i64, dy: i64) {
        let mut points = [
            (dx, dy),
            (dy, dx),
            (-dx, dy),
            (-dy, dx),
            (-dx, -dy),
            (-dy, -dx),
            (dx, -dy),
            (dy, -dx),
        ];
        points.sort_unstable();
        for (i, &(ox, oy)) in points.iter().enumerate() {
            if i == 0 || points[i - 1] != (ox, oy) {
                self.write_pixel(color, cx + ox, cy + oy);
            }
        }
    }

    /// Fill the 4-connected region around `(x, y)` that shares its color.
    ///
    /// Scanline fill driven by an explicit stack. A visited map guarantees
    /// each pixel is tested and written at most once, so blending modes are
    /// applied uniformly. The fill never leaves the clip rect.
    pub fn flood_fill(&mut self, color: Pixel, x: i32, y: i32) {
        let clip = self.clip;
        let (x, y) = (x as i64, y as i64);
        if !clip.contains(x, y) {
            return;
        }
        let target = self.get_pixel(x as i32, y as i32);
        if target == color {
            return;
        }

        let (left, top) = (clip.x as i64, clip.y as i64);
        let (right, bottom) = (clip.right(), clip.bottom());
        let clip_w = clip.w as usize;
        let mut visited = vec![false; clip_w * clip.h as usize];
        let visited_index = |px: i64, py: i64| (py - top) as usize * clip_w + (px - left) as usize;

        let mut stack = vec![(x, y)];
        while let Some((sx, sy)) = stack.pop() {
            if visited[visited_index(sx, sy)] || self.get_pixel(sx as i32, sy as i32) != target {
                continue;
            }

            let fillable = |buffer: &Buffer, visited: &[bool], px: i64| {
                !visited[visited_index(px, sy)] && buffer.get_pixel(px as i32, sy as i32) == target
            };
            let mut l = sx;
            while l - 1 >= left && fillable(&*self, visited.as_slice(), l - 1) {
                l -= 1;
            }
            let mut r = sx;
            while r + 1 < right && fillable(&*self, visited.as_slice(), r + 1) {
                r += 1;
            }

            let stride = self.width as usize;
            for px in l..=r {
                visited[visited_index(px, sy)] = true;
                self.blend_at(sy as usize * stride + px as usize, color);
            }

            // Seed one pending entry per run of candidates above and below.
            for ny in [sy - 1, sy + 1] {
                if ny < top || ny >= bottom {
                    continue;
                }
                let mut in_run = false;
                for px in l..=r {
                    let candidate = !visited[visited_index(px, ny)]
                        && self.get_pixel(px as i32, ny as i32) == target;
                    if candidate && !in_run {
                        stack.push((px, ny));
                    }
                    in_run = candidate;
                }
            }
        }
    }
}
