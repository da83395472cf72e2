//! Rectangles and blit transforms.

/// Integer rectangle.
///
/// Zero or negative extents describe an empty region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle anchored at the origin.
    pub const fn from_size(w: i32, h: i32) -> Self {
        Self { x: 0, y: 0, w, h }
    }

    pub const fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Exclusive right edge, widened so it cannot overflow.
    pub const fn right(&self) -> i64 {
        self.x as i64 + self.w as i64
    }

    /// Exclusive bottom edge, widened so it cannot overflow.
    pub const fn bottom(&self) -> i64 {
        self.y as i64 + self.h as i64
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.x as i64 && x < self.right() && y >= self.y as i64 && y < self.bottom()
    }

    /// Overlap of two rectangles; empty results have zero extent.
    #[must_use]
    pub fn intersect(&self, other: &Rect) -> Rect {
        if self.is_empty() || other.is_empty() {
            return Rect::new(self.x.max(other.x), self.y.max(other.y), 0, 0);
        }
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());
        Rect {
            x: x1,
            y: y1,
            w: (x2 - x1 as i64).max(0) as i32,
            h: (y2 - y1 as i64).max(0) as i32,
        }
    }
}

/// Placement of a source buffer during a transformed blit.
///
/// `ox`/`oy` is the pivot in source pixels, measured from the top-left of the
/// blitted region; it lands on the destination anchor. `r` is a
/// counter-clockwise rotation in radians and `sx`/`sy` scale each axis
/// (negative values mirror).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub ox: f32,
    pub oy: f32,
    pub r: f32,
    pub sx: f32,
    pub sy: f32,
}

impl Transform {
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0, 1.0);

    pub const fn new(ox: f32, oy: f32, r: f32, sx: f32, sy: f32) -> Self {
        Self { ox, oy, r, sx, sy }
    }

    pub const fn scaled(sx: f32, sy: f32) -> Self {
        Self::new(0.0, 0.0, 0.0, sx, sy)
    }

    pub fn is_finite(&self) -> bool {
        self.ox.is_finite()
            && self.oy.is_finite()
            && self.r.is_finite()
            && self.sx.is_finite()
            && self.sy.is_finite()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
