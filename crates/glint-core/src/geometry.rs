#![forbid(unsafe_code)]

//! Geometric primitives in CSS pixels.

/// A point in viewport coordinates (origin at top-left, y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point at `distance` from the origin along `angle_deg` (clockwise on screen).
    #[inline]
    pub fn polar(angle_deg: f64, distance: f64) -> Self {
        let radians = angle_deg.to_radians();
        Self::new(radians.cos() * distance, radians.sin() * distance)
    }
}

/// An axis-aligned box, as returned by `getBoundingClientRect()`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge.
    pub left: f64,
    /// Top edge.
    pub top: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Right edge.
    #[inline]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Bottom edge.
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Center of the box.
    #[inline]
    pub fn center(&self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// The larger of width and height.
    #[inline]
    pub fn max_side(&self) -> f64 {
        self.width.max(self.height)
    }

    /// Translate a viewport point into this box's local coordinates.
    #[inline]
    pub fn to_local(&self, point: Point) -> Point {
        Point::new(point.x - self.left, point.y - self.top)
    }

    /// Check if a point is inside the box (edges inclusive on the left/top).
    #[inline]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left && point.x < self.right() && point.y >= self.top && point.y < self.bottom()
    }
}
