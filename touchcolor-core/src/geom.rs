//! Integer geometry shared by every stage.
//!
//! [`Point`]s are signed, as touches may be dragged beyond the edge of a window. [`Rect`]s and
//! [`Extent`]s are unsigned and always describe real pixels.

use std::num::NonZeroU32;

/// An integer coordinate. Which space it lives in (view-local or screen) is up to whoever
/// produced it - converting between the two must go through [`Point::translate`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}
impl Point {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
    /// Offset by `origin`, eg. to move a view-local point into screen space given the view's
    /// position on screen.
    #[must_use = "returns a new point and does not modify `self`"]
    pub fn translate(self, origin: Point) -> Self {
        Self {
            x: self.x.saturating_add(origin.x),
            y: self.y.saturating_add(origin.y),
        }
    }
    /// Inverse of [`Point::translate`].
    #[must_use = "returns a new point and does not modify `self`"]
    pub fn relative_to(self, origin: Point) -> Self {
        Self {
            x: self.x.saturating_sub(origin.x),
            y: self.y.saturating_sub(origin.y),
        }
    }
}
impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}
impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("surface dimensions must be positive, got {width}x{height}")]
pub struct InvalidDimensions {
    pub width: i64,
    pub height: i64,
}

/// The pixel dimensions of a surface or screen. Zero-sized surfaces cannot be represented,
/// so nothing downstream has to handle them.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Extent {
    width: NonZeroU32,
    height: NonZeroU32,
}
impl Extent {
    /// # Errors
    /// If either dimension is zero or negative.
    pub fn new(width: impl Into<i64>, height: impl Into<i64>) -> Result<Self, InvalidDimensions> {
        let (width, height) = (width.into(), height.into());
        let err = InvalidDimensions { width, height };
        let w = u32::try_from(width).ok().and_then(NonZeroU32::new);
        let h = u32::try_from(height).ok().and_then(NonZeroU32::new);
        match (w, h) {
            (Some(width), Some(height)) => Ok(Self { width, height }),
            _ => Err(err),
        }
    }
    #[must_use]
    pub fn width(self) -> u32 {
        self.width.get()
    }
    #[must_use]
    pub fn height(self) -> u32 {
        self.height.get()
    }
    /// The rect covering every pixel.
    #[must_use]
    pub fn full_rect(self) -> Rect {
        Rect {
            left: 0,
            top: 0,
            right: self.width(),
            bottom: self.height(),
        }
    }
    /// Clamp a point onto the nearest pixel of this extent.
    #[must_use]
    pub fn clamp_point(self, point: Point) -> (u32, u32) {
        use az::SaturatingAs;
        let x: u32 = point.x.saturating_as();
        let y: u32 = point.y.saturating_as();
        (x.min(self.width() - 1), y.min(self.height() - 1))
    }
}
impl std::fmt::Display for Extent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Half-open pixel rectangle `[left, right) x [top, bottom)`.
///
/// Constructors uphold `left <= right` and `top <= bottom`. A zero-area rect is valid and simply
/// contains no pixels.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct Rect {
    left: u32,
    top: u32,
    right: u32,
    bottom: u32,
}
impl Rect {
    /// Build a rect from any two corners, normalizing them.
    #[must_use]
    pub fn from_corners(a: (u32, u32), b: (u32, u32)) -> Self {
        Self {
            left: a.0.min(b.0),
            top: a.1.min(b.1),
            right: a.0.max(b.0),
            bottom: a.1.max(b.1),
        }
    }
    /// The single pixel under `point`, clamped into `extent`.
    #[must_use]
    pub fn pixel_at(point: Point, extent: Extent) -> Self {
        let (x, y) = extent.clamp_point(point);
        Self {
            left: x,
            top: y,
            right: x + 1,
            bottom: y + 1,
        }
    }
    #[must_use]
    pub fn left(&self) -> u32 {
        self.left
    }
    #[must_use]
    pub fn top(&self) -> u32 {
        self.top
    }
    #[must_use]
    pub fn right(&self) -> u32 {
        self.right
    }
    #[must_use]
    pub fn bottom(&self) -> u32 {
        self.bottom
    }
    #[must_use]
    pub fn width(&self) -> u32 {
        self.right - self.left
    }
    #[must_use]
    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
    /// Top-left corner as a point, for moving coordinates into the rect's local space.
    #[must_use]
    pub fn origin(&self) -> Point {
        use az::SaturatingAs;
        Point {
            x: self.left.saturating_as(),
            y: self.top.saturating_as(),
        }
    }
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) else {
            return false;
        };
        (self.left..self.right).contains(&x) && (self.top..self.bottom).contains(&y)
    }
    /// Is this rect entirely within `extent`?
    #[must_use]
    pub fn is_within(&self, extent: Extent) -> bool {
        self.right <= extent.width() && self.bottom <= extent.height()
    }
    /// The pixels of something `size` large placed at `origin`, clipped to `bounds`. Empty if it
    /// lies entirely outside.
    #[must_use]
    pub fn placed(origin: Point, size: Extent, bounds: Extent) -> Self {
        use az::SaturatingAs;
        let clip = |start: i32, len: u32, limit: u32| -> (u32, u32) {
            let start = i64::from(start);
            let end = start + i64::from(len);
            let limit = i64::from(limit);
            (
                start.clamp(0, limit).saturating_as(),
                end.clamp(0, limit).saturating_as(),
            )
        };
        let (left, right) = clip(origin.x, size.width(), bounds.width());
        let (top, bottom) = clip(origin.y, size.height(), bounds.height());
        Self {
            left,
            top,
            right,
            bottom,
        }
    }
}
impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {})x[{}, {})",
            self.left, self.right, self.top, self.bottom
        )
    }
}

#[cfg(test)]
mod test {
    use super::{Extent, Point, Rect};

    #[test]
    fn extent_rejects_non_positive() {
        assert!(Extent::new(0, 10).is_err());
        assert!(Extent::new(10, -1).is_err());
        assert!(Extent::new(-5, -5).is_err());
        let e = Extent::new(640, 480).unwrap();
        assert_eq!((e.width(), e.height()), (640, 480));
    }
    #[test]
    fn rect_normalizes() {
        let r = Rect::from_corners((10, 2), (4, 8));
        assert_eq!((r.left(), r.top(), r.right(), r.bottom()), (4, 2, 10, 8));
        assert_eq!((r.width(), r.height()), (6, 6));
    }
    #[test]
    fn rect_contains_is_half_open() {
        let r = Rect::from_corners((0, 0), (2, 2));
        assert!(r.contains(Point::new(1, 1)));
        assert!(!r.contains(Point::new(2, 1)));
        assert!(!r.contains(Point::new(-1, 0)));
        assert!(!Rect::default().contains(Point::ORIGIN));
    }
    #[test]
    fn pixel_at_clamps() {
        let e = Extent::new(10, 10).unwrap();
        assert_eq!(Rect::pixel_at(Point::new(-3, 40), e), Rect::from_corners((0, 9), (1, 10)));
    }
    #[test]
    fn placed_clips() {
        let bounds = Extent::new(100, 50).unwrap();
        let size = Extent::new(20, 10).unwrap();
        assert_eq!(
            Rect::placed(Point::new(10, 5), size, bounds),
            Rect::from_corners((10, 5), (30, 15))
        );
        assert_eq!(
            Rect::placed(Point::new(90, -4), size, bounds),
            Rect::from_corners((90, 0), (100, 6))
        );
        assert!(Rect::placed(Point::new(-30, 0), size, bounds).is_empty());
        assert!(Rect::placed(Point::new(i32::MAX, i32::MIN), size, bounds).is_within(bounds));
    }
    #[test]
    fn translate_round_trip() {
        let origin = Point::new(12, 300);
        let p = Point::new(5, 5);
        assert_eq!(p.translate(origin), Point::new(17, 305));
        assert_eq!(p.translate(origin).relative_to(origin), p);
    }
}
