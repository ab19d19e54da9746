#![forbid(unsafe_code)]

//! Pixel geometry primitives.
//!
//! All values are signed pixels: overlays may legitimately sit at negative
//! coordinates (the assistive notification position is `(-2000, -2000)`),
//! and intermediate layout arithmetic can dip below zero before clamping.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A point in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The origin.
    pub const ZERO: Self = Self::new(0, 0);

    /// Component-wise offset.
    #[inline]
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// A width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    /// Create a new size.
    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Component-wise maximum.
    #[inline]
    #[must_use]
    pub fn max(self, other: Size) -> Size {
        Size::new(self.width.max(other.width), self.height.max(other.height))
    }
}

/// An axis-aligned box in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: i32,
    /// Top edge (inclusive).
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle at the origin with the given size.
    #[inline]
    pub const fn from_size(size: Size) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    /// Create a rectangle from an origin point and a size.
    #[inline]
    pub const fn from_origin(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    /// Top-left corner.
    #[inline]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Width and height.
    #[inline]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Check if the rectangle has no area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Shrink by the given sides. Width and height never go negative.
    pub fn inner(&self, margin: Sides) -> Rect {
        Rect {
            x: self.x + margin.left,
            y: self.y + margin.top,
            width: (self.width - margin.horizontal_sum()).max(0),
            height: (self.height - margin.vertical_sum()).max(0),
        }
    }

    /// Compute the intersection with another rectangle, returning `None` if no overlap.
    pub fn intersection_opt(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if x < right && y < bottom {
            Some(Rect::new(x, y, right - x, bottom - y))
        } else {
            None
        }
    }
}

/// Per-side pixel values for padding and borders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sides {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl Sides {
    /// Create new sides with equal values.
    pub const fn all(val: i32) -> Self {
        Self {
            top: val,
            right: val,
            bottom: val,
            left: val,
        }
    }

    /// Create new sides with specific values.
    pub const fn new(top: i32, right: i32, bottom: i32, left: i32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Sum of left and right.
    #[inline]
    pub const fn horizontal_sum(&self) -> i32 {
        self.left + self.right
    }

    /// Sum of top and bottom.
    #[inline]
    pub const fn vertical_sum(&self) -> i32 {
        self.top + self.bottom
    }
}

impl From<i32> for Sides {
    fn from(val: i32) -> Self {
        Self::all(val)
    }
}

impl From<(i32, i32)> for Sides {
    fn from((vertical, horizontal): (i32, i32)) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Point, Rect, Sides, Size};

    #[test]
    fn rect_contains_edges() {
        let rect = Rect::new(2, 3, 4, 5);
        assert!(rect.contains(2, 3));
        assert!(rect.contains(5, 7));
        assert!(!rect.contains(6, 3));
        assert!(!rect.contains(2, 8));
    }

    #[test]
    fn rect_accepts_negative_origin() {
        let rect = Rect::new(-2000, -2000, 300, 40);
        assert_eq!(rect.right(), -1700);
        assert!(rect.contains(-1999, -1990));
        assert!(!rect.contains(0, 0));
    }

    #[test]
    fn rect_intersection_no_overlap_is_none() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(10, 0, 5, 5);
        assert_eq!(a.intersection_opt(&b), None);
        assert_eq!(
            a.intersection_opt(&Rect::new(5, 5, 10, 10)),
            Some(Rect::new(5, 5, 5, 5))
        );
    }

    #[test]
    fn rect_inner_never_negative() {
        let rect = Rect::new(0, 0, 6, 6);
        let inner = rect.inner(Sides::all(4));
        assert_eq!(inner, Rect::new(4, 4, 0, 0));
        assert!(inner.is_empty());
    }

    #[test]
    fn sides_conversions_and_sums() {
        let sides: Sides = (1, 2).into();
        assert_eq!(sides, Sides::new(1, 2, 1, 2));
        assert_eq!(sides.horizontal_sum(), 4);
        assert_eq!(sides.vertical_sum(), 2);
        assert_eq!(Sides::from(3), Sides::all(3));
    }

    #[test]
    fn origin_and_size_round_trip() {
        let rect = Rect::from_origin(Point::new(3, 4), Size::new(10, 20));
        assert_eq!(rect.origin(), Point::new(3, 4));
        assert_eq!(rect.size(), Size::new(10, 20));
        assert_eq!(Point::ZERO.offset(5, -5), Point::new(5, -5));
    }
}
