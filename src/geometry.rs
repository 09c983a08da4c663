//! Screen-space geometry value types.
//!
//! All coordinates are integer pixels with the origin at the top-left of
//! the screen. Derived points use integer (floor) division, matching what
//! the remote driver reports.

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Point
// ============================================================================

/// Screen-space pixel coordinate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal offset from the left edge.
    pub x: i32,
    /// Vertical offset from the top edge.
    pub y: i32,
}

impl Point {
    /// Creates a point.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns this point moved by `(dx, dy)`.
    #[inline]
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

// ============================================================================
// Size
// ============================================================================

/// Element dimensions in pixels. Never negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl Size {
    /// Creates a size, clamping negative dimensions to zero.
    #[inline]
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self {
            width: if width < 0 { 0 } else { width },
            height: if height < 0 { 0 } else { height },
        }
    }

    /// Returns `true` if either dimension is zero.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

// ============================================================================
// Rect
// ============================================================================

/// Element bounds: top-left corner plus size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner.
    pub origin: Point,
    /// Dimensions.
    pub size: Size,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and size.
    #[inline]
    #[must_use]
    pub const fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    /// Geometric center: `origin + size / 2`, truncating.
    #[inline]
    #[must_use]
    pub const fn center(&self) -> Point {
        Point::new(
            self.origin.x.saturating_add(self.size.width / 2),
            self.origin.y.saturating_add(self.size.height / 2),
        )
    }

    /// Point one pixel above the top edge, horizontally centered.
    ///
    /// Tapping here takes focus away without landing on the element.
    #[inline]
    #[must_use]
    pub const fn just_above(&self) -> Point {
        Point::new(self.center().x, self.origin.y.saturating_sub(1))
    }

    /// Returns `true` if `point` lies inside the rectangle.
    ///
    /// Left and top edges are inclusive, right and bottom exclusive.
    #[must_use]
    pub const fn contains(&self, point: Point) -> bool {
        point.x >= self.origin.x
            && point.y >= self.origin.y
            && point.x < self.origin.x.saturating_add(self.size.width)
            && point.y < self.origin.y.saturating_add(self.size.height)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    #[test]
    fn test_center_truncates() {
        let rect = Rect::new(Point::new(10, 20), Size::new(5, 7));
        assert_eq!(rect.center(), Point::new(12, 23));
    }

    #[test]
    fn test_just_above() {
        let rect = Rect::new(Point::new(100, 40), Size::new(200, 50));
        assert_eq!(rect.just_above(), Point::new(200, 39));
        assert!(!rect.contains(rect.just_above()));
    }

    #[test]
    fn test_size_clamps_negative() {
        assert_eq!(Size::new(-3, 4), Size::new(0, 4));
        assert!(Size::new(-3, 4).is_empty());
    }

    #[test]
    fn test_point_offset() {
        assert_eq!(Point::new(1, 2).offset(3, -4), Point::new(4, -2));
    }

    #[test]
    fn test_extreme_coordinates_saturate() {
        let rect = Rect::new(Point::new(i32::MAX - 1, i32::MIN), Size::new(i32::MAX, 10));
        assert_eq!(rect.center(), Point::new(i32::MAX, i32::MIN + 5));
        assert_eq!(rect.just_above(), Point::new(i32::MAX, i32::MIN));
        assert!(rect.contains(Point::new(i32::MAX - 1, i32::MIN)));
        assert_eq!(Point::new(i32::MAX, 0).offset(1, -1), Point::new(i32::MAX, -1));
    }

    proptest! {
        #[test]
        fn prop_center_formula(
            x in 0..10_000i32,
            y in 0..10_000i32,
            w in 0..10_000i32,
            h in 0..10_000i32,
        ) {
            let center = Rect::new(Point::new(x, y), Size::new(w, h)).center();
            prop_assert_eq!(center.x, x + w / 2);
            prop_assert_eq!(center.y, y + h / 2);
        }

        #[test]
        fn prop_center_inside_non_empty(
            x in 0..10_000i32,
            y in 0..10_000i32,
            w in 1..10_000i32,
            h in 1..10_000i32,
        ) {
            let rect = Rect::new(Point::new(x, y), Size::new(w, h));
            prop_assert!(rect.contains(rect.center()));
        }
    }
}
