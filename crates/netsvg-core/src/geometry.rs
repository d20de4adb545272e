//! Geometric primitives for node placement and viewport fitting.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate in canvas space
//! - [`Size`] - Width and height dimensions
//! - [`Bounds`] - An axis-aligned bounding box
//! - [`Insets`] - Per-side margins
//!
//! # Coordinate System
//!
//! Coordinates follow SVG conventions:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! A positive rotation (and the SVG arc sweep flag `1`) therefore turns
//! clockwise on screen.

/// A 2D point in canvas coordinate space.
///
/// # Examples
///
/// ```
/// # use netsvg_core::geometry::Point;
/// let a = Point::new(0.0, 0.0);
/// let b = Point::new(3.0, 4.0);
///
/// assert_eq!(a.distance(b), 5.0);
/// assert_eq!(a.midpoint(b), Point::new(1.5, 2.0));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }

    /// Returns true if both coordinates are finite numbers
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Calculates the midpoint between this point and another point
    pub fn midpoint(self, other: Point) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    /// Euclidean distance between this point and another point
    pub fn distance(self, other: Point) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Represents the dimensions of an element with width and height
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f32 {
        self.height
    }

    /// Returns a new Size with the given insets removed from both dimensions.
    ///
    /// Dimensions never shrink below `minimum`.
    pub fn shrink(self, insets: Insets, minimum: f32) -> Self {
        Self {
            width: (self.width - insets.horizontal_sum()).max(minimum),
            height: (self.height - insets.vertical_sum()).max(minimum),
        }
    }
}

/// An axis-aligned bounding box with minimum and maximum coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    /// Creates a new bounds from a top-left point and a size
    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self {
            min_x: top_left.x,
            min_y: top_left.y,
            max_x: top_left.x + size.width,
            max_y: top_left.y + size.height,
        }
    }

    /// Computes the smallest bounds containing every point.
    ///
    /// Returns `None` when the iterator is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// # use netsvg_core::geometry::{Bounds, Point};
    /// let bounds = Bounds::from_points([
    ///     Point::new(10.0, 5.0),
    ///     Point::new(-2.0, 8.0),
    ///     Point::new(4.0, 20.0),
    /// ])
    /// .unwrap();
    ///
    /// assert_eq!(bounds.min_x(), -2.0);
    /// assert_eq!(bounds.max_y(), 20.0);
    /// assert_eq!(bounds.width(), 12.0);
    /// ```
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        let seed = Self {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        Some(points.fold(seed, |acc, p| Self {
            min_x: acc.min_x.min(p.x),
            min_y: acc.min_y.min(p.y),
            max_x: acc.max_x.max(p.x),
            max_y: acc.max_y.max(p.y),
        }))
    }

    /// Returns the minimum x-coordinate of the bounds
    pub fn min_x(self) -> f32 {
        self.min_x
    }

    /// Returns the minimum y-coordinate of the bounds
    pub fn min_y(self) -> f32 {
        self.min_y
    }

    /// Returns the maximum x-coordinate of the bounds
    pub fn max_x(self) -> f32 {
        self.max_x
    }

    /// Returns the maximum y-coordinate of the bounds
    pub fn max_y(self) -> f32 {
        self.max_y
    }

    /// Returns the width of the bounds
    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    /// Returns the height of the bounds
    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    /// Returns true if `other` lies inside these bounds, allowing `epsilon`
    /// of slack on every side.
    pub fn contains_bounds(&self, other: &Self, epsilon: f32) -> bool {
        other.min_x >= self.min_x - epsilon
            && other.min_y >= self.min_y - epsilon
            && other.max_x <= self.max_x + epsilon
            && other.max_y <= self.max_y + epsilon
    }
}

/// Spacing around a region with potentially different values for each side
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Insets {
    top: f32,
    right: f32,
    bottom: f32,
    left: f32,
}

impl Insets {
    /// Creates new insets with specified values for each side
    pub fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Creates uniform insets with the same value for all sides
    pub fn uniform(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    /// Creates insets with one value for left/right and one for top/bottom
    pub fn symmetric(horizontal: f32, vertical: f32) -> Self {
        Self::new(vertical, horizontal, vertical, horizontal)
    }

    /// Returns the top inset value
    pub fn top(self) -> f32 {
        self.top
    }

    /// Returns the right inset value
    pub fn right(self) -> f32 {
        self.right
    }

    /// Returns the bottom inset value
    pub fn bottom(self) -> f32 {
        self.bottom
    }

    /// Returns the left inset value
    pub fn left(self) -> f32 {
        self.left
    }

    /// Returns the sum of left and right insets
    pub fn horizontal_sum(self) -> f32 {
        self.left + self.right
    }

    /// Returns the sum of top and bottom insets
    pub fn vertical_sum(self) -> f32 {
        self.top + self.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_new() {
        let point = Point::new(3.5, 4.2);
        assert_eq!(point.x(), 3.5);
        assert_eq!(point.y(), 4.2);
    }

    #[test]
    fn test_point_distance() {
        let origin = Point::new(0.0, 0.0);
        assert_eq!(origin.distance(Point::new(100.0, 0.0)), 100.0);
        assert_eq!(origin.distance(origin), 0.0);
    }

    #[test]
    fn test_point_is_finite() {
        assert!(Point::new(1.0, 2.0).is_finite());
        assert!(!Point::new(f32::NAN, 2.0).is_finite());
        assert!(!Point::new(1.0, f32::INFINITY).is_finite());
    }

    #[test]
    fn test_size_shrink() {
        let size = Size::new(100.0, 50.0);
        let shrunk = size.shrink(Insets::uniform(10.0), 1.0);
        assert_eq!(shrunk, Size::new(80.0, 30.0));

        let clamped = size.shrink(Insets::uniform(40.0), 1.0);
        assert_eq!(clamped.width(), 20.0);
        assert_eq!(clamped.height(), 1.0);
    }

    #[test]
    fn test_bounds_from_points_empty() {
        assert!(Bounds::from_points(Vec::new()).is_none());
    }

    #[test]
    fn test_bounds_from_single_point() {
        let bounds = Bounds::from_points([Point::new(4.0, 7.0)]).unwrap();
        assert_eq!(bounds.width(), 0.0);
        assert_eq!(bounds.height(), 0.0);
        assert_eq!((bounds.min_x(), bounds.min_y()), (4.0, 7.0));
        assert_eq!((bounds.max_x(), bounds.max_y()), (4.0, 7.0));
    }

    #[test]
    fn test_bounds_contains() {
        let outer = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(100.0, 100.0));
        let inner = Bounds::new_from_top_left(Point::new(10.0, 10.0), Size::new(80.0, 80.0));
        let overflowing = Bounds::new_from_top_left(Point::new(10.0, 10.0), Size::new(95.0, 80.0));

        assert!(outer.contains_bounds(&inner, 0.0));
        assert!(!outer.contains_bounds(&overflowing, 0.0));
        assert!(outer.contains_bounds(&overflowing, 5.0));
    }

    #[test]
    fn test_insets_symmetric() {
        let insets = Insets::symmetric(10.0, 4.0);
        assert_eq!(insets.left(), 10.0);
        assert_eq!(insets.right(), 10.0);
        assert_eq!(insets.top(), 4.0);
        assert_eq!(insets.bottom(), 4.0);
        assert_eq!(insets.horizontal_sum(), 20.0);
        assert_eq!(insets.vertical_sum(), 8.0);
    }
}
