//! Geometric helpers for 2D collision detection inside a bento box.
//!
//! Edge conventions differ: rectangle overlap treats touching edges as separated,
//! while point containment used for drop targeting is inclusive on every edge.

use crate::types::{Bounds, Point, Size};

/// Checks whether two rectangles overlap.
///
/// Uses Axis-Aligned Bounding Box (AABB) collision detection.
/// Two rectangles do NOT overlap if they are separated along at least one axis.
/// Rectangles that only share an edge are separated.
///
/// # Parameters
/// * `pos_a`, `size_a` - First rectangle
/// * `pos_b`, `size_b` - Second rectangle
///
/// # Returns
/// `true` if the rectangles share a region of positive area, otherwise `false`
///
/// # Example
/// ```
/// use bento_designer::geometry::overlaps;
/// use bento_designer::types::{Point, Size};
///
/// let size = Size::new(10.0, 10.0);
/// assert!(!overlaps(Point::new(0.0, 0.0), size, Point::new(10.0, 0.0), size));
/// assert!(overlaps(Point::new(0.0, 0.0), size, Point::new(5.0, 5.0), size));
/// ```
pub fn overlaps(pos_a: Point, size_a: Size, pos_b: Point, size_b: Size) -> bool {
    // Separating axis test: no overlap as soon as one axis separates them
    !(pos_a.x + size_a.width <= pos_b.x
        || pos_b.x + size_b.width <= pos_a.x
        || pos_a.y + size_a.height <= pos_b.y
        || pos_b.y + size_b.height <= pos_a.y)
}

/// Checks whether a rectangle lies entirely within the given bounds.
///
/// Both the lower (left/top) and the upper (right/bottom) edges are checked.
/// Lying exactly on an edge of `bounds` still counts as inside.
pub fn fits_within(position: Point, size: Size, bounds: &Bounds) -> bool {
    position.x >= bounds.x
        && position.y >= bounds.y
        && position.x + size.width <= bounds.right()
        && position.y + size.height <= bounds.bottom()
}

/// Checks whether a point lies inside the bounds, inclusive on all edges.
pub fn contains_point(bounds: &Bounds, point: Point) -> bool {
    point.x >= bounds.x
        && point.x <= bounds.right()
        && point.y >= bounds.y
        && point.y <= bounds.bottom()
}
